use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Write ebooks chapter by chapter: import documents, dictate, get AI feedback
#[derive(Parser, Debug)]
#[command(name = "ebook-writer", version, about)]
pub struct Cli {
    /// Settings file. Defaults to settings.toml in the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert a .txt, .md, .doc or .docx file to Markdown
    Import {
        input: PathBuf,

        /// Write the Markdown here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print content and metadata as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show word count, reading time and other statistics for a file
    Stats { input: PathBuf },

    /// Manage chapters of the current manuscript
    #[command(subcommand)]
    Chapter(ChapterCommand),

    /// Import a file into the active chapter at a cursor position
    Insert {
        input: PathBuf,

        /// Character offset in the active chapter. Defaults to the end.
        #[arg(long)]
        at: Option<usize>,
    },

    /// Insert a dictated phrase into the active chapter
    Dictate {
        /// Transcript to insert. Without it, each stdin line is dictated.
        text: Option<String>,

        /// Character offset in the active chapter. Defaults to the end.
        #[arg(long)]
        at: Option<usize>,
    },

    /// Ask the AI writing assistant
    #[command(subcommand)]
    Assist(AssistCommand),
}

/// Chapters are addressed by id, unique id prefix, or 1-based position.
#[derive(Subcommand, Debug)]
pub enum ChapterCommand {
    /// Add a chapter and make it active
    New { title: Option<String> },
    List,
    Select { chapter: String },
    Rename { chapter: String, title: String },
    Delete { chapter: String },
    /// Move the chapter at position FROM to position TO (1-based)
    Move { from: usize, to: usize },
    /// Write a chapter as Markdown
    Export {
        chapter: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the headings of a chapter
    Toc { chapter: String },
}

#[derive(Subcommand, Debug)]
pub enum AssistCommand {
    /// Style, tone and readability feedback on a chapter
    Analyze { chapter: String },
    /// Suggest a title for a chapter
    Title {
        chapter: String,

        /// Rename the chapter to the suggested title
        #[arg(long)]
        apply: bool,
    },
    /// Print an improved version of a chapter
    Improve {
        chapter: String,

        /// Replace the chapter's text with the improved version
        #[arg(long)]
        apply: bool,
    },
    /// Propose chapter titles for a topic
    Outline { topic: String },
}
