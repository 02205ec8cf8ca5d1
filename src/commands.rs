use crate::cli::{AssistCommand, ChapterCommand, Cli, Command};
use anyhow::{bail, Context, Result};
use ebook_writer::assistant::{OpenAiAssistant, WritingAssistant};
use ebook_writer::config::AppConfig;
use ebook_writer::converter::{self, ImportedDocument};
use ebook_writer::dictation::{DictationSession, TranscriptEvent};
use ebook_writer::manuscript::Manuscript;
use ebook_writer::stats;
use ebook_writer::storage::{AutoSave, ChapterStore};
use ebook_writer::toc;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time;

pub async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
    let config = AppConfig::load_from(&config_path)?;

    match cli.command {
        Command::Import {
            input,
            output,
            json,
        } => {
            let doc = import(&input, &config).await?;
            let rendered = if json {
                serde_json::to_string_pretty(&doc)? + "\n"
            } else {
                doc.content.clone()
            };
            match output {
                Some(path) => {
                    write_file(&path, &rendered)?;
                    eprintln!(
                        "Imported {} ({} words) to {}",
                        input.display(),
                        doc.metadata.statistics.word_count,
                        path.display()
                    );
                }
                None => print!("{}", rendered),
            }
        }
        Command::Stats { input } => {
            let doc = import(&input, &config).await?;
            print_statistics(&doc);
        }
        Command::Chapter(cmd) => chapter_command(cmd, &config)?,
        Command::Insert { input, at } => {
            let doc = import(&input, &config).await?;
            let mut workspace = Workspace::open(&config);
            let start = at
                .unwrap_or(usize::MAX)
                .min(workspace.active_len());
            let cursor = workspace.manuscript.import_at_cursor(&doc, start)?;
            workspace.save()?;
            eprintln!(
                "Inserted {} at offset {}; cursor now {}",
                input.display(),
                start,
                cursor
            );
        }
        Command::Dictate { text, at } => {
            let mut workspace = Workspace::open(&config);
            let cursor = at.unwrap_or_else(|| workspace.active_len());
            match text {
                Some(text) => {
                    let cursor = workspace.manuscript.insert_transcript(&text, cursor)?;
                    workspace.save()?;
                    eprintln!("Cursor now at {}", cursor);
                }
                None => dictate_from_stdin(&mut workspace, cursor, &config).await?,
            }
        }
        Command::Assist(cmd) => assist_command(cmd, &config).await?,
    }

    Ok(())
}

async fn import(input: &Path, config: &AppConfig) -> Result<ImportedDocument> {
    converter::import_path(input, &config.import_options())
        .await
        .into_result()
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("Error importing {}", input.display()))
}

fn print_statistics(doc: &ImportedDocument) {
    let s = stats::calculate_statistics(&doc.content);
    if let Some(ref title) = doc.metadata.title {
        println!("Title:      {}", title);
    }
    if let Some(ref author) = doc.metadata.author {
        println!("Author:     {}", author);
    }
    if let Some(ref date) = doc.metadata.date {
        println!("Date:       {}", date);
    }
    println!("Words:      {}", s.word_count);
    println!("Characters: {}", s.character_count);
    println!("Sentences:  {}", s.sentence_count);
    println!("Paragraphs: {}", s.paragraph_count);
    println!("Words/sentence: {}", s.average_words_per_sentence);
    println!(
        "Reading time:   {}",
        stats::format_reading_time(s.reading_time_minutes)
    );
}

/// Manuscript restored from the chapter store, saved back after edits.
struct Workspace {
    store: ChapterStore,
    manuscript: Manuscript,
}

impl Workspace {
    fn open(config: &AppConfig) -> Self {
        let store = ChapterStore::new(&config.storage.data_dir());
        let mut manuscript = store
            .restore()
            .map(Manuscript::from_chapters)
            .unwrap_or_default();

        if let Some(id) = store.restore_active() {
            if manuscript.select(&id).is_err() {
                log::debug!("stored active chapter {} no longer exists", id);
            }
        }

        Self { store, manuscript }
    }

    fn active_len(&self) -> usize {
        self.manuscript
            .active()
            .map(|c| c.content.chars().count())
            .unwrap_or(0)
    }

    fn save(&self) -> Result<()> {
        self.store.save(self.manuscript.chapters())?;
        self.store
            .save_active(self.manuscript.active().map(|c| c.id()))?;
        Ok(())
    }
}

fn chapter_command(cmd: ChapterCommand, config: &AppConfig) -> Result<()> {
    let mut workspace = Workspace::open(config);
    let manuscript = &mut workspace.manuscript;

    match cmd {
        ChapterCommand::New { title } => {
            let chapter = manuscript.new_chapter(title.as_deref());
            println!("{}\t{}", chapter.id(), chapter.title);
        }
        ChapterCommand::List => {
            let active = manuscript.active().map(|c| c.id().to_string());
            for (i, chapter) in manuscript.chapters().iter().enumerate() {
                let marker = if active.as_deref() == Some(chapter.id()) { "*" } else { " " };
                let words = manuscript.statistics(chapter.id())?.word_count;
                println!(
                    "{} {:>2}. {}  {}  ({} words)",
                    marker,
                    i + 1,
                    short_id(chapter.id()),
                    chapter.title,
                    words
                );
            }
            return Ok(());
        }
        ChapterCommand::Select { chapter } => {
            let id = manuscript.resolve(&chapter)?.id().to_string();
            manuscript.select(&id)?;
        }
        ChapterCommand::Rename { chapter, title } => {
            let id = manuscript.resolve(&chapter)?.id().to_string();
            manuscript.rename(&id, &title)?;
        }
        ChapterCommand::Delete { chapter } => {
            let id = manuscript.resolve(&chapter)?.id().to_string();
            let removed = manuscript.delete(&id)?;
            eprintln!("Deleted {}", removed.title);
        }
        ChapterCommand::Move { from, to } => {
            if from == 0 || to == 0 {
                bail!("Chapter positions start at 1");
            }
            manuscript.reorder(from - 1, to - 1)?;
        }
        ChapterCommand::Export { chapter, output } => {
            let id = manuscript.resolve(&chapter)?.id().to_string();
            let md = manuscript.export_chapter(&id)?;
            match output {
                Some(path) => write_file(&path, &md)?,
                None => print!("{}", md),
            }
            return Ok(());
        }
        ChapterCommand::Toc { chapter } => {
            let content = &manuscript.resolve(&chapter)?.content;
            for item in toc::table_of_contents(content) {
                let indent = "  ".repeat(usize::from(item.level.saturating_sub(1)));
                println!("{}- {} (#{})", indent, item.text, item.id);
            }
            return Ok(());
        }
    }

    workspace.save()
}

/// Each stdin line is a finalized transcript. The store is saved once
/// dictation has been quiet for the autosave delay, and again at the end.
async fn dictate_from_stdin(
    workspace: &mut Workspace,
    cursor: usize,
    config: &AppConfig,
) -> Result<()> {
    let Some(active) = workspace.manuscript.active() else {
        bail!("Please select a chapter first");
    };

    let mut session = DictationSession::new(active.content.clone(), cursor);
    let mut autosave = AutoSave::new(config.storage.autosave_delay());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let deadline = autosave.deadline();
        let quiet = async move {
            match deadline {
                Some(at) => time::sleep_until(at.into()).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read transcript from stdin")? else {
                    break;
                };
                if session.handle_event(TranscriptEvent::Final(line)) {
                    workspace.manuscript.set_content(session.buffer())?;
                    autosave.touch(Instant::now());
                }
            }
            _ = quiet => {
                let chapters = workspace.manuscript.chapters();
                if autosave.flush_if_due(&workspace.store, chapters, Instant::now())? {
                    log::info!("Content saved");
                }
            }
        }
    }

    let (buffer, cursor) = session.finish();
    workspace.manuscript.set_content(buffer)?;
    workspace.save()?;
    eprintln!("Cursor now at {}", cursor);
    Ok(())
}

async fn assist_command(cmd: AssistCommand, config: &AppConfig) -> Result<()> {
    let assistant = OpenAiAssistant::from_config(&config.assistant)?;
    let mut workspace = Workspace::open(config);
    let chapter_of = |workspace: &Workspace, key: &str| -> Result<(String, String)> {
        let chapter = workspace.manuscript.resolve(key)?;
        Ok((chapter.id().to_string(), chapter.content.clone()))
    };

    match cmd {
        AssistCommand::Analyze { chapter } => {
            let (_, content) = chapter_of(&workspace, &chapter)?;
            let analysis = assistant.analyze_writing(&content).await?;
            println!("Style: {}", analysis.style);
            println!("Tone:  {}", analysis.tone);
            println!("Readability: {}/10", analysis.readability_score);
            for suggestion in &analysis.suggestions {
                println!("- {}", suggestion);
            }
        }
        AssistCommand::Title { chapter, apply } => {
            let (id, content) = chapter_of(&workspace, &chapter)?;
            let suggestion = assistant.suggest_chapter_title(&content).await?;
            println!("{}", suggestion.title);
            if !suggestion.description.is_empty() {
                println!("\n{}", suggestion.description);
            }
            for point in &suggestion.key_points {
                println!("- {}", point);
            }

            if apply {
                if suggestion.title.trim().is_empty() {
                    bail!("The assistant did not suggest a title");
                }
                workspace.manuscript.rename(&id, &suggestion.title)?;
                workspace.save()?;
                eprintln!("Chapter renamed");
            }
        }
        AssistCommand::Improve { chapter, apply } => {
            let (id, content) = chapter_of(&workspace, &chapter)?;
            let improved = assistant.improve_writing(&content).await?;
            println!("{}", improved);

            if apply {
                workspace.manuscript.replace_content(&id, improved)?;
                workspace.save()?;
                eprintln!("Chapter text replaced");
            }
        }
        AssistCommand::Outline { topic } => {
            let outline = assistant.generate_outline(&topic).await?;
            for (i, title) in outline.iter().enumerate() {
                println!("{}. {}", i + 1, title);
            }
        }
    }

    Ok(())
}

/// First eight characters of a chapter id; ids from an edited store may not be ASCII.
fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write output file: {}", path.display()))
}
