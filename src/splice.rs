//! Cursor-aware insertion into a text buffer.
//!
//! Offsets are char indices, the same unit editors use for cursor positions.
//! A stale offset past the end of the buffer is clamped to the end.

use ropey::Rope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spacing {
    /// Insert a separating space unless the text before the cursor already
    /// ends in a space or newline. Used for dictated fragments.
    WordBoundary,
    /// Concatenate as-is. Used for imported documents.
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spliced {
    pub buffer: String,
    /// Char offset immediately after the inserted fragment
    pub cursor: usize,
}

pub fn splice(buffer: &str, cursor: usize, fragment: &str, spacing: Spacing) -> Spliced {
    let mut rope = Rope::from_str(buffer);
    let cursor = cursor.min(rope.len_chars());

    if fragment.is_empty() {
        return Spliced {
            buffer: buffer.to_string(),
            cursor,
        };
    }

    let needs_space = spacing == Spacing::WordBoundary
        && cursor > 0
        && !matches!(rope.char(cursor - 1), ' ' | '\n');

    let mut at = cursor;
    if needs_space {
        rope.insert_char(at, ' ');
        at += 1;
    }
    rope.insert(at, fragment);

    Spliced {
        buffer: rope.to_string(),
        cursor: at + fragment.chars().count(),
    }
}

/// Insert a dictated fragment, keeping words apart.
pub fn splice_spaced(buffer: &str, cursor: usize, fragment: &str) -> Spliced {
    splice(buffer, cursor, fragment, Spacing::WordBoundary)
}

/// Insert text exactly at the cursor.
pub fn splice_raw(buffer: &str, cursor: usize, fragment: &str) -> Spliced {
    splice(buffer, cursor, fragment, Spacing::None)
}
