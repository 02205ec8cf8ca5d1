//! Voice dictation: turns a stream of recognizer events into buffer edits.
//!
//! The speech engine itself lives outside this crate. It delivers
//! [`TranscriptEvent`]s one at a time; only final fragments reach the buffer.
//! Interim hypotheses are ignored, even when a later final repeats them.

use crate::splice;
use std::time::Duration;
use thiserror::Error;

/// Delay before a recognizer is restarted after a transient failure.
pub const RESTART_BACKOFF: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    Interim(String),
    Final(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SpeechError {
    #[error("Speech recognition is not supported in this environment")]
    Unsupported,

    /// The recognizer hiccupped and can be restarted.
    #[error("Speech recognition interrupted: {0}")]
    Transient(String),

    #[error("Speech recognition failed: {0}")]
    Fatal(String),
}

/// What the caller should do with the recognizer after an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    RestartAfter(Duration),
    /// Listening is over; show the message to the user once.
    Stop(String),
    /// Already stopped and reported.
    Ignore,
}

/// Dictation into one buffer, tracking the insertion cursor.
#[derive(Debug, Clone)]
pub struct DictationSession {
    buffer: String,
    cursor: usize,
    listening: bool,
}

impl DictationSession {
    pub fn new(buffer: impl Into<String>, cursor: usize) -> Self {
        let buffer = buffer.into();
        let cursor = cursor.min(buffer.chars().count());
        Self {
            buffer,
            cursor,
            listening: true,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Apply one recognizer event. Returns true when the buffer changed.
    pub fn handle_event(&mut self, event: TranscriptEvent) -> bool {
        if !self.listening {
            return false;
        }

        match event {
            TranscriptEvent::Interim(_) => false,
            TranscriptEvent::Final(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return false;
                }

                let spliced = splice::splice_spaced(&self.buffer, self.cursor, text);
                log::debug!("dictated {} chars at {}", text.chars().count(), self.cursor);
                self.buffer = spliced.buffer;
                self.cursor = spliced.cursor;
                true
            }
        }
    }

    pub fn handle_error(&mut self, error: &SpeechError) -> Recovery {
        if !self.listening {
            return Recovery::Ignore;
        }

        match error {
            SpeechError::Transient(reason) => {
                log::warn!("speech recognition interrupted ({}), restarting", reason);
                Recovery::RestartAfter(RESTART_BACKOFF)
            }
            SpeechError::Unsupported | SpeechError::Fatal(_) => {
                log::error!("{}", error);
                self.listening = false;
                Recovery::Stop(error.to_string())
            }
        }
    }

    /// Finish the session, handing back the edited buffer and cursor.
    pub fn finish(self) -> (String, usize) {
        (self.buffer, self.cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fin(s: &str) -> TranscriptEvent {
        TranscriptEvent::Final(s.to_string())
    }

    #[test]
    fn only_final_fragments_are_inserted() {
        let mut session = DictationSession::new("Hello", 5);
        assert!(!session.handle_event(TranscriptEvent::Interim("wor".into())));
        assert_eq!(session.buffer(), "Hello");

        assert!(session.handle_event(fin(" world ")));
        assert_eq!(session.buffer(), "Hello world");
        assert_eq!(session.cursor(), 11);

        assert!(session.handle_event(fin("again")));
        assert_eq!(session.buffer(), "Hello world again");
    }

    #[test]
    fn inserts_at_cursor_and_advances() {
        let mut session = DictationSession::new("Start. End.", 6);
        session.handle_event(fin("Middle."));
        session.handle_event(fin("More."));
        assert_eq!(session.buffer(), "Start. Middle. More. End.");
        let (buffer, cursor) = session.finish();
        assert_eq!(&buffer[cursor..], " End.");
    }

    #[test]
    fn final_after_converging_interims_is_inserted() {
        let mut session = DictationSession::new("Hello", 5);
        session.handle_event(TranscriptEvent::Interim("big".into()));
        session.handle_event(TranscriptEvent::Interim("big world".into()));

        assert!(session.handle_event(fin("big world")));
        assert_eq!(session.buffer(), "Hello big world");
        assert_eq!(session.cursor(), 15);
    }

    #[test]
    fn blank_final_is_ignored() {
        let mut session = DictationSession::new("", 0);
        assert!(!session.handle_event(fin("   ")));
        assert_eq!(session.buffer(), "");
    }

    #[test]
    fn transient_errors_restart_with_backoff() {
        let mut session = DictationSession::new("", 0);
        let recovery = session.handle_error(&SpeechError::Transient("network".into()));
        assert_eq!(recovery, Recovery::RestartAfter(Duration::from_millis(1000)));
        assert!(session.is_listening());
    }

    #[test]
    fn fatal_errors_stop_and_report_once() {
        let mut session = DictationSession::new("", 0);
        let recovery = session.handle_error(&SpeechError::Fatal("not-allowed".into()));
        assert_eq!(
            recovery,
            Recovery::Stop("Speech recognition failed: not-allowed".into())
        );
        assert!(!session.is_listening());

        assert_eq!(
            session.handle_error(&SpeechError::Unsupported),
            Recovery::Ignore
        );
        assert!(!session.handle_event(fin("late")));
        assert_eq!(session.buffer(), "");
    }

    #[test]
    fn unsupported_environment_stops() {
        let mut session = DictationSession::new("x", 1);
        assert!(matches!(
            session.handle_error(&SpeechError::Unsupported),
            Recovery::Stop(_)
        ));
    }
}
