//! Manuscript edits survive a save + restore cycle.

use ebook_writer::dictation::{DictationSession, TranscriptEvent};
use ebook_writer::storage::ChapterStore;
use ebook_writer::{import_document, ImportOptions, Manuscript, SourceFile};

#[test]
fn chapters_survive_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let first_id;

    // First session: write two chapters and persist.
    {
        let store = ChapterStore::new(dir.path());
        let mut manuscript = Manuscript::new();

        first_id = manuscript.new_chapter(Some("Arrival")).id().to_string();
        manuscript.set_content("The train stopped.").unwrap();
        manuscript.insert_transcript("Nobody got off.", 18).unwrap();

        manuscript.new_chapter(None);
        let file = SourceFile::new("notes.md", "---\ntitle: Notes\n---\n## Later".as_bytes());
        let doc = import_document(&file, &ImportOptions::default())
            .into_result()
            .unwrap();
        manuscript.import_at_cursor(&doc, 0).unwrap();

        store.save(manuscript.chapters()).unwrap();
        store
            .save_active(manuscript.active().map(|c| c.id()))
            .unwrap();
    }

    // Second session: restore and verify.
    {
        let store = ChapterStore::new(dir.path());
        let mut manuscript = Manuscript::from_chapters(store.restore().unwrap());
        manuscript.select(&store.restore_active().unwrap()).unwrap();

        assert_eq!(manuscript.chapters().len(), 2);
        let first = manuscript.chapter(&first_id).unwrap();
        assert_eq!(first.title, "Arrival");
        assert_eq!(first.content, "The train stopped. Nobody got off.");

        let active = manuscript.active().unwrap();
        assert_eq!(active.title, "Chapter 2");
        assert_eq!(active.content, "## Later");
    }
}

#[test]
fn corrupt_store_starts_empty() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = ChapterStore::new(dir.path());
    std::fs::write(store.path(), "[{\"id\": 1").unwrap();

    let manuscript = store
        .restore()
        .map(Manuscript::from_chapters)
        .unwrap_or_default();
    assert!(manuscript.is_empty());
}

#[test]
fn dictation_session_feeds_active_chapter() {
    let mut manuscript = Manuscript::new();
    manuscript.new_chapter(Some("Voice"));
    manuscript.set_content("Dear diary,\n").unwrap();

    let start = manuscript.active().unwrap().content.chars().count();
    let mut session = DictationSession::new(manuscript.active().unwrap().content.clone(), start);
    for event in [
        TranscriptEvent::Interim("Today was".into()),
        TranscriptEvent::Final("Today was long.".into()),
        TranscriptEvent::Interim("I slept".into()),
        TranscriptEvent::Interim("I slept early.".into()),
        TranscriptEvent::Final("I slept early.".into()),
    ] {
        session.handle_event(event);
    }

    let (buffer, _) = session.finish();
    manuscript.set_content(buffer).unwrap();
    assert_eq!(
        manuscript.active().unwrap().content,
        "Dear diary,\nToday was long. I slept early."
    );
}
