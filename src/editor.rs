//! The single-document editor.
//!
//! A lighter sibling of the full site store: one title, one text, at most
//! one picture or video, persisted under [`DOCUMENT_KEY`](crate::types::DOCUMENT_KEY)
//! and shown by [`render::render_document`](crate::render::render_document).
//!
//! Edits schedule an auto-save through a [`Debouncer`]. The auto-save skips
//! blank documents, so opening the editor and typing nothing never
//! overwrites earlier content with an empty one. Explicit [`submit`] always
//! validates first.
//!
//! [`submit`]: ContentEditor::submit

use crate::autosave::Debouncer;
use crate::config::MediaConfig;
use crate::ids;
use crate::media::{self, MediaError, MediaKind};
use crate::notice::{Notice, Notices};
use crate::storage::{KeyValueStore, StorageError};
use crate::types::{EditorDocument, MediaData};
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error("Please enter a website title")]
    MissingTitle,
    #[error("Please add some content or upload media")]
    MissingContent,
}

pub struct ContentEditor<S> {
    backend: S,
    key: String,
    doc: EditorDocument,
    limits: MediaConfig,
    autosave: Debouncer,
    notices: Notices,
}

impl<S: KeyValueStore> ContentEditor<S> {
    /// Open the editor and load any previously saved document.
    pub fn open(
        backend: S,
        key: impl Into<String>,
        limits: MediaConfig,
        autosave_delay: Duration,
    ) -> Self {
        let mut editor = Self {
            backend,
            key: key.into(),
            doc: EditorDocument::default(),
            limits,
            autosave: Debouncer::new(autosave_delay),
            notices: Notices::default(),
        };
        editor.load_existing();
        editor
    }

    /// Replace the working document with the stored one, if there is a
    /// readable one. Otherwise the working document is left as it was.
    pub fn load_existing(&mut self) {
        match read_document(&self.backend, &self.key) {
            Ok(Some(doc)) => {
                tracing::debug!(key = %self.key, "loaded existing document");
                self.doc = doc;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(key = %self.key, error = %e, "error loading saved content"),
        }
    }

    pub fn document(&self) -> &EditorDocument {
        &self.doc
    }

    pub fn set_title(&mut self, title: impl Into<String>, now: Instant) {
        self.doc.title = title.into();
        self.autosave.touch(now);
    }

    pub fn set_text(&mut self, text: impl Into<String>, now: Instant) {
        self.doc.text = text.into();
        self.autosave.touch(now);
    }

    /// Validate and embed a local picture or video, replacing any previous
    /// one. On failure the current media is kept.
    pub fn attach_media(&mut self, path: &Path, now: Instant) -> Result<(), EditorError> {
        let ingested = match media::ingest_file(path, &self.limits) {
            Ok(ingested) => ingested,
            Err(e) => {
                self.notices.push(Notice::error(e.to_string()));
                return Err(e.into());
            }
        };
        let label = match ingested.kind {
            MediaKind::Image => "Image",
            MediaKind::Video => "Video",
        };
        self.doc.media = MediaData {
            content: Some(ingested.data_uri),
            mime: Some(ingested.mime),
            name: Some(ingested.name),
        };
        self.notices
            .push(Notice::success(format!("{label} added successfully!")));
        self.autosave.touch(now);
        Ok(())
    }

    pub fn remove_media(&mut self, now: Instant) {
        self.doc.media = MediaData::default();
        self.notices.push(Notice::info("Media removed"));
        self.autosave.touch(now);
    }

    /// A document needs a title, plus text or media.
    pub fn validate(&self) -> Result<(), EditorError> {
        if self.doc.title.trim().is_empty() {
            return Err(EditorError::MissingTitle);
        }
        if self.doc.text.trim().is_empty() && self.doc.media.is_empty() {
            return Err(EditorError::MissingContent);
        }
        Ok(())
    }

    /// Validate and save. Validation failures become error notices and
    /// nothing is written.
    pub fn submit(&mut self) -> Result<(), EditorError> {
        if let Err(e) = self.validate() {
            self.notices.push(Notice::error(e.to_string()));
            return Err(e);
        }
        self.write()?;
        self.notices.push(Notice::success("Content saved!"));
        Ok(())
    }

    /// Like [`submit`](Self::submit), but hands back the saved document for
    /// rendering instead of announcing the save.
    pub fn preview(&mut self) -> Result<&EditorDocument, EditorError> {
        if let Err(e) = self.validate() {
            self.notices.push(Notice::error(e.to_string()));
            return Err(e);
        }
        self.write()?;
        self.notices.push(Notice::info("Opening preview..."));
        Ok(&self.doc)
    }

    /// Run a due auto-save. Returns `true` if something was written.
    pub fn tick(&mut self, now: Instant) -> Result<bool, EditorError> {
        if !self.autosave.poll(now) || self.doc.is_blank() {
            return Ok(false);
        }
        self.write()?;
        tracing::debug!(key = %self.key, "auto-saved");
        Ok(true)
    }

    /// Run a pending auto-save now instead of after the quiet period.
    pub fn flush(&mut self) -> Result<bool, EditorError> {
        if !self.autosave.is_pending() {
            return Ok(false);
        }
        self.autosave = Debouncer::new(self.autosave.delay());
        if self.doc.is_blank() {
            return Ok(false);
        }
        self.write()?;
        Ok(true)
    }

    pub fn has_pending_save(&self) -> bool {
        self.autosave.is_pending()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    fn write(&mut self) -> Result<(), EditorError> {
        self.doc.title = self.doc.title.trim().to_string();
        self.doc.text = self.doc.text.trim().to_string();
        self.doc.timestamp = Some(ids::now_iso());
        let json = serde_json::to_string(&self.doc)?;
        self.backend.set(&self.key, &json)?;
        Ok(())
    }
}

/// Read the stored document. `Ok(None)` when nothing was saved yet.
pub fn read_document<S: KeyValueStore>(
    backend: &S,
    key: &str,
) -> Result<Option<EditorDocument>, EditorError> {
    match backend.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeLevel;
    use crate::storage::MemoryStore;
    use crate::types::DOCUMENT_KEY;
    use std::fs;
    use tempfile::TempDir;

    const DELAY: Duration = Duration::from_secs(2);

    fn editor() -> ContentEditor<MemoryStore> {
        ContentEditor::open(MemoryStore::new(), DOCUMENT_KEY, MediaConfig::default(), DELAY)
    }

    fn stored(editor: &ContentEditor<MemoryStore>) -> Option<EditorDocument> {
        read_document(editor.backend(), DOCUMENT_KEY).unwrap()
    }

    #[test]
    fn submit_requires_title() {
        let mut ed = editor();
        ed.set_text("words", Instant::now());
        assert!(matches!(ed.submit(), Err(EditorError::MissingTitle)));
        assert!(stored(&ed).is_none());
        let notices = ed.drain_notices();
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].message, "Please enter a website title");
    }

    #[test]
    fn submit_requires_text_or_media() {
        let mut ed = editor();
        ed.set_title("Title", Instant::now());
        assert!(matches!(ed.submit(), Err(EditorError::MissingContent)));
    }

    #[test]
    fn submit_saves_trimmed_with_timestamp() {
        let mut ed = editor();
        let now = Instant::now();
        ed.set_title("  My site  ", now);
        ed.set_text("hello\n", now);
        ed.submit().unwrap();
        let doc = stored(&ed).unwrap();
        assert_eq!(doc.title, "My site");
        assert_eq!(doc.text, "hello");
        assert!(doc.timestamp.is_some());
    }

    #[test]
    fn preview_saves_and_returns_document() {
        let mut ed = editor();
        ed.set_title("Peek", Instant::now());
        assert!(ed.preview().is_err());
        ed.set_text("inside", Instant::now());
        let doc = ed.preview().unwrap().clone();
        assert_eq!(doc.title, "Peek");
        assert_eq!(stored(&ed).unwrap(), doc);
    }

    #[test]
    fn autosave_waits_for_quiet_period() {
        let mut ed = editor();
        let start = Instant::now();
        ed.set_title("Draft", start);
        assert!(!ed.tick(start + Duration::from_secs(1)).unwrap());
        ed.set_text("more", start + Duration::from_secs(1));
        assert!(!ed.tick(start + DELAY).unwrap());
        assert!(ed.tick(start + Duration::from_secs(3)).unwrap());
        assert_eq!(stored(&ed).unwrap().text, "more");
        assert!(!ed.has_pending_save());
    }

    #[test]
    fn autosave_skips_blank_document() {
        let mut ed = editor();
        let start = Instant::now();
        ed.set_title("", start);
        assert!(!ed.tick(start + DELAY).unwrap());
        assert!(stored(&ed).is_none());
    }

    #[test]
    fn autosave_never_blanks_saved_document() {
        let mut ed = editor();
        ed.set_title("Keep me", Instant::now());
        ed.set_text("important", Instant::now());
        ed.submit().unwrap();

        let start = Instant::now();
        ed.set_title("   ", start);
        ed.set_text("", start);
        assert!(!ed.tick(start + Duration::from_secs(3)).unwrap());
        let doc = stored(&ed).unwrap();
        assert_eq!(doc.title, "Keep me");
        assert_eq!(doc.text, "important");

        ed.set_text("  \n", start);
        assert!(!ed.flush().unwrap());
        assert_eq!(stored(&ed).unwrap().title, "Keep me");
    }

    #[test]
    fn flush_writes_pending_edit_once() {
        let mut ed = editor();
        assert!(!ed.flush().unwrap());
        ed.set_title("Now", Instant::now());
        assert!(ed.flush().unwrap());
        assert_eq!(stored(&ed).unwrap().title, "Now");
        assert!(!ed.flush().unwrap());
    }

    #[test]
    fn attach_and_remove_media() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sunset.jpg");
        fs::write(&path, b"jpeg").unwrap();

        let mut ed = editor();
        ed.attach_media(&path, Instant::now()).unwrap();
        assert!(ed.document().media.is_image());
        assert_eq!(ed.document().media.name.as_deref(), Some("sunset.jpg"));
        assert_eq!(ed.drain_notices()[0].message, "Image added successfully!");

        ed.remove_media(Instant::now());
        assert!(ed.document().media.is_empty());
    }

    #[test]
    fn rejected_media_keeps_previous() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("a.png");
        let bad = tmp.path().join("notes.txt");
        fs::write(&good, b"png").unwrap();
        fs::write(&bad, b"text").unwrap();

        let mut ed = editor();
        ed.attach_media(&good, Instant::now()).unwrap();
        assert!(ed.attach_media(&bad, Instant::now()).is_err());
        assert_eq!(ed.document().media.name.as_deref(), Some("a.png"));
        let notices = ed.drain_notices();
        assert_eq!(notices.last().unwrap().level, NoticeLevel::Error);
    }

    #[test]
    fn reopening_loads_saved_document() {
        let mut ed = editor();
        ed.set_title("Kept", Instant::now());
        ed.set_text("Body", Instant::now());
        ed.submit().unwrap();
        let backend = ed.backend().clone();

        let reopened =
            ContentEditor::open(backend, DOCUMENT_KEY, MediaConfig::default(), DELAY);
        assert_eq!(reopened.document().title, "Kept");
    }

    #[test]
    fn malformed_saved_document_is_ignored() {
        let mut backend = MemoryStore::new();
        backend.set(DOCUMENT_KEY, "{oops").unwrap();
        let ed = ContentEditor::open(backend, DOCUMENT_KEY, MediaConfig::default(), DELAY);
        assert_eq!(ed.document(), &EditorDocument::default());
    }
}
