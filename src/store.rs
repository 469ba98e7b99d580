//! The site state store.
//!
//! [`StateStore`] owns the one [`AppState`] of a site and the key-value
//! backend it is persisted to. All changes go through named methods. The
//! store never saves on its own: callers decide when a change is worth a
//! write (immediately for structural edits, debounced for typing; see
//! [`crate::controller`]).
//!
//! ## Persistence contract
//!
//! - [`StateStore::load`] never fails. A missing blob, an unreadable one, or
//!   one that is not a valid state all produce [`AppState::default`], with a
//!   `warn` log for the last two.
//! - [`StateStore::save`] overwrites the blob with the full state. There is
//!   no merging with what is on disk and no version check, so two processes
//!   saving the same store simply race: the last write wins.
//! - [`StateStore::merge`] overlays a [`PartialAppState`] key by key. Lists
//!   are replaced, not appended.

use crate::collection::{self, PostDraft, SectionDraft};
use crate::notice::{Notice, Notices};
use crate::storage::{KeyValueStore, StorageError};
use crate::types::{AppState, PartialAppState, Theme};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("imported file must contain a JSON object")]
    NotAnObject,
    #[error("no section with id '{0}'")]
    UnknownSection(String),
    #[error("no post with id '{0}'")]
    UnknownPost(String),
    #[error("no active section to add the post to")]
    NoActiveSection,
    #[error("a post needs a title, some text, or media")]
    EmptyPost,
    #[error("a section needs a title")]
    EmptySection,
}

pub struct StateStore<S> {
    backend: S,
    key: String,
    state: AppState,
    notices: Notices,
}

impl<S: KeyValueStore> StateStore<S> {
    /// Wrap `backend` and load the state stored under `key`.
    pub fn open(backend: S, key: impl Into<String>) -> Self {
        let mut store = Self {
            backend,
            key: key.into(),
            state: AppState::default(),
            notices: Notices::default(),
        };
        store.load();
        store
    }

    /// Re-read the persisted state, falling back to the default state.
    pub fn load(&mut self) -> &AppState {
        self.state = self.read_persisted().unwrap_or_default();
        if collection::normalize_active(&mut self.state) {
            tracing::warn!(key = %self.key, "stored state had several active sections; kept the first");
        }
        &self.state
    }

    fn read_persisted(&self) -> Option<AppState> {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key = %self.key, "no stored state, using defaults");
                return None;
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "could not read stored state, using defaults");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "stored state is malformed, using defaults");
                None
            }
        }
    }

    /// Write the full state, replacing whatever is stored.
    pub fn save(&mut self) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.state)?;
        self.backend.set(&self.key, &json)?;
        tracing::debug!(key = %self.key, "state saved");
        self.notices.push(Notice::success("Changes saved!"));
        Ok(())
    }

    /// Overlay `partial` on the current state.
    pub fn merge(&mut self, partial: PartialAppState) -> &AppState {
        partial.apply_to(&mut self.state);
        collection::normalize_active(&mut self.state);
        &self.state
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    // -------------------------------------------------------------------------
    // Named mutations
    // -------------------------------------------------------------------------

    pub fn set_site_title(&mut self, title: impl Into<String>) {
        self.state.site_title = title.into();
    }

    pub fn set_site_description(&mut self, description: impl Into<String>) {
        self.state.site_description = description.into();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.state.current_theme = theme;
    }

    pub fn set_edit_mode(&mut self, on: bool) {
        self.state.is_edit_mode = on;
    }

    pub fn set_preview_mode(&mut self, on: bool) {
        self.state.is_preview_mode = on;
    }

    pub fn add_menu_item(&mut self, draft: SectionDraft) -> Result<String, StoreError> {
        if draft.title.trim().is_empty() {
            return Err(StoreError::EmptySection);
        }
        Ok(collection::add_section(&mut self.state, draft))
    }

    pub fn update_menu_item(&mut self, id: &str, draft: SectionDraft) -> Result<(), StoreError> {
        if draft.title.trim().is_empty() {
            return Err(StoreError::EmptySection);
        }
        if collection::update_section(&mut self.state, id, draft) {
            Ok(())
        } else {
            Err(StoreError::UnknownSection(id.to_string()))
        }
    }

    /// Make `id` the only active section. Unknown ids leave the state as is.
    pub fn select_menu_item(&mut self, id: &str) -> Result<(), StoreError> {
        if collection::select_section(&mut self.state, id) {
            Ok(())
        } else {
            Err(StoreError::UnknownSection(id.to_string()))
        }
    }

    /// File a new post under the active section.
    pub fn add_content_item(&mut self, draft: PostDraft) -> Result<String, StoreError> {
        if draft.is_empty() {
            return Err(StoreError::EmptyPost);
        }
        let menu_id = collection::active_section(&self.state)
            .map(|m| m.id.clone())
            .ok_or(StoreError::NoActiveSection)?;
        Ok(collection::add_item(&mut self.state, draft, &menu_id))
    }

    pub fn update_content_item(&mut self, id: &str, draft: PostDraft) -> Result<(), StoreError> {
        if draft.is_empty() {
            return Err(StoreError::EmptyPost);
        }
        if collection::update_item(&mut self.state, id, draft) {
            Ok(())
        } else {
            Err(StoreError::UnknownPost(id.to_string()))
        }
    }

    pub fn delete_content_item(&mut self, id: &str) -> Result<(), StoreError> {
        collection::delete_item(&mut self.state, id)
            .map(|_| ())
            .ok_or_else(|| StoreError::UnknownPost(id.to_string()))
    }

    // -------------------------------------------------------------------------
    // Import / export
    // -------------------------------------------------------------------------

    /// The full state as pretty-printed JSON.
    pub fn export_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.state)?)
    }

    /// Merge a JSON document into the state. On any error the state is left
    /// exactly as it was.
    pub fn import_json(&mut self, text: &str) -> Result<&AppState, StoreError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(StoreError::NotAnObject);
        }
        let partial: PartialAppState = serde_json::from_value(value)?;
        Ok(self.merge(partial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};
    use crate::types::STATE_KEY;
    use tempfile::TempDir;

    fn memory_store() -> StateStore<MemoryStore> {
        StateStore::open(MemoryStore::new(), STATE_KEY)
    }

    fn with_blob(blob: &str) -> StateStore<MemoryStore> {
        let mut backend = MemoryStore::new();
        backend.set(STATE_KEY, blob).unwrap();
        StateStore::open(backend, STATE_KEY)
    }

    fn draft(title: &str) -> PostDraft {
        PostDraft {
            title: title.into(),
            text: "body".into(),
            ..Default::default()
        }
    }

    #[test]
    fn load_without_blob_gives_default() {
        let store = memory_store();
        assert_eq!(store.state().menu_items.len(), 1);
        assert_eq!(store.state().content_items.len(), 1);
    }

    #[test]
    fn load_corrupt_blob_gives_default() {
        let store = with_blob("not json");
        assert_eq!(store.state().site_title, "My Website");
        assert_eq!(store.state().menu_items.len(), 1);
        assert_eq!(store.state().content_items.len(), 1);
    }

    #[test]
    fn load_wrong_shape_gives_default() {
        let store = with_blob(r#"{"siteTitle": 5}"#);
        assert_eq!(store.state().site_title, "My Website");
    }

    #[test]
    fn load_repairs_multiple_active_sections() {
        let blob = r#"{"siteTitle":"S","menuItems":[
            {"id":"a","title":"A","active":true},
            {"id":"b","title":"B","active":true}]}"#;
        let store = with_blob(blob);
        let active: Vec<_> = store
            .state()
            .menu_items
            .iter()
            .filter(|m| m.active)
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(active, ["a"]);
    }

    #[test]
    fn save_then_reload() {
        let mut store = memory_store();
        store.set_site_title("Saved");
        store.save().unwrap();
        let backend = store.backend().clone();
        let reopened = StateStore::open(backend, STATE_KEY);
        assert_eq!(reopened.state().site_title, "Saved");
    }

    #[test]
    fn save_emits_confirmation() {
        let mut store = memory_store();
        store.save().unwrap();
        let notices = store.drain_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, crate::notice::NoticeLevel::Success);
    }

    #[test]
    fn save_of_load_is_idempotent() {
        let mut store = memory_store();
        store.add_content_item(draft("Hi")).unwrap();
        store.save().unwrap();
        let first: serde_json::Value =
            serde_json::from_str(&store.backend().get(STATE_KEY).unwrap().unwrap()).unwrap();

        store.load();
        store.save().unwrap();
        let second: serde_json::Value =
            serde_json::from_str(&store.backend().get(STATE_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn file_backed_store_persists() {
        let tmp = TempDir::new().unwrap();
        let mut store = StateStore::open(FileStore::open(tmp.path()).unwrap(), STATE_KEY);
        store.set_theme(Theme::Orange);
        store.save().unwrap();

        let reopened = StateStore::open(FileStore::open(tmp.path()).unwrap(), STATE_KEY);
        assert_eq!(reopened.state().current_theme, Theme::Orange);
    }

    #[test]
    fn merge_overwrites_keys_and_replaces_lists() {
        let mut store = memory_store();
        store.add_content_item(draft("extra")).unwrap();
        assert_eq!(store.state().content_items.len(), 2);

        store.merge(PartialAppState {
            site_description: Some("merged".into()),
            content_items: Some(vec![]),
            ..Default::default()
        });
        assert_eq!(store.state().site_description, "merged");
        assert!(store.state().content_items.is_empty());
        assert_eq!(store.state().site_title, "My Website");
    }

    #[test]
    fn add_post_requires_active_section() {
        let mut store = memory_store();
        store.merge(PartialAppState {
            menu_items: Some(vec![]),
            ..Default::default()
        });
        assert!(matches!(
            store.add_content_item(draft("x")),
            Err(StoreError::NoActiveSection)
        ));
    }

    #[test]
    fn empty_post_rejected() {
        let mut store = memory_store();
        let before = store.state().clone();
        assert!(matches!(
            store.add_content_item(PostDraft::default()),
            Err(StoreError::EmptyPost)
        ));
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn select_unknown_section_is_error_and_noop() {
        let mut store = memory_store();
        let before = store.state().clone();
        assert!(matches!(
            store.select_menu_item("ghost"),
            Err(StoreError::UnknownSection(_))
        ));
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn empty_section_title_rejected() {
        let mut store = memory_store();
        assert!(matches!(
            store.add_menu_item(SectionDraft::default()),
            Err(StoreError::EmptySection)
        ));
    }

    #[test]
    fn delete_unknown_post_is_error() {
        let mut store = memory_store();
        assert!(matches!(
            store.delete_content_item("ghost"),
            Err(StoreError::UnknownPost(_))
        ));
        store.delete_content_item("welcome").unwrap();
        assert!(store.state().content_items.is_empty());
    }

    #[test]
    fn import_invalid_json_leaves_state() {
        let mut store = memory_store();
        let before = store.state().clone();
        assert!(matches!(
            store.import_json("{broken"),
            Err(StoreError::Json(_))
        ));
        assert!(matches!(store.import_json("[]"), Err(StoreError::NotAnObject)));
        assert!(store.import_json(r#"{"siteTitle": 3}"#).is_err());
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn export_then_import_round_trips() {
        let mut store = memory_store();
        store.set_site_title("Exported");
        store.add_content_item(draft("second")).unwrap();
        let json = store.export_json().unwrap();

        let mut other = memory_store();
        other.import_json(&json).unwrap();
        assert_eq!(other.state(), store.state());
    }
}
