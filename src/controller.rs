//! Session controller.
//!
//! Sits between user intents and the [`StateStore`]. The store only knows
//! how to mutate and persist; the controller adds what belongs to one
//! editing session:
//!
//! - which post is being edited ([`Controller::begin_edit`]),
//! - destructive actions waiting for a yes/no ([`PendingConfirmation`]),
//! - debounced saving of keystroke-level edits ([`Controller::tick`]),
//! - the save policy: structural changes are written immediately.
//!
//! Every intent reports its outcome through the store's notice queue.
//! Failures leave the in-memory state as it was before the intent, so the
//! methods return plain `bool`s rather than errors.

use crate::autosave::Debouncer;
use crate::collection::{self, PostDraft, SectionDraft};
use crate::config::{MediaConfig, ShareConfig, SiteConfig};
use crate::media::{self, MediaKind};
use crate::notice::Notice;
use crate::share;
use crate::storage::KeyValueStore;
use crate::store::{StateStore, StoreError};
use crate::types::{AppState, Theme};
use std::fs;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    DeletePost,
}

/// A destructive action waiting for the user's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub action: ConfirmAction,
    /// Id of the thing the action applies to.
    pub payload: String,
    pub prompt: String,
}

pub struct Controller<S> {
    store: StateStore<S>,
    editing_post_id: Option<String>,
    pending: Option<PendingConfirmation>,
    autosave: Debouncer,
    media_limits: MediaConfig,
    share: ShareConfig,
    viewing_shared: bool,
}

impl<S: KeyValueStore> Controller<S> {
    pub fn new(store: StateStore<S>, config: &SiteConfig) -> Self {
        Self {
            store,
            editing_post_id: None,
            pending: None,
            autosave: Debouncer::new(config.autosave.delay()),
            media_limits: config.media.clone(),
            share: config.share.clone(),
            viewing_shared: false,
        }
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn store(&self) -> &StateStore<S> {
        &self.store
    }

    pub fn editing_post_id(&self) -> Option<&str> {
        self.editing_post_id.as_deref()
    }

    pub fn pending_confirmation(&self) -> Option<&PendingConfirmation> {
        self.pending.as_ref()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.store.drain_notices()
    }

    /// True while a shared site is shown in place of the local one.
    pub fn is_viewing_shared(&self) -> bool {
        self.viewing_shared
    }

    /// Drop whatever is in memory and go back to the locally stored site.
    pub fn reload_local(&mut self) {
        self.store.load();
        self.autosave = Debouncer::new(self.autosave.delay());
        self.editing_post_id = None;
        self.pending = None;
        self.viewing_shared = false;
    }

    // -------------------------------------------------------------------------
    // Debounced edits
    // -------------------------------------------------------------------------

    pub fn edit_site_title(&mut self, title: impl Into<String>, now: Instant) {
        self.store.set_site_title(title);
        self.autosave.touch(now);
    }

    pub fn edit_site_description(&mut self, description: impl Into<String>, now: Instant) {
        self.store.set_site_description(description);
        self.autosave.touch(now);
    }

    /// Perform a due auto-save. Returns `true` if the state was written.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.autosave.poll(now) && self.persist()
    }

    /// Write a pending auto-save right away, without waiting for the quiet
    /// period. No-op when nothing is pending.
    pub fn flush(&mut self) -> bool {
        if !self.autosave.is_pending() {
            return false;
        }
        self.autosave = Debouncer::new(self.autosave.delay());
        self.persist()
    }

    // -------------------------------------------------------------------------
    // Immediate edits
    // -------------------------------------------------------------------------

    pub fn set_theme(&mut self, theme: Theme) -> bool {
        self.store.set_theme(theme);
        self.persist()
    }

    /// Entering edit mode leaves preview mode.
    pub fn set_edit_mode(&mut self, on: bool) -> bool {
        self.store.set_edit_mode(on);
        if on {
            self.store.set_preview_mode(false);
        } else {
            self.editing_post_id = None;
        }
        self.persist()
    }

    /// Leave both edit and preview mode with a single save.
    pub fn set_view_mode(&mut self) -> bool {
        self.store.set_edit_mode(false);
        self.store.set_preview_mode(false);
        self.editing_post_id = None;
        self.persist()
    }

    /// Entering preview mode leaves edit mode.
    pub fn set_preview_mode(&mut self, on: bool) -> bool {
        self.store.set_preview_mode(on);
        if on {
            self.store.set_edit_mode(false);
            self.editing_post_id = None;
        }
        self.persist()
    }

    pub fn select_section(&mut self, id: &str) -> bool {
        match self.store.select_menu_item(id) {
            Ok(()) => self.persist(),
            Err(e) => self.fail(e),
        }
    }

    pub fn add_section(&mut self, draft: SectionDraft) -> Option<String> {
        match self.store.add_menu_item(draft) {
            Ok(id) => self.persist().then_some(id),
            Err(e) => {
                self.fail(e);
                None
            }
        }
    }

    pub fn update_section(&mut self, id: &str, draft: SectionDraft) -> bool {
        match self.store.update_menu_item(id, draft) {
            Ok(()) => self.persist(),
            Err(e) => self.fail(e),
        }
    }

    // -------------------------------------------------------------------------
    // Posts
    // -------------------------------------------------------------------------

    /// Start editing an existing post. The next [`submit_post`] updates it
    /// instead of creating a new one.
    ///
    /// [`submit_post`]: Controller::submit_post
    pub fn begin_edit(&mut self, id: &str) -> Option<PostDraft> {
        let Some(item) = collection::find_item(self.store.state(), id) else {
            self.fail(StoreError::UnknownPost(id.to_string()));
            return None;
        };
        let draft = PostDraft {
            title: item.title.clone(),
            text: item.text.clone(),
            images: item.image_list().into_iter().map(str::to_string).collect(),
            videos: item.videos.clone(),
        };
        self.editing_post_id = Some(id.to_string());
        Some(draft)
    }

    pub fn cancel_edit(&mut self) {
        self.editing_post_id = None;
    }

    /// Create a post in the active section, or update the one being edited.
    ///
    /// Attachments may be URLs, data-URIs or local paths; local files are
    /// embedded. Any invalid attachment rejects the whole post.
    pub fn submit_post(&mut self, draft: PostDraft) -> Option<String> {
        let draft = match self.embed_attachments(draft) {
            Ok(draft) => draft,
            Err(message) => {
                self.store.notify(Notice::error(message));
                return None;
            }
        };
        let result = match self.editing_post_id.clone() {
            Some(id) => self.store.update_content_item(&id, draft).map(|()| id),
            None => self.store.add_content_item(draft),
        };
        match result {
            Ok(id) => {
                self.editing_post_id = None;
                self.persist().then_some(id)
            }
            Err(e) => {
                self.fail(e);
                None
            }
        }
    }

    fn embed_attachments(&self, draft: PostDraft) -> Result<PostDraft, String> {
        let resolve = |sources: Vec<String>, kind| {
            sources
                .iter()
                .map(|s| media::resolve_source(s, kind, &self.media_limits))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| e.to_string())
        };
        Ok(PostDraft {
            images: resolve(draft.images, MediaKind::Image)?,
            videos: resolve(draft.videos, MediaKind::Video)?,
            ..draft
        })
    }

    /// Ask before deleting a post. Nothing is deleted until [`confirm`].
    ///
    /// [`confirm`]: Controller::confirm
    pub fn request_delete_post(&mut self, id: &str) -> bool {
        if collection::find_item(self.store.state(), id).is_none() {
            self.pending = None;
            return self.fail(StoreError::UnknownPost(id.to_string()));
        }
        self.pending = Some(PendingConfirmation {
            action: ConfirmAction::DeletePost,
            payload: id.to_string(),
            prompt: "Are you sure you want to delete this content?".to_string(),
        });
        true
    }

    /// Carry out the pending action. Returns `false` if nothing was pending
    /// or the action failed.
    pub fn confirm(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        match pending.action {
            ConfirmAction::DeletePost => match self.store.delete_content_item(&pending.payload) {
                Ok(()) => {
                    if self.editing_post_id.as_deref() == Some(pending.payload.as_str()) {
                        self.editing_post_id = None;
                    }
                    self.persist()
                }
                Err(e) => self.fail(e),
            },
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    // -------------------------------------------------------------------------
    // Sharing
    // -------------------------------------------------------------------------

    /// The share URL for the current state.
    pub fn share_link(&mut self) -> String {
        let token = share::encode(self.store.state());
        let url = share::share_url(&self.share.origin, &self.share.path, &token);
        self.store
            .notify(Notice::success("Share link generated!"));
        url
    }

    /// View a shared site. Accepts a full URL or a bare token.
    ///
    /// The shared content is overlaid on the local state in memory only. Any
    /// scheduled auto-save is dropped, and nothing is saved until
    /// [`reload_local`](Self::reload_local). On a bad token the local state is
    /// reloaded and an error notice is raised.
    pub fn open_shared(&mut self, url_or_token: &str) -> bool {
        let token = share::token_from_url(url_or_token).unwrap_or(url_or_token);
        match share::decode(token) {
            Ok(partial) => {
                self.store.merge(partial);
                self.autosave = Debouncer::new(self.autosave.delay());
                self.editing_post_id = None;
                self.pending = None;
                self.viewing_shared = true;
                self.store.notify(Notice::info("Viewing shared website"));
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "invalid share link");
                self.reload_local();
                self.store
                    .notify(Notice::error("Invalid share link. Loading default website."));
                false
            }
        }
    }

    // -------------------------------------------------------------------------
    // Import / export
    // -------------------------------------------------------------------------

    pub fn export_file(&mut self, path: &Path) -> bool {
        let written = self
            .store
            .export_json()
            .and_then(|json| fs::write(path, json).map_err(|e| StoreError::Storage(e.into())));
        match written {
            Ok(()) => {
                self.store
                    .notify(Notice::success("Website data exported!"));
                true
            }
            Err(e) => self.fail(e),
        }
    }

    /// Merge a previously exported file and save. A malformed file leaves the
    /// state untouched.
    pub fn import_file(&mut self, path: &Path) -> bool {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => return self.fail(StoreError::Storage(e.into())),
        };
        match self.store.import_json(&text) {
            Ok(_) => {
                self.store
                    .notify(Notice::success("Website data imported!"));
                self.persist()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "import rejected");
                self.store
                    .notify(Notice::error("Error importing file. Please check the file format."));
                false
            }
        }
    }

    fn persist(&mut self) -> bool {
        if self.viewing_shared {
            tracing::debug!("save skipped while viewing a shared site");
            self.store.notify(Notice::warning(
                "Viewing a shared website. Changes are not saved.",
            ));
            return false;
        }
        match self.store.save() {
            Ok(()) => true,
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, error: StoreError) -> bool {
        tracing::debug!(%error, "intent failed");
        self.store.notify(Notice::error(error.to_string()));
        false
    }
}
