//! Sections, posts, and the views computed from them.
//!
//! Everything here is a pure function over [`AppState`]: no storage, no
//! notices, no HTML. [`crate::store::StateStore`] wraps the mutating ones so
//! each change is followed by a save, and [`crate::render`] consumes the
//! read-only views.
//!
//! ## Active section
//!
//! At most one [`MenuItem`] is active. [`select_section`] keeps that
//! exclusive, and [`normalize_active`] repairs states that arrive from disk
//! or a share token with several active flags by keeping the first one.
//!
//! ## Orphans
//!
//! A post whose `menu_id` names no existing section is orphaned. It stays in
//! `content_items` untouched but never appears in a section view, because
//! [`visible_items`] only matches against the active section's id.

use crate::ids;
use crate::types::{AppState, ContentItem, MenuItem};

/// User input for a new or edited section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionDraft {
    pub icon: String,
    pub title: String,
    pub description: String,
}

/// User input for a new or edited post.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostDraft {
    pub title: String,
    pub text: String,
    pub images: Vec<String>,
    pub videos: Vec<String>,
}

impl PostDraft {
    /// A post needs a title, some text, or at least one attachment.
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty()
            && self.text.trim().is_empty()
            && self.images.is_empty()
            && self.videos.is_empty()
    }
}

/// One attachment of a post, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Media<'a> {
    Image(&'a str),
    Video(&'a str),
}

/// The active section, if any.
pub fn active_section(state: &AppState) -> Option<&MenuItem> {
    state.menu_items.iter().find(|m| m.active)
}

/// Posts of the active section in insertion order. Empty when no section is
/// active.
pub fn visible_items(state: &AppState) -> Vec<&ContentItem> {
    match active_section(state) {
        Some(section) => state
            .content_items
            .iter()
            .filter(|item| item.menu_id == section.id)
            .collect(),
        None => Vec::new(),
    }
}

/// Posts whose section no longer exists.
pub fn orphaned_items(state: &AppState) -> Vec<&ContentItem> {
    state
        .content_items
        .iter()
        .filter(|item| !state.menu_items.iter().any(|m| m.id == item.menu_id))
        .collect()
}

/// Number of posts filed under `section_id`.
pub fn item_count(state: &AppState, section_id: &str) -> usize {
    state
        .content_items
        .iter()
        .filter(|item| item.menu_id == section_id)
        .count()
}

/// Attachments of a post: every image first, then every video.
pub fn media_of(item: &ContentItem) -> Vec<Media<'_>> {
    item.image_list()
        .into_iter()
        .map(Media::Image)
        .chain(item.videos.iter().map(|v| Media::Video(v.as_str())))
        .collect()
}

/// Make `id` the only active section. Returns `false` (and changes nothing)
/// when no section has that id.
pub fn select_section(state: &mut AppState, id: &str) -> bool {
    if !state.menu_items.iter().any(|m| m.id == id) {
        return false;
    }
    for item in &mut state.menu_items {
        item.active = item.id == id;
    }
    true
}

/// Clear every active flag after the first. Returns `true` if anything
/// changed.
pub fn normalize_active(state: &mut AppState) -> bool {
    let mut seen = false;
    let mut changed = false;
    for item in &mut state.menu_items {
        if item.active {
            if seen {
                item.active = false;
                changed = true;
            }
            seen = true;
        }
    }
    changed
}

/// Append a section and return its id. The new section becomes active only
/// when no other section is.
pub fn add_section(state: &mut AppState, draft: SectionDraft) -> String {
    let id = ids::generate_id();
    let active = active_section(state).is_none();
    state.menu_items.push(MenuItem {
        id: id.clone(),
        icon: draft.icon,
        title: draft.title,
        description: draft.description,
        active,
    });
    id
}

/// Edit a section's labels in place. Returns `false` for an unknown id.
pub fn update_section(state: &mut AppState, id: &str, draft: SectionDraft) -> bool {
    match state.menu_items.iter_mut().find(|m| m.id == id) {
        Some(section) => {
            if !draft.icon.is_empty() {
                section.icon = draft.icon;
            }
            section.title = draft.title;
            section.description = draft.description;
            true
        }
        None => false,
    }
}

/// Append a post to `menu_id` and return its id.
pub fn add_item(state: &mut AppState, draft: PostDraft, menu_id: &str) -> String {
    let id = ids::generate_id();
    state.content_items.push(ContentItem {
        id: id.clone(),
        title: draft.title,
        text: draft.text,
        images: draft.images,
        videos: draft.videos,
        image: None,
        timestamp: ids::now_iso(),
        menu_id: menu_id.to_string(),
    });
    id
}

/// Replace a post's content in place and refresh its timestamp. The post
/// keeps its id, section and position. Returns `false` for an unknown id.
pub fn update_item(state: &mut AppState, id: &str, draft: PostDraft) -> bool {
    match state.content_items.iter_mut().find(|i| i.id == id) {
        Some(item) => {
            item.title = draft.title;
            item.text = draft.text;
            item.images = draft.images;
            item.videos = draft.videos;
            item.image = None;
            item.timestamp = ids::now_iso();
            true
        }
        None => false,
    }
}

/// Remove a post, returning it if it existed.
pub fn delete_item(state: &mut AppState, id: &str) -> Option<ContentItem> {
    let pos = state.content_items.iter().position(|i| i.id == id)?;
    Some(state.content_items.remove(pos))
}

pub fn find_item<'a>(state: &'a AppState, id: &str) -> Option<&'a ContentItem> {
    state.content_items.iter().find(|i| i.id == id)
}

/// Look a section up by id, falling back to a case-insensitive title match.
pub fn find_section<'a>(state: &'a AppState, id_or_title: &str) -> Option<&'a MenuItem> {
    state
        .menu_items
        .iter()
        .find(|m| m.id == id_or_title)
        .or_else(|| {
            state
                .menu_items
                .iter()
                .find(|m| m.title.eq_ignore_ascii_case(id_or_title))
        })
}
