//! Shared data model.
//!
//! These types are persisted as camelCase JSON in the key-value store and
//! embedded in share tokens, so the serde names are part of the on-disk and
//! on-the-wire format. Changing a rename here breaks every saved site.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Key of the full site state in the key-value store.
pub const STATE_KEY: &str = "dynamicWebsiteData";

/// Key of the single-document editor in the key-value store.
pub const DOCUMENT_KEY: &str = "websiteContent";

/// Color theme of the site. Serialized lowercase (`"blue"`, `"pink"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Blue,
    Green,
    Purple,
    Orange,
    Pink,
}

impl Theme {
    pub const ALL: [Theme; 5] = [
        Theme::Blue,
        Theme::Green,
        Theme::Purple,
        Theme::Orange,
        Theme::Pink,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Blue => "blue",
            Theme::Green => "green",
            Theme::Purple => "purple",
            Theme::Orange => "orange",
            Theme::Pink => "pink",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("unknown theme '{0}' (expected blue, green, purple, orange or pink)")]
pub struct UnknownTheme(pub String);

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownTheme(s.to_string()))
    }
}

/// A named partition of content items. At most one is active at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    #[serde(default)]
    pub icon: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub active: bool,
}

/// A user-authored post belonging to one section by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    /// Image URLs or data-URIs, in display order.
    #[serde(default)]
    pub images: Vec<String>,
    /// Video URLs or data-URIs, in display order.
    #[serde(default)]
    pub videos: Vec<String>,
    /// Legacy single-image field written by older saves. Kept verbatim;
    /// see [`ContentItem::image_list`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// ISO-8601 creation or last-edit time.
    #[serde(default)]
    pub timestamp: String,
    /// Id of the owning [`MenuItem`]. Not checked for existence.
    #[serde(default)]
    pub menu_id: String,
}

impl ContentItem {
    /// Images in display order, reading a legacy `image` field as a
    /// one-element list when `images` is empty.
    pub fn image_list(&self) -> Vec<&str> {
        if self.images.is_empty()
            && let Some(legacy) = self.image.as_deref().filter(|s| !s.is_empty())
        {
            return vec![legacy];
        }
        self.images.iter().map(String::as_str).collect()
    }

    pub fn has_media(&self) -> bool {
        !self.image_list().is_empty() || !self.videos.is_empty()
    }
}

/// Full site state persisted under [`STATE_KEY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub site_title: String,
    #[serde(default)]
    pub site_description: String,
    #[serde(default)]
    pub current_theme: Theme,
    #[serde(default)]
    pub is_edit_mode: bool,
    #[serde(default)]
    pub is_preview_mode: bool,
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
    #[serde(default)]
    pub content_items: Vec<ContentItem>,
}

impl Default for AppState {
    /// One active "Home" section holding one welcome post.
    fn default() -> Self {
        Self {
            site_title: "My Website".to_string(),
            site_description: "Welcome to my website".to_string(),
            current_theme: Theme::Blue,
            is_edit_mode: false,
            is_preview_mode: false,
            menu_items: vec![MenuItem {
                id: "home".to_string(),
                icon: "🏠".to_string(),
                title: "Home".to_string(),
                description: "Welcome to my website".to_string(),
                active: true,
            }],
            content_items: vec![ContentItem {
                id: "welcome".to_string(),
                title: "Welcome!".to_string(),
                text: "This is your new website. Switch to edit mode to add sections and posts."
                    .to_string(),
                images: Vec::new(),
                videos: Vec::new(),
                image: None,
                timestamp: crate::ids::now_iso(),
                menu_id: "home".to_string(),
            }],
        }
    }
}

/// An [`AppState`] with every key optional.
///
/// Produced by share tokens and imported files; applied with
/// [`PartialAppState::apply_to`]. Unknown keys are ignored on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialAppState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_theme: Option<Theme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_edit_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_preview_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu_items: Option<Vec<MenuItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_items: Option<Vec<ContentItem>>,
}

impl PartialAppState {
    /// Overwrite each key present in `self`. Lists replace, never append.
    pub fn apply_to(self, state: &mut AppState) {
        if let Some(v) = self.site_title {
            state.site_title = v;
        }
        if let Some(v) = self.site_description {
            state.site_description = v;
        }
        if let Some(v) = self.current_theme {
            state.current_theme = v;
        }
        if let Some(v) = self.is_edit_mode {
            state.is_edit_mode = v;
        }
        if let Some(v) = self.is_preview_mode {
            state.is_preview_mode = v;
        }
        if let Some(v) = self.menu_items {
            state.menu_items = v;
        }
        if let Some(v) = self.content_items {
            state.content_items = v;
        }
    }
}

impl From<AppState> for PartialAppState {
    fn from(state: AppState) -> Self {
        Self {
            site_title: Some(state.site_title),
            site_description: Some(state.site_description),
            current_theme: Some(state.current_theme),
            is_edit_mode: Some(state.is_edit_mode),
            is_preview_mode: Some(state.is_preview_mode),
            menu_items: Some(state.menu_items),
            content_items: Some(state.content_items),
        }
    }
}

/// Media attached to the single-document editor. `null` fields mean none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaData {
    /// Data-URI (or URL) of the file.
    pub content: Option<String>,
    /// MIME type, e.g. `image/png`.
    #[serde(rename = "type")]
    pub mime: Option<String>,
    /// Original file name.
    pub name: Option<String>,
}

impl MediaData {
    pub fn is_empty(&self) -> bool {
        self.content.as_deref().is_none_or(str::is_empty)
    }

    pub fn is_image(&self) -> bool {
        self.mime.as_deref().is_some_and(|m| m.starts_with("image/"))
    }

    pub fn is_video(&self) -> bool {
        self.mime.as_deref().is_some_and(|m| m.starts_with("video/"))
    }
}

/// The editor/output pair's document, persisted under [`DOCUMENT_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorDocument {
    pub title: String,
    pub text: String,
    pub media: MediaData,
    pub timestamp: Option<String>,
}

impl EditorDocument {
    /// True when there is nothing worth auto-saving. Whitespace counts as
    /// nothing, since saving trims it away.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.text.trim().is_empty() && self.media.is_empty()
    }
}
