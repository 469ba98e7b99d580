//! HTML rendering of site snapshots.
//!
//! Every function here takes a snapshot and returns [`Markup`]; nothing
//! touches the store or the filesystem. Callers write the result wherever
//! they like (see the `render` and `editor show` CLI commands).
//!
//! ## Pages
//!
//! - **Site page** ([`render_site`]): header, section nav with the active
//!   section marked, and the posts of the active section. With no active
//!   section the page shows a "no selection" placeholder instead.
//! - **Output card** ([`render_document`]): the single-document editor's
//!   result. Media first as a hero, then title, text, and a relative
//!   "Created ..." timestamp.
//!
//! ## Media order
//!
//! A post's attachments come out in [`collection::media_of`] order: all
//! images, then all videos, each list as stored. A legacy single `image`
//! field counts as a one-image list.
//!
//! Uses [maud](https://maud.lambda.xyz/), so all interpolated text is
//! escaped. Media values go into `src` attributes verbatim.

use crate::collection::{self, Media};
use crate::config::{self, SiteConfig};
use crate::types::{AppState, ContentItem, EditorDocument, MediaData, MenuItem, Theme};
use chrono::{DateTime, Utc};
use maud::{DOCTYPE, Markup, html};

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Stylesheet for a page: theme custom properties, then the static rules.
pub fn site_css(config: &SiteConfig, theme: Theme) -> String {
    format!(
        "{}\n\n{}",
        config::generate_theme_css(&config.themes, theme),
        CSS_STATIC
    )
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
pub(crate) fn base_document(
    title: &str,
    css: &str,
    body_class: Option<&str>,
    content: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (css) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

/// Section navigation. The active section carries `class="current"`.
pub fn render_nav(sections: &[MenuItem]) -> Markup {
    html! {
        nav.section-nav {
            ul {
                @for section in sections {
                    li class=[section.active.then_some("current")] data-section=(section.id) {
                        @if !section.icon.is_empty() {
                            span.section-icon { (section.icon) } " "
                        }
                        (section.title)
                    }
                }
            }
        }
    }
}

/// One `<img>` or `<video>` per attachment, images first.
fn render_media(item: &ContentItem) -> Markup {
    let media = collection::media_of(item);
    html! {
        @if !media.is_empty() {
            div.post-media {
                @for entry in &media {
                    @match entry {
                        Media::Image(src) => {
                            img src=(src) alt=(item.title) loading="lazy";
                        }
                        Media::Video(src) => {
                            video src=(src) controls preload="metadata" {}
                        }
                    }
                }
            }
        }
    }
}

/// Posts in the given order: title, text, then media.
pub fn render_items(items: &[&ContentItem]) -> Markup {
    html! {
        @for item in items {
            article.post id=(item.id) {
                @if !item.title.is_empty() {
                    h3 { (item.title) }
                }
                @if !item.text.is_empty() {
                    p.post-text { (item.text) }
                }
                (render_media(item))
                @if !item.timestamp.is_empty() {
                    time.post-time datetime=(item.timestamp) { (display_date(&item.timestamp)) }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Full page for the current site state.
pub fn render_site(state: &AppState, config: &SiteConfig) -> Markup {
    let css = site_css(config, state.current_theme);
    let active = collection::active_section(state);
    let items = collection::visible_items(state);
    let body_class = format!("theme-{}", state.current_theme);

    let content = html! {
        header.site-header {
            h1 { (state.site_title) }
            @if !state.site_description.is_empty() {
                p.site-description { (state.site_description) }
            }
        }
        @if state.is_preview_mode {
            div.preview-banner { "Read-only preview" }
        }
        (render_nav(&state.menu_items))
        main {
            @match active {
                Some(current) => {
                    section.section-view data-section=(current.id) {
                        h2 { (current.title) }
                        @if !current.description.is_empty() {
                            p.section-description { (current.description) }
                        }
                        @if items.is_empty() {
                            p.no-content { "Nothing here yet." }
                        } @else {
                            (render_items(&items))
                        }
                    }
                }
                None => {
                    p.no-selection { "Select a section to see its posts." }
                }
            }
        }
    };

    base_document(&state.site_title, &css, Some(&body_class), content)
}

/// Hero media of the output card, chosen by MIME type.
fn render_hero(media: &MediaData) -> Markup {
    html! {
        @if let Some(src) = media.content.as_deref().filter(|_| !media.is_empty()) {
            div.hero-media {
                @if media.is_image() {
                    img src=(src) alt=(media.name.as_deref().unwrap_or("Shared image")) loading="lazy";
                } @else if media.is_video() {
                    video src=(src) controls preload="metadata" {}
                }
            }
        }
    }
}

/// The editor's output page. `None` renders the "no content" page.
pub fn render_document(
    doc: Option<&EditorDocument>,
    now: DateTime<Utc>,
    config: &SiteConfig,
) -> Markup {
    let css = site_css(config, Theme::default());
    let Some(doc) = doc else {
        let content = html! {
            main {
                div.no-content {
                    h2 { "No content yet" }
                    p { "Use the editor to add a title, some text, or a picture." }
                }
            }
        };
        return base_document("Your Website", &css, Some("output-page"), content);
    };

    let title = if doc.title.is_empty() {
        "Untitled"
    } else {
        doc.title.as_str()
    };
    let created = doc
        .timestamp
        .as_deref()
        .and_then(|ts| relative_time(ts, now));

    let content = html! {
        main {
            article.output-card {
                (render_hero(&doc.media))
                h2.card-title { (title) }
                @if !doc.text.is_empty() {
                    p.card-text { (doc.text) }
                }
                @if let Some(created) = created {
                    p.timestamp { "Created " (created) }
                }
            }
        }
    };

    let page_title = if doc.title.is_empty() {
        "Your Website"
    } else {
        doc.title.as_str()
    };
    base_document(page_title, &css, Some("output-page"), content)
}

// ============================================================================
// Dates
// ============================================================================

/// Human description of how long ago `timestamp` was, relative to `now`.
///
/// - under an hour: `Just now`
/// - same day: `N hour(s) ago`
/// - one day: `Yesterday`
/// - under a week: `N days ago`
/// - otherwise the date, e.g. `March 5, 2024`
///
/// Timestamps in the future count as "Just now". Unparseable input is `None`.
pub fn relative_time(timestamp: &str, now: DateTime<Utc>) -> Option<String> {
    let then = DateTime::parse_from_rfc3339(timestamp)
        .ok()?
        .with_timezone(&Utc);
    let hours = (now - then).num_hours().max(0);
    let days = hours / 24;

    let text = match days {
        0 if hours == 0 => "Just now".to_string(),
        0 if hours == 1 => "1 hour ago".to_string(),
        0 => format!("{hours} hours ago"),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{days} days ago"),
        _ => long_date(then),
    };
    Some(text)
}

fn long_date(date: DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Post timestamps are shown as a long date; unparseable ones verbatim.
pub(crate) fn display_date(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| long_date(dt.with_timezone(&Utc)))
        .unwrap_or_else(|_| timestamp.to_string())
}
