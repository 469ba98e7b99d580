//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every entity (section, post, document) is listed by positional index and
//! title first. Ids, descriptions and attachment counts follow as indented
//! context lines, so the output reads as a content inventory while still
//! giving the ids the other commands take as arguments.
//!
//! # Output Format
//!
//! ## Show
//!
//! ```text
//! My Website [blue, edit]
//!     Welcome to my website
//!
//! Sections
//! 001 🏠 Home (1 post) *
//!     Id: home
//! 002 About (0 posts)
//!     Id: m1a2b3c4d5e6f7g8h9
//!
//! Home
//! 001 Welcome
//!     Id: welcome
//!     Text: Hello there...
//!     Media: 1 image
//!     Posted: March 5, 2024
//! ```
//!
//! Posts whose section no longer exists are listed last under
//! `Orphaned posts`.
//!
//! ## Notices
//!
//! ```text
//! success: Changes saved!
//! error: Please enter a website title
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::collection;
use crate::notice::{Notice, NoticeLevel};
use crate::render;
use crate::types::{AppState, ContentItem, EditorDocument};
use chrono::{DateTime, Utc};
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Format an entity header: positional index + title, with optional post
/// count.
///
/// ```text
/// 001 Home (3 posts)
/// 002 Untitled post
/// ```
fn entity_header(index: usize, title: &str, count: Option<usize>) -> String {
    match count {
        Some(n) => format!("{} {} ({})", format_index(index), title, plural(n, "post")),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
/// Only the first line is kept.
fn truncate_desc(text: &str, max: usize) -> String {
    let first_line = text.lines().next().unwrap_or("");
    if first_line.chars().count() <= max && first_line.len() == text.trim_end().len() {
        first_line.to_string()
    } else {
        let cut: String = first_line.chars().take(max).collect();
        format!("{cut}...")
    }
}

fn media_summary(item: &ContentItem) -> Option<String> {
    let images = item.image_list().len();
    let videos = item.videos.len();
    match (images, videos) {
        (0, 0) => None,
        (i, 0) => Some(plural(i, "image")),
        (0, v) => Some(plural(v, "video")),
        (i, v) => Some(format!("{}, {}", plural(i, "image"), plural(v, "video"))),
    }
}

fn post_lines(lines: &mut Vec<String>, index: usize, item: &ContentItem) {
    let title = if item.title.trim().is_empty() {
        "(untitled)"
    } else {
        item.title.as_str()
    };
    lines.push(entity_header(index, title, None));
    lines.push(format!("{}Id: {}", indent(1), item.id));
    if !item.text.trim().is_empty() {
        lines.push(format!("{}Text: {}", indent(1), truncate_desc(&item.text, 60)));
    }
    if let Some(media) = media_summary(item) {
        lines.push(format!("{}Media: {}", indent(1), media));
    }
    lines.push(format!(
        "{}Posted: {}",
        indent(1),
        render::display_date(&item.timestamp)
    ));
}

// ============================================================================
// show
// ============================================================================

/// Format the whole site: header, sections, posts of the active section,
/// and orphaned posts.
pub fn format_state_summary(state: &AppState) -> Vec<String> {
    let mut lines = Vec::new();

    let mode = match (state.is_edit_mode, state.is_preview_mode) {
        (true, _) => ", edit",
        (false, true) => ", preview",
        (false, false) => "",
    };
    lines.push(format!("{} [{}{}]", state.site_title, state.current_theme, mode));
    if !state.site_description.is_empty() {
        lines.push(format!("{}{}", indent(1), state.site_description));
    }

    lines.push(String::new());
    lines.push("Sections".to_string());
    if state.menu_items.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, section) in state.menu_items.iter().enumerate() {
        let label = if section.icon.is_empty() {
            section.title.clone()
        } else {
            format!("{} {}", section.icon, section.title)
        };
        let mut header = entity_header(
            i + 1,
            &label,
            Some(collection::item_count(state, &section.id)),
        );
        if section.active {
            header.push_str(" *");
        }
        lines.push(header);
        lines.push(format!("{}Id: {}", indent(1), section.id));
        if !section.description.is_empty() {
            lines.push(format!(
                "{}Description: {}",
                indent(1),
                truncate_desc(&section.description, 60)
            ));
        }
    }

    lines.push(String::new());
    match collection::active_section(state) {
        Some(section) => {
            lines.push(section.title.clone());
            let items = collection::visible_items(state);
            if items.is_empty() {
                lines.push(format!("{}(no posts)", indent(1)));
            }
            for (i, item) in items.into_iter().enumerate() {
                post_lines(&mut lines, i + 1, item);
            }
        }
        None => lines.push("No section selected".to_string()),
    }

    let orphans = collection::orphaned_items(state);
    if !orphans.is_empty() {
        lines.push(String::new());
        lines.push("Orphaned posts".to_string());
        for (i, item) in orphans.into_iter().enumerate() {
            post_lines(&mut lines, i + 1, item);
            lines.push(format!("{}Section: {}", indent(1), item.menu_id));
        }
    }

    lines
}

pub fn print_state_summary(state: &AppState) {
    for line in format_state_summary(state) {
        println!("{}", line);
    }
}

// ============================================================================
// editor show
// ============================================================================

/// Format the editor's stored document.
pub fn format_document(doc: Option<&EditorDocument>, now: DateTime<Utc>) -> Vec<String> {
    let Some(doc) = doc.filter(|d| !d.is_blank()) else {
        return vec!["No content saved yet".to_string()];
    };
    let mut lines = vec![if doc.title.is_empty() {
        "(untitled)".to_string()
    } else {
        doc.title.clone()
    }];
    if !doc.text.is_empty() {
        lines.push(format!("{}Text: {}", indent(1), truncate_desc(&doc.text, 60)));
    }
    if let Some(name) = &doc.media.name {
        let mime = doc.media.mime.as_deref().unwrap_or("unknown type");
        lines.push(format!("{}Media: {} ({})", indent(1), name, mime));
    }
    if let Some(when) = doc
        .timestamp
        .as_deref()
        .and_then(|ts| render::relative_time(ts, now))
    {
        lines.push(format!("{}Saved: {}", indent(1), when));
    }
    lines
}

pub fn print_document(doc: Option<&EditorDocument>, now: DateTime<Utc>) {
    for line in format_document(doc, now) {
        println!("{}", line);
    }
}

// ============================================================================
// Notices and written files
// ============================================================================

pub fn format_notice(notice: &Notice) -> String {
    format!("{}: {}", notice.level, notice.message)
}

/// Success and info notices go to stdout, warnings and errors to stderr.
pub fn print_notices(notices: &[Notice]) {
    for notice in notices {
        match notice.level {
            NoticeLevel::Success | NoticeLevel::Info => println!("{}", format_notice(notice)),
            NoticeLevel::Warning | NoticeLevel::Error => eprintln!("{}", format_notice(notice)),
        }
    }
}

/// `Wrote <what> → <path>`
pub fn format_written(what: &str, path: &Path) -> String {
    format!("Wrote {} → {}", what, path.display())
}

pub fn print_written(what: &str, path: &Path) {
    println!("{}", format_written(what, path));
}
