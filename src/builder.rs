//! Static page builder.
//!
//! Turns a blocks document exported by a headless CMS into one
//! self-contained HTML page:
//!
//! ```json
//! { "blocks": [ { "title": "Hello", "media": "photos/a.jpg", "text": "**hi**" } ] }
//! ```
//!
//! Each block becomes a `div.post-block` with an optional heading, picture,
//! and Markdown body. Block text comes from the site owner's CMS and is
//! trusted, so inline HTML in it passes through unescaped.
//!
//! Local media paths are resolved against the document's directory and
//! inlined as data-URIs, so the page has no external file dependencies.
//! Remote URLs and existing data-URIs are kept as they are.

use crate::config::{MediaConfig, SiteConfig};
use crate::media::{self, MediaError, MediaKind};
use crate::render::{base_document, site_css};
use crate::types::Theme;
use maud::{Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const EMPTY_MESSAGE: &str = "No content has been added yet. Check back soon!";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid blocks document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("block {index}: {source}")]
    Media {
        index: usize,
        #[source]
        source: MediaError,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlocksDocument {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Block {
    pub title: Option<String>,
    pub media: Option<String>,
    pub text: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

pub fn parse_document(json: &str) -> Result<BlocksDocument, BuildError> {
    Ok(serde_json::from_str(json)?)
}

/// Replace local media paths with data-URIs. Relative paths are taken
/// from `base_dir`.
pub fn inline_media(
    doc: &mut BlocksDocument,
    base_dir: &Path,
    limits: &MediaConfig,
) -> Result<(), BuildError> {
    for (index, block) in doc.blocks.iter_mut().enumerate() {
        let Some(source) = present(&block.media) else {
            continue;
        };
        let source = if media::is_embedded_or_remote(source) {
            source.to_string()
        } else {
            base_dir.join(source).to_string_lossy().into_owned()
        };
        let resolved = media::resolve_source(&source, MediaKind::Image, limits)
            .map_err(|source| BuildError::Media { index, source })?;
        block.media = Some(resolved);
    }
    Ok(())
}

pub fn render_markdown(text: &str) -> String {
    let parser = Parser::new(text);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

fn render_block(block: &Block) -> Markup {
    let title = present(&block.title);
    html! {
        div.post-block {
            @if let Some(title) = title {
                h2 { (title) }
            }
            @if let Some(src) = present(&block.media) {
                img src=(src) alt=(title.unwrap_or("Content Image"));
            }
            @if let Some(text) = present(&block.text) {
                div.post-text { (PreEscaped(render_markdown(text))) }
            }
        }
    }
}

pub fn render_blocks_page(doc: &BlocksDocument, title: &str, theme: Theme, css: &str) -> Markup {
    let content = html! {
        header.site-header {
            h1 { (title) }
        }
        main #posts {
            @if doc.blocks.is_empty() {
                p.no-content { (EMPTY_MESSAGE) }
            } @else {
                @for block in &doc.blocks {
                    (render_block(block))
                }
            }
        }
    };
    let body_class = format!("theme-{theme}");
    base_document(title, css, Some(&body_class), content)
}

/// Read `input`, inline its media, and write the page to `output`.
/// Returns the number of blocks written.
pub fn build(
    input: &Path,
    output: &Path,
    title: &str,
    theme: Theme,
    config: &SiteConfig,
) -> Result<usize, BuildError> {
    let io_err = |path: &Path| {
        let path = path.display().to_string();
        move |source: std::io::Error| BuildError::Io { path, source }
    };
    let json = fs::read_to_string(input).map_err(io_err(input))?;
    let mut doc = parse_document(&json)?;
    let base_dir = input.parent().unwrap_or(Path::new("."));
    inline_media(&mut doc, base_dir, &config.media)?;

    let css = site_css(config, theme);
    let page = render_blocks_page(&doc, title, theme, &css).into_string();
    fs::write(output, page).map_err(io_err(output))?;
    tracing::debug!(output = %output.display(), blocks = doc.blocks.len(), "built page");
    Ok(doc.blocks.len())
}
