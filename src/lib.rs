//! # Simple Site
//!
//! A small personal-website builder. A site is one JSON document: a title, a
//! colour theme, an ordered list of sections, and posts filed under those
//! sections. It lives in a key-value store on disk, can be handed to someone
//! else as a single URL, and renders to a self-contained HTML page.
//!
//! # Architecture
//!
//! ```text
//!             ┌────────────┐   share::encode    ┌──────────────┐
//!  intents ──▶│ controller │ ─────────────────▶ │  ?data=...   │
//!             └─────┬──────┘ ◀──────────────── └──────────────┘
//!                   │          share::decode (read-only)
//!             ┌─────▼──────┐
//!             │   store    │ ── save/load ──▶ storage (FileStore / MemoryStore)
//!             └─────┬──────┘
//!                   │ snapshot
//!             ┌─────▼──────┐
//!             │   render   │ ──▶ HTML
//!             └────────────┘
//! ```
//!
//! Two smaller tools sit beside the site store: the single-document
//! [`editor`] (one title, one text, one picture or video) and the [`builder`],
//! which turns a CMS blocks export into a standalone page.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Persisted shapes: `AppState`, sections, posts, editor document |
//! | [`storage`] | `KeyValueStore` trait with on-disk and in-memory backends |
//! | [`store`] | Load, save, merge, import/export and named mutations of one site |
//! | [`collection`] | Section selection and post filtering over a snapshot |
//! | [`share`] | State ⇄ URL-safe token, with forced read-only decoding |
//! | [`media`] | File validation and data-URI embedding |
//! | [`render`] | Maud templates for the site page and the editor's output card |
//! | [`controller`] | Session logic: confirmations, debounced saves, notices |
//! | [`editor`] | The single-document editor |
//! | [`builder`] | Blocks document → self-contained HTML page |
//! | [`autosave`] | Debounce timer shared by the controller and the editor |
//! | [`config`] | `config.toml` loading, validation, merging, and theme CSS |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Snapshots In, Markup Out
//!
//! Rendering never reads the store. It takes an [`types::AppState`] by
//! reference and returns HTML, so a shared state viewed in memory and a saved
//! one render through the same code.
//!
//! ## Shared Links Are Read-Only
//!
//! A share token is attacker-controlled input. Decoding always turns edit
//! mode off and preview mode on, whatever the token says, and the controller
//! never saves a shared state over the local one.
//!
//! ## Media Are Opaque Strings
//!
//! Attachments are stored as URLs or `data:` URIs and inserted into `src`
//! attributes verbatim. Validation happens once, when a local file is
//! embedded ([`media::ingest_file`]).

pub mod autosave;
pub mod builder;
pub mod collection;
pub mod config;
pub mod controller;
pub mod editor;
pub mod ids;
pub mod logging;
pub mod media;
pub mod notice;
pub mod output;
pub mod render;
pub mod share;
pub mod storage;
pub mod store;
pub mod types;
