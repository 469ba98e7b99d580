//! Share links: a read-only snapshot of the site packed into a URL.
//!
//! ```text
//! AppState ─strip─▶ JSON ─UTF-8─▶ base64 ─percent-encode─▶ token
//! <origin><path>?data=<token>
//! ```
//!
//! Decoding runs the pipeline backwards and can fail at every stage
//! ([`DecodeError`]). Callers never surface that as a hard failure. They
//! fall back to the locally stored state (see
//! [`crate::controller::Controller::open_shared`]).
//!
//! ## Read-only on arrival
//!
//! Whatever the token says, a decoded snapshot always comes out with
//! `isEditMode = false` and `isPreviewMode = true`. Tokens are written by
//! somebody else, so they must not be able to put the recipient into
//! editing mode.

use crate::types::{AppState, PartialAppState};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use thiserror::Error;

/// Name of the query parameter carrying the token.
pub const QUERY_PARAM: &str = "data";

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("share token is not valid percent-encoding: {0}")]
    Percent(#[from] std::string::FromUtf8Error),
    #[error("share token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("share token does not decode to UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("share token does not contain valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The portion of `state` a recipient sees: every content key, with the
/// session flags replaced by the read-only viewer flags.
pub fn shared_view(state: &AppState) -> PartialAppState {
    let mut view = PartialAppState::from(state.clone());
    force_read_only(&mut view);
    view
}

/// Pack `state` into a URL-safe token. Session flags are left out.
pub fn encode(state: &AppState) -> String {
    let stripped = PartialAppState {
        is_edit_mode: None,
        is_preview_mode: None,
        ..PartialAppState::from(state.clone())
    };
    // Only strings, bools and unit enums: serialization cannot fail.
    let json = serde_json::to_string(&stripped).unwrap_or_else(|_| "{}".to_string());
    urlencoding::encode(&BASE64.encode(json.as_bytes())).into_owned()
}

/// Unpack a token produced by [`encode`]. Raw (not percent-encoded) base64
/// is accepted too.
pub fn decode(token: &str) -> Result<PartialAppState, DecodeError> {
    let unescaped = urlencoding::decode(token.trim())?;
    let bytes = BASE64.decode(unescaped.as_bytes())?;
    let json = std::str::from_utf8(&bytes)?;
    let mut partial: PartialAppState = serde_json::from_str(json)?;
    force_read_only(&mut partial);
    Ok(partial)
}

/// Build the full share URL. `path` may omit its leading slash.
pub fn share_url(origin: &str, path: &str, token: &str) -> String {
    let origin = origin.trim_end_matches('/');
    let path = if path.is_empty() || path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    format!("{origin}{path}?{QUERY_PARAM}={token}")
}

/// Extract the `data` query value from a URL, still percent-encoded.
///
/// Returns `None` when the URL has no query or no `data` parameter. Anything
/// after `#` is ignored.
pub fn token_from_url(url: &str) -> Option<&str> {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let (_, query) = without_fragment.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == QUERY_PARAM)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

fn force_read_only(partial: &mut PartialAppState) {
    partial.is_edit_mode = Some(false);
    partial.is_preview_mode = Some(true);
}
