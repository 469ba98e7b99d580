//! Media ingestion: turning a local file into a data-URI.
//!
//! Media values everywhere else in the crate are opaque strings (a remote
//! URL or a `data:` URI) and are never inspected again. This is the one
//! place they are checked, at the moment a file is attached:
//!
//! - the MIME type (guessed from the extension) must be `image/*` or
//!   `video/*`;
//! - the file must fit the ceiling for its kind ([`MediaConfig`]). The size
//!   comes from file metadata, so oversized files are never read.

use crate::config::MediaConfig;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{name}: please select an image or video file (got {mime})")]
    UnsupportedType { name: String, mime: String },
    #[error("{name}: file size must be less than {}", size_limit(.limit))]
    TooLarge { name: String, size: u64, limit: u64 },
    #[error("{name}: expected {expected} file, got {actual}")]
    WrongKind {
        name: String,
        expected: MediaKind,
        actual: MediaKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MediaKind::Image => "an image",
            MediaKind::Video => "a video",
        })
    }
}

impl MediaKind {
    /// Classify a MIME type. Anything that is not an image or video is `None`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        if mime.starts_with("image/") {
            Some(MediaKind::Image)
        } else if mime.starts_with("video/") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    fn limit(self, limits: &MediaConfig) -> u64 {
        match self {
            MediaKind::Image => limits.max_image_bytes,
            MediaKind::Video => limits.max_video_bytes,
        }
    }
}

/// A file accepted for embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    pub kind: MediaKind,
    pub name: String,
    pub mime: String,
    pub data_uri: String,
}

/// MIME type guessed from the file extension.
pub fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Check a prospective upload without reading it.
pub fn check_upload(
    name: &str,
    mime: &str,
    size: u64,
    limits: &MediaConfig,
) -> Result<MediaKind, MediaError> {
    let kind = MediaKind::from_mime(mime).ok_or_else(|| MediaError::UnsupportedType {
        name: name.to_string(),
        mime: mime.to_string(),
    })?;
    let limit = kind.limit(limits);
    if size > limit {
        return Err(MediaError::TooLarge {
            name: name.to_string(),
            size,
            limit,
        });
    }
    Ok(kind)
}

/// `data:<mime>;base64,<payload>`
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Validate and read a local file into a data-URI.
pub fn ingest_file(path: &Path, limits: &MediaConfig) -> Result<Ingested, MediaError> {
    let io_err = |source| MediaError::Io {
        path: path.display().to_string(),
        source,
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime = guess_mime(path);
    let size = fs::metadata(path).map_err(io_err)?.len();
    let kind = check_upload(&name, &mime, size, limits)?;
    let bytes = fs::read(path).map_err(io_err)?;
    tracing::debug!(file = %name, %mime, size, "ingested media");
    Ok(Ingested {
        kind,
        data_uri: data_uri(&mime, &bytes),
        name,
        mime,
    })
}

/// True for values that are already usable as `src`: remote URLs and
/// data-URIs.
pub fn is_embedded_or_remote(source: &str) -> bool {
    source.starts_with("data:")
        || source.starts_with("http://")
        || source.starts_with("https://")
        || source.starts_with("//")
}

/// Resolve a media argument to a value that can be stored.
///
/// URLs and data-URIs pass through unchecked. Anything else is read as a
/// local file, validated, and required to be of `expected` kind.
pub fn resolve_source(
    source: &str,
    expected: MediaKind,
    limits: &MediaConfig,
) -> Result<String, MediaError> {
    if is_embedded_or_remote(source) {
        return Ok(source.to_string());
    }
    let ingested = ingest_file(Path::new(source), limits)?;
    if ingested.kind != expected {
        return Err(MediaError::WrongKind {
            name: ingested.name,
            expected,
            actual: ingested.kind,
        });
    }
    Ok(ingested.data_uri)
}

fn size_limit(limit: &u64) -> String {
    format_size(*limit)
}

/// Human-readable byte size: `10MB`, `512KB`, `300 bytes`.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes >= MB && bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else if bytes >= MB {
        format!("{:.1}MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{}KB", bytes / KB)
    } else {
        format!("{bytes} bytes")
    }
}
