//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives in
//! the site root (the directory `simple-site` runs in, or `--root`). Stock
//! defaults are the base layer and the user file overrides them key by key.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [storage]
//! dir = ".simple-site"             # Key-value store directory (relative to root)
//! state_key = "dynamicWebsiteData" # Key of the site state blob
//! document_key = "websiteContent"  # Key of the single-document editor blob
//!
//! [share]
//! origin = "http://localhost:8000" # Prefix of generated share links
//! path = "/index.html"
//!
//! [media]
//! max_image_bytes = 10485760       # 10 MB
//! max_video_bytes = 52428800       # 50 MB
//!
//! [autosave]
//! delay_ms = 2000                  # Quiet period before an auto-save
//!
//! [logging]
//! level = "warn"                   # RUST_LOG takes precedence
//!
//! [themes.blue]
//! primary = "#2563eb"
//! accent = "#60a5fa"
//! # ... one table per theme: blue, green, purple, orange, pink
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [themes.pink]
//! primary = "#be185d"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::types::{self, Theme};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Where blobs are kept and under which keys.
    pub storage: StorageConfig,
    /// Share link prefix.
    pub share: ShareConfig,
    /// Upload size ceilings.
    pub media: MediaConfig,
    /// Debounce for auto-save.
    pub autosave: AutosaveConfig,
    /// Default log filter.
    pub logging: LoggingConfig,
    /// Color palette per theme.
    pub themes: ThemesConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "storage.dir must not be empty".into(),
            ));
        }
        if self.storage.state_key == self.storage.document_key {
            return Err(ConfigError::Validation(
                "storage.state_key and storage.document_key must differ".into(),
            ));
        }
        if self.media.max_image_bytes == 0 || self.media.max_video_bytes == 0 {
            return Err(ConfigError::Validation(
                "media size limits must be non-zero".into(),
            ));
        }
        if !(self.share.origin.starts_with("http://") || self.share.origin.starts_with("https://"))
        {
            return Err(ConfigError::Validation(
                "share.origin must start with http:// or https://".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Store directory, relative to the site root unless absolute.
    pub dir: String,
    pub state_key: String,
    pub document_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: ".simple-site".to_string(),
            state_key: types::STATE_KEY.to_string(),
            document_key: types::DOCUMENT_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShareConfig {
    pub origin: String,
    pub path: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8000".to_string(),
            path: "/index.html".to_string(),
        }
    }
}

/// Upload ceilings checked once, when a file is ingested.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediaConfig {
    /// Largest accepted image, in bytes.
    pub max_image_bytes: u64,
    /// Largest accepted video, in bytes.
    pub max_video_bytes: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: 10 * 1024 * 1024,
            max_video_bytes: 50 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutosaveConfig {
    /// Milliseconds of quiet after the last edit before saving.
    pub delay_ms: u64,
}

impl AutosaveConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self { delay_ms: 2000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Colors of one theme.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeColors {
    /// Header, links, active section.
    pub primary: String,
    /// Hover states and highlights.
    pub accent: String,
}

impl ThemeColors {
    fn new(primary: &str, accent: &str) -> Self {
        Self {
            primary: primary.to_string(),
            accent: accent.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemesConfig {
    pub blue: ThemeColors,
    pub green: ThemeColors,
    pub purple: ThemeColors,
    pub orange: ThemeColors,
    pub pink: ThemeColors,
}

impl ThemesConfig {
    pub fn colors(&self, theme: Theme) -> &ThemeColors {
        match theme {
            Theme::Blue => &self.blue,
            Theme::Green => &self.green,
            Theme::Purple => &self.purple,
            Theme::Orange => &self.orange,
            Theme::Pink => &self.pink,
        }
    }
}

impl Default for ThemesConfig {
    fn default() -> Self {
        Self {
            blue: ThemeColors::new("#2563eb", "#60a5fa"),
            green: ThemeColors::new("#16a34a", "#4ade80"),
            purple: ThemeColors::new("#7c3aed", "#a78bfa"),
            orange: ThemeColors::new("#ea580c", "#fb923c"),
            pink: ThemeColors::new("#db2777", "#f472b6"),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the site root.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Simple Site Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Storage
# ---------------------------------------------------------------------------
[storage]
# Directory holding one <key>.json file per stored blob.
# Relative paths are resolved against the site root.
dir = ".simple-site"

# Key of the full site state (sections, posts, theme, flags).
state_key = "dynamicWebsiteData"

# Key of the single-document editor (title, text, one media file).
document_key = "websiteContent"

# ---------------------------------------------------------------------------
# Share links
# ---------------------------------------------------------------------------
[share]
# Links look like <origin><path>?data=<token>
origin = "http://localhost:8000"
path = "/index.html"

# ---------------------------------------------------------------------------
# Media ingestion
# ---------------------------------------------------------------------------
[media]
# Files above these sizes are rejected when attached.
max_image_bytes = 10485760   # 10 MB
max_video_bytes = 52428800   # 50 MB

# ---------------------------------------------------------------------------
# Auto-save
# ---------------------------------------------------------------------------
[autosave]
# Milliseconds without edits before the editor saves on its own.
delay_ms = 2000

# ---------------------------------------------------------------------------
# Logging
# ---------------------------------------------------------------------------
[logging]
# tracing filter used when RUST_LOG is not set (error, warn, info, debug, trace).
level = "warn"

# ---------------------------------------------------------------------------
# Theme palettes
# ---------------------------------------------------------------------------
[themes.blue]
primary = "#2563eb"
accent = "#60a5fa"

[themes.green]
primary = "#16a34a"
accent = "#4ade80"

[themes.purple]
primary = "#7c3aed"
accent = "#a78bfa"

[themes.orange]
primary = "#ea580c"
accent = "#fb923c"

[themes.pink]
primary = "#db2777"
accent = "#f472b6"
"##
}

/// Generate CSS custom properties for the selected theme.
pub fn generate_theme_css(themes: &ThemesConfig, theme: Theme) -> String {
    let colors = themes.colors(theme);
    format!(
        r#":root {{
    --color-primary: {primary};
    --color-accent: {accent};
}}"#,
        primary = colors.primary,
        accent = colors.accent,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.storage.state_key, "dynamicWebsiteData");
        assert_eq!(config.storage.document_key, "websiteContent");
        assert_eq!(config.media.max_image_bytes, 10 * 1024 * 1024);
        assert_eq!(config.media.max_video_bytes, 50 * 1024 * 1024);
        assert_eq!(config.autosave.delay(), Duration::from_secs(2));
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[themes.pink]
primary = "#000000"
accent = "#111111"
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.themes.pink.primary, "#000000");
        // Default values preserved
        assert_eq!(config.themes.blue.primary, "#2563eb");
        assert_eq!(config.autosave.delay_ms, 2000);
    }

    #[test]
    fn theme_css_uses_selected_palette() {
        let themes = ThemesConfig::default();
        let css = generate_theme_css(&themes, Theme::Green);
        assert!(css.contains("--color-primary: #16a34a"));
        assert!(!css.contains("#2563eb"));
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.storage.dir, ".simple-site");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r##"
[share]
origin = "https://me.example"

[media]
max_image_bytes = 1024
"##,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.share.origin, "https://me.example");
        assert_eq!(config.share.path, "/index.html");
        assert_eq!(config.media.max_image_bytes, 1024);
        assert_eq!(config.media.max_video_bytes, 50 * 1024 * 1024);
    }

    #[test]
    fn load_config_partial_theme_table_merges() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[themes.orange]\nprimary = \"#ff0000\"\n",
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.themes.orange.primary, "#ff0000");
        assert_eq!(config.themes.orange.accent, "#fb923c");
    }

    #[test]
    fn load_config_rejects_unknown_keys() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[share]\norign = \"x\"\n").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn load_config_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not toml [[[").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn validate_rejects_zero_limits() {
        let mut config = SiteConfig::default();
        config.media.max_video_bytes = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_same_keys() {
        let mut config = SiteConfig::default();
        config.storage.document_key = config.storage.state_key.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_http_origin() {
        let mut config = SiteConfig::default();
        config.share.origin = "ftp://nope".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn merge_toml_overlay_wins() {
        let base: toml::Value = toml::from_str("a = 1\n[t]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[t]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["t"]["x"].as_integer(), Some(1));
        assert_eq!(merged["t"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.storage.dir, defaults.storage.dir);
        assert_eq!(config.media.max_video_bytes, defaults.media.max_video_bytes);
        assert_eq!(config.themes.purple.accent, defaults.themes.purple.accent);
        config.validate().unwrap();
    }
}
