//! Site configuration module.
//!
//! Handles loading, validating, and merging `site.toml`. Stock defaults are
//! serialized to a TOML table, the user's file is merged on top of it, and the
//! result is deserialized and validated.
//!
//! ## Config File Location
//!
//! ```text
//! content/
//! ├── site.toml                # Optional; overrides stock defaults
//! ├── portfolio/
//! └── artists/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! name = "Inklab Mastery"
//! title = "Inklab Mastery - Tatuajes de Alta Calidad"
//! description = "Estudio de tatuajes ..."
//! url = "https://inklab-mastery.vercel.app"   # Absolute; used by the sitemap
//! locale = "es-ES"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//!
//! [contact]
//! limit = 5                 # Submissions per window per client
//! window_minutes = 15
//! spam_keywords = ["viagra", "casino", "lottery", "pills"]
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! [site]
//! url = "https://inklab.example"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// File name of the site config inside the content root.
pub const CONFIG_FILENAME: &str = "site.toml";

/// Upper bound for `contact.window_minutes` (7 days).
pub const MAX_WINDOW_MINUTES: u64 = 7 * 24 * 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Studio identity and SEO defaults.
    pub site: SiteInfo,
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Contact form abuse protection.
    pub contact: ContactConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.name.trim().is_empty() {
            return Err(ConfigError::Validation("site.name must not be empty".into()));
        }
        match url::Url::parse(&self.site.url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            _ => {
                return Err(ConfigError::Validation(format!(
                    "site.url must be an absolute http(s) URL, got {:?}",
                    self.site.url
                )));
            }
        }
        if self.contact.limit == 0 {
            return Err(ConfigError::Validation(
                "contact.limit must be greater than 0".into(),
            ));
        }
        if self.contact.window_minutes == 0 || self.contact.window_minutes > MAX_WINDOW_MINUTES {
            return Err(ConfigError::Validation(format!(
                "contact.window_minutes must be between 1 and {MAX_WINDOW_MINUTES}, got {}",
                self.contact.window_minutes
            )));
        }
        Ok(())
    }
}

/// Studio identity, used for page titles, meta tags and the sitemap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    /// Short studio name, appended to page titles.
    pub name: String,
    /// Full title used on the home page.
    pub title: String,
    /// Default meta description.
    pub description: String,
    /// Public base URL, without trailing slash.
    pub url: String,
    /// BCP 47 locale for `<html lang>` and Open Graph.
    pub locale: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: "Inklab Mastery".to_string(),
            title: "Inklab Mastery - Tatuajes de Alta Calidad".to_string(),
            description: "Estudio de tatuajes especializado en estilo japonés, blackwork y \
                          realismo. Artistas profesionales con más de 10 años de experiencia."
                .to_string(),
            url: "https://inklab-mastery.vercel.app".to_string(),
            locale: "es-ES".to_string(),
        }
    }
}

impl SiteInfo {
    /// Base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Language subtag of the locale (`es-ES` → `es`).
    pub fn lang(&self) -> &str {
        self.locale.split('-').next().unwrap_or(&self.locale)
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Contact form abuse protection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContactConfig {
    /// Accepted submissions per client within one window.
    pub limit: u32,
    /// Fixed window length in minutes.
    pub window_minutes: u64,
    /// Case-insensitive substrings that mark a submission as spam.
    pub spam_keywords: Vec<String>,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            limit: 5,
            window_minutes: 15,
            spam_keywords: ["viagra", "casino", "lottery", "pills"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl ContactConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_minutes.saturating_mul(60))
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
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

/// Load `site.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist, `Err` if it is not valid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
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

/// Load config from `site.toml` in the content root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `site.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Inklab Site Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file at <content>/site.toml. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Studio identity
# ---------------------------------------------------------------------------
[site]
# Short name, appended to page titles ("Portfolio | Inklab Mastery").
name = "Inklab Mastery"

# Title of the home page.
title = "Inklab Mastery - Tatuajes de Alta Calidad"

# Default meta description.
description = "Estudio de tatuajes especializado en estilo japonés, blackwork y realismo. Artistas profesionales con más de 10 años de experiencia."

# Public base URL. Must be absolute; used for sitemap entries.
url = "https://inklab-mastery.vercel.app"

# Locale for <html lang> and Open Graph tags.
locale = "es-ES"

# ---------------------------------------------------------------------------
# HTTP server (overridden by `serve --host/--port`)
# ---------------------------------------------------------------------------
[server]
host = "127.0.0.1"
port = 3000

# ---------------------------------------------------------------------------
# Contact form
# ---------------------------------------------------------------------------
[contact]
# Submissions allowed per client (x-forwarded-for) within one window.
limit = 5

# Fixed window length in minutes (1 to 10080, i.e. 7 days). Expired entries
# are swept on this period.
window_minutes = 15

# Case-insensitive substrings rejected in the name or message.
spam_keywords = ["viagra", "casino", "lottery", "pills"]
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.site.name, "Inklab Mastery");
        assert_eq!(config.site.locale, "es-ES");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.contact.limit, 5);
        assert_eq!(config.contact.window(), Duration::from_secs(15 * 60));
        assert_eq!(config.contact.spam_keywords.len(), 4);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[site]
url = "https://inklab.example"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        // Overridden value
        assert_eq!(config.site.url, "https://inklab.example");
        // Default values preserved
        assert_eq!(config.site.name, "Inklab Mastery");
        assert_eq!(config.contact.limit, 5);
    }

    #[test]
    fn base_url_strips_trailing_slash() {
        let mut site = SiteInfo::default();
        site.url = "https://inklab.example/".to_string();
        assert_eq!(site.base_url(), "https://inklab.example");
    }

    #[test]
    fn lang_from_locale() {
        assert_eq!(SiteInfo::default().lang(), "es");
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.url, "https://inklab-mastery.vercel.app");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
[contact]
limit = 3
spam_keywords = ["crypto"]
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.contact.limit, 3);
        assert_eq!(config.contact.spam_keywords, vec!["crypto"]);
        // Unspecified values should be defaults
        assert_eq!(config.contact.window_minutes, 15);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "this is not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
[contact]
limit = 0
"#,
        )
        .unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn window_minutes_bounded() {
        let mut config = SiteConfig::default();
        config.contact.window_minutes = MAX_WINDOW_MINUTES;
        assert!(config.validate().is_ok());

        config.contact.window_minutes = MAX_WINDOW_MINUTES + 1;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        config.contact.window_minutes = u64::MAX / 60;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn window_does_not_overflow() {
        let contact = ContactConfig {
            window_minutes: u64::MAX,
            ..ContactConfig::default()
        };
        assert_eq!(contact.window(), Duration::from_secs(u64::MAX));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[contact]
limit = 5
window_minutes = 15
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[contact]
limit = 2
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let contact = merged.get("contact").unwrap();
        assert_eq!(contact.get("limit").unwrap().as_integer(), Some(2));
        assert_eq!(contact.get("window_minutes").unwrap().as_integer(), Some(15));
    }

    #[test]
    fn merge_toml_arrays_replaced_not_appended() {
        let base: toml::Value = toml::from_str(r#"keywords = ["a", "b"]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"keywords = ["c"]"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("keywords").unwrap().as_array().unwrap().len(), 1);
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[contact]
limt = 5
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml_str);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[database]\nurl = \"x\"\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_relative_url_rejected() {
        let mut config = SiteConfig::default();
        config.site.url = "/relative".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("site.url"));

        config.site.url = "ftp://inklab.example".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_zero_window_rejected() {
        let mut config = SiteConfig::default();
        config.contact.window_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_empty_name_rejected() {
        let mut config = SiteConfig::default();
        config.site.name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.site.title, defaults.site.title);
        assert_eq!(config.site.description, defaults.site.description);
        assert_eq!(config.site.url, defaults.site.url);
        assert_eq!(config.server.port, defaults.server.port);
        assert_eq!(config.contact.limit, defaults.contact.limit);
        assert_eq!(config.contact.spam_keywords, defaults.contact.spam_keywords);
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.get("site").is_some());
        assert!(val.get("server").is_some());
        assert!(val.get("contact").is_some());
    }
}
