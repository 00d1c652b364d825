//! Bot configuration loaded from environment variables and an optional TOML file.
//!
//! The token and database URLs always come from the environment (usually via `.env`).
//! Embed defaults can be overridden with a small TOML file:
//!
//! ```toml
//! [embed]
//! color = 0x00FFB3
//! footer = "Scrims made easy"
//! ```

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Default embed color for every guild without an override.
pub const DEFAULT_EMBED_COLOR: u32 = 0x00_FF_B3;
/// Default embed footer for every guild without an override.
pub const DEFAULT_FOOTER: &str = "scrim-buddy | practice made easy";

const DEFAULT_EXTENSIONS: &str = "general,events,esports,config";

/// Which of the two database pools this process treats as its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceType {
    Quotient,
    Pro,
}

impl InstanceType {
    /// Parses the `INSTANCE_TYPE` value, case-insensitively.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "quotient" => Ok(Self::Quotient),
            "pro" => Ok(Self::Pro),
            other => Err(Error::Config {
                message: format!("Unknown INSTANCE_TYPE '{other}', expected 'quotient' or 'pro'"),
            }),
        }
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quotient => f.write_str("quotient"),
            Self::Pro => f.write_str("pro"),
        }
    }
}

/// Embed defaults, optionally read from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedDefaults {
    #[serde(default = "default_color")]
    pub color: u32,
    #[serde(default = "default_footer")]
    pub footer: String,
}

const fn default_color() -> u32 {
    DEFAULT_EMBED_COLOR
}

fn default_footer() -> String {
    DEFAULT_FOOTER.to_string()
}

impl Default for EmbedDefaults {
    fn default() -> Self {
        Self {
            color: DEFAULT_EMBED_COLOR,
            footer: default_footer(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    embed: EmbedDefaults,
}

/// Everything the bot shell needs to start.
#[derive(Clone)]
pub struct BotConfig {
    pub token: String,
    pub quotient_database_url: String,
    pub pro_database_url: String,
    pub instance_type: InstanceType,
    pub default_prefix: String,
    /// Extension names in load order, as written in `EXTENSIONS`
    pub extensions: Vec<String>,
    pub embed: EmbedDefaults,
}

// Keep the token out of logs.
impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("quotient_database_url", &self.quotient_database_url)
            .field("pro_database_url", &self.pro_database_url)
            .field("instance_type", &self.instance_type)
            .field("default_prefix", &self.default_prefix)
            .field("extensions", &self.extensions)
            .field("embed", &self.embed)
            .finish()
    }
}

impl BotConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Only `DISCORD_TOKEN` is required; everything else has a default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("DISCORD_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Config {
                message: "DISCORD_TOKEN is not set".to_string(),
            })?;

        let instance_type = lookup("INSTANCE_TYPE")
            .map_or(Ok(InstanceType::Quotient), |v| InstanceType::parse(&v))?;

        let extensions = parse_extension_list(
            &lookup("EXTENSIONS").unwrap_or_else(|| DEFAULT_EXTENSIONS.to_string()),
        );

        let embed = match lookup("BOT_CONFIG") {
            Some(path) => load_embed_defaults(path)?,
            None if Path::new("config.toml").exists() => load_embed_defaults("config.toml")?,
            None => EmbedDefaults::default(),
        };

        Ok(Self {
            token,
            quotient_database_url: lookup("QUOTIENT_DATABASE_URL")
                .unwrap_or_else(|| "sqlite://data/quotient.sqlite?mode=rwc".to_string()),
            pro_database_url: lookup("PRO_DATABASE_URL")
                .unwrap_or_else(|| "sqlite://data/pro.sqlite?mode=rwc".to_string()),
            instance_type,
            default_prefix: lookup("DEFAULT_PREFIX")
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| crate::entities::guild::DEFAULT_PREFIX.to_string()),
            extensions,
            embed,
        })
    }
}

/// Splits a comma separated extension list, dropping blanks.
#[must_use]
pub fn parse_extension_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Loads embed defaults from a TOML file.
pub fn load_embed_defaults<P: AsRef<Path>>(path: P) -> Result<EmbedDefaults> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load embed defaults from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_embed_defaults(&contents)
}

fn parse_embed_defaults(contents: &str) -> Result<EmbedDefaults> {
    let file: FileConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse bot config: {e}"),
    })?;
    Ok(file.embed)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let result = BotConfig::from_lookup(lookup_from(&[("BOT_CONFIG", "/nonexistent")]));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_defaults_apply() {
        let config = BotConfig::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("BOT_CONFIG", "/nonexistent/config.toml"),
        ]));
        // A BOT_CONFIG pointing nowhere is an error, not a silent default
        assert!(config.is_err());

        let config = BotConfig::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("INSTANCE_TYPE", "PRO"),
            ("DEFAULT_PREFIX", "!"),
            ("EXTENSIONS", "general, ,esports"),
        ]))
        .unwrap();
        assert_eq!(config.instance_type, InstanceType::Pro);
        assert_eq!(config.default_prefix, "!");
        assert_eq!(config.extensions, vec!["general", "esports"]);
    }

    #[test]
    fn test_unknown_instance_type() {
        assert!(InstanceType::parse("staging").is_err());
        assert_eq!(InstanceType::parse("quotient").unwrap().to_string(), "quotient");
    }

    #[test]
    fn test_embed_defaults_from_toml() {
        let parsed = parse_embed_defaults("[embed]\ncolor = 255\n").unwrap();
        assert_eq!(parsed.color, 255);
        assert_eq!(parsed.footer, DEFAULT_FOOTER);

        let empty = parse_embed_defaults("").unwrap();
        assert_eq!(empty.color, DEFAULT_EMBED_COLOR);

        assert!(parse_embed_defaults("[embed]\ncolor = \"red\"").is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = BotConfig::from_lookup(lookup_from(&[("DISCORD_TOKEN", "super-secret")]))
            .unwrap();
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
