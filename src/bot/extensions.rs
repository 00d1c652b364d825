//! Feature modules ("extensions") selected at startup through `EXTENSIONS`.
//!
//! Each extension contributes commands and/or event handling. An extension that
//! fails to load is logged and skipped; the rest of the bot still starts.

use super::{BotData, commands};
use crate::errors::{Error, Result};
use std::fmt;
use std::str::FromStr;
use tracing::{error, info, warn};

/// A feature module the bot can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    /// `/ping` and `/help`
    General,
    /// Guild-join bookkeeping and the mention reply
    Events,
    /// Scrims, the slotlist edit panel and slot managers
    Esports,
    /// Per-guild settings such as the prefix
    Config,
}

impl Extension {
    /// Commands contributed by this extension.
    #[must_use]
    pub fn commands(self) -> Vec<poise::Command<BotData, Error>> {
        match self {
            Self::General => vec![commands::ping(), commands::help()],
            Self::Events => Vec::new(),
            Self::Esports => vec![
                commands::scrim(),
                commands::slotlist(),
                commands::slotmanager(),
            ],
            Self::Config => vec![commands::setprefix()],
        }
    }
}

impl FromStr for Extension {
    type Err = Error;

    /// Accepts bare names as well as dotted module paths such as `cogs.esports`.
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().rsplit('.').next().unwrap_or_default();
        match name.to_ascii_lowercase().as_str() {
            "general" => Ok(Self::General),
            "events" => Ok(Self::Events),
            "esports" => Ok(Self::Esports),
            "config" => Ok(Self::Config),
            _ => Err(Error::Config {
                message: format!("unknown extension '{}'", s.trim()),
            }),
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::General => "general",
            Self::Events => "events",
            Self::Esports => "esports",
            Self::Config => "config",
        };
        f.write_str(name)
    }
}

/// The outcome of loading the configured extensions.
pub struct LoadedExtensions {
    pub extensions: Vec<Extension>,
    pub commands: Vec<poise::Command<BotData, Error>>,
}

/// Loads extensions in order, skipping (and logging) any that fail.
#[must_use]
pub fn load_extensions(names: &[String]) -> LoadedExtensions {
    let mut loaded = LoadedExtensions {
        extensions: Vec::new(),
        commands: Vec::new(),
    };

    for name in names {
        match name.parse::<Extension>() {
            Ok(ext) if loaded.extensions.contains(&ext) => {
                warn!("Extension {ext} listed twice, ignoring the duplicate.");
            }
            Ok(ext) => {
                loaded.commands.extend(ext.commands());
                loaded.extensions.push(ext);
                info!("Loaded extension {ext}.");
            }
            Err(e) => error!("Failed to load extension {name}: {e}"),
        }
    }

    loaded
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_extension_names() {
        assert_eq!("esports".parse::<Extension>().unwrap(), Extension::Esports);
        assert_eq!("cogs.Events".parse::<Extension>().unwrap(), Extension::Events);
        assert!("music".parse::<Extension>().is_err());
        assert_eq!(Extension::Config.to_string(), "config");
    }

    #[test]
    fn test_bad_extension_is_skipped() {
        let names: Vec<String> = ["general", "bogus", "esports", "general"]
            .into_iter()
            .map(String::from)
            .collect();
        let loaded = load_extensions(&names);

        assert_eq!(
            loaded.extensions,
            vec![Extension::General, Extension::Esports]
        );
        let command_names: Vec<&str> = loaded.commands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            command_names,
            vec!["ping", "help", "scrim", "slotlist", "slotmanager"]
        );
    }

    #[test]
    fn test_events_extension_has_no_commands() {
        let loaded = load_extensions(&["events".to_string()]);
        assert_eq!(loaded.extensions, vec![Extension::Events]);
        assert!(loaded.commands.is_empty());
    }
}
