//! Bot layer - Discord-specific interface, event handlers and interactive views
//!
//! This module provides the Discord interface for scrim-buddy, including slash
//! commands, gateway event handlers, the slotlist edit panel and the bot shell
//! that wires them to the database pools.

/// Discord command implementations (general, esports, config)
pub mod commands;
/// Gateway event handlers (guild join, messages, mentions)
pub mod events;
/// Feature modules that can be switched on and off per deployment
pub mod extensions;
/// Startup and shutdown of the gateway client, HTTP session and pools
pub mod shell;
/// Interactive button panels, modals and select prompts
pub mod views;

use crate::{
    cache::GuildCache,
    config::{EmbedDefaults, Pools},
    errors::Error,
};
use extensions::Extension;
use std::sync::atomic::{AtomicU64, Ordering};

/// Poise context used by every command.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Shared data available to all bot commands and event handlers.
pub struct BotData {
    /// Both database pools
    pub pools: Pools,
    /// Per-guild settings, written on join and read on every message
    pub guild_cache: GuildCache,
    /// Outbound HTTP session shared by extensions
    pub http: reqwest::Client,
    /// Bot-wide embed defaults
    pub embed: EmbedDefaults,
    /// Prefix used for guilds that aren't cached yet
    pub default_prefix: String,
    /// Extensions that loaded successfully
    pub extensions: Vec<Extension>,
    seen_messages: AtomicU64,
}

impl BotData {
    /// Creates a new `BotData` with an empty guild cache.
    #[must_use]
    pub fn new(
        pools: Pools,
        http: reqwest::Client,
        embed: EmbedDefaults,
        default_prefix: String,
        extensions: Vec<Extension>,
    ) -> Self {
        Self {
            pools,
            guild_cache: GuildCache::new(),
            http,
            embed,
            default_prefix,
            extensions,
            seen_messages: AtomicU64::new(0),
        }
    }

    /// Shorthand for the pool this instance owns.
    #[must_use]
    pub const fn db(&self) -> &sea_orm::DatabaseConnection {
        self.pools.my_pool()
    }

    #[must_use]
    pub fn has_extension(&self, extension: Extension) -> bool {
        self.extensions.contains(&extension)
    }

    /// Counts one more message seen on the gateway and returns the new total.
    pub fn record_message(&self) -> u64 {
        self.seen_messages.fetch_add(1, Ordering::Relaxed) + 1
    }

    #[must_use]
    pub fn seen_messages(&self) -> u64 {
        self.seen_messages.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::InstanceType, test_utils::setup_test_db};

    #[tokio::test]
    async fn test_record_message_counts() -> crate::errors::Result<()> {
        let pools = Pools::new(
            setup_test_db().await?,
            setup_test_db().await?,
            InstanceType::Quotient,
        );
        let data = BotData::new(
            pools,
            reqwest::Client::new(),
            EmbedDefaults::default(),
            "q".to_string(),
            vec![Extension::General],
        );
        assert_eq!(data.seen_messages(), 0);
        assert_eq!(data.record_message(), 1);
        assert_eq!(data.record_message(), 2);
        assert_eq!(data.seen_messages(), 2);
        assert!(data.has_extension(Extension::General));
        assert!(!data.has_extension(Extension::Esports));
        Ok(())
    }
}
