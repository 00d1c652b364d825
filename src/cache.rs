//! In-process cache of per-guild settings.
//!
//! Written by the guild-join handler and `/setprefix`, read by the mention handler
//! and the prefix resolver on every message. Concurrent writers race benignly: the
//! last write wins.

use crate::config::EmbedDefaults;
use crate::entities::{GuildModel, guild::DEFAULT_PREFIX};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::trace;

/// Resolved settings for one guild, with bot-wide defaults already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildSettings {
    pub prefix: String,
    pub color: u32,
    pub footer: String,
}

impl GuildSettings {
    /// Merges a stored guild row with the bot-wide embed defaults.
    #[must_use]
    pub fn from_model(model: &GuildModel, defaults: &EmbedDefaults) -> Self {
        Self {
            prefix: model.prefix.clone(),
            color: model
                .embed_color
                .and_then(|c| u32::try_from(c).ok())
                .unwrap_or(defaults.color),
            footer: model
                .embed_footer
                .clone()
                .unwrap_or_else(|| defaults.footer.clone()),
        }
    }
}

/// Shared guild settings cache. Cloning is cheap and shares the same map.
#[derive(Debug, Clone, Default)]
pub struct GuildCache {
    inner: Arc<RwLock<HashMap<u64, GuildSettings>>>,
}

impl GuildCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, guild_id: u64, settings: GuildSettings) {
        trace!(guild_id, ?settings, "Caching guild settings");
        self.inner.write().await.insert(guild_id, settings);
    }

    pub async fn get(&self, guild_id: u64) -> Option<GuildSettings> {
        self.inner.read().await.get(&guild_id).cloned()
    }

    /// The guild's prefix, or the global default when the guild isn't cached.
    pub async fn prefix(&self, guild_id: u64) -> String {
        self.inner
            .read()
            .await
            .get(&guild_id)
            .map_or_else(|| DEFAULT_PREFIX.to_string(), |s| s.prefix.clone())
    }

    /// Updates only the prefix of a cached guild. Returns false if the guild isn't cached.
    pub async fn set_prefix(&self, guild_id: u64, prefix: &str) -> bool {
        let mut cache = self.inner.write().await;
        cache.get_mut(&guild_id).is_some_and(|s| {
            s.prefix = prefix.to_string();
            true
        })
    }

    /// Number of guilds currently cached.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(prefix: &str, color: Option<i32>, footer: Option<&str>) -> GuildModel {
        GuildModel {
            guild_id: "1".to_string(),
            prefix: prefix.to_string(),
            embed_color: color,
            embed_footer: footer.map(str::to_string),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_settings_fall_back_to_defaults() {
        let defaults = EmbedDefaults::default();
        let settings = GuildSettings::from_model(&model("q", None, None), &defaults);
        assert_eq!(settings.color, defaults.color);
        assert_eq!(settings.footer, defaults.footer);

        let settings = GuildSettings::from_model(&model("!", Some(0xFF), Some("hi")), &defaults);
        assert_eq!(settings.prefix, "!");
        assert_eq!(settings.color, 0xFF);
        assert_eq!(settings.footer, "hi");
    }

    #[tokio::test]
    async fn test_prefix_defaults_when_uncached() {
        let cache = GuildCache::new();
        assert_eq!(cache.prefix(42).await, DEFAULT_PREFIX);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_insert_and_set_prefix() {
        let cache = GuildCache::new();
        assert!(!cache.set_prefix(7, "!").await);

        let settings = GuildSettings::from_model(&model("q", None, None), &EmbedDefaults::default());
        cache.insert(7, settings).await;
        assert!(cache.set_prefix(7, "!").await);
        assert_eq!(cache.prefix(7).await, "!");

        // Clones share the same map
        let other = cache.clone();
        assert_eq!(other.len().await, 1);
        assert_eq!(other.get(7).await.map(|s| s.prefix), Some("!".to_string()));
    }
}
