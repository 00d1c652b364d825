/// Environment and TOML configuration for the bot shell
pub mod bot;

/// Database connection pools and table creation
pub mod database;

pub use bot::{BotConfig, EmbedDefaults, InstanceType};
pub use database::Pools;
