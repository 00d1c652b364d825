//! Guild entity - per-guild configuration created lazily when the bot joins.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Prefix used when a guild never configured one.
pub const DEFAULT_PREFIX: &str = "q";

/// Guild configuration model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "guilds")]
pub struct Model {
    /// Discord guild ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub guild_id: String,
    /// Prefix for text commands in this guild
    pub prefix: String,
    /// Embed color override, falls back to the bot default when unset
    pub embed_color: Option<i32>,
    /// Embed footer override, falls back to the bot default when unset
    pub embed_footer: Option<String>,
    pub created_at: DateTimeUtc,
}

/// `Guild` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
