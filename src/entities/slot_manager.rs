//! Slot manager entity - a public message summarising open slots across scrims.
//!
//! A scrim is "managed" when its id appears in some slot manager's `scrim_ids`.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ids of the scrims tracked by a slot manager.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ScrimIds(pub Vec<i64>);

/// Slot manager database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "slot_managers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub guild_id: String,
    /// Channel holding the public slot manager message
    pub main_channel_id: String,
    /// The public message, once it has been sent
    pub message_id: Option<String>,
    #[sea_orm(column_type = "Json")]
    pub scrim_ids: ScrimIds,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
