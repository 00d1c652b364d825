//! Assigned slot entity - a team occupying one numbered slot of a scrim.
//!
//! The slot number is unique within a scrim and the leader is always one of the members.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Discord user ids of a team's members, leader first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct MemberIds(pub Vec<String>);

/// Assigned slot database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "scrim_assigned_slots")]
pub struct Model {
    /// Unique identifier for the slot record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the scrim this slot belongs to
    pub scrim_id: i64,
    /// Slot number shown in the slotlist
    pub num: i32,
    pub team_name: String,
    /// Discord user ID of the team leader
    pub leader_id: String,
    #[sea_orm(column_type = "Json")]
    pub members: MemberIds,
    pub assigned_at: DateTimeUtc,
}

/// Defines relationships between assigned slots and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each slot belongs to one scrim
    #[sea_orm(
        belongs_to = "super::scrim::Entity",
        from = "Column::ScrimId",
        to = "super::scrim::Column::Id",
        on_delete = "Cascade"
    )]
    Scrim,
}

impl Related<super::scrim::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scrim.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
