//! Scrim entity - a scheduled practice match with a fixed range of numbered slots.
//!
//! `available_slots` holds the slot numbers that no team occupies yet. It is kept
//! sorted and must stay disjoint from the numbers of the scrim's assigned slots.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sorted list of slot numbers, stored as a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct SlotNumbers(pub Vec<i32>);

impl SlotNumbers {
    /// Builds a sorted, deduplicated list from any iterator of numbers.
    #[must_use]
    pub fn from_unsorted(nums: impl IntoIterator<Item = i32>) -> Self {
        let mut v: Vec<i32> = nums.into_iter().collect();
        v.sort_unstable();
        v.dedup();
        Self(v)
    }

    #[must_use]
    pub fn contains(&self, num: i32) -> bool {
        self.0.binary_search(&num).is_ok()
    }
}

/// Scrim database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "scrims")]
pub struct Model {
    /// Unique identifier for the scrim
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord guild the scrim belongs to
    pub guild_id: String,
    /// Display name used in the slotlist title
    pub name: String,
    /// Channel where teams register and the slotlist is posted
    pub registration_channel_id: String,
    /// Message rendering the current slotlist, once it has been sent
    pub slotlist_message_id: Option<String>,
    /// Slot numbers not occupied by any team
    #[sea_orm(column_type = "Json")]
    pub available_slots: SlotNumbers,
    /// First slot number handed out for this scrim
    pub start_from: i32,
    /// When the scrim was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Scrim and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One scrim has many assigned slots
    #[sea_orm(has_many = "super::assigned_slot::Entity")]
    AssignedSlots,
}

impl Related<super::assigned_slot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssignedSlots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
