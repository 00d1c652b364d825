//! Entity module - Contains all SeaORM entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod assigned_slot;
pub mod guild;
pub mod scrim;
pub mod slot_manager;

// Re-export specific types to avoid conflicts
pub use assigned_slot::{
    Column as AssignedSlotColumn, Entity as AssignedSlot, MemberIds, Model as AssignedSlotModel,
};
pub use guild::{Column as GuildColumn, Entity as Guild, Model as GuildModel};
pub use scrim::{Column as ScrimColumn, Entity as Scrim, Model as ScrimModel, SlotNumbers};
pub use slot_manager::{
    Column as SlotManagerColumn, Entity as SlotManager, Model as SlotManagerModel, ScrimIds,
};
