//! Core business logic, independent of Discord.
//!
//! Every function takes a `SeaORM` connection and returns crate `Result`s so that it can
//! be tested against an in-memory database.

/// Guild configuration records
pub mod guild;
/// Slotlist and slot manager message rendering
pub mod render;
/// Scrim creation and lookup
pub mod scrim;
/// Slot assignment: add, remove and change teams
pub mod slot;
/// Slot manager records
pub mod slot_manager;
