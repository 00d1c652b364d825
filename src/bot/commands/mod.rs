//! Discord command implementations organized by extension.

/// Per-guild settings commands
pub mod config;

/// Scrim, slotlist and slot manager commands
pub mod esports;

/// General utility commands
pub mod general;

// Export commands
pub use config::*;
pub use esports::*;
pub use general::*;
