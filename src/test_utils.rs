//! Shared test utilities.
//!
//! Helpers for setting up an in-memory database and seeding scrims and slots
//! with sensible defaults.

use crate::{
    core::scrim,
    entities::{self, MemberIds, Scrim, SlotNumbers, assigned_slot},
    errors::Result,
};
use sea_orm::{DatabaseConnection, Set, prelude::*};
use tracing_subscriber::EnvFilter;

/// Guild id used by every seeded scrim.
pub const TEST_GUILD_ID: &str = "424242";
/// Registration channel used by every seeded scrim.
pub const TEST_CHANNEL_ID: &str = "515151";

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a scrim in [`TEST_GUILD_ID`] whose slots start at `start_from`.
pub async fn create_test_scrim(
    db: &DatabaseConnection,
    start_from: i32,
) -> Result<entities::ScrimModel> {
    scrim::create_scrim(
        db,
        TEST_GUILD_ID.to_string(),
        "Test Scrim".to_string(),
        TEST_CHANNEL_ID.to_string(),
        start_from,
    )
    .await
}

/// Assigns a one-member team to slot `num` and removes `num` from `available_slots`.
///
/// Writes directly rather than going through `core::slot::add_team`, so tests of
/// that function don't depend on it for their setup.
pub async fn assign_test_slot(
    db: &DatabaseConnection,
    scrim_id: i64,
    num: i32,
    team_name: &str,
) -> Result<entities::AssignedSlotModel> {
    let slot = assigned_slot::ActiveModel {
        scrim_id: Set(scrim_id),
        num: Set(num),
        team_name: Set(team_name.to_string()),
        leader_id: Set("1".to_string()),
        members: Set(MemberIds(vec!["1".to_string()])),
        assigned_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    if let Some(scrim) = Scrim::find_by_id(scrim_id).one(db).await? {
        let remaining =
            SlotNumbers::from_unsorted(scrim.available_slots.0.iter().copied().filter(|n| *n != num));
        let mut active: entities::scrim::ActiveModel = scrim.into();
        active.available_slots = Set(remaining);
        active.update(db).await?;
    }
    Ok(slot)
}
