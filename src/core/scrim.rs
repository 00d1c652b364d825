//! Scrim business logic - creating scrims and tracking their slotlist message.

use crate::{
    core::slot::MAX_SLOT,
    entities::{Scrim, SlotNumbers, scrim},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Creates a scrim whose slots `start_from..MAX_SLOT` are all available.
pub async fn create_scrim<C: ConnectionTrait>(
    db: &C,
    guild_id: String,
    name: String,
    registration_channel_id: String,
    start_from: i32,
) -> Result<scrim::Model> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Scrim name cannot be empty".to_string(),
        });
    }
    if !(0..=MAX_SLOT).contains(&start_from) {
        return Err(Error::Validation {
            message: format!("Starting slot must be between 0 and {MAX_SLOT}"),
        });
    }

    let model = scrim::ActiveModel {
        guild_id: Set(guild_id),
        name: Set(name.trim().to_string()),
        registration_channel_id: Set(registration_channel_id),
        slotlist_message_id: Set(None),
        available_slots: Set(SlotNumbers::from_unsorted(start_from..MAX_SLOT)),
        start_from: Set(start_from),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let created = model.insert(db).await?;
    info!(scrim_id = created.id, name = %created.name, "Created scrim");
    Ok(created)
}

pub async fn get_scrim<C: ConnectionTrait>(db: &C, scrim_id: i64) -> Result<Option<scrim::Model>> {
    Scrim::find_by_id(scrim_id).one(db).await.map_err(Into::into)
}

/// Finds a scrim only if it belongs to `guild_id`, so one guild can't edit another's scrims.
pub async fn get_guild_scrim<C: ConnectionTrait>(
    db: &C,
    guild_id: &str,
    scrim_id: i64,
) -> Result<Option<scrim::Model>> {
    Scrim::find_by_id(scrim_id)
        .filter(scrim::Column::GuildId.eq(guild_id))
        .one(db)
        .await
        .map_err(Into::into)
}

pub async fn list_guild_scrims<C: ConnectionTrait>(
    db: &C,
    guild_id: &str,
) -> Result<Vec<scrim::Model>> {
    Scrim::find()
        .filter(scrim::Column::GuildId.eq(guild_id))
        .order_by_asc(scrim::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Records which message renders the slotlist.
pub async fn set_slotlist_message<C: ConnectionTrait>(
    db: &C,
    scrim_id: i64,
    message_id: String,
) -> Result<scrim::Model> {
    let scrim = get_scrim(db, scrim_id)
        .await?
        .ok_or(Error::ScrimNotFound { id: scrim_id })?;
    let mut active: scrim::ActiveModel = scrim.into();
    active.slotlist_message_id = Set(Some(message_id));
    active.update(db).await.map_err(Into::into)
}
