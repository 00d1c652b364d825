//! Slot manager business logic.
//!
//! A slot manager owns one public message listing every tracked scrim together with
//! its open slots, so teams can see at a glance where they can still get in.

use crate::{
    entities::{ScrimIds, SlotManager, scrim, slot_manager},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*};

pub async fn create_slot_manager<C: ConnectionTrait>(
    db: &C,
    guild_id: String,
    main_channel_id: String,
    scrim_ids: Vec<i64>,
) -> Result<slot_manager::Model> {
    slot_manager::ActiveModel {
        guild_id: Set(guild_id),
        main_channel_id: Set(main_channel_id),
        message_id: Set(None),
        scrim_ids: Set(ScrimIds(scrim_ids)),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

pub async fn set_message<C: ConnectionTrait>(
    db: &C,
    manager: slot_manager::Model,
    message_id: String,
) -> Result<slot_manager::Model> {
    let mut active: slot_manager::ActiveModel = manager.into();
    active.message_id = Set(Some(message_id));
    active.update(db).await.map_err(Into::into)
}

/// The slot manager tracking `scrim`, if any.
pub async fn find_for_scrim<C: ConnectionTrait>(
    db: &C,
    scrim: &scrim::Model,
) -> Result<Option<slot_manager::Model>> {
    let managers = SlotManager::find()
        .filter(slot_manager::Column::GuildId.eq(scrim.guild_id.as_str()))
        .order_by_asc(slot_manager::Column::Id)
        .all(db)
        .await?;
    Ok(managers
        .into_iter()
        .find(|m| m.scrim_ids.0.contains(&scrim.id)))
}

/// Loads the tracked scrims in the order the manager lists them, skipping deleted ones.
pub async fn tracked_scrims<C: ConnectionTrait>(
    db: &C,
    manager: &slot_manager::Model,
) -> Result<Vec<scrim::Model>> {
    let mut found = crate::entities::Scrim::find()
        .filter(scrim::Column::Id.is_in(manager.scrim_ids.0.iter().copied()))
        .all(db)
        .await?;
    found.sort_by_key(|s| {
        manager
            .scrim_ids
            .0
            .iter()
            .position(|id| *id == s.id)
            .unwrap_or(usize::MAX)
    });
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_find_for_scrim() -> Result<()> {
        let db = setup_test_db().await?;
        let tracked = create_test_scrim(&db, 1).await?;
        let untracked = create_test_scrim(&db, 1).await?;

        let manager =
            create_slot_manager(&db, TEST_GUILD_ID.into(), "77".into(), vec![tracked.id]).await?;

        assert_eq!(find_for_scrim(&db, &tracked).await?.map(|m| m.id), Some(manager.id));
        assert!(find_for_scrim(&db, &untracked).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_tracked_scrims_keep_manager_order() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_scrim(&db, 1).await?;
        let b = create_test_scrim(&db, 1).await?;
        let manager =
            create_slot_manager(&db, TEST_GUILD_ID.into(), "77".into(), vec![b.id, a.id, 999])
                .await?;

        let ids: Vec<i64> = tracked_scrims(&db, &manager).await?.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);

        let manager = set_message(&db, manager, "12".into()).await?;
        assert_eq!(manager.message_id.as_deref(), Some("12"));
        Ok(())
    }
}
