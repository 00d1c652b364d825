//! Guild configuration business logic.
//!
//! Guild rows are created lazily, the first time the bot joins a guild or someone
//! changes a setting. Two handlers racing to create the same row is expected; the
//! loser simply reads back what the winner wrote.

use crate::{
    entities::{Guild, guild},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*, sea_query::OnConflict};
use tracing::{debug, instrument};

/// Longest prefix a guild may configure.
pub const MAX_PREFIX_LEN: usize = 5;

pub async fn get_guild<C: ConnectionTrait>(db: &C, guild_id: &str) -> Result<Option<guild::Model>> {
    Guild::find_by_id(guild_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Fetches the guild's configuration, creating it with defaults when missing.
///
/// Returns the row and whether this call created it.
#[instrument(skip(db))]
pub async fn get_or_create_guild<C: ConnectionTrait>(
    db: &C,
    guild_id: &str,
) -> Result<(guild::Model, bool)> {
    if let Some(existing) = get_guild(db, guild_id).await? {
        return Ok((existing, false));
    }

    let row = guild::ActiveModel {
        guild_id: Set(guild_id.to_string()),
        prefix: Set(guild::DEFAULT_PREFIX.to_string()),
        embed_color: Set(None),
        embed_footer: Set(None),
        created_at: Set(chrono::Utc::now()),
    };
    let inserted = Guild::insert(row)
        .on_conflict(
            OnConflict::column(guild::Column::GuildId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    if inserted == 0 {
        debug!(guild_id, "Guild row was created concurrently, reading it back");
    }

    let model = get_guild(db, guild_id).await?.ok_or_else(|| {
        Error::Database(DbErr::RecordNotFound(format!(
            "guild {guild_id} vanished right after creation"
        )))
    })?;
    Ok((model, inserted > 0))
}

/// Changes a guild's command prefix, creating the guild row if needed.
#[instrument(skip(db))]
pub async fn set_prefix<C: ConnectionTrait>(
    db: &C,
    guild_id: &str,
    prefix: &str,
) -> Result<guild::Model> {
    let prefix = prefix.trim();
    if prefix.is_empty() || prefix.chars().count() > MAX_PREFIX_LEN {
        return Err(Error::Validation {
            message: format!("Prefix must be between 1 and {MAX_PREFIX_LEN} characters"),
        });
    }

    let (guild, _) = get_or_create_guild(db, guild_id).await?;
    let mut active: guild::ActiveModel = guild.into();
    active.prefix = Set(prefix.to_string());
    active.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;

        let (first, created) = get_or_create_guild(&db, "123").await?;
        assert!(created);
        assert_eq!(first.prefix, guild::DEFAULT_PREFIX);

        let (second, created) = get_or_create_guild(&db, "123").await?;
        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(Guild::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_prefix() -> Result<()> {
        let db = setup_test_db().await?;
        let updated = set_prefix(&db, "55", " ! ").await?;
        assert_eq!(updated.prefix, "!");
        assert_eq!(get_guild(&db, "55").await?.map(|g| g.prefix), Some("!".into()));

        assert!(set_prefix(&db, "55", "").await.is_err());
        let too_long = set_prefix(&db, "55", "toolong").await;
        assert!(matches!(too_long, Err(Error::Validation { .. })));
        Ok(())
    }
}
