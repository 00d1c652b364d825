//! Database connection management for the two connection pools.
//!
//! The bot talks to a main (`quotient`) database and a premium (`pro`) database.
//! Tables are created from the `SeaORM` entity definitions with `IF NOT EXISTS`, so
//! startup is safe to repeat against an existing database.

use super::bot::{BotConfig, InstanceType};
use crate::entities::{AssignedSlot, Guild, Scrim, SlotManager, assigned_slot};
use crate::errors::{Error, Result};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, sea_query::Index};
use std::path::{Path, PathBuf};
use tracing::info;

/// Both database pools, plus the instance discriminator that picks "ours".
#[derive(Debug, Clone)]
pub struct Pools {
    quotient: DatabaseConnection,
    pro: DatabaseConnection,
    instance_type: InstanceType,
}

impl Pools {
    /// Connects both pools and makes sure every table exists.
    pub async fn connect(config: &BotConfig) -> Result<Self> {
        let quotient = create_connection(&config.quotient_database_url).await?;
        create_tables(&quotient).await?;
        info!("Connected to the quotient database.");

        let pro = create_connection(&config.pro_database_url).await?;
        create_tables(&pro).await?;
        info!("Connected to the pro database.");

        Ok(Self::new(quotient, pro, config.instance_type))
    }

    #[must_use]
    pub const fn new(
        quotient: DatabaseConnection,
        pro: DatabaseConnection,
        instance_type: InstanceType,
    ) -> Self {
        Self {
            quotient,
            pro,
            instance_type,
        }
    }

    /// The pool this instance owns, selected by `INSTANCE_TYPE`.
    #[must_use]
    pub const fn my_pool(&self) -> &DatabaseConnection {
        match self.instance_type {
            InstanceType::Quotient => &self.quotient,
            InstanceType::Pro => &self.pro,
        }
    }

    #[must_use]
    pub const fn quotient_pool(&self) -> &DatabaseConnection {
        &self.quotient
    }

    #[must_use]
    pub const fn pro_pool(&self) -> &DatabaseConnection {
        &self.pro
    }

    #[must_use]
    pub const fn instance_type(&self) -> InstanceType {
        self.instance_type
    }

    /// Closes both pools. Consumes `self` since the connections are unusable afterwards.
    pub async fn close(self) -> Result<()> {
        self.quotient.close().await?;
        self.pro.close().await?;
        Ok(())
    }
}

/// Establishes a connection to the database at `url`.
///
/// For file-backed `SQLite` URLs the parent directory is created first, since
/// `mode=rwc` creates the file but not the directories leading to it.
pub async fn create_connection(url: &str) -> Result<DatabaseConnection> {
    if let Some(dir) = sqlite_parent_dir(url) {
        std::fs::create_dir_all(&dir).map_err(|e| Error::Config {
            message: format!("could not create database directory {}: {e}", dir.display()),
        })?;
    }
    Database::connect(url).await.map_err(Into::into)
}

/// The directory holding the database file of a `sqlite://` URL, if it has one.
fn sqlite_parent_dir(url: &str) -> Option<PathBuf> {
    let path = url.strip_prefix("sqlite://")?;
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

async fn create_table<E, C>(db: &C, entity: E) -> Result<()>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables that don't exist yet.
pub async fn create_tables<C: ConnectionTrait>(db: &C) -> Result<()> {
    create_table(db, Guild).await?;
    create_table(db, Scrim).await?;
    create_table(db, AssignedSlot).await?;
    create_table(db, SlotManager).await?;
    create_slot_number_index(db).await?;
    Ok(())
}

/// One team per slot number and scrim, enforced by the database itself.
async fn create_slot_number_index<C: ConnectionTrait>(db: &C) -> Result<()> {
    let builder = db.get_database_backend();
    let statement = Index::create()
        .if_not_exists()
        .unique()
        .name("idx_assigned_slot_scrim_num_unique")
        .table(AssignedSlot)
        .col(assigned_slot::Column::ScrimId)
        .col(assigned_slot::Column::Num)
        .to_owned();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{AssignedSlotModel, GuildModel, ScrimModel, SlotManagerModel};
    use sea_orm::QuerySelect;

    #[test]
    fn test_sqlite_parent_dir() {
        assert_eq!(
            sqlite_parent_dir("sqlite://data/quotient.sqlite?mode=rwc"),
            Some(PathBuf::from("data"))
        );
        assert_eq!(sqlite_parent_dir("sqlite://bot.sqlite"), None);
        assert_eq!(sqlite_parent_dir("sqlite::memory:"), None);
        assert_eq!(sqlite_parent_dir("postgres://localhost/quotient"), None);
    }

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<GuildModel> = Guild::find().limit(1).all(&db).await?;
        let _: Vec<ScrimModel> = Scrim::find().limit(1).all(&db).await?;
        let _: Vec<AssignedSlotModel> = AssignedSlot::find().limit(1).all(&db).await?;
        let _: Vec<SlotManagerModel> = SlotManager::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_repeatable() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_slot_numbers_are_unique_per_scrim() -> Result<()> {
        let db = crate::test_utils::setup_test_db().await?;
        let scrim = crate::test_utils::create_test_scrim(&db, 1).await?;
        let other = crate::test_utils::create_test_scrim(&db, 1).await?;

        crate::test_utils::assign_test_slot(&db, scrim.id, 3, "Alpha").await?;
        let duplicate = crate::test_utils::assign_test_slot(&db, scrim.id, 3, "Bravo").await;
        assert!(matches!(duplicate, Err(Error::Database(_))));

        // Same number in another scrim is fine
        crate::test_utils::assign_test_slot(&db, other.id, 3, "Bravo").await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_my_pool_follows_instance_type() -> Result<()> {
        let quotient = Database::connect("sqlite::memory:").await?;
        let pro = Database::connect("sqlite::memory:").await?;
        create_tables(&quotient).await?;

        let pools = Pools::new(quotient, pro, InstanceType::Quotient);
        // Only the quotient database has tables, so this proves which one my_pool is
        let _: Vec<GuildModel> = Guild::find().limit(1).all(pools.my_pool()).await?;
        assert!(Guild::find().limit(1).all(pools.pro_pool()).await.is_err());
        pools.close().await
    }
}
