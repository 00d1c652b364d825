//! Slot business logic - adding, removing and renaming the teams that occupy a scrim's slots.
//!
//! Every mutation re-reads the scrim inside one database transaction and writes the
//! slot rows and `available_slots` together. The scrim row is locked for the rest of
//! the transaction (`SELECT ... FOR UPDATE`; `SQLite` gets the same effect from its
//! single writer), so edits to one scrim run one after another. A unique index on
//! `(scrim_id, num)` backs this up. After each commit, `available_slots` is disjoint
//! from the numbers of the scrim's assigned slots.

use crate::{
    entities::{AssignedSlot, MemberIds, Scrim, SlotNumbers, assigned_slot, scrim},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait, prelude::*};
use std::collections::BTreeSet;
use tracing::{info, instrument};

/// Slot numbers are handed out below this bound.
pub const MAX_SLOT: i32 = 30;

/// Numbers from `start_from` up to [`MAX_SLOT`] that no assigned slot occupies.
#[must_use]
pub fn addable_slot_numbers(start_from: i32, assigned: &[assigned_slot::Model]) -> Vec<i32> {
    let taken: BTreeSet<i32> = assigned.iter().map(|s| s.num).collect();
    (start_from..MAX_SLOT).filter(|n| !taken.contains(n)).collect()
}

/// Whether `available_slots` and the assigned slot numbers are disjoint.
#[must_use]
pub fn is_consistent(scrim: &scrim::Model, assigned: &[assigned_slot::Model]) -> bool {
    assigned.iter().all(|s| !scrim.available_slots.contains(s.num))
}

/// Moves `leader` to the front of `members`, adding them if they weren't a member yet.
#[must_use]
pub fn promote_leader(members: &[String], leader: &str) -> Vec<String> {
    std::iter::once(leader.to_string())
        .chain(members.iter().filter(|m| *m != leader).cloned())
        .collect()
}

/// All slots of a scrim, ordered by slot number.
pub async fn get_assigned_slots<C: ConnectionTrait>(
    db: &C,
    scrim_id: i64,
) -> Result<Vec<assigned_slot::Model>> {
    AssignedSlot::find()
        .filter(assigned_slot::Column::ScrimId.eq(scrim_id))
        .order_by_asc(assigned_slot::Column::Num)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn find_scrim<C: ConnectionTrait>(db: &C, scrim_id: i64) -> Result<scrim::Model> {
    Scrim::find_by_id(scrim_id)
        .one(db)
        .await?
        .ok_or(Error::ScrimNotFound { id: scrim_id })
}

/// Reads the scrim and holds a row lock on it until the surrounding transaction ends.
async fn lock_scrim<C: ConnectionTrait>(txn: &C, scrim_id: i64) -> Result<scrim::Model> {
    Scrim::find_by_id(scrim_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(Error::ScrimNotFound { id: scrim_id })
}

/// Slot numbers a new team could be placed at right now.
pub async fn addable_numbers_for<C: ConnectionTrait>(db: &C, scrim_id: i64) -> Result<Vec<i32>> {
    let scrim = find_scrim(db, scrim_id).await?;
    let assigned = get_assigned_slots(db, scrim_id).await?;
    Ok(addable_slot_numbers(scrim.start_from, &assigned))
}

/// Places a new team at slot `num`. The first member is the leader.
///
/// Fails with [`Error::NoSlotsAvailable`] when the scrim is full and with
/// [`Error::SlotTaken`] when `num` was filled since it was offered; neither writes anything.
#[instrument(skip(db, members))]
pub async fn add_team(
    db: &DatabaseConnection,
    scrim_id: i64,
    num: i32,
    team_name: &str,
    members: Vec<String>,
) -> Result<assigned_slot::Model> {
    let Some(leader_id) = members.first().cloned() else {
        return Err(Error::Validation {
            message: "A team needs at least one member".to_string(),
        });
    };
    if team_name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Team name cannot be empty".to_string(),
        });
    }

    let txn = db.begin().await?;

    let scrim = lock_scrim(&txn, scrim_id).await?;
    let assigned = get_assigned_slots(&txn, scrim_id).await?;
    let addable = addable_slot_numbers(scrim.start_from, &assigned);

    if addable.is_empty() {
        return Err(Error::NoSlotsAvailable);
    }
    if !addable.contains(&num) {
        return Err(if assigned.iter().any(|s| s.num == num) {
            Error::SlotTaken { num }
        } else {
            Error::Validation {
                message: format!("Slot {num} is outside this scrim's range"),
            }
        });
    }

    let slot = assigned_slot::ActiveModel {
        scrim_id: Set(scrim_id),
        num: Set(num),
        team_name: Set(team_name.trim().to_string()),
        leader_id: Set(leader_id),
        members: Set(MemberIds(members)),
        assigned_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::SlotTaken { num },
        _ => Error::from(e),
    })?;

    let remaining = SlotNumbers::from_unsorted(
        scrim.available_slots.0.iter().copied().filter(|n| *n != num),
    );
    let mut active: scrim::ActiveModel = scrim.into();
    active.available_slots = Set(remaining);
    active.update(&txn).await?;

    txn.commit().await?;

    info!(scrim_id, num, team = %slot.team_name, "Added team to slotlist");
    Ok(slot)
}

/// Removes the given slots and hands their numbers back to `available_slots`.
///
/// Ids that don't belong to the scrim are ignored. Returns the freed slot numbers,
/// sorted; an empty result means nothing was written.
#[instrument(skip(db))]
pub async fn remove_teams(
    db: &DatabaseConnection,
    scrim_id: i64,
    slot_ids: &[i64],
) -> Result<Vec<i32>> {
    if slot_ids.is_empty() {
        return Ok(Vec::new());
    }

    let txn = db.begin().await?;

    let scrim = lock_scrim(&txn, scrim_id).await?;
    let doomed = AssignedSlot::find()
        .filter(assigned_slot::Column::ScrimId.eq(scrim_id))
        .filter(assigned_slot::Column::Id.is_in(slot_ids.iter().copied()))
        .all(&txn)
        .await?;

    if doomed.is_empty() {
        return Ok(Vec::new());
    }

    let mut freed: Vec<i32> = doomed.iter().map(|s| s.num).collect();
    freed.sort_unstable();

    let available = SlotNumbers::from_unsorted(
        scrim
            .available_slots
            .0
            .iter()
            .copied()
            .chain(freed.iter().copied()),
    );
    let mut active: scrim::ActiveModel = scrim.into();
    active.available_slots = Set(available);
    active.update(&txn).await?;

    AssignedSlot::delete_many()
        .filter(assigned_slot::Column::Id.is_in(doomed.iter().map(|s| s.id)))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    info!(scrim_id, ?freed, "Removed teams from slotlist");
    Ok(freed)
}

/// Renames the team at `slot_id` and makes `leader_id` its leader.
///
/// Existing members are kept; the new leader is moved to (or inserted at) the front.
/// Returns `None` without writing when the slot doesn't exist in this scrim.
#[instrument(skip(db))]
pub async fn change_team(
    db: &DatabaseConnection,
    scrim_id: i64,
    slot_id: i64,
    team_name: &str,
    leader_id: &str,
) -> Result<Option<assigned_slot::Model>> {
    if team_name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Team name cannot be empty".to_string(),
        });
    }

    let txn = db.begin().await?;
    lock_scrim(&txn, scrim_id).await?;

    let Some(slot) = AssignedSlot::find_by_id(slot_id)
        .filter(assigned_slot::Column::ScrimId.eq(scrim_id))
        .one(&txn)
        .await?
    else {
        return Ok(None);
    };

    let members = promote_leader(&slot.members.0, leader_id);
    let mut active: assigned_slot::ActiveModel = slot.into();
    active.team_name = Set(team_name.trim().to_string());
    active.leader_id = Set(leader_id.to_string());
    active.members = Set(MemberIds(members));
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    info!(scrim_id, num = updated.num, team = %updated.team_name, "Changed team in slotlist");
    Ok(Some(updated))
}
