//! Text rendering for the public slotlist and slot manager messages.
//!
//! Pure functions only, so the exact layout can be tested without Discord.

use crate::entities::{assigned_slot, scrim};
use std::fmt::Write;

/// Body of the slotlist embed: one line per assigned slot inside a code block.
pub fn slotlist_body(slots: &[assigned_slot::Model]) -> Result<String, std::fmt::Error> {
    if slots.is_empty() {
        return Ok("```\nNo teams registered yet.\n```".to_string());
    }

    let mut body = String::from("```\n");
    for slot in slots {
        writeln!(&mut body, "Slot {:02}  ->  {}", slot.num, slot.team_name)?;
    }
    body.push_str("```");
    Ok(body)
}

/// Title of the slotlist embed.
#[must_use]
pub fn slotlist_title(scrim: &scrim::Model) -> String {
    format!("{} Slotlist", scrim.name)
}

/// Body of the slot manager's public message.
pub fn slot_manager_body(scrims: &[scrim::Model]) -> Result<String, std::fmt::Error> {
    if scrims.is_empty() {
        return Ok("No scrims are being tracked.".to_string());
    }

    let mut body = String::new();
    for scrim in scrims {
        let open = &scrim.available_slots.0;
        if open.is_empty() {
            writeln!(&mut body, "**{}** (ID: {}): full", scrim.name, scrim.id)?;
        } else {
            let nums: Vec<String> = open.iter().map(i32::to_string).collect();
            writeln!(
                &mut body,
                "**{}** (ID: {}): {} open, slots {}",
                scrim.name,
                scrim.id,
                open.len(),
                nums.join(", ")
            )?;
        }
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{MemberIds, SlotNumbers};

    fn slot(num: i32, team: &str) -> assigned_slot::Model {
        assigned_slot::Model {
            id: i64::from(num),
            scrim_id: 1,
            num,
            team_name: team.to_string(),
            leader_id: "1".to_string(),
            members: MemberIds(vec!["1".to_string()]),
            assigned_at: chrono::Utc::now(),
        }
    }

    fn scrim(id: i64, name: &str, open: Vec<i32>) -> scrim::Model {
        scrim::Model {
            id,
            guild_id: "1".to_string(),
            name: name.to_string(),
            registration_channel_id: "2".to_string(),
            slotlist_message_id: None,
            available_slots: SlotNumbers(open),
            start_from: 1,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_slotlist_body() {
        let body = slotlist_body(&[slot(2, "Alpha"), slot(11, "Bravo")]).unwrap();
        assert_eq!(body, "```\nSlot 02  ->  Alpha\nSlot 11  ->  Bravo\n```");
        assert!(slotlist_body(&[]).unwrap().contains("No teams"));
    }

    #[test]
    fn test_slot_manager_body() {
        let body = slot_manager_body(&[scrim(1, "Day", vec![3, 4]), scrim(2, "Night", vec![])])
            .unwrap();
        assert!(body.contains("**Day** (ID: 1): 2 open, slots 3, 4"));
        assert!(body.contains("**Night** (ID: 2): full"));
        assert_eq!(slotlist_title(&scrim(1, "Day", vec![])), "Day Slotlist");
    }
}
