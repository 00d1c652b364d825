//! The slotlist edit panel.
//!
//! Three buttons let a moderator add, remove or rename the teams in a scrim's
//! slotlist. Each button runs a short flow of modal and select prompts, commits the
//! change through [`crate::core::slot`], and then refreshes the public slotlist
//! message. Once nobody clicks anything for [`PANEL_TIMEOUT`], the panel disables and
//! greys out its buttons.

use super::{
    ignore_unknown_message,
    prompts::{self, Responder, SlotChoice},
    refresh, success_embed,
};
use crate::{
    bot::{BotData, Context},
    core::slot,
    entities::ScrimModel,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use serenity::{
    ButtonStyle, ComponentInteraction, CreateActionRow, CreateButton, CreateEmbed,
    CreateInteractionResponse, CreateInteractionResponseMessage,
};
use std::time::Duration;
use tracing::{debug, error, info};

/// Idle time after which the panel stops accepting clicks.
pub const PANEL_TIMEOUT: Duration = Duration::from_secs(50);

pub const CHANGE_TEAM_ID: &str = "smslot_change_team";
pub const REMOVE_TEAM_ID: &str = "smslot_remove_team";
pub const ADD_TEAM_ID: &str = "smslot_add_team";

const NO_SLOT_TO_REPLACE: &str = "No slot available to replace.";

/// Button state of one open panel.
#[derive(Debug)]
pub struct SlotlistEditPanel {
    scrim_id: i64,
    disabled: bool,
}

impl SlotlistEditPanel {
    #[must_use]
    pub const fn new(scrim_id: i64) -> Self {
        Self {
            scrim_id,
            disabled: false,
        }
    }

    #[must_use]
    pub const fn scrim_id(&self) -> i64 {
        self.scrim_id
    }

    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    #[must_use]
    pub fn initial_embed() -> CreateEmbed {
        CreateEmbed::new()
            .color(0x0000_FFB3)
            .description("Choose an option below to edit the slotlist.")
    }

    /// The panel's button row in its current state.
    #[must_use]
    pub fn components(&self) -> Vec<CreateActionRow> {
        let button = |id: &str, label: &str, style: ButtonStyle| {
            let button = CreateButton::new(id).label(label);
            if self.disabled {
                button.style(ButtonStyle::Secondary).disabled(true)
            } else {
                button.style(style)
            }
        };
        vec![CreateActionRow::Buttons(vec![
            button(CHANGE_TEAM_ID, "Replace / Change Team", ButtonStyle::Success),
            button(REMOVE_TEAM_ID, "Remove Team", ButtonStyle::Danger),
            button(ADD_TEAM_ID, "Add Team", ButtonStyle::Success),
        ])]
    }

    /// Disables the panel. Returns the greyed-out components the first time only.
    pub fn disable(&mut self) -> Option<Vec<CreateActionRow>> {
        if self.disabled {
            return None;
        }
        self.disabled = true;
        Some(self.components())
    }
}

/// Sends the panel for `scrim` and serves clicks until it goes idle.
pub async fn run(ctx: Context<'_>, scrim: &ScrimModel) -> Result<()> {
    let mut panel = SlotlistEditPanel::new(scrim.id);
    let reply = ctx
        .send(
            poise::CreateReply::default()
                .embed(SlotlistEditPanel::initial_embed())
                .components(panel.components()),
        )
        .await?;
    let message = reply.message().await?.into_owned();

    let serenity_ctx = ctx.serenity_context();
    let data = ctx.data();
    let author = ctx.author().id;
    while let Some(press) = message
        .await_component_interaction(serenity_ctx)
        .author_id(author)
        .timeout(PANEL_TIMEOUT)
        .await
    {
        let flow = run_flow(serenity_ctx, &press, data, panel.scrim_id());
        tokio::pin!(flow);

        // Clicks that arrive mid-flow still need an answer, or Discord shows them as failed
        let outcome = loop {
            tokio::select! {
                outcome = &mut flow => break outcome,
                Some(extra) = message.await_component_interaction(serenity_ctx).author_id(author) => {
                    let busy = CreateInteractionResponse::Message(busy_message());
                    if let Err(e) = extra.create_response(&serenity_ctx.http, busy).await {
                        debug!("Could not answer a click during an edit: {e}");
                    }
                }
            }
        };
        // One failed flow shouldn't take the whole panel down
        if let Err(e) = outcome {
            error!(scrim_id = scrim.id, "Slotlist edit failed: {e}");
        }
    }

    if let Some(components) = panel.disable() {
        let edit = reply
            .edit(
                ctx,
                poise::CreateReply::default()
                    .embed(SlotlistEditPanel::initial_embed())
                    .components(components),
            )
            .await;
        if ignore_unknown_message(edit)?.is_none() {
            debug!("Panel message was already deleted");
        }
    }
    Ok(())
}

/// Ephemeral answer to a panel click while another edit is still being prompted.
fn busy_message() -> CreateInteractionResponseMessage {
    CreateInteractionResponseMessage::new()
        .content("Finish the current edit first.")
        .ephemeral(true)
}

async fn run_flow(
    ctx: &serenity::Context,
    press: &ComponentInteraction,
    data: &BotData,
    scrim_id: i64,
) -> Result<()> {
    match press.data.custom_id.as_str() {
        CHANGE_TEAM_ID => change_team(ctx, press, data, scrim_id).await,
        REMOVE_TEAM_ID => remove_team(ctx, press, data, scrim_id).await,
        ADD_TEAM_ID => add_team(ctx, press, data, scrim_id).await,
        other => {
            debug!(custom_id = other, "Ignoring unknown panel component");
            Ok(())
        }
    }
}

fn assigned_choices(slots: &[crate::entities::AssignedSlotModel]) -> Vec<SlotChoice> {
    slots
        .iter()
        .map(|s| SlotChoice::new(s.id, s.num, s.team_name.clone()))
        .collect()
}

async fn change_team(
    ctx: &serenity::Context,
    press: &ComponentInteraction,
    data: &BotData,
    scrim_id: i64,
) -> Result<()> {
    let Some((team_name, submit)) = prompts::team_name(ctx, press).await? else {
        return Ok(());
    };
    let responder = Responder::Modal(&submit);

    let slots = slot::get_assigned_slots(data.db(), scrim_id).await?;
    if slots.is_empty() {
        return responder.say(ctx, NO_SLOT_TO_REPLACE).await;
    }

    let picked = prompts::select_slots(
        ctx,
        responder,
        press.user.id,
        &assigned_choices(&slots),
        "Select the slot to change team name...",
        "Click me to pick a slot",
        false,
    )
    .await?;
    let Some(slot_id) = picked.first().and_then(|v| v.parse::<i64>().ok()) else {
        return Ok(());
    };

    let leaders = prompts::select_users(
        ctx,
        responder,
        press.user.id,
        &format!("Please select the new team leader for `Team {team_name}`:"),
        "Select a user...",
        false,
    )
    .await?;
    let Some(leader) = leaders.first() else {
        return Ok(());
    };

    if slot::change_team(data.db(), scrim_id, slot_id, &team_name, &leader.to_string())
        .await?
        .is_none()
    {
        // Removed by someone else while we were prompting
        return responder.say(ctx, NO_SLOT_TO_REPLACE).await;
    }

    responder
        .embed(ctx, success_embed("Slotlist updated successfully."))
        .await?;
    refresh::slotlist_message(ctx, data, scrim_id).await
}

async fn remove_team(
    ctx: &serenity::Context,
    press: &ComponentInteraction,
    data: &BotData,
    scrim_id: i64,
) -> Result<()> {
    press
        .create_response(&ctx.http, CreateInteractionResponse::Acknowledge)
        .await?;
    let responder = Responder::Component(press);

    let slots = slot::get_assigned_slots(data.db(), scrim_id).await?;
    if slots.is_empty() {
        return responder.say(ctx, NO_SLOT_TO_REPLACE).await;
    }

    let picked = prompts::select_slots(
        ctx,
        responder,
        press.user.id,
        &assigned_choices(&slots),
        "Select the slots you want to remove.",
        "Click me to pick slots...",
        true,
    )
    .await?;
    let slot_ids: Vec<i64> = picked.iter().filter_map(|v| v.parse().ok()).collect();
    if slot_ids.is_empty() {
        return Ok(());
    }

    let freed = slot::remove_teams(data.db(), scrim_id, &slot_ids).await?;
    if freed.is_empty() {
        return Ok(());
    }

    refresh::slotlist_message(ctx, data, scrim_id).await?;
    responder
        .embed(
            ctx,
            success_embed("Successfully removed selected teams from slotlist."),
        )
        .await?;
    refresh::slot_manager_message(ctx, data, scrim_id).await
}

async fn add_team(
    ctx: &serenity::Context,
    press: &ComponentInteraction,
    data: &BotData,
    scrim_id: i64,
) -> Result<()> {
    let Some((team_name, submit)) = prompts::team_name(ctx, press).await? else {
        return Ok(());
    };
    let responder = Responder::Modal(&submit);

    let addable = slot::addable_numbers_for(data.db(), scrim_id).await?;
    if addable.is_empty() {
        return responder.say(ctx, Error::NoSlotsAvailable.to_string()).await;
    }

    let choices: Vec<SlotChoice> = addable
        .iter()
        .map(|n| SlotChoice::new(n, *n, "Click to add"))
        .collect();
    let picked = prompts::select_slots(
        ctx,
        responder,
        press.user.id,
        &choices,
        "Select a slot to add the team...",
        "Click me to pick a slot",
        false,
    )
    .await?;
    let Some(num) = picked.first().and_then(|v| v.parse::<i32>().ok()) else {
        return Ok(());
    };

    let members = prompts::select_users(
        ctx,
        responder,
        press.user.id,
        &format!(
            "Please select the team members for `Team {team_name}`: (First user is treated as Leader)"
        ),
        "Select users...",
        true,
    )
    .await?;
    if members.is_empty() {
        return Ok(());
    }

    let member_ids = members.iter().map(ToString::to_string).collect();
    let slot = match slot::add_team(data.db(), scrim_id, num, &team_name, member_ids).await {
        Ok(slot) => slot,
        Err(e) if e.is_user_facing() => return responder.say(ctx, e.to_string()).await,
        Err(e) => return Err(e),
    };
    info!(scrim_id, num = slot.num, "Team added through the edit panel");

    refresh::slotlist_message(ctx, data, scrim_id).await?;
    responder
        .embed(
            ctx,
            success_embed(&format!(
                "`Team {}` has been added at `Slot {}`",
                slot.team_name, slot.num
            )),
        )
        .await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn buttons(components: &[CreateActionRow]) -> Vec<serde_json::Value> {
        let row = serde_json::to_value(&components[0]).unwrap();
        row["components"].as_array().unwrap().clone()
    }

    #[test]
    fn test_fresh_panel_buttons() {
        let panel = SlotlistEditPanel::new(3);
        let buttons = buttons(&panel.components());
        let ids: Vec<&str> = buttons
            .iter()
            .map(|b| b["custom_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec![CHANGE_TEAM_ID, REMOVE_TEAM_ID, ADD_TEAM_ID]);
        assert!(buttons.iter().all(|b| b["disabled"] != true));
        // Danger style for removal
        assert_eq!(buttons[1]["style"], 4);
    }

    #[test]
    fn test_timeout_disables_exactly_once() {
        let mut panel = SlotlistEditPanel::new(3);
        assert!(!panel.is_disabled());

        let components = panel.disable().unwrap();
        for button in buttons(&components) {
            assert_eq!(button["disabled"], true);
            // Secondary is the grey style
            assert_eq!(button["style"], 2);
        }
        assert!(panel.is_disabled());
        assert!(panel.disable().is_none());
    }

    #[test]
    fn test_busy_message_is_ephemeral() {
        let value = serde_json::to_value(busy_message()).unwrap();
        assert_eq!(value["content"], "Finish the current edit first.");
        assert_eq!(value["flags"], 64);
    }

    #[test]
    fn test_assigned_choices_use_slot_ids() {
        let slot = crate::entities::AssignedSlotModel {
            id: 91,
            scrim_id: 1,
            num: 4,
            team_name: "Alpha".into(),
            leader_id: "1".into(),
            members: crate::entities::MemberIds(vec!["1".into()]),
            assigned_at: chrono::Utc::now(),
        };
        let choices = assigned_choices(&[slot]);
        assert_eq!(choices[0].value, "91");
        assert_eq!(choices[0].label, "Slot 4");
        assert_eq!(choices[0].description, "Alpha");
    }
}
