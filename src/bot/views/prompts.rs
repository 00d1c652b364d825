//! Modal and select-menu prompts used by the interactive panels.
//!
//! Every prompt is ephemeral and answered only by the person who opened the panel.
//! A prompt that times out or is dismissed yields `None`/an empty list, and the
//! calling flow aborts quietly.
//!
//! A multi-pick slot prompt with more than one menu gets a "Done" button: picks are
//! collected across all menus until it is pressed.

use crate::errors::Result;
use poise::Modal as _;
use poise::serenity_prelude as serenity;
use serenity::{
    ButtonStyle, ComponentInteraction, ComponentInteractionDataKind, CreateActionRow, CreateButton,
    CreateInteractionResponse, CreateInteractionResponseFollowup, CreateSelectMenu,
    CreateSelectMenuKind, CreateSelectMenuOption, Message, ModalInteraction,
};
use std::{collections::BTreeMap, time::Duration};
use tracing::debug;

/// How long the team name modal stays open.
pub const MODAL_TIMEOUT: Duration = Duration::from_secs(30);
/// How long a select prompt waits for a pick.
pub const PROMPT_TIMEOUT: Duration = Duration::from_secs(60);

/// Discord caps select menus at 25 options and messages at 5 action rows.
const OPTIONS_PER_MENU: usize = 25;
const MAX_ROWS: usize = 5;
const DONE_SUFFIX: &str = "_done";

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    #[derive(Debug, poise::Modal)]
    #[name = "New Team Name"]
    pub struct NewTeamNameModal {
        #[name = "Enter new teamname:"]
        #[min_length = 3]
        #[max_length = 25]
        pub new_team_name: String,
    }
}

pub use inner::NewTeamNameModal;

/// The interaction a flow answers through. Buttons that open a modal hand over to the
/// modal submission, so follow-ups must go to whichever one was acknowledged last.
#[derive(Clone, Copy)]
pub enum Responder<'a> {
    Component(&'a ComponentInteraction),
    Modal(&'a ModalInteraction),
}

impl Responder<'_> {
    pub async fn followup(
        self,
        ctx: &serenity::Context,
        builder: CreateInteractionResponseFollowup,
    ) -> Result<Message> {
        let message = match self {
            Self::Component(i) => i.create_followup(&ctx.http, builder).await?,
            Self::Modal(i) => i.create_followup(&ctx.http, builder).await?,
        };
        Ok(message)
    }

    pub async fn delete_followup(
        self,
        ctx: &serenity::Context,
        message_id: serenity::MessageId,
    ) -> Result<()> {
        match self {
            Self::Component(i) => i.delete_followup(&ctx.http, message_id).await?,
            Self::Modal(i) => i.delete_followup(&ctx.http, message_id).await?,
        }
        Ok(())
    }

    /// Sends a short ephemeral text message.
    pub async fn say(self, ctx: &serenity::Context, text: impl Into<String>) -> Result<()> {
        self.followup(
            ctx,
            CreateInteractionResponseFollowup::new()
                .content(text)
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    pub async fn embed(self, ctx: &serenity::Context, embed: serenity::CreateEmbed) -> Result<()> {
        self.followup(
            ctx,
            CreateInteractionResponseFollowup::new()
                .embed(embed)
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }
}

/// One entry of a slot selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotChoice {
    /// Value reported back when picked
    pub value: String,
    pub label: String,
    pub description: String,
}

impl SlotChoice {
    #[must_use]
    pub fn new(value: impl ToString, num: i32, description: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            label: format!("Slot {num}"),
            description: description.into(),
        }
    }
}

/// Whether a prompt over `choice_count` choices needs a "Done" button to finish.
const fn needs_confirm(choice_count: usize, multiple: bool) -> bool {
    multiple && choice_count > OPTIONS_PER_MENU
}

/// Builds select menus for `choices`, 25 options per menu and at most 5 rows.
///
/// When several picks may be spread over more than one menu, the last row is a
/// `{custom_id}_done` button and at most 4 menus are built.
#[must_use]
pub fn slot_menu_rows(
    custom_id: &str,
    choices: &[SlotChoice],
    placeholder: &str,
    multiple: bool,
) -> Vec<CreateActionRow> {
    let confirm = needs_confirm(choices.len(), multiple);
    let menu_rows = if confirm { MAX_ROWS - 1 } else { MAX_ROWS };
    let mut rows: Vec<CreateActionRow> = choices
        .chunks(OPTIONS_PER_MENU)
        .take(menu_rows)
        .enumerate()
        .map(|(i, chunk)| {
            let options = chunk
                .iter()
                .map(|c| {
                    CreateSelectMenuOption::new(c.label.clone(), c.value.clone())
                        .description(c.description.clone())
                })
                .collect();
            let max = if multiple {
                u8::try_from(chunk.len()).unwrap_or(u8::MAX)
            } else {
                1
            };
            CreateActionRow::SelectMenu(
                CreateSelectMenu::new(
                    format!("{custom_id}_{i}"),
                    CreateSelectMenuKind::String { options },
                )
                .placeholder(placeholder)
                // A menu may be cleared again while the others are still in use
                .min_values(u8::from(!confirm))
                .max_values(max),
            )
        })
        .collect();

    if confirm {
        rows.push(CreateActionRow::Buttons(vec![
            CreateButton::new(format!("{custom_id}{DONE_SUFFIX}"))
                .label("Done")
                .style(ButtonStyle::Success),
        ]));
    }
    rows
}

/// Latest selection of each menu in a multi-menu prompt.
#[derive(Debug, Default)]
pub struct MenuPicks {
    by_menu: BTreeMap<String, Vec<String>>,
}

impl MenuPicks {
    /// Replaces what `menu_id` had selected before.
    pub fn record(&mut self, menu_id: &str, values: Vec<String>) {
        if values.is_empty() {
            self.by_menu.remove(menu_id);
        } else {
            self.by_menu.insert(menu_id.to_string(), values);
        }
    }

    /// Every picked value, in menu order.
    #[must_use]
    pub fn values(&self) -> Vec<String> {
        self.by_menu.values().flatten().cloned().collect()
    }
}

/// Opens the team name modal in response to `press`.
///
/// Returns the trimmed name together with the acknowledged modal submission, or
/// `None` if the modal was dismissed, timed out or came back empty.
pub async fn team_name(
    ctx: &serenity::Context,
    press: &ComponentInteraction,
) -> Result<Option<(String, ModalInteraction)>> {
    let custom_id = format!("{}_team_name", press.id);
    press
        .create_response(
            &ctx.http,
            NewTeamNameModal::create(None, custom_id.clone()),
        )
        .await?;

    let filter_id = custom_id.clone();
    let Some(submit) = serenity::ModalInteractionCollector::new(ctx)
        .author_id(press.user.id)
        .filter(move |m| m.data.custom_id == filter_id)
        .timeout(MODAL_TIMEOUT)
        .await
    else {
        debug!(%custom_id, "Team name modal timed out");
        return Ok(None);
    };

    submit
        .create_response(&ctx.http, CreateInteractionResponse::Acknowledge)
        .await?;

    let name = NewTeamNameModal::parse(submit.data.clone())
        .map(|m| m.new_team_name.trim().to_string())
        .unwrap_or_default();
    if name.is_empty() {
        return Ok(None);
    }
    Ok(Some((name, submit)))
}

async fn send_prompt(
    ctx: &serenity::Context,
    responder: Responder<'_>,
    prompt: &str,
    rows: Vec<CreateActionRow>,
) -> Result<Message> {
    responder
        .followup(
            ctx,
            CreateInteractionResponseFollowup::new()
                .content(prompt)
                .components(rows)
                .ephemeral(true),
        )
        .await
}

async fn close_prompt(ctx: &serenity::Context, responder: Responder<'_>, message: &Message) {
    // The prompt has served its purpose either way
    if let Err(e) = responder.delete_followup(ctx, message.id).await {
        debug!("Could not delete prompt message: {e}");
    }
}

/// Sends `rows` with `prompt` and waits for the first pick from `user`.
async fn await_pick(
    ctx: &serenity::Context,
    responder: Responder<'_>,
    user: serenity::UserId,
    prompt: &str,
    rows: Vec<CreateActionRow>,
) -> Result<Option<ComponentInteraction>> {
    let message = send_prompt(ctx, responder, prompt, rows).await?;

    let pick = message
        .await_component_interaction(ctx)
        .author_id(user)
        .timeout(PROMPT_TIMEOUT)
        .await;

    if let Some(pick) = &pick {
        pick.create_response(&ctx.http, CreateInteractionResponse::Acknowledge)
            .await?;
    }
    close_prompt(ctx, responder, &message).await;
    Ok(pick)
}

/// Sends `rows` and gathers picks from every menu until `user` presses "Done".
///
/// Each click restarts the timeout. Returns nothing if the prompt times out first.
async fn collect_picks(
    ctx: &serenity::Context,
    responder: Responder<'_>,
    user: serenity::UserId,
    prompt: &str,
    rows: Vec<CreateActionRow>,
    custom_id: &str,
) -> Result<Vec<String>> {
    let message = send_prompt(ctx, responder, prompt, rows).await?;
    let done_id = format!("{custom_id}{DONE_SUFFIX}");

    let mut picks = MenuPicks::default();
    let confirmed = loop {
        let Some(press) = message
            .await_component_interaction(ctx)
            .author_id(user)
            .timeout(PROMPT_TIMEOUT)
            .await
        else {
            break false;
        };
        press
            .create_response(&ctx.http, CreateInteractionResponse::Acknowledge)
            .await?;
        if press.data.custom_id == done_id {
            break true;
        }
        if let ComponentInteractionDataKind::StringSelect { values } = &press.data.kind {
            picks.record(&press.data.custom_id, values.clone());
        }
    };
    close_prompt(ctx, responder, &message).await;

    if !confirmed {
        debug!(%custom_id, "Slot prompt timed out before Done");
        return Ok(Vec::new());
    }
    Ok(picks.values())
}

/// Asks `user` to pick one (or, with `multiple`, several) of `choices`.
///
/// Returns the picked values; empty on timeout.
pub async fn select_slots(
    ctx: &serenity::Context,
    responder: Responder<'_>,
    user: serenity::UserId,
    choices: &[SlotChoice],
    prompt: &str,
    placeholder: &str,
    multiple: bool,
) -> Result<Vec<String>> {
    let custom_id = format!("slot_select_{}", user.get());
    let rows = slot_menu_rows(&custom_id, choices, placeholder, multiple);
    if needs_confirm(choices.len(), multiple) {
        let prompt = format!("{prompt}\nPress **Done** when finished.");
        return collect_picks(ctx, responder, user, &prompt, rows, &custom_id).await;
    }

    let Some(pick) = await_pick(ctx, responder, user, prompt, rows).await? else {
        return Ok(Vec::new());
    };
    Ok(match &pick.data.kind {
        ComponentInteractionDataKind::StringSelect { values } => values.clone(),
        _ => Vec::new(),
    })
}

/// Asks `user` to pick one or more guild members. Order is preserved: the first
/// selected user comes first.
pub async fn select_users(
    ctx: &serenity::Context,
    responder: Responder<'_>,
    user: serenity::UserId,
    prompt: &str,
    placeholder: &str,
    multiple: bool,
) -> Result<Vec<serenity::UserId>> {
    let menu = CreateSelectMenu::new(
        format!("user_select_{}", user.get()),
        CreateSelectMenuKind::User {
            default_users: None,
        },
    )
    .placeholder(placeholder)
    .min_values(1)
    .max_values(if multiple { 25 } else { 1 });

    let rows = vec![CreateActionRow::SelectMenu(menu)];
    let Some(pick) = await_pick(ctx, responder, user, prompt, rows).await? else {
        return Ok(Vec::new());
    };
    Ok(match &pick.data.kind {
        ComponentInteractionDataKind::UserSelect { values } => values.clone(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn choices(n: i32) -> Vec<SlotChoice> {
        (1..=n).map(|i| SlotChoice::new(i, i, "Click to add")).collect()
    }

    #[test]
    fn test_slot_choice_label() {
        let choice = SlotChoice::new(42_i64, 7, "Alpha");
        assert_eq!(choice.value, "42");
        assert_eq!(choice.label, "Slot 7");
        assert_eq!(choice.description, "Alpha");
    }

    #[test]
    fn test_menus_are_chunked() {
        assert_eq!(slot_menu_rows("x", &choices(3), "pick", false).len(), 1);
        assert_eq!(slot_menu_rows("x", &choices(25), "pick", false).len(), 1);
        assert_eq!(slot_menu_rows("x", &choices(25), "pick", true).len(), 1);
        assert_eq!(slot_menu_rows("x", &choices(200), "pick", false).len(), 5);
        assert!(slot_menu_rows("x", &[], "pick", true).is_empty());
    }

    #[test]
    fn test_multi_menu_prompt_ends_with_done_button() {
        let rows = slot_menu_rows("x", &choices(30), "pick", true);
        assert_eq!(rows.len(), 3);
        let last = serde_json::to_value(&rows[2]).unwrap();
        assert_eq!(last["components"][0]["custom_id"], "x_done");
        assert_eq!(last["components"][0]["label"], "Done");

        // 4 menus plus the button stays within Discord's 5 rows
        let rows = slot_menu_rows("x", &choices(200), "pick", true);
        assert_eq!(rows.len(), 5);
        let menu = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(menu["components"][0]["min_values"], 0);
    }

    #[test]
    fn test_picks_merge_across_menus() {
        let mut picks = MenuPicks::default();
        picks.record("x_1", vec!["27".into()]);
        picks.record("x_0", vec!["3".into(), "4".into()]);
        assert_eq!(picks.values(), vec!["3", "4", "27"]);

        // A later selection in the same menu replaces the earlier one
        picks.record("x_0", vec!["5".into()]);
        assert_eq!(picks.values(), vec!["5", "27"]);

        picks.record("x_1", Vec::new());
        assert_eq!(picks.values(), vec!["5"]);
    }

    #[test]
    fn test_menu_option_counts() {
        let rows = slot_menu_rows("x", &choices(30), "pick", true);
        let first = serde_json::to_value(&rows[0]).unwrap();
        let second = serde_json::to_value(&rows[1]).unwrap();
        let menu = &first["components"][0];
        assert_eq!(menu["options"].as_array().unwrap().len(), 25);
        assert_eq!(menu["max_values"], 25);
        assert_eq!(second["components"][0]["options"].as_array().unwrap().len(), 5);
        assert_eq!(second["components"][0]["custom_id"], "x_1");
    }

    #[test]
    fn test_single_pick_menus_cap_at_one() {
        let rows = slot_menu_rows("x", &choices(30), "pick", false);
        let value = serde_json::to_value(&rows[1]).unwrap();
        assert_eq!(value["components"][0]["max_values"], 1);
    }
}
