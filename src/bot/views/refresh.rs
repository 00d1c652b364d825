//! Keeps the public slotlist and slot manager messages in sync with the database.
//!
//! Both refreshes are best effort: a message that no longer exists is logged and
//! skipped, since the underlying data is already committed.

use super::{ignore_unknown_message, snowflake};
use crate::{
    bot::BotData,
    core::{render, scrim, slot, slot_manager},
    entities::{AssignedSlotModel, ScrimModel},
    errors::Result,
};
use poise::serenity_prelude as serenity;
use serenity::{ChannelId, CreateEmbed, CreateEmbedFooter, EditMessage, MessageId};
use tracing::{debug, warn};

/// Embed color and footer for a guild, falling back to the bot defaults.
pub async fn guild_style(data: &BotData, guild_id: &str) -> (u32, String) {
    let cached = match guild_id.parse::<u64>() {
        Ok(id) => data.guild_cache.get(id).await,
        Err(_) => None,
    };
    cached.map_or_else(
        || (data.embed.color, data.embed.footer.clone()),
        |s| (s.color, s.footer),
    )
}

pub fn slotlist_embed(
    scrim: &ScrimModel,
    slots: &[AssignedSlotModel],
    color: u32,
    footer: &str,
) -> Result<CreateEmbed> {
    Ok(CreateEmbed::new()
        .title(render::slotlist_title(scrim))
        .description(render::slotlist_body(slots)?)
        .color(color)
        .footer(CreateEmbedFooter::new(footer)))
}

pub fn slot_manager_embed(scrims: &[ScrimModel], color: u32, footer: &str) -> Result<CreateEmbed> {
    Ok(CreateEmbed::new()
        .title("Scrims Slot Manager")
        .description(render::slot_manager_body(scrims)?)
        .color(color)
        .footer(CreateEmbedFooter::new(footer)))
}

async fn edit_or_skip(
    ctx: &serenity::Context,
    channel: ChannelId,
    message: MessageId,
    embed: CreateEmbed,
) -> Result<()> {
    let edited = channel
        .edit_message(&ctx.http, message, EditMessage::new().embed(embed))
        .await;
    if ignore_unknown_message(edited)?.is_none() {
        warn!(%channel, %message, "Message to refresh no longer exists");
    }
    Ok(())
}

/// Re-renders the scrim's slotlist message, if it has one.
pub async fn slotlist_message(ctx: &serenity::Context, data: &BotData, scrim_id: i64) -> Result<()> {
    let Some(scrim) = scrim::get_scrim(data.db(), scrim_id).await? else {
        return Ok(());
    };
    let Some(message_id) = scrim.slotlist_message_id.as_deref() else {
        debug!(scrim_id, "Scrim has no slotlist message yet");
        return Ok(());
    };

    let slots = slot::get_assigned_slots(data.db(), scrim_id).await?;
    let (color, footer) = guild_style(data, &scrim.guild_id).await;
    let embed = slotlist_embed(&scrim, &slots, color, &footer)?;

    edit_or_skip(
        ctx,
        snowflake(&scrim.registration_channel_id)?,
        snowflake(message_id)?,
        embed,
    )
    .await
}

/// Re-renders the public message of the slot manager tracking `scrim_id`, if any.
pub async fn slot_manager_message(
    ctx: &serenity::Context,
    data: &BotData,
    scrim_id: i64,
) -> Result<()> {
    let Some(scrim) = scrim::get_scrim(data.db(), scrim_id).await? else {
        return Ok(());
    };
    let Some(manager) = slot_manager::find_for_scrim(data.db(), &scrim).await? else {
        return Ok(());
    };
    let Some(message_id) = manager.message_id.as_deref() else {
        return Ok(());
    };

    let scrims = slot_manager::tracked_scrims(data.db(), &manager).await?;
    let (color, footer) = guild_style(data, &manager.guild_id).await;
    let embed = slot_manager_embed(&scrims, color, &footer)?;

    edit_or_skip(
        ctx,
        snowflake(&manager.main_channel_id)?,
        snowflake(message_id)?,
        embed,
    )
    .await
}
