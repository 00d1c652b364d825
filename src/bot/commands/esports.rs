//! Esports commands - scrims, their slotlists and slot managers.
//!
//! All of these are management commands: guild-only and gated behind
//! `MANAGE_GUILD`. Scrim ids are looked up within the invoking guild only.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            Context,
            views::{refresh, slotlist_edit as edit_panel},
        },
        core::{scrim, slot, slot_manager},
        entities::ScrimModel,
        errors::Result,
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;
    use tracing::info;

    /// Replies that `scrim_id` doesn't exist here and returns `None`, or returns the scrim.
    async fn find_scrim(ctx: Context<'_>, scrim_id: i64) -> Result<Option<ScrimModel>> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(None);
        };
        let found = scrim::get_guild_scrim(ctx.data().db(), &guild_id.to_string(), scrim_id).await?;
        if found.is_none() {
            ctx.send(
                poise::CreateReply::default()
                    .content(format!("❌ No scrim with ID `{scrim_id}` in this server."))
                    .ephemeral(true),
            )
            .await?;
        }
        Ok(found)
    }

    /// Parent command for scrim management.
    #[poise::command(
        slash_command,
        prefix_command,
        guild_only,
        required_permissions = "MANAGE_GUILD",
        subcommands("scrim_create", "scrim_slotlist", "scrim_list")
    )]
    pub async fn scrim(ctx: Context<'_>) -> Result<()> {
        let help_text = "Scrim management command. Available subcommands:\n\
            `/scrim create` - Create a new scrim\n\
            `/scrim slotlist` - Post the slotlist of a scrim\n\
            `/scrim list` - List this server's scrims";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Creates a scrim whose slots are all open.
    #[poise::command(
        slash_command,
        prefix_command,
        rename = "create",
        guild_only,
        required_permissions = "MANAGE_GUILD"
    )]
    pub async fn scrim_create(
        ctx: Context<'_>,
        #[description = "Name of the scrim"] name: String,
        #[description = "Channel where teams register and the slotlist is posted"]
        #[channel_types("Text")]
        registration_channel: serenity::GuildChannel,
        #[description = "First slot number (defaults to 1)"]
        #[min = 0]
        #[max = 30]
        start_from: Option<i32>,
    ) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };

        let created = match scrim::create_scrim(
            ctx.data().db(),
            guild_id.to_string(),
            name,
            registration_channel.id.to_string(),
            start_from.unwrap_or(1),
        )
        .await
        {
            Ok(created) => created,
            Err(crate::errors::Error::Validation { message }) => {
                ctx.say(format!("❌ {message}")).await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        ctx.say(format!(
            "✅ Created scrim **{}** (ID: `{}`) with {} open slots in <#{}>.",
            created.name,
            created.id,
            created.available_slots.0.len(),
            created.registration_channel_id
        ))
        .await?;
        Ok(())
    }

    /// Posts the slotlist of a scrim in its registration channel.
    #[poise::command(
        slash_command,
        prefix_command,
        rename = "slotlist",
        guild_only,
        required_permissions = "MANAGE_GUILD"
    )]
    pub async fn scrim_slotlist(
        ctx: Context<'_>,
        #[description = "ID of the scrim"] scrim_id: i64,
    ) -> Result<()> {
        let Some(found) = find_scrim(ctx, scrim_id).await? else {
            return Ok(());
        };
        let data = ctx.data();

        let slots = slot::get_assigned_slots(data.db(), found.id).await?;
        let (color, footer) = refresh::guild_style(data, &found.guild_id).await;
        let embed = refresh::slotlist_embed(&found, &slots, color, &footer)?;

        let channel: serenity::ChannelId =
            crate::bot::views::snowflake(&found.registration_channel_id)?;
        let message = channel
            .send_message(ctx.http(), serenity::CreateMessage::new().embed(embed))
            .await?;
        scrim::set_slotlist_message(data.db(), found.id, message.id.to_string()).await?;
        info!(scrim_id = found.id, message_id = %message.id, "Posted slotlist");

        ctx.say(format!("✅ Slotlist posted: {}", message.link()))
            .await?;
        Ok(())
    }

    /// Lists this server's scrims.
    #[poise::command(
        slash_command,
        prefix_command,
        rename = "list",
        guild_only,
        required_permissions = "MANAGE_GUILD"
    )]
    pub async fn scrim_list(ctx: Context<'_>) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };
        let scrims = scrim::list_guild_scrims(ctx.data().db(), &guild_id.to_string()).await?;
        if scrims.is_empty() {
            ctx.say("No scrims yet. Create one with `/scrim create`.")
                .await?;
            return Ok(());
        }

        let mut text = String::from("**Scrims in this server**\n");
        for s in &scrims {
            writeln!(
                text,
                "• `{}` **{}** in <#{}> ({} open)",
                s.id,
                s.name,
                s.registration_channel_id,
                s.available_slots.0.len()
            )?;
        }
        ctx.say(text).await?;
        Ok(())
    }

    /// Parent command for slotlist tools.
    #[poise::command(
        slash_command,
        prefix_command,
        guild_only,
        required_permissions = "MANAGE_GUILD",
        subcommands("slotlist_edit")
    )]
    pub async fn slotlist(ctx: Context<'_>) -> Result<()> {
        ctx.say("Slotlist command. Available subcommands:\n`/slotlist edit` - Edit a scrim's slotlist")
            .await?;
        Ok(())
    }

    /// Opens the panel to add, remove or replace teams in a slotlist.
    #[poise::command(
        slash_command,
        prefix_command,
        rename = "edit",
        guild_only,
        required_permissions = "MANAGE_GUILD"
    )]
    pub async fn slotlist_edit(
        ctx: Context<'_>,
        #[description = "ID of the scrim"] scrim_id: i64,
    ) -> Result<()> {
        let Some(found) = find_scrim(ctx, scrim_id).await? else {
            return Ok(());
        };
        edit_panel::run(ctx, &found).await
    }

    /// Parent command for slot managers.
    #[poise::command(
        slash_command,
        prefix_command,
        guild_only,
        required_permissions = "MANAGE_GUILD",
        subcommands("slotmanager_setup")
    )]
    pub async fn slotmanager(ctx: Context<'_>) -> Result<()> {
        ctx.say("Slot manager command. Available subcommands:\n`/slotmanager setup` - Post a live overview of open slots")
            .await?;
        Ok(())
    }

    /// Posts a message that keeps track of open slots in every scrim of this server.
    #[poise::command(
        slash_command,
        prefix_command,
        rename = "setup",
        guild_only,
        required_permissions = "MANAGE_GUILD"
    )]
    pub async fn slotmanager_setup(
        ctx: Context<'_>,
        #[description = "Channel for the slot manager message"]
        #[channel_types("Text")]
        channel: serenity::GuildChannel,
    ) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };
        let data = ctx.data();
        let scrims = scrim::list_guild_scrims(data.db(), &guild_id.to_string()).await?;
        if scrims.is_empty() {
            ctx.say("❌ Create a scrim first with `/scrim create`.")
                .await?;
            return Ok(());
        }

        let manager = slot_manager::create_slot_manager(
            data.db(),
            guild_id.to_string(),
            channel.id.to_string(),
            scrims.iter().map(|s| s.id).collect(),
        )
        .await?;

        let (color, footer) = refresh::guild_style(data, &manager.guild_id).await;
        let embed = refresh::slot_manager_embed(&scrims, color, &footer)?;
        let message = channel
            .id
            .send_message(ctx.http(), serenity::CreateMessage::new().embed(embed))
            .await?;
        let manager = slot_manager::set_message(data.db(), manager, message.id.to_string()).await?;
        info!(manager_id = manager.id, %guild_id, "Slot manager set up");

        ctx.say(format!(
            "✅ Slot manager is live in <#{}>, tracking {} scrims.",
            manager.main_channel_id,
            manager.scrim_ids.0.len()
        ))
        .await?;
        Ok(())
    }
}

pub use inner::*;
