//! General Discord commands - ping and help.
//! These don't touch the database.

/// The `/ping` reply with a few liveness numbers.
#[must_use]
pub fn ping_reply(seen_messages: u64, cached_guilds: usize) -> String {
    format!("Pong! Seen {seen_messages} messages, {cached_guilds} guilds cached.")
}

/// The `/help` text. Prefix-command examples use `prefix`.
#[must_use]
pub fn help_text(prefix: &str) -> String {
    format!(
        "**Scrim Buddy Help**\n\
        Slash commands work everywhere; prefix commands use `{prefix}`.\n\n\
        **Scrims**\n\
        • `/scrim create <name> <channel> [start_from]` - Creates a scrim with open slots.\n\
        • `/scrim slotlist <scrim_id>` - Posts the slotlist in the registration channel.\n\
        • `/scrim list` - Lists this server's scrims.\n\
        • `/slotlist edit <scrim_id>` - Opens the panel to add, remove or replace teams.\n\
        • `/slotmanager setup <channel>` - Posts a live overview of open slots.\n\n\
        **Settings**\n\
        • `/setprefix <prefix>` - Changes the prefix (up to 5 characters).\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message."
    )
}

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::Context,
        errors::Result,
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: Context<'_>) -> Result<()> {
        let data = ctx.data();
        let cached = data.guild_cache.len().await;
        ctx.say(super::ping_reply(data.seen_messages(), cached))
            .await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: Context<'_>) -> Result<()> {
        let prefix = match ctx.guild_id() {
            Some(guild_id) => ctx.data().guild_cache.prefix(guild_id.get()).await,
            None => ctx.data().default_prefix.clone(),
        };
        ctx.say(super::help_text(&prefix)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
