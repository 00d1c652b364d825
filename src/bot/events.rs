//! Gateway event handlers.
//!
//! Serenity events arrive through poise's `event_handler` hook and are dispatched with
//! an explicit match. Events the bot derives itself (currently only "the bot was
//! mentioned") go through [`BotEvent`] and [`dispatch`].

use super::{BotData, extensions::Extension};
use crate::{
    cache::GuildSettings,
    core::guild,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use rand::seq::IndexedRandom;
use tracing::{debug, info, warn};

const GREETINGS: &[&str] = &[
    "Hey!",
    "Hello there!",
    "Hi!",
    "Yo!",
    "Howdy!",
    "Greetings!",
    "Sup!",
];

/// Events synthesised by the bot from raw gateway events.
#[derive(Debug)]
pub enum BotEvent<'a> {
    /// A message consisting of nothing but a mention of the bot
    Mention { message: &'a serenity::Message },
}

/// Entry point registered as poise's `event_handler`.
pub async fn handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    framework: poise::FrameworkContext<'_, BotData, Error>,
    data: &BotData,
) -> Result<()> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!(
                "Ready: {} (ID: {})",
                data_about_bot.user.name, data_about_bot.user.id
            );
        }
        serenity::FullEvent::Resume { .. } => {
            info!("Shard ID {} has resumed...", ctx.shard_id);
        }
        serenity::FullEvent::GuildCreate { guild, is_new } => {
            if *is_new == Some(true) && data.has_extension(Extension::Events) {
                on_guild_join(ctx, guild, data).await;
            } else {
                warm_cache(guild.id, data).await;
            }
        }
        serenity::FullEvent::Message { new_message } => {
            data.record_message();
            if data.has_extension(Extension::Events) {
                on_message(ctx, new_message, framework.bot_id, data).await?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Routes a derived event to its handler.
pub async fn dispatch(ctx: &serenity::Context, event: BotEvent<'_>, data: &BotData) -> Result<()> {
    match event {
        BotEvent::Mention { message } => on_mention(ctx, message, data).await,
    }
}

/// Seeds the guild's configuration and cache entry, then asks the gateway for its members.
///
/// Best effort: a database failure is logged and the join proceeds.
async fn on_guild_join(ctx: &serenity::Context, guild: &serenity::Guild, data: &BotData) {
    info!("Joined guild {} ({})", guild.name, guild.id);

    match guild::get_or_create_guild(data.db(), &guild.id.to_string()).await {
        Ok((model, created)) => {
            debug!(guild_id = %guild.id, created, "Guild configuration ready");
            data.guild_cache
                .insert(guild.id.get(), GuildSettings::from_model(&model, &data.embed))
                .await;
        }
        Err(e) => warn!("Could not set up configuration for guild {}: {e}", guild.id),
    }

    // Fire and forget; members arrive later as GuildMembersChunk events
    ctx.shard.chunk_guild(
        guild.id,
        None,
        false,
        serenity::ChunkGuildFilter::None,
        None,
    );
}

/// Caches the stored settings of a guild we were already in, so its prefix resolves
/// without waiting for a join.
async fn warm_cache(guild_id: serenity::GuildId, data: &BotData) {
    match guild::get_guild(data.db(), &guild_id.to_string()).await {
        Ok(Some(model)) => {
            data.guild_cache
                .insert(guild_id.get(), GuildSettings::from_model(&model, &data.embed))
                .await;
        }
        Ok(None) => {}
        Err(e) => warn!("Could not load configuration for guild {guild_id}: {e}"),
    }
}

async fn on_message(
    ctx: &serenity::Context,
    message: &serenity::Message,
    bot_id: serenity::UserId,
    data: &BotData,
) -> Result<()> {
    if message.author.bot || message.guild_id.is_none() {
        return Ok(());
    }
    if is_bare_mention(&message.content, bot_id.get()) {
        dispatch(ctx, BotEvent::Mention { message }, data).await?;
    }
    Ok(())
}

async fn on_mention(
    ctx: &serenity::Context,
    message: &serenity::Message,
    data: &BotData,
) -> Result<()> {
    let prefix = match message.guild_id {
        Some(guild_id) => data.guild_cache.prefix(guild_id.get()).await,
        None => data.default_prefix.clone(),
    };
    message
        .channel_id
        .say(&ctx.http, mention_reply(random_greeting(), &prefix))
        .await?;
    Ok(())
}

/// Whether `content` is exactly a mention of the bot, `<@id>` or `<@!id>`.
#[must_use]
pub fn is_bare_mention(content: &str, bot_id: u64) -> bool {
    let Some(inner) = content
        .strip_prefix("<@")
        .and_then(|rest| rest.strip_suffix('>'))
    else {
        return false;
    };
    let inner = inner.strip_prefix('!').unwrap_or(inner);
    inner.parse::<u64>().is_ok_and(|id| id == bot_id) && !inner.starts_with('+')
}

/// The canned help text sent when someone pings the bot.
#[must_use]
pub fn mention_reply(greeting: &str, prefix: &str) -> String {
    format!(
        "{greeting} You seem lost. Are you?\n\
         Current prefix for this server is: `{prefix}`.\n\n\
         Use it like: `{prefix}help`"
    )
}

fn random_greeting() -> &'static str {
    GREETINGS.choose(&mut rand::rng()).copied().unwrap_or("Hey!")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT: u64 = 1_234_567_890;

    #[test]
    fn test_bare_mentions() {
        assert!(is_bare_mention("<@1234567890>", BOT));
        assert!(is_bare_mention("<@!1234567890>", BOT));
    }

    #[test]
    fn test_not_bare_mentions() {
        assert!(!is_bare_mention("<@1234567890> help", BOT));
        assert!(!is_bare_mention(" <@1234567890>", BOT));
        assert!(!is_bare_mention("<@!!1234567890>", BOT));
        assert!(!is_bare_mention("<@&1234567890>", BOT));
        assert!(!is_bare_mention("<@+1234567890>", BOT));
        assert!(!is_bare_mention("<@999>", BOT));
        assert!(!is_bare_mention("", BOT));
    }

    #[test]
    fn test_mention_reply_uses_prefix() {
        let reply = mention_reply("Hi!", "!");
        assert!(reply.starts_with("Hi! You seem lost."));
        assert!(reply.contains("Current prefix for this server is: `!`."));
        assert!(reply.ends_with("Use it like: `!help`"));
    }

    #[test]
    fn test_random_greeting_is_known() {
        assert!(GREETINGS.contains(&random_greeting()));
    }
}
