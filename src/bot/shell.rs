//! Startup and shutdown of the bot.
//!
//! [`run`] builds the outbound HTTP session, connects both database pools, loads
//! the configured extensions and runs the gateway client until Ctrl-C. Teardown
//! happens in reverse: shards, HTTP session, then the pools.

use super::{BotData, events, extensions};
use crate::{
    config::{BotConfig, Pools},
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use std::{future::Future, io};
use tracing::{error, info, instrument, warn};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            if error.is_user_facing() {
                warn!("Command `{}` refused: {error}", ctx.command().name);
            } else {
                error!("Error in command `{}`: {error:?}", ctx.command().name);
            }
            if let Err(e) = ctx.say(format!("An error occurred: {error}")).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Resolves the prefix for a message: the guild's cached prefix, or the configured default.
async fn dynamic_prefix(ctx: poise::PartialContext<'_, BotData, Error>) -> Result<Option<String>> {
    let prefix = match ctx.guild_id {
        Some(guild_id) => ctx
            .data
            .guild_cache
            .get(guild_id.get())
            .await
            .map(|s| s.prefix),
        None => None,
    };
    Ok(Some(
        prefix.unwrap_or_else(|| ctx.data.default_prefix.clone()),
    ))
}

/// Gateway intents: everything non-privileged plus members and message content.
#[must_use]
pub fn intents() -> serenity::GatewayIntents {
    serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::MESSAGE_CONTENT
}

/// Users and the replied-to user may be pinged; `@everyone` and roles may not.
#[must_use]
pub fn allowed_mentions() -> serenity::CreateAllowedMentions {
    serenity::CreateAllowedMentions::new()
        .everyone(false)
        .all_roles(false)
        .all_users(true)
        .replied_user(true)
}

fn http_session() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| Error::Config {
            message: format!("could not build HTTP session: {e}"),
        })
}

/// Waits for `signal`, then runs `shutdown`. Returns whether it shut down.
///
/// If the signal listener can't be installed the bot keeps running; it only loses
/// graceful Ctrl-C handling.
async fn shutdown_on<S, F, Fut>(signal: S, shutdown: F) -> bool
where
    S: Future<Output = io::Result<()>>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    if let Err(e) = signal.await {
        error!("Could not listen for Ctrl-C: {e}");
        return false;
    }
    info!("Received Ctrl-C, shutting down.");
    shutdown().await;
    true
}

/// Runs the bot until the gateway shuts down, then releases every resource.
#[instrument(skip(config))]
pub async fn run(config: BotConfig) -> Result<()> {
    let http = http_session()?;
    info!("HTTP session ready.");

    let pools = Pools::connect(&config).await?;
    info!(instance = %pools.instance_type(), "Database pools ready.");

    let loaded = extensions::load_extensions(&config.extensions);
    info!(
        "{} extensions loaded, {} commands registered.",
        loaded.extensions.len(),
        loaded.commands.len()
    );

    let data = BotData::new(
        pools.clone(),
        http,
        config.embed.clone(),
        config.default_prefix.clone(),
        loaded.extensions,
    );

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: loaded.commands,
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.default_prefix.clone()),
                dynamic_prefix: Some(|ctx| Box::pin(dynamic_prefix(ctx))),
                case_insensitive_commands: true,
                ..Default::default()
            },
            allowed_mentions: Some(allowed_mentions()),
            on_error: |error| Box::pin(on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Registered application commands globally.");
                Ok(data)
            })
        })
        .build();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(&config.token, intents())
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e}"))?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(shutdown_on(tokio::signal::ctrl_c(), move || async move {
        shard_manager.shutdown_all().await;
        info!("All shards shut down.");
    }));

    info!("Starting bot client...");
    let outcome = client.start().await;
    if let Err(e) = &outcome {
        error!("Client error: {e}");
    }

    // The client owns the framework data, and with it the HTTP session
    drop(client);
    info!("HTTP session closed.");

    match pools.close().await {
        Ok(()) => info!("Database connections closed."),
        Err(e) => error!("Failed to close database connections: {e}"),
    }

    outcome.map_err(Error::from)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_intents_include_privileged_extras() {
        let intents = intents();
        assert!(intents.contains(serenity::GatewayIntents::GUILD_MEMBERS));
        assert!(intents.contains(serenity::GatewayIntents::MESSAGE_CONTENT));
        assert!(intents.contains(serenity::GatewayIntents::GUILD_MESSAGES));
        assert!(!intents.contains(serenity::GatewayIntents::GUILD_PRESENCES));
    }

    #[test]
    fn test_allowed_mentions_block_everyone_and_roles() {
        let value = serde_json::to_value(allowed_mentions()).unwrap();
        let parse: Vec<&str> = value["parse"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(parse, vec!["users"]);
        assert_eq!(value["replied_user"], true);
    }

    #[tokio::test]
    async fn test_failed_signal_listener_keeps_running() {
        let stopped = AtomicBool::new(false);
        let flag = &stopped;
        let signal = std::future::ready(io::Result::<()>::Err(io::Error::other("no signal handler")));
        let shut_down = shutdown_on(signal, move || async move {
            flag.store(true, Ordering::SeqCst);
        })
        .await;
        assert!(!shut_down);
        assert!(!stopped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_signal_triggers_shutdown() {
        let stopped = AtomicBool::new(false);
        let flag = &stopped;
        let shut_down = shutdown_on(std::future::ready(io::Result::Ok(())), move || async move {
            flag.store(true, Ordering::SeqCst);
        })
        .await;
        assert!(shut_down);
        assert!(stopped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_http_session_builds() {
        assert!(http_session().is_ok());
    }
}
