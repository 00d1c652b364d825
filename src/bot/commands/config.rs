//! Per-guild settings commands.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::Context,
        cache::GuildSettings,
        core::guild,
        errors::{Error, Result},
    };
    use tracing::info;

    /// Changes the command prefix for this server.
    #[poise::command(
        slash_command,
        prefix_command,
        guild_only,
        required_permissions = "MANAGE_GUILD"
    )]
    pub async fn setprefix(
        ctx: Context<'_>,
        #[description = "New prefix, 1 to 5 characters"] prefix: String,
    ) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };

        let model = match guild::set_prefix(ctx.data().db(), &guild_id.to_string(), &prefix).await {
            Ok(model) => model,
            Err(Error::Validation { message }) => {
                ctx.say(format!("❌ {message}")).await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let cache = &ctx.data().guild_cache;
        if !cache.set_prefix(guild_id.get(), &model.prefix).await {
            cache
                .insert(
                    guild_id.get(),
                    GuildSettings::from_model(&model, &ctx.data().embed),
                )
                .await;
        }
        info!(%guild_id, prefix = %model.prefix, "Prefix changed");

        ctx.say(format!("✅ Prefix updated to `{}`.", model.prefix))
            .await?;
        Ok(())
    }
}

pub use inner::*;
