//! Interactive views: button panels, modals and select prompts.

/// Modal and select-menu prompts
pub mod prompts;
/// Public message refreshes after slot edits
pub mod refresh;
/// The slotlist edit panel
pub mod slotlist_edit;

use crate::errors::{Error, Result};
use poise::serenity_prelude as serenity;
use std::num::NonZeroU64;

/// Green embed used to confirm a successful edit.
#[must_use]
pub fn success_embed(text: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .description(format!("✅ | {text}"))
        .color(0x0057_F287)
}

/// Parses a stored snowflake string into a serenity id type.
pub fn snowflake<T: From<NonZeroU64>>(value: &str) -> Result<T> {
    value
        .parse::<NonZeroU64>()
        .map(T::from)
        .map_err(|_| Error::InvalidSnowflake {
            value: value.to_string(),
        })
}

/// Whether Discord answered "this message doesn't exist (anymore)".
#[must_use]
pub fn is_unknown_message(error: &serenity::Error) -> bool {
    matches!(
        error,
        serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 404
    )
}

/// Treats a message that no longer exists as nothing to do (`Ok(None)`); any other
/// failure propagates.
pub fn ignore_unknown_message<T>(
    result: std::result::Result<T, serenity::Error>,
) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if is_unknown_message(&e) => Ok(None),
        Err(e) => Err(Error::from(e)),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    /// A Discord REST failure with the given status, as serenity reports it.
    async fn discord_error(status: u16) -> serenity::Error {
        let body = r#"{"code":10008,"message":"Unknown Message"}"#;
        let response = http::Response::builder().status(status).body(body).unwrap();
        let response =
            serenity::ErrorResponse::from_response(response.into(), reqwest::Method::PATCH).await;
        serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(response))
    }

    #[tokio::test]
    async fn test_404_is_unknown_message() {
        assert!(is_unknown_message(&discord_error(404).await));
        assert!(!is_unknown_message(&discord_error(403).await));
    }

    #[tokio::test]
    async fn test_deleted_message_is_swallowed() {
        let gone: std::result::Result<(), _> = Err(discord_error(404).await);
        assert!(ignore_unknown_message(gone).unwrap().is_none());

        let forbidden: std::result::Result<(), _> = Err(discord_error(403).await);
        assert!(matches!(
            ignore_unknown_message(forbidden),
            Err(Error::FrameworkError(_))
        ));

        assert_eq!(ignore_unknown_message(Ok(7)).unwrap(), Some(7));
    }

    #[test]
    fn test_snowflake_parsing() {
        let channel: serenity::ChannelId = snowflake("1234").unwrap();
        assert_eq!(channel.get(), 1234);

        assert!(snowflake::<serenity::ChannelId>("0").is_err());
        assert!(snowflake::<serenity::MessageId>("abc").is_err());
        assert!(matches!(
            snowflake::<serenity::UserId>("-5"),
            Err(Error::InvalidSnowflake { .. })
        ));
    }

    #[test]
    fn test_other_errors_are_not_unknown_message() {
        assert!(!is_unknown_message(&serenity::Error::Other("boom")));
    }
}
