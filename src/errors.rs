use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    #[error("{message}")]
    Validation { message: String },

    #[error("Scrim {id} not found")]
    ScrimNotFound { id: i64 },

    #[error("Slot {num} is already taken")]
    SlotTaken { num: i32 },

    #[error("No slots available to add this time.")]
    NoSlotsAvailable,

    #[error("Invalid Discord id: {value}")]
    InvalidSnowflake { value: String },

    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Error::FrameworkError(Box::new(value))
    }
}

impl Error {
    /// Whether the error is worth showing to the person who clicked, rather than
    /// only logging it.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::NoSlotsAvailable | Self::SlotTaken { .. } | Self::Validation { .. }
        )
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_shows_only_the_message() {
        let error = Error::Validation {
            message: "Slot 31 is outside this scrim's range".to_string(),
        };
        assert_eq!(error.to_string(), "Slot 31 is outside this scrim's range");
        assert!(error.is_user_facing());

        let config = Error::Config {
            message: "DISCORD_TOKEN is not set".to_string(),
        };
        assert!(!config.is_user_facing());
    }
}
