//! Configuration — read from the environment at startup.

use crate::error::ConfigError;

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram Bot API token.
    pub telegram_token: String,
    /// Path to the SQLite database file.
    pub db_path: String,
    /// Chat id of the administrator, if any.
    ///
    /// Enables the `/export` command and duplicate-order notifications.
    pub admin_chat_id: Option<i64>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `TELEGRAM_BOT_TOKEN` is required; a missing token is fatal at startup.
    pub fn from_env() -> Result<Self, ConfigError> {
        let telegram_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("TELEGRAM_BOT_TOKEN".into()))?;

        let db_path =
            std::env::var("SQUEEGEE_DB_PATH").unwrap_or_else(|_| "./data/squeegee.db".to_string());

        let admin_chat_id = match std::env::var("ADMIN_CHAT_ID") {
            Ok(raw) => Some(raw.trim().parse::<i64>().map_err(|_| {
                ConfigError::InvalidValue {
                    key: "ADMIN_CHAT_ID".into(),
                    message: format!("expected a numeric chat id, got {raw:?}"),
                }
            })?),
            Err(_) => None,
        };

        Ok(Self {
            telegram_token,
            db_path,
            admin_chat_id,
        })
    }

    /// Whether the given chat belongs to the administrator.
    pub fn is_admin(&self, chat_id: i64) -> bool {
        self.admin_chat_id == Some(chat_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_admin_matches_configured_id() {
        let config = Config {
            telegram_token: "t".into(),
            db_path: ":memory:".into(),
            admin_chat_id: Some(42),
        };
        assert!(config.is_admin(42));
        assert!(!config.is_admin(7));
    }

    #[test]
    fn is_admin_false_when_unset() {
        let config = Config {
            telegram_token: "t".into(),
            db_path: ":memory:".into(),
            admin_chat_id: None,
        };
        assert!(!config.is_admin(0));
    }
}
