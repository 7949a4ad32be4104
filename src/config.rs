use secrecy::Secret;
use std::path::PathBuf;

use crate::models::card::IdPolicy;
use crate::services::gate::DEFAULT_PROMPT;
use crate::store::DEFAULT_ITEM_KEY;

#[derive(Debug, Clone)]
pub struct Config {
    // Storage
    pub storage_dir: PathBuf,
    pub storage_secret: Secret<String>,
    pub item_key: String,

    // Authorization
    pub prompt_message: String,
    pub device_credential: Option<Secret<String>>,

    pub id_policy: IdPolicy,
}

impl Config {
    /// Reads `CARDVAULT_*` environment variables, after loading `.env` if present.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists (for local development)
        let _ = dotenvy::dotenv();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("CARDVAULT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Self::from_settings(&config)
    }

    pub fn from_settings(config: &config::Config) -> Result<Self, config::ConfigError> {
        let id_policy = match config.get::<String>("id_policy") {
            Ok(raw) => raw
                .parse::<IdPolicy>()
                .map_err(|e| config::ConfigError::Message(e.to_string()))?,
            Err(config::ConfigError::NotFound(_)) => IdPolicy::default(),
            Err(e) => return Err(e),
        };

        Ok(Self {
            storage_dir: config
                .get::<String>("storage_dir")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".cardvault")),
            storage_secret: Secret::new(config.get("storage_secret")?),
            item_key: config
                .get("item_key")
                .unwrap_or_else(|_| DEFAULT_ITEM_KEY.to_string()),

            prompt_message: config
                .get("prompt_message")
                .unwrap_or_else(|_| DEFAULT_PROMPT.to_string()),
            device_credential: config
                .get::<String>("device_credential")
                .ok()
                .map(Secret::new),

            id_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn settings(pairs: &[(&str, &str)]) -> config::Config {
        pairs
            .iter()
            .fold(config::Config::builder(), |builder, (key, value)| {
                builder.set_override(*key, *value).unwrap()
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_settings(&settings(&[("storage_secret", "s3cret")])).unwrap();

        assert_eq!(config.storage_dir, PathBuf::from(".cardvault"));
        assert_eq!(config.storage_secret.expose_secret(), "s3cret");
        assert_eq!(config.item_key, "data");
        assert_eq!(config.prompt_message, "Confirm fingerprint");
        assert!(config.device_credential.is_none());
        assert_eq!(config.id_policy, IdPolicy::Length);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_settings(&settings(&[
            ("storage_secret", "s3cret"),
            ("storage_dir", "/tmp/vault"),
            ("item_key", "cards"),
            ("prompt_message", "Unlock"),
            ("device_credential", "2468"),
            ("id_policy", "monotonic"),
        ]))
        .unwrap();

        assert_eq!(config.storage_dir, PathBuf::from("/tmp/vault"));
        assert_eq!(config.item_key, "cards");
        assert_eq!(config.prompt_message, "Unlock");
        assert_eq!(
            config.device_credential.as_ref().map(|c| c.expose_secret().as_str()),
            Some("2468")
        );
        assert_eq!(config.id_policy, IdPolicy::Monotonic);
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        assert!(Config::from_settings(&settings(&[])).is_err());
    }

    #[test]
    fn test_bad_id_policy_is_an_error() {
        let result = Config::from_settings(&settings(&[
            ("storage_secret", "s3cret"),
            ("id_policy", "random"),
        ]));
        assert!(result.is_err());
    }
}
