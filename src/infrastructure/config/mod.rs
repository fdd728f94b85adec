use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::{
    LLMConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, TRANSLATION_TEMPERATURE,
};
use crate::infrastructure::security::keyring::KeyringManager;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const CONFIG_FILE: &str = "termbridge.toml";
pub const ENV_PREFIX: &str = "TERMBRIDGE_";
/// Unprefixed variable accepted for the credential.
pub const PLAIN_API_KEY_ENV: &str = "API_KEY";
pub const DEFAULT_KEYRING_SERVICE: &str = "TermBridge";
const KEYRING_USER: &str = "gemini";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f64,
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub log_filter: String,
    /// Keyring service holding the credential; empty skips the keyring.
    pub keyring_service: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            temperature: TRANSLATION_TEMPERATURE,
            host: "127.0.0.1".to_string(),
            port: 3001,
            request_timeout_secs: 120,
            log_filter: "info".to_string(),
            keyring_service: DEFAULT_KEYRING_SERVICE.to_string(),
        }
    }
}

impl AppConfig {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Defaults, then `termbridge.toml`, then `TERMBRIDGE_*` variables.
    pub fn load() -> Result<Self> {
        Ok(Self::figment().extract()?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub struct ConfigService {
    config: AppConfig,
    keyring: Option<KeyringManager>,
}

impl ConfigService {
    pub fn new(config: AppConfig) -> Self {
        let service = config.keyring_service.trim();
        let keyring = (!service.is_empty()).then(|| KeyringManager::new(service));
        Self { config, keyring }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Config value, then `API_KEY`, then the OS keyring.
    pub fn resolve_api_key(&self) -> Result<String> {
        let from_env = || {
            std::env::var(PLAIN_API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty())
        };

        self.config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(from_env)
            .or_else(|| {
                self.keyring
                    .as_ref()
                    .and_then(|keyring| keyring.find_secret(KEYRING_USER))
            })
            .ok_or_else(|| {
                AppError::ConfigError(format!(
                    "{}API_KEY environment variable not set",
                    ENV_PREFIX
                ))
            })
    }

    /// Oracle settings; fails when no credential is available.
    pub fn llm_config(&self) -> Result<LLMConfig> {
        let api_key = self.resolve_api_key()?;
        let mut config = LLMConfig::gemini(&self.config.base_url, &self.config.model, api_key);
        config.temperature = Some(self.config.temperature);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_match_gemini_flash() {
        Jail::expect_with(|_jail| {
            let config = AppConfig::load().expect("defaults load");
            assert_eq!(config.model, "gemini-2.5-flash");
            assert_eq!(config.port, 3001);
            assert_eq!(config.temperature, 0.2);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                    port = 8080
                    model = "gemini-2.0-flash"
                "#,
            )?;
            jail.set_env("TERMBRIDGE_PORT", "9090");
            jail.set_env("TERMBRIDGE_API_KEY", "from-env");
            jail.set_env("TERMBRIDGE_KEYRING_SERVICE", "TermBridge-dev");

            let config = AppConfig::load().expect("config loads");
            assert_eq!(config.port, 9090);
            assert_eq!(config.model, "gemini-2.0-flash");
            assert_eq!(config.api_key.as_deref(), Some("from-env"));
            assert_eq!(config.keyring_service, "TermBridge-dev");
            Ok(())
        });
    }

    #[test]
    fn configured_key_builds_llm_config() {
        let config = AppConfig {
            api_key: Some("secret".to_string()),
            temperature: 0.3,
            ..AppConfig::default()
        };
        let llm = ConfigService::new(config).llm_config().unwrap();
        assert_eq!(llm.api_key.as_deref(), Some("secret"));
        assert_eq!(llm.model, "gemini-2.5-flash");
        assert_eq!(llm.temperature, Some(0.3));
    }

    #[test]
    fn missing_credential_is_a_config_error() {
        Jail::expect_with(|_jail| {
            std::env::remove_var(PLAIN_API_KEY_ENV);
            std::env::remove_var("TERMBRIDGE_API_KEY");

            let config = AppConfig {
                keyring_service: String::new(),
                ..AppConfig::load().expect("config loads")
            };
            assert!(config.api_key.is_none());

            let err = ConfigService::new(config).llm_config().unwrap_err();
            assert!(matches!(err, AppError::ConfigError(_)));
            assert!(err.to_string().contains("TERMBRIDGE_API_KEY"));
            Ok(())
        });
    }

    #[test]
    fn blank_configured_key_falls_through() {
        Jail::expect_with(|_jail| {
            std::env::remove_var(PLAIN_API_KEY_ENV);
            let config = AppConfig {
                api_key: Some("   ".to_string()),
                keyring_service: String::new(),
                ..AppConfig::default()
            };
            assert!(ConfigService::new(config).resolve_api_key().is_err());
            Ok(())
        });
    }

    #[test]
    fn plain_api_key_variable_is_accepted() {
        Jail::expect_with(|jail| {
            jail.set_env(PLAIN_API_KEY_ENV, "plain-key");
            let config = AppConfig {
                keyring_service: String::new(),
                ..AppConfig::default()
            };
            let key = ConfigService::new(config).resolve_api_key().unwrap();
            assert_eq!(key, "plain-key");
            Ok(())
        });
    }
}
