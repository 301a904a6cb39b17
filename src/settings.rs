use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub debug: bool,
    pub port: u16,
    pub enable_swagger: bool,
    pub studio_name: String,
    pub member_name: String,
    pub load_delay_ms: u64,
    pub confirmation_delay_ms: u64,
    pub preferences_path: String,
    pub assets_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            port: 8080,
            enable_swagger: true,
            studio_name: "FitStudio".to_string(),
            member_name: "Jamie".to_string(),
            load_delay_ms: 1000,
            confirmation_delay_ms: 3000,
            preferences_path: "preferences.json".to_string(),
            assets_base_url: "/assets".to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let defaults = Settings::default();

        let config = Config::builder()
            // APP_LOAD_DELAY_MS -> load_delay_ms
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .try_parsing(true),
            )
            .set_default("debug", defaults.debug)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("enable_swagger", defaults.enable_swagger)?
            .set_default("studio_name", defaults.studio_name)?
            .set_default("member_name", defaults.member_name)?
            .set_default("load_delay_ms", defaults.load_delay_ms as i64)?
            .set_default("confirmation_delay_ms", defaults.confirmation_delay_ms as i64)?
            .set_default("preferences_path", defaults.preferences_path)?
            .set_default("assets_base_url", defaults.assets_base_url)?
            .build()?;

        config.try_deserialize()
    }

    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }

    pub fn confirmation_delay(&self) -> Duration {
        Duration::from_millis(self.confirmation_delay_ms)
    }
}
