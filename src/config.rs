//! Environment-driven configuration.
//!
//! Values are read from the process environment after `.env` has been loaded
//! by the binary. Only the API key is mandatory.

use crate::error::ForgeError;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_TOAST_MS: u64 = 3000;
pub const DEFAULT_LOGIN_DELAY_MS: u64 = 800;

/// Which remote model serves each kind of call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSet {
    pub analysis: String,
    pub text: String,
    pub image: String,
}

impl Default for ModelSet {
    fn default() -> Self {
        Self {
            analysis: DEFAULT_TEXT_MODEL.to_string(),
            text: DEFAULT_TEXT_MODEL.to_string(),
            image: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}

/// Fixed delays used by the session (toast lifetime, simulated login).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub toast: Duration,
    pub login_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            toast: Duration::from_millis(DEFAULT_TOAST_MS),
            login_delay: Duration::from_millis(DEFAULT_LOGIN_DELAY_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForgeConfig {
    pub api_key: String,
    pub base_url: String,
    pub models: ModelSet,
    pub timings: Timings,
}

impl ForgeConfig {
    pub fn from_env() -> Result<Self, ForgeError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't have to
    /// touch the real environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ForgeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty("GEMINI_API_KEY")
            .or_else(|| non_empty("API_KEY"))
            .ok_or_else(|| ForgeError::Config("GEMINI_API_KEY must be set".into()))?;

        let defaults = ModelSet::default();
        let models = ModelSet {
            analysis: non_empty("FORGE_ANALYSIS_MODEL").unwrap_or(defaults.analysis),
            text: non_empty("FORGE_TEXT_MODEL").unwrap_or(defaults.text),
            image: non_empty("FORGE_IMAGE_MODEL").unwrap_or(defaults.image),
        };

        let timings = Timings {
            toast: millis(non_empty("FORGE_TOAST_MS"), "FORGE_TOAST_MS", DEFAULT_TOAST_MS)?,
            login_delay: millis(
                non_empty("FORGE_LOGIN_DELAY_MS"),
                "FORGE_LOGIN_DELAY_MS",
                DEFAULT_LOGIN_DELAY_MS,
            )?,
        };

        Ok(Self {
            api_key,
            base_url: non_empty("GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            models,
            timings,
        })
    }
}

fn millis(raw: Option<String>, key: &str, default: u64) -> Result<Duration, ForgeError> {
    match raw {
        None => Ok(Duration::from_millis(default)),
        Some(v) => v
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| ForgeError::Config(format!("{key} must be a number of milliseconds: {e}"))),
    }
}
