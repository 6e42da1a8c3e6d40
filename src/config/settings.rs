use crate::error::{BroadcastError, Result};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    pub slack: SlackConfig,
    pub broadcast: BroadcastSettings,
}

#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub bot_token: String,
}

#[derive(Debug, Clone)]
pub struct BroadcastSettings {
    /// YAML file holding mentions, channel lists and sender identity
    pub config_path: PathBuf,
    /// Flat delay after every send attempt
    pub pacing: Duration,
    /// Upper bound for a single send
    pub request_timeout: Duration,
}

impl Default for BroadcastSettings {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("broadcast.yaml"),
            pacing: Duration::from_millis(1000),
            request_timeout: Duration::from_secs(30),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: &str) -> Result<T> {
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| BroadcastError::Config(format!("Invalid {}", key)))
}

/// Settings that don't need credentials, so `lists` and `validate` work
/// without a token.
pub fn load_broadcast_settings() -> Result<BroadcastSettings> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    Ok(BroadcastSettings {
        config_path: std::env::var("BROADCAST_CONFIG")
            .unwrap_or_else(|_| "broadcast.yaml".to_string())
            .into(),
        pacing: Duration::from_millis(parse_env("BROADCAST_PACING_MS", "1000")?),
        request_timeout: Duration::from_secs(parse_env("SLACK_REQUEST_TIMEOUT_SECS", "30")?),
    })
}

pub fn load_settings() -> Result<Settings> {
    let broadcast = load_broadcast_settings()?;

    let slack = SlackConfig {
        bot_token: std::env::var("SLACK_BOT_TOKEN")
            .map_err(|_| BroadcastError::Config("SLACK_BOT_TOKEN not set".to_string()))?,
    };

    Ok(Settings { slack, broadcast })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = BroadcastSettings::default();
        assert_eq!(settings.pacing, Duration::from_secs(1));
        assert_eq!(settings.request_timeout, Duration::from_secs(30));
        assert_eq!(settings.config_path, PathBuf::from("broadcast.yaml"));
    }

    #[test]
    fn test_parse_env_falls_back_to_default() {
        let value: u64 = parse_env("SLACK_BROADCAST_TEST_UNSET_VARIABLE", "42").unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_env_rejects_garbage_default() {
        let err = parse_env::<u64>("SLACK_BROADCAST_TEST_UNSET_VARIABLE", "soon").unwrap_err();
        assert!(matches!(err, BroadcastError::Config(_)));
    }
}
