use thiserror::Error;

#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("Slack API error: {0}")]
    SlackApi(String),

    #[error("Channel directory error: {0}")]
    Directory(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown channel list: {0}")]
    UnknownList(String),

    #[error("Invalid mention mapping: {0}")]
    Mapping(String),

    #[error("Invalid channel identifier: {0}")]
    InvalidIdentifier(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl BroadcastError {
    /// Errors raised before any channel was attempted because the input itself
    /// is wrong, as opposed to the messaging service being unreachable.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            BroadcastError::Config(_)
                | BroadcastError::UnknownList(_)
                | BroadcastError::Mapping(_)
                | BroadcastError::InvalidIdentifier(_)
                | BroadcastError::Io(_)
                | BroadcastError::Yaml(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BroadcastError>;
