//! The messaging capabilities the broadcast pipeline depends on

use crate::error::Result;
use crate::slack::{ChannelId, ChannelPage, MessageTs, SenderIdentity};
use async_trait::async_trait;
use std::time::Duration;

/// Why a single post did not go through
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendFailure {
    /// Slack answered with `ok: false`
    Api {
        code: String,
        /// Free-form detail from the response, e.g. `response_metadata.messages`
        detail: Option<String>,
        retry_after: Option<Duration>,
    },
    /// The request never produced an API answer (connection, TLS, timeout)
    Transport(String),
}

impl std::fmt::Display for SendFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SendFailure::Api { code, .. } => write!(f, "Slack API returned error: {code}"),
            SendFailure::Transport(e) => write!(f, "Slack API request failed: {e}"),
        }
    }
}

#[async_trait]
pub trait MessagingBoundary: Send + Sync {
    /// Post `text` to a channel, returning the new message's timestamp.
    async fn post_message(
        &self,
        channel: &ChannelId,
        text: &str,
        identity: Option<&SenderIdentity>,
    ) -> std::result::Result<MessageTs, SendFailure>;

    /// Fetch one page of channels visible to the bot.
    async fn list_channels(&self, cursor: Option<&str>) -> Result<ChannelPage>;
}
