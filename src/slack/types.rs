use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Slack identifies a posted message by its timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTs(pub String);

impl MessageTs {
    pub fn new(ts: impl Into<String>) -> Self {
        Self(ts.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// How the bot presents itself when posting. Passed through to Slack untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderIdentity {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icon_emoji: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
}

/// One channel as listed by `conversations.list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelListing {
    pub id: ChannelId,
    pub name: String,
    pub is_private: bool,
    pub is_member: bool,
    pub is_archived: bool,
}

/// A page of the channel listing. `next_cursor` is `None` on the last page.
#[derive(Debug, Clone, Default)]
pub struct ChannelPage {
    pub channels: Vec<ChannelListing>,
    pub next_cursor: Option<String>,
}
