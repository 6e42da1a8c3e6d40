//! The broadcast YAML file
//!
//! ```yaml
//! mentions:
//!   alice: U111AAA
//!   oncall: { id: S999TEAM, type: team }
//! channel_lists:
//!   - name: weekly
//!     description: Weekly release notes
//!     channels: ["#general", "C0123456789"]
//! sender:
//!   name: Release Bot
//!   icon_emoji: ":rocket:"
//! ```

use crate::directory::ChannelIdentifier;
use crate::error::{BroadcastError, Result};
use crate::mention::{MentionMapping, RawMentions};
use crate::slack::SenderIdentity;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelList {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub channels: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BroadcastConfig {
    /// Kept raw; normalized per broadcast so a bad mapping only disables
    /// mention resolution instead of the whole run.
    #[serde(default)]
    pub mentions: RawMentions,
    #[serde(default)]
    pub channel_lists: Vec<ChannelList>,
    #[serde(default)]
    pub sender: Option<SenderIdentity>,
}

impl BroadcastConfig {
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            BroadcastError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_yaml_str(&raw)?;
        tracing::debug!(
            path = %path.display(),
            lists = config.channel_lists.len(),
            "Loaded broadcast config"
        );
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let config: BroadcastConfig = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks. Mentions are deliberately not checked here.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for list in &self.channel_lists {
            if list.name.trim().is_empty() {
                return Err(BroadcastError::Config(
                    "channel list name must not be empty".to_string(),
                ));
            }
            if !names.insert(list.name.as_str()) {
                return Err(BroadcastError::Config(format!(
                    "duplicate channel list: {}",
                    list.name
                )));
            }
            if list.channels.is_empty() {
                return Err(BroadcastError::Config(format!(
                    "channel list {} has no channels",
                    list.name
                )));
            }
            for raw in &list.channels {
                raw.parse::<ChannelIdentifier>().map_err(|_| {
                    BroadcastError::Config(format!(
                        "channel list {}: invalid channel identifier {:?}",
                        list.name, raw
                    ))
                })?;
            }
        }

        if let Some(sender) = &self.sender {
            if sender.icon_emoji.is_some() && sender.icon_url.is_some() {
                return Err(BroadcastError::Config(
                    "sender may set icon_emoji or icon_url, not both".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn list(&self, name: &str) -> Result<&ChannelList> {
        self.channel_lists
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| BroadcastError::UnknownList(name.to_string()))
    }

    pub fn mention_mapping(&self) -> Result<MentionMapping> {
        self.mentions.normalize()
    }
}
