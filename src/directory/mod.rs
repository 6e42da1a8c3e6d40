//! Channel directory: turns channel-list identifiers into channel records
//!
//! The snapshot is fetched fresh for every broadcast and never cached, so a
//! renamed or newly archived channel is picked up on the next run.

mod identifier;

pub use identifier::ChannelIdentifier;

use crate::error::{BroadcastError, Result};
use crate::logging::Logger;
use crate::slack::{ChannelId, ChannelListing, MessagingBoundary};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::Instrument;

/// A channel enriched with what delivery needs to know about it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedChannel {
    pub id: ChannelId,
    /// Name without the leading `#`
    pub name: String,
    pub is_private: bool,
    pub is_member: bool,
    pub is_archived: bool,
}

impl ResolvedChannel {
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            self.id.to_string()
        } else {
            format!("#{}", self.name)
        }
    }
}

impl From<ChannelListing> for ResolvedChannel {
    fn from(listing: ChannelListing) -> Self {
        Self {
            id: listing.id,
            name: listing.name,
            is_private: listing.is_private,
            is_member: listing.is_member,
            is_archived: listing.is_archived,
        }
    }
}

/// Point-in-time view of every channel visible to the bot
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    pub channels: Vec<ResolvedChannel>,
}

impl DirectorySnapshot {
    pub fn new(channels: Vec<ResolvedChannel>) -> Self {
        Self { channels }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

pub struct ChannelDirectory {
    logger: Logger,
}

impl ChannelDirectory {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    /// Walk every page of the channel listing.
    pub async fn fetch_snapshot(
        &self,
        boundary: &dyn MessagingBoundary,
    ) -> Result<DirectorySnapshot> {
        async {
            let mut channels = Vec::new();
            let mut cursor: Option<String> = None;
            let mut seen_cursors = HashSet::new();
            let mut pages = 0usize;

            loop {
                let page = boundary.list_channels(cursor.as_deref()).await?;
                pages += 1;
                channels.extend(page.channels.into_iter().map(ResolvedChannel::from));

                match page.next_cursor {
                    Some(next) => {
                        if !seen_cursors.insert(next.clone()) {
                            return Err(BroadcastError::Directory(format!(
                                "channel listing repeated cursor {next}"
                            )));
                        }
                        cursor = Some(next);
                    }
                    None => break,
                }
            }

            tracing::info!(
                channels = channels.len(),
                pages = pages,
                "Fetched channel directory"
            );
            Ok(DirectorySnapshot::new(channels))
        }
        .instrument(self.logger.span().clone())
        .await
    }

    /// Map identifiers to channels in input order, dropping unknown ones and
    /// keeping only the first occurrence of each channel id.
    pub fn resolve<S: AsRef<str>>(
        &self,
        identifiers: &[S],
        snapshot: &DirectorySnapshot,
    ) -> Vec<ResolvedChannel> {
        self.logger.in_scope(|| {
            let by_id: HashMap<&str, &ResolvedChannel> = snapshot
                .channels
                .iter()
                .map(|c| (c.id.as_str(), c))
                .collect();
            let by_name: HashMap<&str, &ResolvedChannel> = snapshot
                .channels
                .iter()
                .map(|c| (c.name.as_str(), c))
                .collect();

            let mut seen: HashSet<&str> = HashSet::new();
            let mut resolved = Vec::new();

            for raw in identifiers {
                let raw = raw.as_ref();
                let identifier = match raw.parse::<ChannelIdentifier>() {
                    Ok(identifier) => identifier,
                    Err(e) => {
                        tracing::warn!(identifier = %raw, error = %e, "Skipping channel");
                        continue;
                    }
                };

                let found = match &identifier {
                    ChannelIdentifier::Id(id) => by_id.get(id.as_str()),
                    ChannelIdentifier::Name(name) => by_name.get(name.as_str()),
                };

                let Some(channel) = found else {
                    tracing::warn!(
                        identifier = %identifier,
                        "Channel not found in directory, skipping"
                    );
                    continue;
                };

                if seen.insert(channel.id.as_str()) {
                    resolved.push((*channel).clone());
                } else {
                    tracing::debug!(
                        identifier = %identifier,
                        channel_id = %channel.id,
                        "Duplicate channel, keeping first occurrence"
                    );
                }
            }

            resolved
        })
    }
}
