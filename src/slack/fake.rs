//! In-memory messaging boundary for tests

use crate::error::{BroadcastError, Result};
use crate::slack::boundary::{MessagingBoundary, SendFailure};
use crate::slack::{ChannelId, ChannelListing, ChannelPage, MessageTs, SenderIdentity};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub fn listing(id: &str, name: &str) -> ChannelListing {
    ChannelListing {
        id: ChannelId::new(id),
        name: name.to_string(),
        is_private: false,
        is_member: true,
        is_archived: false,
    }
}

#[derive(Debug, Clone)]
pub struct PostedMessage {
    pub channel: ChannelId,
    pub text: String,
    pub identity: Option<SenderIdentity>,
}

#[derive(Default)]
pub struct FakeBoundary {
    pages: Vec<Vec<ChannelListing>>,
    listing_error: Option<String>,
    cursor_loop: bool,
    failures: HashMap<String, SendFailure>,
    delays: HashMap<String, Duration>,
    posted: Mutex<Vec<PostedMessage>>,
    list_calls: Mutex<usize>,
}

impl FakeBoundary {
    pub fn with_pages(mut self, pages: Vec<Vec<ChannelListing>>) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_listing_error(mut self, code: &str) -> Self {
        self.listing_error = Some(code.to_string());
        self
    }

    /// Point the last page back at the first one instead of ending.
    pub fn with_cursor_loop(mut self) -> Self {
        self.cursor_loop = true;
        self
    }

    /// Make posts to `channel` fail.
    pub fn failing(mut self, channel: &str, failure: SendFailure) -> Self {
        self.failures.insert(channel.to_string(), failure);
        self
    }

    /// Make posts to `channel` take this long.
    pub fn slow(mut self, channel: &str, delay: Duration) -> Self {
        self.delays.insert(channel.to_string(), delay);
        self
    }

    pub fn posted(&self) -> Vec<PostedMessage> {
        self.posted.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }
}

#[async_trait]
impl MessagingBoundary for FakeBoundary {
    async fn post_message(
        &self,
        channel: &ChannelId,
        text: &str,
        identity: Option<&SenderIdentity>,
    ) -> std::result::Result<MessageTs, SendFailure> {
        if let Some(delay) = self.delays.get(channel.as_str()) {
            tokio::time::sleep(*delay).await;
        }

        let ts = {
            let mut posted = self.posted.lock().unwrap();
            posted.push(PostedMessage {
                channel: channel.clone(),
                text: text.to_string(),
                identity: identity.cloned(),
            });
            format!("1700000000.{:06}", posted.len())
        };

        match self.failures.get(channel.as_str()) {
            Some(failure) => Err(failure.clone()),
            None => Ok(MessageTs::new(ts)),
        }
    }

    async fn list_channels(&self, cursor: Option<&str>) -> Result<ChannelPage> {
        *self.list_calls.lock().unwrap() += 1;

        if let Some(code) = &self.listing_error {
            return Err(BroadcastError::SlackApi(code.clone()));
        }

        let index: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
        let channels = self.pages.get(index).cloned().unwrap_or_default();
        let next_cursor = if self.cursor_loop {
            Some(((index + 1) % self.pages.len().max(1)).to_string())
        } else {
            (index + 1 < self.pages.len()).then(|| (index + 1).to_string())
        };

        Ok(ChannelPage {
            channels,
            next_cursor,
        })
    }
}
