use crate::config::SlackConfig;
use crate::error::{BroadcastError, Result};
use crate::slack::boundary::{MessagingBoundary, SendFailure};
use crate::slack::{ChannelId, ChannelListing, ChannelPage, MessageTs, SenderIdentity};
use async_trait::async_trait;
use slack_morphism::errors::SlackClientError;
use slack_morphism::prelude::*;
use std::sync::Arc;

/// `conversations.list` recommends no more than 200 per page
const PAGE_SIZE: u16 = 200;

pub struct SlackClient {
    client: Arc<SlackHyperClient>,
    token: SlackApiToken,
}

impl SlackClient {
    pub fn new(config: SlackConfig) -> Result<Self> {
        let connector = SlackClientHyperConnector::new()
            .map_err(|e| BroadcastError::SlackApi(e.to_string()))?;

        let client = Arc::new(slack_morphism::SlackClient::new(connector));
        let token = SlackApiToken::new(config.bot_token.into());

        Ok(Self { client, token })
    }
}

#[async_trait]
impl MessagingBoundary for SlackClient {
    /// Send a message to a channel; mentions are expected to be resolved already
    async fn post_message(
        &self,
        channel: &ChannelId,
        text: &str,
        identity: Option<&SenderIdentity>,
    ) -> std::result::Result<MessageTs, SendFailure> {
        let session = self.client.open_session(&self.token);

        let mut request = SlackApiChatPostMessageRequest::new(
            channel.as_str().into(),
            SlackMessageContent::new().with_text(text.into()),
        );

        if let Some(identity) = identity {
            request.username = identity.name.clone();
            request.icon_emoji = identity.icon_emoji.clone();
            request.icon_url = identity.icon_url.clone();
        }

        request.unfurl_links = Some(false);
        request.unfurl_media = Some(false);

        let response = session
            .chat_post_message(&request)
            .await
            .map_err(to_send_failure)?;

        Ok(MessageTs::new(response.ts.to_string()))
    }

    async fn list_channels(&self, cursor: Option<&str>) -> Result<ChannelPage> {
        let session = self.client.open_session(&self.token);

        let mut request = SlackApiConversationsListRequest::new()
            .with_types(vec![
                SlackConversationType::Public,
                SlackConversationType::Private,
            ])
            .with_limit(PAGE_SIZE)
            .with_exclude_archived(false);

        if let Some(cursor) = cursor {
            request = request.with_cursor(SlackCursorId(cursor.to_string()));
        }

        let response = session
            .conversations_list(&request)
            .await
            .map_err(|e| BroadcastError::SlackApi(e.to_string()))?;

        tracing::debug!(
            count = response.channels.len(),
            "Received channel listing page"
        );

        let channels = response
            .channels
            .into_iter()
            .map(|c| ChannelListing {
                id: ChannelId::new(c.id.to_string()),
                name: c.name.unwrap_or_default(),
                is_private: c.flags.is_private.unwrap_or(false),
                is_member: c.flags.is_member.unwrap_or(false),
                is_archived: c.flags.is_archived.unwrap_or(false),
            })
            .collect();

        // Slack signals the last page with an empty cursor
        let next_cursor = response
            .response_metadata
            .and_then(|meta| meta.next_cursor)
            .map(|cursor| cursor.to_string())
            .filter(|cursor| !cursor.is_empty());

        Ok(ChannelPage {
            channels,
            next_cursor,
        })
    }
}

/// The raw response body is preferred as detail since it carries
/// `response_metadata.messages`; `errors` and `warnings` are fallbacks.
fn to_send_failure(err: SlackClientError) -> SendFailure {
    match err {
        SlackClientError::ApiError(api) => SendFailure::Api {
            detail: api
                .http_response_body
                .clone()
                .or_else(|| api.errors.as_ref().map(|e| e.join("; ")))
                .or_else(|| api.warnings.as_ref().map(|w| w.join("; "))),
            code: api.code,
            retry_after: None,
        },
        SlackClientError::RateLimitError(limit) => SendFailure::Api {
            code: "rate_limited".to_string(),
            detail: None,
            retry_after: limit.retry_after,
        },
        other => SendFailure::Transport(other.to_string()),
    }
}
