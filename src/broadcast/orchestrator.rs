//! Sequential per-channel delivery

use crate::broadcast::classify::{Eligibility, classify};
use crate::broadcast::types::{BroadcastResult, ChannelDeliveryResult, DeliveryError, ErrorType};
use crate::directory::ResolvedChannel;
use crate::logging::Logger;
use crate::slack::{MessagingBoundary, SendFailure, SenderIdentity};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

#[derive(Debug, Clone, Copy)]
pub struct DeliveryOptions {
    /// Fixed delay after every send attempt
    pub pacing: Duration,
    /// Upper bound for one send; exceeding it counts as a network error
    pub request_timeout: Duration,
}

impl Default for DeliveryOptions {
    fn default() -> Self {
        Self {
            pacing: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
        }
    }
}

pub struct DeliveryOrchestrator {
    boundary: Arc<dyn MessagingBoundary>,
    options: DeliveryOptions,
    identity: Option<SenderIdentity>,
    logger: Logger,
}

impl DeliveryOrchestrator {
    pub fn new(
        boundary: Arc<dyn MessagingBoundary>,
        options: DeliveryOptions,
        logger: Logger,
    ) -> Self {
        Self {
            boundary,
            options,
            identity: None,
            logger,
        }
    }

    pub fn with_identity(mut self, identity: Option<SenderIdentity>) -> Self {
        self.identity = identity;
        self
    }

    /// Deliver `text` to every channel in order. Never fails: every channel
    /// gets a result, whatever happened to the others.
    pub async fn deliver(
        &self,
        list_name: &str,
        channels: &[ResolvedChannel],
        text: &str,
    ) -> BroadcastResult {
        async {
            let mut results = Vec::with_capacity(channels.len());

            for (index, channel) in channels.iter().enumerate() {
                let result = match classify(channel) {
                    Eligibility::Blocked { status, error } => {
                        ChannelDeliveryResult::unsuccessful(channel.clone(), status, error)
                    }
                    Eligibility::Deliverable => {
                        let result = self.attempt(channel, text).await;
                        if !self.options.pacing.is_zero() {
                            tokio::time::sleep(self.options.pacing).await;
                        }
                        result
                    }
                };

                log_result(index + 1, channels.len(), &result);
                results.push(result);
            }

            let result = BroadcastResult::new(list_name, results, Utc::now());
            tracing::info!(
                status = %result.overall_status,
                total = result.total_channels,
                "Broadcast finished"
            );
            result
        }
        .instrument(self.logger.span().clone())
        .await
    }

    async fn attempt(&self, channel: &ResolvedChannel, text: &str) -> ChannelDeliveryResult {
        let send = self
            .boundary
            .post_message(&channel.id, text, self.identity.as_ref());

        match tokio::time::timeout(self.options.request_timeout, send).await {
            Ok(Ok(ts)) => ChannelDeliveryResult::succeeded(channel.clone(), ts.0, Utc::now()),
            Ok(Err(SendFailure::Api {
                code,
                detail,
                retry_after,
            })) => ChannelDeliveryResult::failed(
                channel.clone(),
                api_error(&code, detail.as_deref(), retry_after),
            ),
            Ok(Err(SendFailure::Transport(e))) => ChannelDeliveryResult::failed(
                channel.clone(),
                DeliveryError::new(ErrorType::NetworkError, format!("Request failed: {e}")),
            ),
            Err(_) => ChannelDeliveryResult::failed(
                channel.clone(),
                DeliveryError::new(
                    ErrorType::NetworkError,
                    format!(
                        "Request timed out after {}s",
                        self.options.request_timeout.as_secs_f64()
                    ),
                ),
            ),
        }
    }
}

fn log_result(position: usize, total: usize, result: &ChannelDeliveryResult) {
    let channel = result.channel.display_name();
    match &result.error {
        None => tracing::info!(
            position,
            total,
            channel = %channel,
            message_id = result.message_id.as_deref().unwrap_or_default(),
            "Delivered"
        ),
        Some(error) => tracing::warn!(
            position,
            total,
            channel = %channel,
            error_type = %error.kind,
            error = %error.message,
            "Not delivered"
        ),
    }
}

/// Build the error for an `ok: false` answer.
fn api_error(code: &str, detail: Option<&str>, retry_after: Option<Duration>) -> DeliveryError {
    let kind = ErrorType::from(code);
    let message = match &kind {
        ErrorType::InvalidArguments => "Slack rejected the message arguments".to_string(),
        ErrorType::RateLimited => "Rate limited by Slack".to_string(),
        ErrorType::NotInChannel => "The bot is not a member of this channel".to_string(),
        ErrorType::IsArchived => "Channel is archived".to_string(),
        _ => format!("Slack API returned error: {code}"),
    };

    let details = match kind {
        ErrorType::InvalidArguments => extract_guidance(detail),
        _ => None,
    };

    DeliveryError::new(kind, message)
        .with_details(details)
        .with_retry_after(retry_after.map(|d| d.as_secs()))
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    messages: Vec<String>,
}

/// Pull readable guidance out of the error response.
///
/// Slack explains `invalid_arguments` in `response_metadata.messages`, e.g.
/// `["[ERROR] must provide at least one of text or blocks [json-pointer:/text]"]`.
/// Anything that isn't such a body is used as-is.
pub fn extract_guidance(detail: Option<&str>) -> Option<String> {
    let detail = detail?.trim();
    if detail.is_empty() {
        return None;
    }

    match serde_json::from_str::<ErrorBody>(detail) {
        Ok(body) => {
            let messages: Vec<String> = body
                .response_metadata
                .map(|meta| meta.messages)
                .unwrap_or_default()
                .iter()
                .map(|m| m.trim_start_matches("[ERROR]").trim().to_string())
                .filter(|m| !m.is_empty())
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        Err(_) => Some(detail.to_string()),
    }
}
