//! Delivery outcome types

use crate::directory::ResolvedChannel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure classification for one channel. Unrecognized Slack codes are kept
/// verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorType {
    IsArchived,
    NotInChannel,
    InvalidArguments,
    NetworkError,
    RateLimited,
    Unknown,
    Other(String),
}

impl ErrorType {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorType::IsArchived => "is_archived",
            ErrorType::NotInChannel => "not_in_channel",
            ErrorType::InvalidArguments => "invalid_arguments",
            ErrorType::NetworkError => "network_error",
            ErrorType::RateLimited => "rate_limited",
            ErrorType::Unknown => "unknown",
            ErrorType::Other(code) => code,
        }
    }

    /// Failures caused by the message content rather than the infrastructure.
    pub fn is_validation_class(&self) -> bool {
        match self {
            ErrorType::InvalidArguments => true,
            other => other.as_str().to_ascii_lowercase().contains("validation"),
        }
    }
}

impl From<String> for ErrorType {
    fn from(code: String) -> Self {
        match code.as_str() {
            "is_archived" => ErrorType::IsArchived,
            "not_in_channel" => ErrorType::NotInChannel,
            "invalid_arguments" => ErrorType::InvalidArguments,
            "network_error" => ErrorType::NetworkError,
            "rate_limited" | "ratelimited" => ErrorType::RateLimited,
            "" | "unknown" => ErrorType::Unknown,
            _ => ErrorType::Other(code),
        }
    }
}

impl From<&str> for ErrorType {
    fn from(code: &str) -> Self {
        ErrorType::from(code.to_string())
    }
}

impl From<ErrorType> for String {
    fn from(kind: ErrorType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryError {
    #[serde(rename = "type")]
    pub kind: ErrorType,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Seconds Slack asked us to wait
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl DeliveryError {
    pub fn new(kind: ErrorType, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            retry_after: None,
        }
    }

    pub fn with_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }

    pub fn with_retry_after(mut self, secs: Option<u64>) -> Self {
        self.retry_after = secs;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Success,
    Failed,
    Skipped,
}

/// Outcome for one channel. Build through [`ChannelDeliveryResult::succeeded`],
/// [`ChannelDeliveryResult::failed`] or [`ChannelDeliveryResult::skipped`] so a
/// success always has a message id and a failure always has an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDeliveryResult {
    pub channel: ResolvedChannel,
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<DeliveryError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
}

impl ChannelDeliveryResult {
    pub fn succeeded(
        channel: ResolvedChannel,
        message_id: impl Into<String>,
        delivered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            channel,
            status: DeliveryStatus::Success,
            message_id: Some(message_id.into()),
            error: None,
            delivered_at: Some(delivered_at),
        }
    }

    pub fn failed(channel: ResolvedChannel, error: DeliveryError) -> Self {
        Self::unsuccessful(channel, DeliveryStatus::Failed, error)
    }

    pub fn skipped(channel: ResolvedChannel, error: DeliveryError) -> Self {
        Self::unsuccessful(channel, DeliveryStatus::Skipped, error)
    }

    pub(crate) fn unsuccessful(
        channel: ResolvedChannel,
        status: DeliveryStatus,
        error: DeliveryError,
    ) -> Self {
        Self {
            channel,
            status,
            message_id: None,
            error: Some(error),
            delivered_at: None,
        }
    }

    pub fn error_type(&self) -> Option<&ErrorType> {
        self.error.as_ref().map(|e| &e.kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Success,
    Partial,
    Failed,
    /// Only reachable from a deserialized result written by something else
    #[serde(other)]
    Unknown,
}

impl OverallStatus {
    /// `success` when every channel succeeded, `failed` when none did.
    /// An empty broadcast delivered nothing and counts as failed.
    pub fn from_results(results: &[ChannelDeliveryResult]) -> Self {
        let succeeded = results
            .iter()
            .filter(|r| r.status == DeliveryStatus::Success)
            .count();

        if succeeded == 0 {
            OverallStatus::Failed
        } else if succeeded == results.len() {
            OverallStatus::Success
        } else {
            OverallStatus::Partial
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OverallStatus::Success => "success",
            OverallStatus::Partial => "partial",
            OverallStatus::Failed => "failed",
            OverallStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResult {
    pub target_list_name: String,
    pub total_channels: usize,
    pub delivery_results: Vec<ChannelDeliveryResult>,
    pub overall_status: OverallStatus,
    pub completed_at: DateTime<Utc>,
}

impl BroadcastResult {
    pub fn new(
        target_list_name: impl Into<String>,
        delivery_results: Vec<ChannelDeliveryResult>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            target_list_name: target_list_name.into(),
            total_channels: delivery_results.len(),
            overall_status: OverallStatus::from_results(&delivery_results),
            delivery_results,
            completed_at,
        }
    }

    pub fn count(&self, status: DeliveryStatus) -> usize {
        self.delivery_results
            .iter()
            .filter(|r| r.status == status)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DryRunResult {
    pub target_list_name: String,
    pub channels: Vec<ResolvedChannel>,
    pub message: String,
    pub would_succeed: usize,
    pub would_fail: usize,
    pub would_skip: usize,
    pub warnings: Vec<String>,
    pub estimated_duration: String,
}
