//! Predict a broadcast without posting anything

use crate::broadcast::classify::{Eligibility, classify};
use crate::broadcast::types::{DeliveryStatus, DryRunResult};
use crate::directory::ResolvedChannel;
use crate::logging::Logger;
use std::time::Duration;

/// Slack truncates `chat.postMessage` text beyond this many characters
pub const MAX_MESSAGE_CHARS: usize = 40_000;

pub struct DryRunSimulator {
    /// Same per-channel pacing the live orchestrator uses
    pacing: Duration,
    logger: Logger,
}

impl DryRunSimulator {
    pub fn new(pacing: Duration, logger: Logger) -> Self {
        Self { pacing, logger }
    }

    pub fn simulate(
        &self,
        list_name: &str,
        channels: &[ResolvedChannel],
        text: &str,
    ) -> DryRunResult {
        self.logger.in_scope(|| {
            let mut result = DryRunResult {
                target_list_name: list_name.to_string(),
                channels: channels.to_vec(),
                message: text.to_string(),
                would_succeed: 0,
                would_fail: 0,
                would_skip: 0,
                warnings: Vec::new(),
                estimated_duration: String::new(),
            };

            if let Some(warning) = message_problem(text, channels.len()) {
                tracing::warn!(warning = %warning, "Dry run: message would be rejected");
                result.would_fail = channels.len();
                result.warnings.push(warning);
                result.estimated_duration = estimate_duration(0, self.pacing);
                return result;
            }

            for channel in channels {
                match classify(channel) {
                    Eligibility::Deliverable => result.would_succeed += 1,
                    Eligibility::Blocked { status, error } => {
                        match status {
                            DeliveryStatus::Skipped => result.would_skip += 1,
                            _ => result.would_fail += 1,
                        }
                        result
                            .warnings
                            .push(format!("{}: {} ({})", channel.display_name(), error.message, error.kind));
                    }
                }
            }

            result.estimated_duration = estimate_duration(result.would_succeed, self.pacing);
            tracing::info!(
                would_succeed = result.would_succeed,
                would_fail = result.would_fail,
                would_skip = result.would_skip,
                "Dry run complete"
            );
            result
        })
    }
}

/// Problems with the message itself that would fail every channel.
fn message_problem(text: &str, channel_count: usize) -> Option<String> {
    if text.trim().is_empty() {
        return Some(format!(
            "Message is empty; all {channel_count} channel(s) would fail"
        ));
    }

    let length = text.chars().count();
    if length > MAX_MESSAGE_CHARS {
        return Some(format!(
            "Message is {length} characters, over the {MAX_MESSAGE_CHARS} character limit; \
             all {channel_count} channel(s) would fail"
        ));
    }

    None
}

/// Rough wall-clock range for `deliveries` sends at `pacing` each. The upper
/// bound allows one more pacing interval per send for request latency.
pub fn estimate_duration(deliveries: usize, pacing: Duration) -> String {
    if deliveries == 0 {
        return "0 seconds".to_string();
    }

    let min = pacing.as_secs_f64() * deliveries as f64;
    let max = min * 2.0;

    if max < 1.0 {
        "less than a second".to_string()
    } else if max < 60.0 {
        format!("{}-{} seconds", min.ceil() as u64, max.ceil() as u64)
    } else if max < 3600.0 {
        format!(
            "{}-{} minutes",
            (min / 60.0).ceil() as u64,
            (max / 60.0).ceil() as u64
        )
    } else {
        format!("{:.1}-{:.1} hours", min / 3600.0, max / 3600.0)
    }
}
