//! Plain-text reports for the terminal

use crate::broadcast::types::{BroadcastResult, DeliveryStatus, DryRunResult};
use crate::mention::ResolutionSummary;

fn status_marker(status: DeliveryStatus) -> &'static str {
    match status {
        DeliveryStatus::Success => "✓",
        DeliveryStatus::Failed => "✗",
        DeliveryStatus::Skipped => "-",
    }
}

/// Format a finished broadcast
pub fn render_broadcast(result: &BroadcastResult, summary: &ResolutionSummary) -> String {
    let mut lines = vec![format!(
        "Broadcast to '{}': {} ({} channels)",
        result.target_list_name, result.overall_status, result.total_channels
    )];
    lines.extend(summary.lines());
    lines.push(String::new());

    for delivery in &result.delivery_results {
        let mut line = format!(
            "  {} {}",
            status_marker(delivery.status),
            delivery.channel.display_name()
        );
        match (&delivery.message_id, &delivery.error) {
            (Some(ts), _) => line.push_str(&format!(" (ts {ts})")),
            (None, Some(error)) => {
                line.push_str(&format!(" [{}] {}", error.kind, error.message));
                if let Some(details) = &error.details {
                    line.push_str(&format!(": {details}"));
                }
                if let Some(secs) = error.retry_after {
                    line.push_str(&format!(" (retry after {secs}s)"));
                }
            }
            (None, None) => {}
        }
        lines.push(line);
    }

    lines.push(String::new());
    lines.push(format!(
        "Delivered: {}  Failed: {}  Skipped: {}",
        result.count(DeliveryStatus::Success),
        result.count(DeliveryStatus::Failed),
        result.count(DeliveryStatus::Skipped)
    ));
    lines.join("\n")
}

/// Format a dry-run prediction
pub fn render_dry_run(result: &DryRunResult, summary: &ResolutionSummary) -> String {
    let mut lines = vec![format!(
        "Dry run for '{}' ({} channels)",
        result.target_list_name,
        result.channels.len()
    )];
    lines.extend(summary.lines());
    lines.push(String::new());

    for channel in &result.channels {
        lines.push(format!("  {} ({})", channel.display_name(), channel.id));
    }

    lines.push(String::new());
    lines.push(format!(
        "Would succeed: {}  Would fail: {}  Would skip: {}",
        result.would_succeed, result.would_fail, result.would_skip
    ));
    lines.push(format!("Estimated duration: {}", result.estimated_duration));

    if !result.warnings.is_empty() {
        lines.push("Warnings:".to_string());
        lines.extend(result.warnings.iter().map(|w| format!("  ! {w}")));
    }

    lines.push(String::new());
    lines.push("Message preview:".to_string());
    lines.push(result.message.clone());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::types::{ChannelDeliveryResult, DeliveryError, ErrorType};
    use crate::directory::ResolvedChannel;
    use crate::slack::ChannelId;
    use chrono::Utc;

    fn channel(id: &str, name: &str) -> ResolvedChannel {
        ResolvedChannel {
            id: ChannelId::new(id),
            name: name.to_string(),
            is_private: false,
            is_member: true,
            is_archived: false,
        }
    }

    #[test]
    fn test_render_broadcast() {
        let result = BroadcastResult::new(
            "weekly",
            vec![
                ChannelDeliveryResult::succeeded(channel("C1", "general"), "1700.0001", Utc::now()),
                ChannelDeliveryResult::failed(
                    channel("C2", "dev"),
                    DeliveryError::new(ErrorType::InvalidArguments, "Slack rejected the message arguments")
                        .with_details(Some("missing text".to_string())),
                ),
            ],
            Utc::now(),
        );

        let text = render_broadcast(&result, &ResolutionSummary::default());

        assert!(text.starts_with("Broadcast to 'weekly': partial (2 channels)"));
        assert!(text.contains("Placeholders: none"));
        assert!(text.contains("✓ #general (ts 1700.0001)"));
        assert!(text.contains("✗ #dev [invalid_arguments] Slack rejected the message arguments: missing text"));
        assert!(text.ends_with("Delivered: 1  Failed: 1  Skipped: 0"));
    }

    #[test]
    fn test_render_dry_run_lists_warnings() {
        let result = DryRunResult {
            target_list_name: "weekly".to_string(),
            channels: vec![channel("C1", "general")],
            message: "hello".to_string(),
            would_succeed: 0,
            would_fail: 1,
            would_skip: 0,
            warnings: vec!["#general: #general is archived (is_archived)".to_string()],
            estimated_duration: "0 seconds".to_string(),
        };

        let text = render_dry_run(&result, &ResolutionSummary::default());

        assert!(text.contains("Would succeed: 0  Would fail: 1  Would skip: 0"));
        assert!(text.contains("  ! #general: #general is archived (is_archived)"));
        assert!(text.ends_with("Message preview:\nhello"));
    }
}
