//! Pre-send eligibility check shared by live delivery and dry runs, so a dry
//! run predicts exactly what a live run against the same directory does.

use crate::broadcast::types::{DeliveryError, DeliveryStatus, ErrorType};
use crate::directory::ResolvedChannel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// Worth an attempt
    Deliverable,
    /// Known to fail or be skipped without contacting Slack
    Blocked {
        status: DeliveryStatus,
        error: DeliveryError,
    },
}

pub fn classify(channel: &ResolvedChannel) -> Eligibility {
    if channel.is_archived {
        return Eligibility::Blocked {
            status: DeliveryStatus::Failed,
            error: DeliveryError::new(
                ErrorType::IsArchived,
                format!("{} is archived", channel.display_name()),
            ),
        };
    }

    if channel.is_private && !channel.is_member {
        return Eligibility::Blocked {
            status: DeliveryStatus::Skipped,
            error: DeliveryError::new(
                ErrorType::NotInChannel,
                format!(
                    "{} is private and the bot is not a member",
                    channel.display_name()
                ),
            ),
        };
    }

    Eligibility::Deliverable
}
