//! Process exit codes
//!
//! | code | meaning |
//! |------|---------|
//! | 0 | every channel received the message |
//! | 1 | partial delivery, or every failure was a content/validation problem |
//! | 2 | nothing delivered because of operational failures |
//! | 3 | configuration error before any channel was attempted |
//! | 4 | Slack unreachable or directory unavailable before any channel was attempted |
//! | 5 | result with an unrecognized status |

use crate::broadcast::types::{BroadcastResult, DeliveryStatus, OverallStatus};
use crate::error::BroadcastError;

pub const SUCCESS: i32 = 0;
pub const PARTIAL_OR_INPUT: i32 = 1;
pub const FAILED: i32 = 2;
pub const CONFIG_ERROR: i32 = 3;
pub const PREFLIGHT_ERROR: i32 = 4;
pub const UNKNOWN_STATUS: i32 = 5;

/// True when there is at least one failed delivery and all of them were
/// rejected for their content.
fn all_failures_are_validation(result: &BroadcastResult) -> bool {
    let mut failures = result
        .delivery_results
        .iter()
        .filter(|r| r.status == DeliveryStatus::Failed)
        .peekable();

    failures.peek().is_some()
        && failures.all(|r| r.error_type().is_some_and(|kind| kind.is_validation_class()))
}

pub fn resolve(result: &BroadcastResult) -> i32 {
    match result.overall_status {
        OverallStatus::Success => SUCCESS,
        OverallStatus::Partial | OverallStatus::Failed if all_failures_are_validation(result) => {
            PARTIAL_OR_INPUT
        }
        OverallStatus::Partial => PARTIAL_OR_INPUT,
        OverallStatus::Failed => FAILED,
        OverallStatus::Unknown => UNKNOWN_STATUS,
    }
}

/// Exit code for an error that aborted the run before delivery started.
pub fn for_error(error: &BroadcastError) -> i32 {
    if error.is_config_error() {
        CONFIG_ERROR
    } else {
        PREFLIGHT_ERROR
    }
}
