//! Broadcast delivery: live sends, dry runs and exit-code mapping

mod classify;
mod dry_run;
pub mod exit_code;
mod orchestrator;
mod pipeline;
mod report;
mod types;

pub use classify::{Eligibility, classify};
pub use dry_run::{DryRunSimulator, MAX_MESSAGE_CHARS, estimate_duration};
pub use orchestrator::{DeliveryOptions, DeliveryOrchestrator, extract_guidance};
pub use pipeline::{BroadcastOutcome, Broadcaster};
pub use report::{render_broadcast, render_dry_run};
pub use types::{
    BroadcastResult, ChannelDeliveryResult, DeliveryError, DeliveryStatus, DryRunResult,
    ErrorType, OverallStatus,
};
