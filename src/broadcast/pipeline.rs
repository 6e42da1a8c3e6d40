//! End-to-end broadcast: mentions, directory, then delivery or simulation

use crate::broadcast::dry_run::DryRunSimulator;
use crate::broadcast::orchestrator::{DeliveryOptions, DeliveryOrchestrator};
use crate::broadcast::types::{BroadcastResult, DryRunResult};
use crate::config::{BroadcastConfig, BroadcastSettings};
use crate::directory::ChannelDirectory;
use crate::error::Result;
use crate::logging::{Logger, Timer};
use crate::mention::{self, ResolutionSummary};
use crate::slack::MessagingBoundary;
use std::sync::Arc;
use tracing::Instrument;

#[derive(Debug, Clone)]
pub enum BroadcastOutcome {
    Delivered {
        result: BroadcastResult,
        summary: ResolutionSummary,
    },
    Simulated {
        result: DryRunResult,
        summary: ResolutionSummary,
    },
}

impl BroadcastOutcome {
    pub fn summary(&self) -> &ResolutionSummary {
        match self {
            BroadcastOutcome::Delivered { summary, .. } => summary,
            BroadcastOutcome::Simulated { summary, .. } => summary,
        }
    }
}

pub struct Broadcaster {
    boundary: Arc<dyn MessagingBoundary>,
    config: BroadcastConfig,
    settings: BroadcastSettings,
}

impl Broadcaster {
    pub fn new(
        boundary: Arc<dyn MessagingBoundary>,
        config: BroadcastConfig,
        settings: BroadcastSettings,
    ) -> Self {
        Self {
            boundary,
            config,
            settings,
        }
    }

    /// Send `message` to the channel list `list_name`, or only predict the
    /// outcome when `dry_run` is set.
    ///
    /// Errors only when the run cannot start: unknown list or directory fetch
    /// failure. A list with no channel left after resolution still runs and
    /// comes back `failed` with no deliveries.
    pub async fn run(
        &self,
        list_name: &str,
        message: &str,
        dry_run: bool,
    ) -> Result<BroadcastOutcome> {
        let logger = Logger::for_broadcast(list_name, dry_run);
        let span = logger.span().clone();
        self.run_inner(logger, list_name, message, dry_run)
            .instrument(span)
            .await
    }

    async fn run_inner(
        &self,
        logger: Logger,
        list_name: &str,
        message: &str,
        dry_run: bool,
    ) -> Result<BroadcastOutcome> {
        let _timer = Timer::new("broadcast");
        let list = self.config.list(list_name)?;

        let (text, summary) = self.resolve_mentions(message);
        for line in summary.lines() {
            tracing::info!("{}", line);
        }

        let directory = ChannelDirectory::new(logger.component("directory"));
        let snapshot = directory.fetch_snapshot(self.boundary.as_ref()).await?;
        let channels = directory.resolve(&list.channels, &snapshot);
        if channels.is_empty() {
            tracing::warn!(
                requested = list.channels.len(),
                "None of the list's channels were found in the directory"
            );
        }
        tracing::info!(
            requested = list.channels.len(),
            resolved = channels.len(),
            "Resolved channel list"
        );

        if dry_run {
            let simulator =
                DryRunSimulator::new(self.settings.pacing, logger.component("dry_run"));
            let result = simulator.simulate(list_name, &channels, &text);
            return Ok(BroadcastOutcome::Simulated { result, summary });
        }

        let orchestrator = DeliveryOrchestrator::new(
            self.boundary.clone(),
            DeliveryOptions {
                pacing: self.settings.pacing,
                request_timeout: self.settings.request_timeout,
            },
            logger.component("delivery"),
        )
        .with_identity(self.config.sender.clone());

        let result = orchestrator.deliver(list_name, &channels, &text).await;
        Ok(BroadcastOutcome::Delivered { result, summary })
    }

    /// A broken mapping disables substitution; the message still goes out as
    /// written.
    fn resolve_mentions(&self, message: &str) -> (String, ResolutionSummary) {
        match self.config.mention_mapping() {
            Ok(mapping) => {
                let resolution = mention::resolve(message, &mapping);
                (resolution.text, resolution.summary)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Mention mapping unusable, sending message without substitution"
                );
                (message.to_string(), ResolutionSummary::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::exit_code;
    use crate::broadcast::types::{DeliveryStatus, OverallStatus};
    use crate::error::BroadcastError;
    use crate::slack::ChannelListing;
    use crate::slack::fake::{FakeBoundary, listing};
    use std::time::Duration;

    const CONFIG: &str = r##"
mentions:
  alice: U111AAA
  team: { id: S999TEAM, type: team }
channel_lists:
  - name: weekly
    channels: ["#general", "#archive", "#secret", "C0000000001", "#missing"]
sender:
  name: Release Bot
"##;

    fn settings() -> BroadcastSettings {
        BroadcastSettings {
            pacing: Duration::ZERO,
            request_timeout: Duration::from_secs(1),
            ..Default::default()
        }
    }

    fn directory() -> Vec<Vec<ChannelListing>> {
        let mut archived = listing("C0000000002", "archive");
        archived.is_archived = true;
        let mut secret = listing("C0000000003", "secret");
        secret.is_private = true;
        secret.is_member = false;

        vec![
            vec![listing("C0000000001", "general"), archived],
            vec![secret, listing("C0000000004", "random")],
        ]
    }

    fn broadcaster(boundary: Arc<FakeBoundary>, config: &str) -> Broadcaster {
        Broadcaster::new(
            boundary,
            BroadcastConfig::from_yaml_str(config).unwrap(),
            settings(),
        )
    }

    #[tokio::test]
    async fn test_live_run() {
        let boundary = Arc::new(FakeBoundary::default().with_pages(directory()));
        let outcome = broadcaster(boundary.clone(), CONFIG)
            .run("weekly", "Ship it @{alice} @team ", false)
            .await
            .unwrap();

        let BroadcastOutcome::Delivered { result, summary } = outcome else {
            panic!("expected a live delivery");
        };

        // #general and C0000000001 collapse to one channel, #missing is dropped
        assert_eq!(result.total_channels, 3);
        assert_eq!(result.overall_status, OverallStatus::Partial);
        assert_eq!(summary.total_replacements, 2);

        let posted = boundary.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].text, "Ship it <@U111AAA> <!subteam^S999TEAM> ");
        assert_eq!(
            posted[0].identity.as_ref().unwrap().name.as_deref(),
            Some("Release Bot")
        );
    }

    #[tokio::test]
    async fn test_dry_run_matches_live_classification() {
        let dry_boundary = Arc::new(FakeBoundary::default().with_pages(directory()));
        let live_boundary = Arc::new(FakeBoundary::default().with_pages(directory()));

        let dry = broadcaster(dry_boundary.clone(), CONFIG)
            .run("weekly", "hello", true)
            .await
            .unwrap();
        let live = broadcaster(live_boundary, CONFIG)
            .run("weekly", "hello", false)
            .await
            .unwrap();

        let (BroadcastOutcome::Simulated { result: dry, .. }, BroadcastOutcome::Delivered { result: live, .. }) =
            (dry, live)
        else {
            panic!("unexpected outcome kinds");
        };

        assert!(dry_boundary.posted().is_empty());
        assert_eq!(dry.would_succeed, live.count(DeliveryStatus::Success));
        assert_eq!(dry.would_skip, live.count(DeliveryStatus::Skipped));
        assert_eq!(dry.would_fail, live.count(DeliveryStatus::Failed));
        assert_eq!(dry.channels.len(), live.total_channels);
    }

    #[tokio::test]
    async fn test_broken_mapping_sends_original_text() {
        let config = r##"
mentions:
  alice: { type: user }
channel_lists:
  - name: weekly
    channels: ["#general"]
"##;
        let boundary = Arc::new(FakeBoundary::default().with_pages(directory()));
        let outcome = broadcaster(boundary.clone(), config)
            .run("weekly", "hi @alice", false)
            .await
            .unwrap();

        assert!(!outcome.summary().had_placeholders);
        assert_eq!(boundary.posted()[0].text, "hi @alice");
    }

    #[tokio::test]
    async fn test_directory_failure_aborts_before_sending() {
        let boundary = Arc::new(FakeBoundary::default().with_listing_error("invalid_auth"));
        let err = broadcaster(boundary.clone(), CONFIG)
            .run("weekly", "hello", false)
            .await
            .unwrap_err();

        assert!(matches!(err, BroadcastError::SlackApi(_)));
        assert!(boundary.posted().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_list() {
        let boundary = Arc::new(FakeBoundary::default().with_pages(directory()));
        let err = broadcaster(boundary.clone(), CONFIG)
            .run("monthly", "hello", false)
            .await
            .unwrap_err();

        assert!(matches!(err, BroadcastError::UnknownList(_)));
        assert_eq!(boundary.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_no_resolvable_channels_is_failed_result() {
        let config = "channel_lists:\n  - {name: weekly, channels: ['#nowhere']}\n";
        let boundary = Arc::new(FakeBoundary::default().with_pages(directory()));
        let outcome = broadcaster(boundary.clone(), config)
            .run("weekly", "hello", false)
            .await
            .unwrap();

        let BroadcastOutcome::Delivered { result, .. } = outcome else {
            panic!("expected a live delivery");
        };
        assert_eq!(result.total_channels, 0);
        assert_eq!(result.overall_status, OverallStatus::Failed);
        assert_eq!(exit_code::resolve(&result), exit_code::FAILED);
        assert!(boundary.posted().is_empty());
    }

    #[tokio::test]
    async fn test_no_resolvable_channels_dry_run() {
        let config = "channel_lists:\n  - {name: weekly, channels: ['#nowhere']}\n";
        let boundary = Arc::new(FakeBoundary::default().with_pages(directory()));
        let outcome = broadcaster(boundary, config)
            .run("weekly", "hello", true)
            .await
            .unwrap();

        let BroadcastOutcome::Simulated { result, .. } = outcome else {
            panic!("expected a dry run");
        };
        assert!(result.channels.is_empty());
        assert_eq!(result.would_succeed + result.would_fail + result.would_skip, 0);
    }
}
