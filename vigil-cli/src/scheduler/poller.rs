//! Job poller
//!
//! Fetches the status of one job repeatedly until it reaches a terminal
//! state, the caller opted out of waiting, or the attempt budget runs out.
//! A failed fetch is logged and counts as an `UNKNOWN`, non-terminal state.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use vigil_client::{BatchApi, ClientError};
use vigil_core::domain::job::{JobName, JobSnapshot, JobState};

use crate::materialize::Materializer;

/// Default pause between two status checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Source of delays between polls
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real clock backed by the tokio timer
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// How the poller waits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Fixed pause between checks
    pub interval: Duration,
    /// Upper bound on status fetches; `None` polls until a terminal state
    pub max_attempts: Option<u32>,
    /// Keep polling while the job is not finished
    pub wait: bool,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
            wait: false,
        }
    }
}

impl PollPolicy {
    /// Whether the attempt budget is used up after `attempts` fetches
    fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

/// How a poll run ended
#[derive(Debug)]
pub enum PollOutcome {
    /// Job succeeded; `content` holds the downloaded results, if any
    Succeeded {
        snapshot: JobSnapshot,
        content: Option<Vec<u8>>,
    },
    /// Job reached a terminal state other than success
    Finished { snapshot: JobSnapshot },
    /// Job not finished and the caller did not ask to wait
    StillRunning { snapshot: JobSnapshot },
    /// Attempt budget ran out before the job finished
    Exhausted { snapshot: JobSnapshot, attempts: u32 },
}

/// Polls a single batch job
pub struct JobPoller {
    api: Arc<dyn BatchApi>,
    clock: Arc<dyn Clock>,
    policy: PollPolicy,
    materializer: Option<Materializer>,
}

impl JobPoller {
    /// Creates a new job poller
    ///
    /// Without a materializer, succeeded jobs are reported but not
    /// downloaded.
    pub fn new(
        api: Arc<dyn BatchApi>,
        clock: Arc<dyn Clock>,
        policy: PollPolicy,
        materializer: Option<Materializer>,
    ) -> Self {
        Self {
            api,
            clock,
            policy,
            materializer,
        }
    }

    /// Runs the polling loop for `name`
    pub async fn run(&self, name: &JobName) -> PollOutcome {
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let snapshot = self.fetch(name).await;
            info!("Job {} state: {}", name, snapshot.raw_state);

            match snapshot.state {
                JobState::Succeeded => {
                    let content = match &self.materializer {
                        Some(materializer) => {
                            materializer.materialize(self.api.as_ref(), &snapshot).await
                        }
                        None => None,
                    };
                    return PollOutcome::Succeeded { snapshot, content };
                }
                state if state.is_terminal() => {
                    warn!("Job {} ended with state {}", name, snapshot.raw_state);
                    if let Some(reason) = &snapshot.error {
                        warn!("Reason: {}", reason);
                    }
                    return PollOutcome::Finished { snapshot };
                }
                _ => {
                    if !self.policy.wait {
                        info!("Job {} is not finished yet (use --wait to keep polling)", name);
                        return PollOutcome::StillRunning { snapshot };
                    }

                    if self.policy.exhausted(attempts) {
                        warn!("Giving up on job {} after {} checks", name, attempts);
                        return PollOutcome::Exhausted { snapshot, attempts };
                    }

                    info!("Checking again in {:?}", self.policy.interval);
                    self.clock.sleep(self.policy.interval).await;
                }
            }
        }
    }

    /// Performs a single status fetch, degrading errors to `UNKNOWN`
    async fn fetch(&self, name: &JobName) -> JobSnapshot {
        match self.api.get_batch(name).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Status of job {} {}: {}", name, fetch_failure(&e), e);
                JobSnapshot::unknown(name)
            }
        }
    }
}

/// Short operator-facing reason for a failed status fetch
fn fetch_failure(e: &ClientError) -> &'static str {
    if e.is_not_found() {
        "unavailable, job was not found"
    } else if e.is_unauthorized() {
        "unavailable, the API key was rejected (check GOOGLE_API_KEY)"
    } else {
        "could not be fetched"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeApi, FakeClock, Scripted, snapshot};

    fn name() -> JobName {
        JobName::new("batches/test").unwrap()
    }

    fn poller(
        api: &Arc<FakeApi>,
        clock: &Arc<FakeClock>,
        policy: PollPolicy,
        materializer: Option<Materializer>,
    ) -> JobPoller {
        JobPoller::new(api.clone(), clock.clone(), policy, materializer)
    }

    fn waiting() -> PollPolicy {
        PollPolicy {
            wait: true,
            ..PollPolicy::default()
        }
    }

    #[tokio::test]
    async fn test_succeeded_materializes_once_and_stops() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("batch_results.jsonl");
        let api = Arc::new(
            FakeApi::new(vec![snapshot("succeeded", Some("files/out"))])
                .with_download(b"{\"a\":1}\n"),
        );
        let clock = Arc::new(FakeClock::default());

        let outcome = poller(&api, &clock, waiting(), Some(Materializer::new(&results)))
            .run(&name())
            .await;

        match outcome {
            PollOutcome::Succeeded { content, .. } => {
                assert_eq!(content.as_deref(), Some(&b"{\"a\":1}\n"[..]));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(api.gets(), 1);
        assert_eq!(api.downloads(), 1);
        assert!(clock.sleeps().is_empty());
        assert_eq!(std::fs::read(&results).unwrap(), b"{\"a\":1}\n");
    }

    #[tokio::test]
    async fn test_active_without_wait_fetches_once() {
        let api = Arc::new(FakeApi::new(vec![snapshot("active", None)]));
        let clock = Arc::new(FakeClock::default());

        let outcome = poller(&api, &clock, PollPolicy::default(), None)
            .run(&name())
            .await;

        assert!(matches!(outcome, PollOutcome::StillRunning { .. }));
        assert_eq!(api.gets(), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_waits_with_fixed_interval_until_terminal() {
        let api = Arc::new(FakeApi::new(vec![
            snapshot("JOB_STATE_PENDING", None),
            snapshot("JOB_STATE_RUNNING", None),
            snapshot("JOB_STATE_SUCCEEDED", Some("files/out")),
        ]));
        let clock = Arc::new(FakeClock::default());

        let outcome = poller(&api, &clock, waiting(), None).run(&name()).await;

        assert!(matches!(outcome, PollOutcome::Succeeded { content: None, .. }));
        assert_eq!(api.gets(), 3);
        assert_eq!(api.downloads(), 0);
        assert_eq!(clock.sleeps(), vec![DEFAULT_POLL_INTERVAL; 2]);
    }

    #[tokio::test]
    async fn test_failed_job_finishes_without_download() {
        let api = Arc::new(FakeApi::new(vec![snapshot("JOB_STATE_FAILED", None)]));
        let clock = Arc::new(FakeClock::default());
        let dir = tempfile::tempdir().unwrap();

        let outcome = poller(
            &api,
            &clock,
            waiting(),
            Some(Materializer::new(dir.path().join("out.jsonl"))),
        )
        .run(&name())
        .await;

        match outcome {
            PollOutcome::Finished { snapshot } => assert_eq!(snapshot.state, JobState::Failed),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(api.downloads(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_job_finishes() {
        let api = Arc::new(FakeApi::new(vec![snapshot("JOB_STATE_CANCELLED", None)]));
        let clock = Arc::new(FakeClock::default());

        let outcome = poller(&api, &clock, waiting(), None).run(&name()).await;

        assert!(matches!(outcome, PollOutcome::Finished { .. }));
        assert_eq!(api.gets(), 1);
    }

    #[tokio::test]
    async fn test_fetch_error_is_non_terminal() {
        let api = Arc::new(FakeApi::new(vec![
            Scripted::Fails(503),
            snapshot("succeeded", None),
        ]));
        let clock = Arc::new(FakeClock::default());

        let outcome = poller(&api, &clock, waiting(), None).run(&name()).await;

        assert!(matches!(outcome, PollOutcome::Succeeded { .. }));
        assert_eq!(api.gets(), 2);
        assert_eq!(clock.sleeps().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_error_without_wait_reports_unknown() {
        let api = Arc::new(FakeApi::new(vec![Scripted::Fails(404)]));
        let clock = Arc::new(FakeClock::default());

        let outcome = poller(&api, &clock, PollPolicy::default(), None)
            .run(&name())
            .await;

        match outcome {
            PollOutcome::StillRunning { snapshot } => {
                assert_eq!(snapshot.state, JobState::Unknown);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(api.gets(), 1);
    }

    #[tokio::test]
    async fn test_rejected_key_degrades_to_unknown() {
        let api = Arc::new(FakeApi::new(vec![Scripted::Fails(401)]));
        let clock = Arc::new(FakeClock::default());

        let outcome = poller(&api, &clock, PollPolicy::default(), None)
            .run(&name())
            .await;

        match outcome {
            PollOutcome::StillRunning { snapshot } => {
                assert_eq!(snapshot.state, JobState::Unknown);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_fetch_failure_reasons() {
        assert!(fetch_failure(&ClientError::api_error(404, "gone")).contains("not found"));
        assert!(fetch_failure(&ClientError::api_error(401, "bad key")).contains("GOOGLE_API_KEY"));
        assert!(fetch_failure(&ClientError::api_error(403, "denied")).contains("API key"));
        assert_eq!(
            fetch_failure(&ClientError::api_error(503, "busy")),
            "could not be fetched"
        );
    }

    #[tokio::test]
    async fn test_max_attempts_bounds_the_loop() {
        let api = Arc::new(FakeApi::new(vec![snapshot("active", None)]));
        let clock = Arc::new(FakeClock::default());
        let policy = PollPolicy {
            interval: Duration::from_secs(2),
            max_attempts: Some(3),
            wait: true,
        };

        let outcome = poller(&api, &clock, policy, None).run(&name()).await;

        assert!(matches!(outcome, PollOutcome::Exhausted { attempts: 3, .. }));
        assert_eq!(api.gets(), 3);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(2); 2]);
    }

    #[tokio::test]
    async fn test_success_without_output_reference() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("out.jsonl");
        let api = Arc::new(FakeApi::new(vec![snapshot("succeeded", None)]));
        let clock = Arc::new(FakeClock::default());

        let outcome = poller(&api, &clock, waiting(), Some(Materializer::new(&results)))
            .run(&name())
            .await;

        assert!(matches!(outcome, PollOutcome::Succeeded { content: None, .. }));
        assert_eq!(api.downloads(), 0);
        assert!(!results.exists());
    }

    #[tokio::test]
    async fn test_download_failure_is_soft() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("out.jsonl");
        let api = Arc::new(
            FakeApi::new(vec![snapshot("succeeded", Some("files/out"))]).with_failing_download(),
        );
        let clock = Arc::new(FakeClock::default());

        let outcome = poller(&api, &clock, waiting(), Some(Materializer::new(&results)))
            .run(&name())
            .await;

        assert!(matches!(outcome, PollOutcome::Succeeded { content: None, .. }));
        assert_eq!(api.downloads(), 1);
        assert!(!results.exists());
    }

    #[tokio::test]
    async fn test_write_failure_is_soft() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be overwritten as a file
        let api = Arc::new(FakeApi::new(vec![snapshot("succeeded", Some("files/out"))]));
        let clock = Arc::new(FakeClock::default());

        let outcome = poller(
            &api,
            &clock,
            waiting(),
            Some(Materializer::new(dir.path())),
        )
        .run(&name())
        .await;

        assert!(matches!(outcome, PollOutcome::Succeeded { content: None, .. }));
        assert_eq!(api.downloads(), 1);
    }
}
