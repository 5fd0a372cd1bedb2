//! In-memory fakes shared by the CLI unit tests

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use vigil_client::{BatchApi, ClientError, Result};
use vigil_core::domain::job::{JobName, JobSnapshot, JobState, OutputRef};
use vigil_core::dto::batch::{CreateBatchRequest, CreatedBatch};

use crate::scheduler::Clock;

/// One scripted answer to a status fetch
#[derive(Debug, Clone)]
pub enum Scripted {
    State(JobSnapshot),
    /// Fetch fails with this HTTP status
    Fails(u16),
}

/// Build a snapshot in `state`, with an output reference when given
pub fn snapshot(state: &str, output: Option<&str>) -> Scripted {
    Scripted::State(JobSnapshot {
        name: "batches/test".to_string(),
        state: JobState::from_remote(state),
        raw_state: state.to_string(),
        output: output.and_then(OutputRef::new),
        error: None,
    })
}

/// Batch API fake that replays scripted statuses
///
/// Once the script runs out, the last entry repeats.
pub struct FakeApi {
    script: Vec<Scripted>,
    download: Option<Vec<u8>>,
    created: Mutex<Vec<(String, usize)>>,
    get_calls: AtomicUsize,
    download_calls: AtomicUsize,
}

impl FakeApi {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script,
            download: Some(b"{\"ok\":true}\n".to_vec()),
            created: Mutex::new(Vec::new()),
            get_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
        }
    }

    /// Make downloads fail with a server error
    pub fn with_failing_download(mut self) -> Self {
        self.download = None;
        self
    }

    pub fn with_download(mut self, content: &[u8]) -> Self {
        self.download = Some(content.to_vec());
        self
    }

    pub fn gets(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn downloads(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }

    /// `(model, request count)` for every create call
    pub fn created(&self) -> Vec<(String, usize)> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl BatchApi for FakeApi {
    async fn create_batch(&self, model: &str, req: &CreateBatchRequest) -> Result<CreatedBatch> {
        self.created.lock().unwrap().push((
            model.to_string(),
            req.batch.input_config.requests.requests.len(),
        ));
        Ok(CreatedBatch {
            name: "batches/created".to_string(),
        })
    }

    async fn get_batch(&self, _name: &JobName) -> Result<JobSnapshot> {
        let call = self.get_calls.fetch_add(1, Ordering::SeqCst);
        let index = call.min(self.script.len().saturating_sub(1));
        match self.script.get(index) {
            Some(Scripted::State(snapshot)) => Ok(snapshot.clone()),
            Some(Scripted::Fails(status)) => Err(ClientError::api_error(*status, "scripted")),
            None => Err(ClientError::api_error(404, "no script")),
        }
    }

    async fn download_file(&self, _output: &OutputRef) -> Result<Vec<u8>> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        self.download
            .clone()
            .ok_or_else(|| ClientError::api_error(500, "download failed"))
    }
}

/// Clock that records requested sleeps and returns immediately
#[derive(Default)]
pub struct FakeClock {
    sleeps: Mutex<Vec<Duration>>,
}

impl FakeClock {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for FakeClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}
