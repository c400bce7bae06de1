use std::{fmt, sync::Arc};

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};
use uuid::Uuid;

use vulnscan_contracts::{ContractError, Enqueuer, Result};
use vulnscan_model::{ScanJob, ScanJobId, ScanRequest};

use super::store::InMemoryScanJobStore;

pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Unit of work handed to the scan worker.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanTask {
    pub job_id: ScanJobId,
    pub request: ScanRequest,
}

/// Enqueuer backed by a bounded in-process channel.
///
/// The receiving half belongs to whatever runs scans. The job record is
/// created before the task is sent, so a worker never sees a task whose
/// job is missing.
pub struct QueueEnqueuer {
    store: Arc<InMemoryScanJobStore>,
    sender: mpsc::Sender<ScanTask>,
}

impl fmt::Debug for QueueEnqueuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueEnqueuer")
            .field("capacity", &self.sender.max_capacity())
            .finish_non_exhaustive()
    }
}

impl QueueEnqueuer {
    pub fn new(
        store: Arc<InMemoryScanJobStore>,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<ScanTask>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { store, sender }, receiver)
    }
}

#[async_trait]
impl Enqueuer for QueueEnqueuer {
    async fn enqueue(&self, request: ScanRequest) -> Result<ScanJob> {
        let id = ScanJobId::new(Uuid::new_v4().to_string());
        let job = self.store.create(id.clone())?;

        let task = ScanTask {
            job_id: id.clone(),
            request,
        };
        if let Err(err) = self.sender.try_send(task) {
            let reason = match err {
                TrySendError::Full(_) => "scan queue is full",
                TrySendError::Closed(_) => "scan queue is closed",
            };
            // The job was already visible to readers; park it in a terminal state.
            self.store.fail(&id, reason)?;
            return Err(ContractError::Unavailable(reason.to_string()));
        }

        debug!(scan_job_id = %id, "scan job enqueued");
        Ok(job)
    }
}

/// Consume tasks when no scan worker is attached to this process.
///
/// Each job is failed right away so polling clients get a definitive
/// answer instead of an endless redirect.
pub async fn drain_unattended(
    mut receiver: mpsc::Receiver<ScanTask>,
    store: Arc<InMemoryScanJobStore>,
) {
    while let Some(task) = receiver.recv().await {
        warn!(scan_job_id = %task.job_id, "no scan worker attached; failing job");
        if let Err(err) = store.fail(&task.job_id, "no scan worker attached") {
            warn!(scan_job_id = %task.job_id, error = %err, "could not fail unattended job");
        }
    }
}
