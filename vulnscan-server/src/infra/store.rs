use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use serde_json::Value;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, info};

use vulnscan_contracts::{ContractError, Result, ScanJobStore};
use vulnscan_model::{JobStatus, ScanJob, ScanJobId};

#[derive(Debug, Clone)]
struct StoredJob {
    job: ScanJob,
    /// Set when the job reaches `Finished` or `Failed`
    terminal_at: Option<Instant>,
}

/// Process-local job store.
///
/// Readers never block each other and each mutation holds only the shard
/// of the job being changed. Every mutation checks the status machine, so
/// a job can never leave a terminal state or move backwards. Terminal jobs
/// are kept until [`evict_expired`](Self::evict_expired) drops them.
#[derive(Default)]
pub struct InMemoryScanJobStore {
    jobs: DashMap<ScanJobId, StoredJob>,
}

impl fmt::Debug for InMemoryScanJobStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryScanJobStore")
            .field("jobs", &self.jobs.len())
            .finish()
    }
}

impl InMemoryScanJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Insert a new `Queued` job.
    pub fn create(&self, id: ScanJobId) -> Result<ScanJob> {
        match self.jobs.entry(id.clone()) {
            Entry::Occupied(_) => Err(ContractError::AlreadyExists(id)),
            Entry::Vacant(slot) => {
                let job = ScanJob::queued(id);
                slot.insert(StoredJob {
                    job: job.clone(),
                    terminal_at: None,
                });
                debug!(scan_job_id = %job.id, "created scan job");
                Ok(job)
            }
        }
    }

    /// Move a job to `Pending`.
    ///
    /// Only non-terminal statuses are accepted here; use
    /// [`update_report`](Self::update_report) or [`fail`](Self::fail) to
    /// finish a job so the report/error pairing stays intact.
    pub fn update_status(&self, id: &ScanJobId, status: JobStatus) -> Result<ScanJob> {
        if status.is_terminal() || matches!(status, JobStatus::Unknown(_)) {
            let from = self.current_status(id)?;
            return Err(ContractError::InvalidTransition {
                id: id.clone(),
                from,
                to: status,
            });
        }
        self.transition(id, status, |_| {})
    }

    /// Finish a job with its report.
    pub fn update_report(&self, id: &ScanJobId, report: Value) -> Result<ScanJob> {
        self.transition(id, JobStatus::Finished, |job| {
            job.report = Some(report);
            job.error = None;
        })
    }

    /// Mark a job failed with a reason clients will see.
    pub fn fail(&self, id: &ScanJobId, error: impl Into<String>) -> Result<ScanJob> {
        let error = error.into();
        self.transition(id, JobStatus::Failed, |job| {
            job.report = None;
            job.error = Some(error);
        })
    }

    /// Drop terminal jobs that finished more than `ttl` ago.
    ///
    /// Queued and pending jobs are never evicted. Returns how many jobs
    /// were removed.
    pub fn evict_expired(&self, ttl: Duration) -> usize {
        let Some(cutoff) = Instant::now().checked_sub(ttl) else {
            return 0;
        };

        let before = self.jobs.len();
        self.jobs.retain(|_, stored| {
            stored
                .terminal_at
                .is_none_or(|terminal_at| terminal_at > cutoff)
        });
        before.saturating_sub(self.jobs.len())
    }

    /// Run [`evict_expired`](Self::evict_expired) every `every` until the
    /// returned task is aborted.
    pub fn spawn_retention_sweep(
        store: Arc<Self>,
        ttl: Duration,
        every: Duration,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let evicted = store.evict_expired(ttl);
                if evicted > 0 {
                    info!(evicted, remaining = store.len(), "evicted expired scan jobs");
                }
            }
        })
    }

    fn current_status(&self, id: &ScanJobId) -> Result<JobStatus> {
        self.jobs
            .get(id)
            .map(|stored| stored.job.status.clone())
            .ok_or_else(|| ContractError::NotFound(id.clone()))
    }

    fn transition(
        &self,
        id: &ScanJobId,
        to: JobStatus,
        apply: impl FnOnce(&mut ScanJob),
    ) -> Result<ScanJob> {
        let mut stored = self
            .jobs
            .get_mut(id)
            .ok_or_else(|| ContractError::NotFound(id.clone()))?;

        if !stored.job.status.can_transition_to(&to) {
            return Err(ContractError::InvalidTransition {
                id: id.clone(),
                from: stored.job.status.clone(),
                to,
            });
        }

        debug!(scan_job_id = %id, scan_job_status = %to, "scan job advanced");
        let entry = stored.value_mut();
        if to.is_terminal() {
            entry.terminal_at = Some(Instant::now());
        }
        entry.job.status = to;
        apply(&mut entry.job);
        Ok(entry.job.clone())
    }
}

#[async_trait]
impl ScanJobStore for InMemoryScanJobStore {
    async fn get(&self, id: &ScanJobId) -> Result<Option<ScanJob>> {
        Ok(self.jobs.get(id).map(|stored| stored.job.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn follows_the_job_lifecycle() {
        let store = InMemoryScanJobStore::new();
        let id = ScanJobId::new("job-1");

        store.create(id.clone()).unwrap();
        assert_eq!(
            store.get(&id).await.unwrap().unwrap().status,
            JobStatus::Queued
        );

        store.update_status(&id, JobStatus::Pending).unwrap();
        let finished = store
            .update_report(&id, json!({"vulnerabilities": []}))
            .unwrap();
        assert_eq!(finished.status, JobStatus::Finished);
        assert_eq!(finished.report, Some(json!({"vulnerabilities": []})));
        assert!(finished.error.is_none());

        assert_eq!(store.get(&id).await.unwrap(), Some(finished));
    }

    #[tokio::test]
    async fn missing_job_reads_as_none() {
        let store = InMemoryScanJobStore::new();
        assert_eq!(store.get(&ScanJobId::new("nope")).await.unwrap(), None);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let store = InMemoryScanJobStore::new();
        store.create("dup".into()).unwrap();
        assert!(matches!(
            store.create("dup".into()),
            Err(ContractError::AlreadyExists(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn terminal_jobs_cannot_move() {
        let store = InMemoryScanJobStore::new();
        let id = ScanJobId::new("job-2");
        store.create(id.clone()).unwrap();
        store.fail(&id, "registry unreachable").unwrap();

        let err = store.update_status(&id, JobStatus::Pending).unwrap_err();
        assert!(matches!(
            err,
            ContractError::InvalidTransition {
                from: JobStatus::Failed,
                to: JobStatus::Pending,
                ..
            }
        ));
        assert!(store.update_report(&id, json!({})).is_err());
    }

    #[test]
    fn update_status_refuses_terminal_targets() {
        let store = InMemoryScanJobStore::new();
        let id = ScanJobId::new("job-3");
        store.create(id.clone()).unwrap();

        assert!(store.update_status(&id, JobStatus::Finished).is_err());
        assert!(store.update_status(&id, JobStatus::Queued).is_err());
        assert!(matches!(
            store.update_status(&"ghost".into(), JobStatus::Pending),
            Err(ContractError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn terminal_jobs_are_evicted_after_ttl() {
        let store = InMemoryScanJobStore::new();
        let failed = ScanJobId::new("job-failed");
        let finished = ScanJobId::new("job-finished");
        let running = ScanJobId::new("job-running");

        for id in [&failed, &finished, &running] {
            store.create(id.clone()).unwrap();
        }
        store.fail(&failed, "no scan worker attached").unwrap();
        store.update_report(&finished, json!({})).unwrap();
        store.update_status(&running, JobStatus::Pending).unwrap();

        assert_eq!(store.evict_expired(Duration::from_secs(3600)), 0);
        assert_eq!(store.len(), 3);

        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(store.evict_expired(Duration::from_millis(1)), 2);
        assert_eq!(store.get(&failed).await.unwrap(), None);
        assert_eq!(store.get(&finished).await.unwrap(), None);
        assert_eq!(
            store.get(&running).await.unwrap().unwrap().status,
            JobStatus::Pending
        );
    }

    #[tokio::test]
    async fn retention_sweep_runs_in_the_background() {
        let store = Arc::new(InMemoryScanJobStore::new());
        for n in 0..100 {
            let id = ScanJobId::new(format!("job-{n}"));
            store.create(id.clone()).unwrap();
            store.fail(&id, "no scan worker attached").unwrap();
        }

        let sweep = InMemoryScanJobStore::spawn_retention_sweep(
            store.clone(),
            Duration::ZERO,
            Duration::from_millis(10),
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
        sweep.abort();

        assert!(store.is_empty());
    }
}
