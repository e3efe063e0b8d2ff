//! In-process job queue with bounded workers, retry backoff, and
//! duplicate-submission rejection.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::job::{Job, JobState, QueueConfig, QueueCounts};
use crate::domain::Order;
use crate::error::{EngineError, Result};

/// What a handler reports back for one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Complete,
    Retry { error: String },
}

#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn process(&self, order: &Order) -> JobOutcome;
}

struct QueueState {
    jobs: HashMap<Uuid, Job>,
    ready: VecDeque<Uuid>,
    /// Retry deadlines, keyed by job id. Kept apart from `jobs` so the
    /// worker wake-up scan only touches jobs actually waiting on a
    /// backoff, not the ever-growing terminal set retained for dedup.
    delayed: HashMap<Uuid, Instant>,
}

/// FIFO queue keyed by order id. A job id stays known after it reaches a
/// terminal state, so re-submitting the same order is always rejected.
pub struct JobQueue {
    config: QueueConfig,
    state: Mutex<QueueState>,
    notify: Notify,
    running: AtomicBool,
}

/// Idle poll interval when no delayed deadline is nearer
const IDLE_POLL: Duration = Duration::from_millis(200);

impl JobQueue {
    pub fn new(config: QueueConfig) -> Self {
        Self {
            config,
            state: Mutex::new(QueueState {
                jobs: HashMap::new(),
                ready: VecDeque::new(),
                delayed: HashMap::new(),
            }),
            notify: Notify::new(),
            running: AtomicBool::new(true),
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub async fn enqueue(&self, order: Order) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.jobs.contains_key(&order.id) {
            return Err(EngineError::DuplicateJob(order.id));
        }

        let id = order.id;
        state.jobs.insert(id, Job::new(order));
        state.ready.push_back(id);
        drop(state);

        debug!(order_id = %id, "job enqueued");
        self.notify.notify_one();
        Ok(())
    }

    pub async fn counts(&self) -> QueueCounts {
        let state = self.state.lock().await;
        let mut counts = QueueCounts::default();
        for job in state.jobs.values() {
            match job.state {
                JobState::Waiting => counts.waiting += 1,
                JobState::Delayed => counts.delayed += 1,
                JobState::Active => counts.active += 1,
                JobState::Completed => counts.completed += 1,
                JobState::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// Block until a job is ready or the queue shuts down. Returns the
    /// order snapshot and the 1-based attempt number.
    async fn next_job(&self) -> Option<(Uuid, Order, u32)> {
        loop {
            if !self.is_running() {
                return None;
            }

            let wait = {
                let mut state = self.state.lock().await;

                let now = Instant::now();
                let due: Vec<Uuid> = state
                    .delayed
                    .iter()
                    .filter(|(_, deadline)| **deadline <= now)
                    .map(|(id, _)| *id)
                    .collect();
                for id in due {
                    state.delayed.remove(&id);
                    if let Some(job) = state.jobs.get_mut(&id) {
                        job.state = JobState::Waiting;
                    }
                    state.ready.push_back(id);
                }

                if let Some(id) = state.ready.pop_front() {
                    if let Some(job) = state.jobs.get_mut(&id) {
                        job.state = JobState::Active;
                        job.attempts += 1;
                        return Some((id, job.order.clone(), job.attempts));
                    }
                    continue;
                }

                state
                    .delayed
                    .values()
                    .min()
                    .map(|deadline| deadline.saturating_duration_since(now))
                    .map_or(IDLE_POLL, |until_due| until_due.min(IDLE_POLL))
            };

            tokio::select! {
                _ = self.notify.notified() => {}
                _ = sleep(wait) => {}
            }
        }
    }

    async fn finish(&self, id: Uuid, outcome: JobOutcome) {
        let mut state = self.state.lock().await;
        let Some(job) = state.jobs.get_mut(&id) else {
            return;
        };

        match outcome {
            JobOutcome::Complete => {
                job.state = JobState::Completed;
                info!(order_id = %id, attempts = job.attempts, "job completed");
            }
            JobOutcome::Retry { error } => {
                if job.attempts >= self.config.max_attempts {
                    job.state = JobState::Failed;
                    warn!(
                        order_id = %id,
                        attempts = job.attempts,
                        error = %error,
                        "job failed permanently"
                    );
                } else {
                    let delay = self.config.backoff(job.attempts);
                    job.state = JobState::Delayed;
                    let attempt = job.attempts;
                    state.delayed.insert(id, Instant::now() + delay);
                    info!(
                        order_id = %id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "job scheduled for retry"
                    );
                    drop(state);
                    self.notify.notify_one();
                }
            }
        }
    }

    /// Spawn the worker pool. Each worker pulls jobs until shutdown.
    pub fn start_workers(
        self: &Arc<Self>,
        handler: Arc<dyn JobHandler>,
        concurrency: usize,
    ) -> Vec<JoinHandle<()>> {
        (0..concurrency.max(1))
            .map(|worker| {
                let queue = Arc::clone(self);
                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    debug!(worker, "queue worker started");
                    while let Some((id, order, attempt)) = queue.next_job().await {
                        debug!(worker, order_id = %id, attempt, "processing job");
                        let outcome = handler.process(&order).await;
                        queue.finish(id, outcome).await;
                    }
                    debug!(worker, "queue worker stopped");
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderRequest, OrderType};
    use std::sync::atomic::{AtomicU32, AtomicUsize};
    use tokio_test::assert_ok;

    fn sample_order() -> Order {
        Order::from_request(&OrderRequest {
            user_id: "user-1".to_string(),
            order_type: OrderType::Market,
            token_in: "SOL".to_string(),
            token_out: "USDC".to_string(),
            amount_in: 1.0,
            slippage: None,
        })
    }

    fn fast_config(max_attempts: u32, concurrency: usize) -> QueueConfig {
        QueueConfig {
            max_attempts,
            backoff_base: Duration::from_millis(10),
            backoff_max: Duration::from_millis(40),
            concurrency,
        }
    }

    struct CountingHandler {
        attempts: AtomicU32,
        outcome: JobOutcome,
        delay: Duration,
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    impl CountingHandler {
        fn new(outcome: JobOutcome) -> Self {
            Self {
                attempts: AtomicU32::new(0),
                outcome,
                delay: Duration::ZERO,
                current: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    #[async_trait]
    impl JobHandler for CountingHandler {
        async fn process(&self, _order: &Order) -> JobOutcome {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let running = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(running, Ordering::SeqCst);
            if !self.delay.is_zero() {
                sleep(self.delay).await;
            }
            self.current.fetch_sub(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    async fn wait_until<F>(queue: &JobQueue, predicate: F)
    where
        F: Fn(&QueueCounts) -> bool,
    {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let counts = queue.counts().await;
            if predicate(&counts) {
                return;
            }
            assert!(Instant::now() < deadline, "queue did not settle: {counts:?}");
            sleep(Duration::from_millis(10)).await;
        }
    }

    /// Fails the first attempt for each order id, then completes
    struct RetryOnceHandler {
        seen: std::sync::Mutex<std::collections::HashSet<Uuid>>,
    }

    impl RetryOnceHandler {
        fn new() -> Self {
            Self {
                seen: std::sync::Mutex::new(std::collections::HashSet::new()),
            }
        }
    }

    #[async_trait]
    impl JobHandler for RetryOnceHandler {
        async fn process(&self, order: &Order) -> JobOutcome {
            if self.seen.lock().unwrap().insert(order.id) {
                JobOutcome::Retry {
                    error: "transient".to_string(),
                }
            } else {
                JobOutcome::Complete
            }
        }
    }

    #[tokio::test]
    async fn duplicate_enqueue_is_rejected() {
        let queue = JobQueue::new(fast_config(3, 1));
        let order = sample_order();
        tokio_test::assert_ok!(queue.enqueue(order.clone()).await);

        let err = queue.enqueue(order.clone()).await.unwrap_err();
        assert!(matches!(err, EngineError::DuplicateJob(id) if id == order.id));
    }

    #[tokio::test]
    async fn completed_job_still_blocks_resubmission() {
        let queue = Arc::new(JobQueue::new(fast_config(3, 1)));
        let handler = Arc::new(CountingHandler::new(JobOutcome::Complete));
        let workers = queue.start_workers(handler.clone() as Arc<dyn JobHandler>, 1);

        let order = sample_order();
        queue.enqueue(order.clone()).await.unwrap();
        wait_until(&queue, |c| c.completed == 1).await;

        assert!(queue.enqueue(order).await.is_err());

        queue.shutdown();
        for worker in workers {
            worker.await.unwrap();
        }
    }

    #[tokio::test]
    async fn retries_stop_after_max_attempts() {
        let queue = Arc::new(JobQueue::new(fast_config(3, 1)));
        let handler = Arc::new(CountingHandler::new(JobOutcome::Retry {
            error: "boom".to_string(),
        }));
        let workers = queue.start_workers(handler.clone() as Arc<dyn JobHandler>, 1);

        queue.enqueue(sample_order()).await.unwrap();
        wait_until(&queue, |c| c.failed == 1).await;

        assert_eq!(handler.attempts.load(Ordering::SeqCst), 3);

        queue.shutdown();
        for worker in workers {
            worker.await.unwrap();
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn worker_pool_never_exceeds_configured_width() {
        let queue = Arc::new(JobQueue::new(fast_config(3, 3)));
        let handler = Arc::new(
            CountingHandler::new(JobOutcome::Complete).with_delay(Duration::from_millis(50)),
        );
        let workers = queue.start_workers(handler.clone() as Arc<dyn JobHandler>, 3);

        for _ in 0..8 {
            queue.enqueue(sample_order()).await.unwrap();
        }
        wait_until(&queue, |c| c.completed == 8).await;

        assert!(handler.peak.load(Ordering::SeqCst) <= 3);

        queue.shutdown();
        for worker in workers {
            worker.await.unwrap();
        }
    }

    #[tokio::test]
    async fn delayed_retries_promote_despite_a_terminal_backlog() {
        let queue = Arc::new(JobQueue::new(fast_config(3, 4)));
        let handler = Arc::new(RetryOnceHandler::new());
        let workers = queue.start_workers(handler as Arc<dyn JobHandler>, 4);

        // Every job fails once and must come back through the delayed
        // path while the terminal set keeps growing
        for _ in 0..50 {
            tokio_test::assert_ok!(queue.enqueue(sample_order()).await);
        }
        wait_until(&queue, |c| c.completed == 50).await;

        let counts = queue.counts().await;
        assert_eq!(counts.delayed, 0);
        assert_eq!(counts.failed, 0);

        queue.shutdown();
        for worker in workers {
            worker.await.unwrap();
        }
    }

    #[tokio::test]
    async fn counts_reflect_job_states() {
        let queue = JobQueue::new(fast_config(3, 1));
        queue.enqueue(sample_order()).await.unwrap();
        queue.enqueue(sample_order()).await.unwrap();

        let counts = queue.counts().await;
        assert_eq!(counts.waiting, 2);
        assert_eq!(counts.active, 0);
        assert_eq!(counts.paused, 0);
        assert_eq!(counts.prioritized, 0);
    }
}
