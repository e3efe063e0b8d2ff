//! Job bookkeeping types for the in-process order queue.

use std::time::Duration;

use serde::Serialize;

use crate::config::QueueSettings;
use crate::domain::Order;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Waiting,
    Delayed,
    Active,
    Completed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct Job {
    pub order: Order,
    pub attempts: u32,
    pub state: JobState,
}

impl Job {
    pub fn new(order: Order) -> Self {
        Self {
            order,
            attempts: 0,
            state: JobState::Waiting,
        }
    }
}

/// Queue depth snapshot, one bucket per job state
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct QueueCounts {
    pub waiting: usize,
    pub active: usize,
    pub completed: usize,
    pub failed: usize,
    pub delayed: usize,
    pub paused: usize,
    pub prioritized: usize,
}

#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
    pub concurrency: usize,
}

impl QueueConfig {
    /// Exponential backoff before the given attempt number (1-based):
    /// base * 2^(attempt-1), capped at `backoff_max`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let delay = self
            .backoff_base
            .saturating_mul(2u32.saturating_pow(exp));
        delay.min(self.backoff_max)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_millis(1000),
            backoff_max: Duration::from_millis(30_000),
            concurrency: 10,
        }
    }
}

impl From<&QueueSettings> for QueueConfig {
    fn from(settings: &QueueSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            backoff_base: Duration::from_millis(settings.backoff_base_ms),
            backoff_max: Duration::from_millis(settings.backoff_max_ms),
            concurrency: settings.concurrency,
        }
    }
}
