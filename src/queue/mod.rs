pub mod job;
pub mod queue;

pub use job::{Job, JobState, QueueConfig, QueueCounts};
pub use queue::{JobHandler, JobOutcome, JobQueue};
