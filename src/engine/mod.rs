pub mod executor;

pub use executor::{ExecutionOutcome, OrderExecutor};
