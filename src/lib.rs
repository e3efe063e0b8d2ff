pub mod api;
pub mod config;
pub mod dex;
pub mod domain;
pub mod engine;
pub mod error;
pub mod notify;
pub mod persistence;
pub mod queue;
pub mod services;
pub mod validation;

pub use config::AppConfig;
pub use dex::{DexRouter, SimulatedDex};
pub use domain::{Order, OrderRequest, OrderStatus};
pub use engine::{ExecutionOutcome, OrderExecutor};
pub use error::{EngineError, Result};
pub use notify::NotificationHub;
pub use persistence::{MemoryStore, OrderStore, PgOrderStore};
pub use queue::{JobQueue, QueueConfig};
pub use services::OrderService;
