pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::MemoryStore;
pub use postgres::PgOrderStore;
pub use store::{OrderStore, OrderUpdate};
