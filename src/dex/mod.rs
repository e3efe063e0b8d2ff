pub mod router;
pub mod simulated;
pub mod traits;

pub use router::DexRouter;
pub use simulated::{generate_tx_hash, SimulatedDex};
pub use traits::{ExecutionSource, LiquiditySource, QuoteSource, SwapRequest};
