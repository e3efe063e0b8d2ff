use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{DexKind, Quote, Settlement};
use crate::error::Result;

/// Everything the execution simulator needs to know about one swap attempt.
///
/// A data snapshot, not a handle: the lifecycle driver owns the order,
/// sources only see this.
#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub order_id: Uuid,
    pub token_in: String,
    pub token_out: String,
    pub amount_in: f64,
    /// Fee fraction taken from the winning quote
    pub fee: f64,
    /// Reject the swap if the realized output falls below this
    pub min_amount_out: f64,
}

/// A liquidity source that can price a prospective swap
#[async_trait]
pub trait QuoteSource: Send + Sync {
    fn kind(&self) -> DexKind;

    async fn quote(&self, token_in: &str, token_out: &str, amount_in: f64) -> Result<Quote>;
}

/// A liquidity source that can execute a swap
#[async_trait]
pub trait ExecutionSource: Send + Sync {
    /// Execute a swap, settling at `price_hint` when supplied, otherwise at
    /// a fresh estimate of the source's base rate
    async fn execute_swap(
        &self,
        request: &SwapRequest,
        price_hint: Option<f64>,
    ) -> Result<Settlement>;
}

/// A full liquidity source: quotable and executable.
///
/// The simulated implementation is one variant; a real exchange client can
/// slot in later without touching the lifecycle driver.
pub trait LiquiditySource: QuoteSource + ExecutionSource {}

impl<T: QuoteSource + ExecutionSource> LiquiditySource for T {}
