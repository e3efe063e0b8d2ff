//! Quote aggregation across competing liquidity sources.

use std::sync::Arc;

use futures_util::future::try_join_all;
use tracing::info;

use super::traits::LiquiditySource;
use crate::domain::{DexKind, Quote};
use crate::error::{EngineError, Result};

/// Routes each swap to the source quoting the best output amount
pub struct DexRouter {
    sources: Vec<Arc<dyn LiquiditySource>>,
}

impl DexRouter {
    pub fn new(sources: Vec<Arc<dyn LiquiditySource>>) -> Self {
        Self { sources }
    }

    /// Look up the execution handle for a previously chosen source
    pub fn source(&self, kind: DexKind) -> Option<Arc<dyn LiquiditySource>> {
        self.sources.iter().find(|s| s.kind() == kind).cloned()
    }

    /// Fetch quotes from every configured source concurrently and pick the
    /// one with the strictly greatest output amount.
    ///
    /// On an exact tie the first-configured source wins (strict `>`
    /// comparison); this is deliberate, documented behavior. Any source
    /// failure aborts the whole routing attempt.
    pub async fn best_quote(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: f64,
    ) -> Result<Quote> {
        if self.sources.is_empty() {
            return Err(EngineError::Routing("no liquidity sources configured".to_string()));
        }

        let quotes: Vec<Quote> = try_join_all(
            self.sources
                .iter()
                .map(|source| source.quote(token_in, token_out, amount_in)),
        )
        .await
        .map_err(|e| EngineError::Routing(e.to_string()))?;

        let mut best = &quotes[0];
        for quote in &quotes[1..] {
            if quote.amount_out > best.amount_out {
                best = quote;
            }
        }

        info!(
            event = "routing_decision",
            token_in,
            token_out,
            amount_in,
            quotes = %serde_json::to_string(&quotes).unwrap_or_default(),
            chosen = %best.source,
            "selected best quote"
        );

        Ok(best.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex::traits::{ExecutionSource, QuoteSource, SwapRequest};
    use crate::domain::Settlement;
    use async_trait::async_trait;

    /// Deterministic source returning a fixed quote or a fixed failure
    struct FixedSource {
        kind: DexKind,
        amount_out: f64,
        fail: bool,
    }

    impl FixedSource {
        fn quoting(kind: DexKind, amount_out: f64) -> Arc<dyn LiquiditySource> {
            Arc::new(Self {
                kind,
                amount_out,
                fail: false,
            })
        }

        fn failing(kind: DexKind) -> Arc<dyn LiquiditySource> {
            Arc::new(Self {
                kind,
                amount_out: 0.0,
                fail: true,
            })
        }
    }

    #[async_trait]
    impl QuoteSource for FixedSource {
        fn kind(&self) -> DexKind {
            self.kind
        }

        async fn quote(&self, _: &str, _: &str, _: f64) -> crate::error::Result<Quote> {
            if self.fail {
                return Err(EngineError::Routing(format!("{} unavailable", self.kind)));
            }
            Ok(Quote {
                source: self.kind,
                price: 1.0,
                fee: 0.0,
                amount_out: self.amount_out,
            })
        }
    }

    #[async_trait]
    impl ExecutionSource for FixedSource {
        async fn execute_swap(
            &self,
            request: &SwapRequest,
            _price_hint: Option<f64>,
        ) -> crate::error::Result<Settlement> {
            Ok(Settlement {
                tx_hash: "0x00".to_string(),
                executed_price: 1.0,
                amount_out: request.amount_in,
            })
        }
    }

    #[tokio::test]
    async fn picks_strictly_greater_amount_out() {
        let router = DexRouter::new(vec![
            FixedSource::quoting(DexKind::Raydium, 10.0),
            FixedSource::quoting(DexKind::Meteora, 12.0),
        ]);

        let best = router.best_quote("SOL", "USDC", 1.0).await.unwrap();
        assert_eq!(best.source, DexKind::Meteora);
        assert_eq!(best.amount_out, 12.0);
    }

    #[tokio::test]
    async fn first_source_wins_exact_ties() {
        let router = DexRouter::new(vec![
            FixedSource::quoting(DexKind::Raydium, 10.0),
            FixedSource::quoting(DexKind::Meteora, 10.0),
        ]);

        let best = router.best_quote("SOL", "USDC", 1.0).await.unwrap();
        assert_eq!(best.source, DexKind::Raydium);
    }

    #[tokio::test]
    async fn any_source_failure_aborts_routing() {
        let router = DexRouter::new(vec![
            FixedSource::quoting(DexKind::Raydium, 10.0),
            FixedSource::failing(DexKind::Meteora),
        ]);

        let err = router.best_quote("SOL", "USDC", 1.0).await.unwrap_err();
        assert!(matches!(err, EngineError::Routing(_)));
        assert!(err.to_string().contains("meteora unavailable"));
    }

    #[tokio::test]
    async fn empty_router_is_a_routing_error() {
        let router = DexRouter::new(Vec::new());
        assert!(router.best_quote("SOL", "USDC", 1.0).await.is_err());
    }

    #[tokio::test]
    async fn source_lookup_by_kind() {
        let router = DexRouter::new(vec![
            FixedSource::quoting(DexKind::Raydium, 10.0),
            FixedSource::quoting(DexKind::Meteora, 12.0),
        ]);

        assert!(router.source(DexKind::Meteora).is_some());
        assert_eq!(
            router.source(DexKind::Raydium).map(|s| s.kind()),
            Some(DexKind::Raydium)
        );
    }
}
