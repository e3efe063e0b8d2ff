//! Simulated liquidity sources.
//!
//! Stands in for real exchange connectivity: quotes are the pair's base rate
//! under multiplicative noise, execution has confirmation latency, a
//! randomized network fault, and a slippage check against the caller's
//! minimum.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::time::sleep;
use tracing::debug;

use super::traits::{ExecutionSource, QuoteSource, SwapRequest};
use crate::config::SimulatorConfig;
use crate::domain::{calculate_amount_out, DexKind, Quote, Settlement};
use crate::error::{EngineError, Result};

const DEFAULT_BASE_PRICE: f64 = 100.0;

/// A simulated DEX with a fixed fee schedule and a bounded quote-noise band
pub struct SimulatedDex {
    kind: DexKind,
    fee: f64,
    /// Multiplicative noise band applied to the base rate when quoting
    quote_noise: (f64, f64),
    /// Noise band for the realized price when no hint is supplied
    exec_noise: (f64, f64),
    config: SimulatorConfig,
    base_prices: HashMap<String, f64>,
}

impl SimulatedDex {
    fn new(kind: DexKind, fee: f64, quote_noise: (f64, f64), config: SimulatorConfig) -> Self {
        let mut base_prices = HashMap::new();
        base_prices.insert("SOL-USDC".to_string(), 100.0);
        base_prices.insert("USDC-SOL".to_string(), 0.01);
        base_prices.insert("SOL-BONK".to_string(), 10_000.0);
        base_prices.insert("BONK-SOL".to_string(), 0.0001);

        Self {
            kind,
            fee,
            quote_noise,
            exec_noise: (0.99, 1.01),
            config,
            base_prices,
        }
    }

    /// Raydium profile: 0.3% fee, quotes within ±2% of the base rate
    pub fn raydium(config: SimulatorConfig) -> Self {
        Self::new(DexKind::Raydium, 0.003, (0.98, 1.02), config)
    }

    /// Meteora profile: 0.2% fee, quotes within -3%/+2% of the base rate
    pub fn meteora(config: SimulatorConfig) -> Self {
        Self::new(DexKind::Meteora, 0.002, (0.97, 1.02), config)
    }

    pub fn fee(&self) -> f64 {
        self.fee
    }

    /// Base rate for the ordered pair; reverse pairs fall back to the
    /// reciprocal, unknown pairs to a fixed default
    fn base_price(&self, token_in: &str, token_out: &str) -> f64 {
        let pair = format!("{}-{}", token_in, token_out);
        if let Some(price) = self.base_prices.get(&pair) {
            return *price;
        }

        let reverse = format!("{}-{}", token_out, token_in);
        match self.base_prices.get(&reverse) {
            Some(price) if *price != 0.0 => 1.0 / price,
            _ => DEFAULT_BASE_PRICE,
        }
    }

    fn is_native(&self, symbol: &str) -> bool {
        symbol == self.config.native_symbol
    }

    async fn random_delay(&self, min_ms: u64, max_ms: u64) {
        let ms = if max_ms > min_ms {
            rand::thread_rng().gen_range(min_ms..=max_ms)
        } else {
            min_ms
        };
        if ms > 0 {
            sleep(Duration::from_millis(ms)).await;
        }
    }

    /// Wrap/unwrap overhead when either leg is the chain's native asset
    async fn maybe_wrap_native(&self, token_in: &str, token_out: &str) {
        if self.is_native(token_in) || self.is_native(token_out) {
            if self.config.wrap_delay_ms > 0 {
                sleep(Duration::from_millis(self.config.wrap_delay_ms)).await;
            }
        }
    }
}

/// Synthetic settlement reference: `0x` + 64 lowercase hex chars
pub fn generate_tx_hash() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    format!("0x{}", hex::encode(bytes))
}

#[async_trait]
impl QuoteSource for SimulatedDex {
    fn kind(&self) -> DexKind {
        self.kind
    }

    async fn quote(&self, token_in: &str, token_out: &str, amount_in: f64) -> Result<Quote> {
        self.random_delay(self.config.quote_delay_min_ms, self.config.quote_delay_max_ms)
            .await;

        let base = self.base_price(token_in, token_out);
        let (lo, hi) = self.quote_noise;
        let price = base * rand::thread_rng().gen_range(lo..hi);

        Ok(Quote {
            source: self.kind,
            price,
            fee: self.fee,
            amount_out: calculate_amount_out(amount_in, price, self.fee),
        })
    }
}

#[async_trait]
impl ExecutionSource for SimulatedDex {
    async fn execute_swap(
        &self,
        request: &SwapRequest,
        price_hint: Option<f64>,
    ) -> Result<Settlement> {
        debug!(order_id = %request.order_id, source = %self.kind, "executing swap");

        self.maybe_wrap_native(&request.token_in, &request.token_out)
            .await;

        // Transaction build/confirmation latency
        self.random_delay(self.config.exec_delay_min_ms, self.config.exec_delay_max_ms)
            .await;

        if rand::thread_rng().gen::<f64>() < self.config.fail_probability {
            return Err(EngineError::Execution {
                source: self.kind,
                reason: "simulated network error".to_string(),
            });
        }

        let executed_price = match price_hint {
            Some(hint) => hint,
            None => {
                let (lo, hi) = self.exec_noise;
                self.base_price(&request.token_in, &request.token_out)
                    * rand::thread_rng().gen_range(lo..hi)
            }
        };

        let amount_out = calculate_amount_out(request.amount_in, executed_price, request.fee);

        if amount_out < request.min_amount_out {
            return Err(EngineError::Slippage {
                got: amount_out,
                min: request.min_amount_out,
            });
        }

        Ok(Settlement {
            tx_hash: generate_tx_hash(),
            executed_price,
            amount_out,
        })
    }
}
