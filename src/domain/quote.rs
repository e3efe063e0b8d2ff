use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Liquidity source identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DexKind {
    Raydium,
    Meteora,
}

impl DexKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raydium => "raydium",
            Self::Meteora => "meteora",
        }
    }
}

impl std::fmt::Display for DexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::error::Error for DexKind {}

impl FromStr for DexKind {
    type Err = &'static str;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "raydium" => Ok(Self::Raydium),
            "meteora" => Ok(Self::Meteora),
            _ => Err("invalid dex; expected raydium|meteora"),
        }
    }
}

/// A liquidity source's proposed price/fee/output for a prospective swap.
///
/// Ephemeral: produced per routing attempt, consumed by the lifecycle driver
/// and discarded. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub source: DexKind,
    pub price: f64,
    pub fee: f64,
    pub amount_out: f64,
}

/// Result of a completed (simulated) swap execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    /// Opaque settlement reference: `0x` + 64 lowercase hex chars
    pub tx_hash: String,
    pub executed_price: f64,
    pub amount_out: f64,
}

/// Output amount implied by a price and a fee fraction:
/// `amount_in * price * (1 - fee)`
pub fn calculate_amount_out(amount_in: f64, price: f64, fee: f64) -> f64 {
    amount_in * price * (1.0 - fee)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_accepts_known_sources() {
        assert_eq!(
            DexKind::from_str("raydium").expect("raydium should parse"),
            DexKind::Raydium
        );
        assert_eq!(
            DexKind::from_str("Meteora").expect("meteora should parse"),
            DexKind::Meteora
        );
    }

    #[test]
    fn from_str_rejects_unknown_value() {
        assert!(DexKind::from_str("orca").is_err());
    }

    #[test]
    fn calculate_amount_out_applies_fee() {
        assert_eq!(calculate_amount_out(100.0, 2.0, 0.01), 198.0);
    }

    #[test]
    fn calculate_amount_out_handles_zero_fee() {
        assert_eq!(calculate_amount_out(100.0, 2.0, 0.0), 200.0);
    }

    #[test]
    fn calculate_amount_out_handles_decimal_amounts() {
        let out = calculate_amount_out(0.5, 100.0, 0.003);
        assert!((out - 49.85).abs() < 1e-9);
    }

    #[test]
    fn calculate_amount_out_handles_high_fees() {
        let out = calculate_amount_out(100.0, 2.0, 0.5);
        assert!((out - 100.0).abs() < 1e-9);
    }
}
