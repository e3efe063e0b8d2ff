use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DexKind;

/// Order kind (only market swaps are supported)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
}

impl Default for OrderType {
    fn default() -> Self {
        Self::Market
    }
}

/// Order lifecycle status
///
/// `pending → routing → building → submitted → {confirmed | failed}`,
/// strictly sequential; `failed` is reachable from every non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created by the producer, waiting for a worker
    Pending,
    /// Fetching quotes from the configured liquidity sources
    Routing,
    /// Assembling the transaction on the chosen source
    Building,
    /// Transaction sent, waiting for confirmation
    Submitted,
    /// Swap settled successfully
    Confirmed,
    /// Terminal failure (routing, execution, or slippage)
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Routing => "routing",
            OrderStatus::Building => "building",
            OrderStatus::Submitted => "submitted",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Failed => "failed",
        }
    }

    /// Check if this status can transition to another status
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        use OrderStatus::*;

        match (self, target) {
            (Pending, Routing) => true,
            (Routing, Building) => true,
            (Building, Submitted) => true,
            (Submitted, Confirmed) => true,

            // Failure is terminal and reachable from any non-terminal state
            (Pending | Routing | Building | Submitted, Failed) => true,

            _ => false,
        }
    }

    /// Is this a terminal state? Once reached it is never mutated again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Confirmed | OrderStatus::Failed)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for OrderStatus {
    type Error = String;

    fn try_from(s: &str) -> std::result::Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "routing" => Ok(OrderStatus::Routing),
            "building" => Ok(OrderStatus::Building),
            "submitted" => Ok(OrderStatus::Submitted),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "failed" => Ok(OrderStatus::Failed),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}

/// Order request (what the producer wants to do)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub user_id: String,
    #[serde(rename = "type", default)]
    pub order_type: OrderType,
    pub token_in: String,
    pub token_out: String,
    pub amount_in: f64,
    /// Slippage tolerance in [0, 1]; defaults to 1%
    pub slippage: Option<f64>,
}

pub const DEFAULT_SLIPPAGE: f64 = 0.01;

/// A single requested asset swap and its execution record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: String,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub token_in: String,
    pub token_out: String,
    pub amount_in: f64,
    pub slippage: f64,
    pub amount_out: Option<f64>,
    pub status: OrderStatus,
    pub dex_used: Option<DexKind>,
    pub executed_price: Option<f64>,
    pub tx_hash: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn from_request(request: &OrderRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: request.user_id.clone(),
            order_type: request.order_type,
            token_in: request.token_in.clone(),
            token_out: request.token_out.clone(),
            amount_in: request.amount_in,
            slippage: request.slippage.unwrap_or(DEFAULT_SLIPPAGE),
            amount_out: None,
            status: OrderStatus::Pending,
            dex_used: None,
            executed_price: None,
            tx_hash: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Minimum acceptable output for a quoted amount under this order's
    /// slippage tolerance
    pub fn min_amount_out(&self, quoted_amount_out: f64) -> f64 {
        quoted_amount_out * (1.0 - self.slippage)
    }
}
