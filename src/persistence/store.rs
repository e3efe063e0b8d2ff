use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{DexKind, Order, OrderStatus};
use crate::error::Result;

/// Partial order update: only supplied fields are written, plus the
/// refreshed `updated_at` timestamp
#[derive(Debug, Clone)]
pub struct OrderUpdate {
    pub id: Uuid,
    pub status: Option<OrderStatus>,
    pub amount_out: Option<f64>,
    pub dex_used: Option<DexKind>,
    pub executed_price: Option<f64>,
    pub tx_hash: Option<String>,
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl OrderUpdate {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            status: None,
            amount_out: None,
            dex_used: None,
            executed_price: None,
            tx_hash: None,
            error: None,
            updated_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// The record-store contract the execution core requires: create, merge a
/// partial update, read back.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: &Order) -> Result<()>;

    async fn update(&self, update: &OrderUpdate) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<Order>>;
}
