//! In-memory order store for dry-run mode and tests.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use super::store::{OrderStore, OrderUpdate};
use crate::domain::Order;
use crate::error::{EngineError, Result};

#[derive(Default)]
pub struct MemoryStore {
    orders: DashMap<Uuid, Order>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert(&self, order: &Order) -> Result<()> {
        if self.orders.contains_key(&order.id) {
            return Err(EngineError::Internal(format!(
                "order {} already exists",
                order.id
            )));
        }
        self.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn update(&self, update: &OrderUpdate) -> Result<()> {
        let mut entry = self.orders.get_mut(&update.id).ok_or_else(|| {
            EngineError::Internal(format!("order {} not found", update.id))
        })?;

        if let Some(status) = update.status {
            entry.status = status;
        }
        if let Some(amount_out) = update.amount_out {
            entry.amount_out = Some(amount_out);
        }
        if let Some(dex_used) = update.dex_used {
            entry.dex_used = Some(dex_used);
        }
        if let Some(executed_price) = update.executed_price {
            entry.executed_price = Some(executed_price);
        }
        if let Some(ref tx_hash) = update.tx_hash {
            entry.tx_hash = Some(tx_hash.clone());
        }
        if let Some(ref error) = update.error {
            entry.error = Some(error.clone());
        }
        entry.updated_at = update.updated_at;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Order>> {
        Ok(self.orders.get(&id).map(|entry| entry.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderRequest, OrderStatus, OrderType};

    fn order() -> Order {
        Order::from_request(&OrderRequest {
            user_id: "user-1".to_string(),
            order_type: OrderType::Market,
            token_in: "SOL".to_string(),
            token_out: "USDC".to_string(),
            amount_in: 1.0,
            slippage: None,
        })
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let store = MemoryStore::new();
        let order = order();
        store.insert(&order).await.unwrap();

        let loaded = store.get(order.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, order.id);
        assert_eq!(loaded.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let store = MemoryStore::new();
        let order = order();
        store.insert(&order).await.unwrap();
        assert!(store.insert(&order).await.is_err());
    }

    #[tokio::test]
    async fn update_merges_only_supplied_fields() {
        let store = MemoryStore::new();
        let order = order();
        store.insert(&order).await.unwrap();

        let mut update = OrderUpdate::new(order.id).with_status(OrderStatus::Routing);
        update.executed_price = Some(101.5);
        store.update(&update).await.unwrap();

        let loaded = store.get(order.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Routing);
        assert_eq!(loaded.executed_price, Some(101.5));
        // Untouched fields are preserved
        assert_eq!(loaded.user_id, "user-1");
        assert!(loaded.tx_hash.is_none());
        assert!(loaded.updated_at >= loaded.created_at);
    }

    #[tokio::test]
    async fn missing_order_is_none() {
        let store = MemoryStore::new();
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }
}
