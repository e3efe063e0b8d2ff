//! Status fan-out: push to live WebSocket subscribers, always persist.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::domain::{DexKind, OrderStatus};
use crate::persistence::{OrderStore, OrderUpdate};

/// Optional per-transition detail carried alongside the status change
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dex_used: Option<DexKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quoted_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quoted_amount_out: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executed_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_out: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusPayload {
    pub fn quoted(dex_used: DexKind, quoted_price: f64, quoted_amount_out: f64) -> Self {
        Self {
            dex_used: Some(dex_used),
            quoted_price: Some(quoted_price),
            quoted_amount_out: Some(quoted_amount_out),
            ..Self::default()
        }
    }

    pub fn settled(
        dex_used: DexKind,
        executed_price: f64,
        tx_hash: String,
        amount_out: f64,
    ) -> Self {
        Self {
            dex_used: Some(dex_used),
            executed_price: Some(executed_price),
            tx_hash: Some(tx_hash),
            amount_out: Some(amount_out),
            ..Self::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Wire message pushed to WebSocket subscribers
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusMessage {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub order_id: Uuid,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<StatusPayload>,
}

impl StatusMessage {
    pub fn status_update(order_id: Uuid, status: OrderStatus, data: Option<StatusPayload>) -> Self {
        Self {
            kind: "status_update",
            order_id,
            status,
            data,
        }
    }
}

/// One live subscriber per order id; registering again replaces the
/// previous channel (last writer wins).
pub struct NotificationHub {
    subscribers: DashMap<Uuid, mpsc::UnboundedSender<StatusMessage>>,
    store: Arc<dyn OrderStore>,
}

impl NotificationHub {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self {
            subscribers: DashMap::new(),
            store,
        }
    }

    pub fn register(&self, order_id: Uuid) -> mpsc::UnboundedReceiver<StatusMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.insert(order_id, tx);
        debug!(%order_id, "websocket subscriber registered");
        rx
    }

    pub fn unregister(&self, order_id: Uuid) {
        self.subscribers.remove(&order_id);
        debug!(%order_id, "websocket subscriber removed");
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Push the transition to the live subscriber (if any), then persist it.
    ///
    /// Persistence happens regardless of whether the push succeeded, and a
    /// store failure is logged rather than propagated: a notification must
    /// never fail the swap that produced it.
    pub async fn publish(&self, order_id: Uuid, status: OrderStatus, data: Option<StatusPayload>) {
        let message = StatusMessage::status_update(order_id, status, data.clone());

        if let Some(entry) = self.subscribers.get(&order_id) {
            if entry.send(message).is_err() {
                drop(entry);
                warn!(%order_id, "subscriber channel closed, dropping it");
                self.subscribers.remove(&order_id);
            }
        }

        let mut update = OrderUpdate::new(order_id).with_status(status);
        if let Some(payload) = data {
            update.dex_used = payload.dex_used;
            update.executed_price = payload.executed_price;
            update.tx_hash = payload.tx_hash;
            update.amount_out = payload.amount_out;
            update.error = payload.error;
        }

        if let Err(e) = self.store.update(&update).await {
            error!(%order_id, %status, error = %e, "failed to persist status update");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Order, OrderRequest, OrderType};
    use crate::persistence::MemoryStore;

    fn sample_order() -> Order {
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
    async fn publish_without_subscriber_still_persists() {
        let store = Arc::new(MemoryStore::new());
        let order = sample_order();
        store.insert(&order).await.unwrap();

        let hub = NotificationHub::new(store.clone() as Arc<dyn OrderStore>);
        hub.publish(order.id, OrderStatus::Routing, None).await;

        let loaded = store.get(order.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Routing);
    }

    #[tokio::test]
    async fn subscriber_receives_pushed_message() {
        let store = Arc::new(MemoryStore::new());
        let order = sample_order();
        store.insert(&order).await.unwrap();

        let hub = NotificationHub::new(store.clone() as Arc<dyn OrderStore>);
        let mut rx = hub.register(order.id);

        let payload = StatusPayload::quoted(DexKind::Raydium, 100.0, 99.7);
        hub.publish(order.id, OrderStatus::Building, Some(payload.clone()))
            .await;

        let message = rx.recv().await.unwrap();
        assert_eq!(message.kind, "status_update");
        assert_eq!(message.order_id, order.id);
        assert_eq!(message.status, OrderStatus::Building);
        assert_eq!(message.data, Some(payload));

        let loaded = store.get(order.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Building);
        assert_eq!(loaded.dex_used, Some(DexKind::Raydium));
    }

    #[tokio::test]
    async fn dropped_receiver_is_pruned_and_persistence_continues() {
        let store = Arc::new(MemoryStore::new());
        let order = sample_order();
        store.insert(&order).await.unwrap();

        let hub = NotificationHub::new(store.clone() as Arc<dyn OrderStore>);
        let rx = hub.register(order.id);
        drop(rx);

        hub.publish(order.id, OrderStatus::Submitted, None).await;

        assert_eq!(hub.subscriber_count(), 0);
        let loaded = store.get(order.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Submitted);
    }

    #[tokio::test]
    async fn reregistering_replaces_the_previous_channel() {
        let store = Arc::new(MemoryStore::new());
        let order = sample_order();
        store.insert(&order).await.unwrap();

        let hub = NotificationHub::new(store.clone() as Arc<dyn OrderStore>);
        let mut first = hub.register(order.id);
        let mut second = hub.register(order.id);

        hub.publish(order.id, OrderStatus::Routing, None).await;

        assert!(second.recv().await.is_some());
        assert!(first.try_recv().is_err());
    }

    #[test]
    fn payload_serializes_camel_case_and_skips_none() {
        let payload = StatusPayload::settled(DexKind::Meteora, 101.0, "0xabc".to_string(), 99.5);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["dexUsed"], "meteora");
        assert_eq!(json["executedPrice"], 101.0);
        assert_eq!(json["txHash"], "0xabc");
        assert!(json.get("error").is_none());
        assert!(json.get("quotedPrice").is_none());
    }

    #[test]
    fn message_serializes_with_type_tag() {
        let message =
            StatusMessage::status_update(Uuid::nil(), OrderStatus::Confirmed, None);
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "status_update");
        assert_eq!(json["status"], "confirmed");
        assert!(json.get("data").is_none());
    }
}
