//! Order intake: validate, persist, announce, enqueue.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::{Order, OrderRequest, OrderStatus};
use crate::error::Result;
use crate::notify::NotificationHub;
use crate::persistence::OrderStore;
use crate::queue::JobQueue;
use crate::validation::validate_order_request;

pub struct OrderService {
    store: Arc<dyn OrderStore>,
    queue: Arc<JobQueue>,
    hub: Arc<NotificationHub>,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>, queue: Arc<JobQueue>, hub: Arc<NotificationHub>) -> Self {
        Self { store, queue, hub }
    }

    /// Accept a new market-swap request. The order is durably recorded as
    /// `pending` before it is handed to the queue, so a status read never
    /// races the workers.
    pub async fn submit(&self, request: OrderRequest) -> Result<Order> {
        validate_order_request(&request)?;

        let order = Order::from_request(&request);
        self.store.insert(&order).await?;
        self.hub.publish(order.id, OrderStatus::Pending, None).await;
        self.queue.enqueue(order.clone()).await?;

        info!(
            order_id = %order.id,
            user_id = %order.user_id,
            token_in = %order.token_in,
            token_out = %order.token_out,
            amount_in = order.amount_in,
            "order accepted"
        );

        Ok(order)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Order>> {
        self.store.get(id).await
    }
}
