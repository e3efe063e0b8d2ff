//! Order lifecycle driver: routing, building, submission, settlement.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{error, info};

use crate::dex::{DexRouter, SwapRequest};
use crate::domain::{Order, OrderStatus};
use crate::error::{EngineError, Result};
use crate::notify::{NotificationHub, StatusPayload};
use crate::queue::{JobHandler, JobOutcome};

/// Result of one execution attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Confirmed,
    Failed { error: String, retry: bool },
}

/// Walks one order through the full lifecycle, publishing every
/// transition as it happens. A failed attempt restarts from routing on
/// the next retry; nothing is resumed mid-flight.
pub struct OrderExecutor {
    router: Arc<DexRouter>,
    hub: Arc<NotificationHub>,
    phase_delay: Duration,
}

impl OrderExecutor {
    pub fn new(router: Arc<DexRouter>, hub: Arc<NotificationHub>, phase_delay: Duration) -> Self {
        Self {
            router,
            hub,
            phase_delay,
        }
    }

    pub async fn execute(&self, order: &Order) -> ExecutionOutcome {
        match self.run(order).await {
            Ok(()) => ExecutionOutcome::Confirmed,
            Err(e) => {
                let error = e.to_string();
                error!(order_id = %order.id, error = %error, "order execution failed");
                self.hub
                    .publish(
                        order.id,
                        OrderStatus::Failed,
                        Some(StatusPayload::failure(error.clone())),
                    )
                    .await;
                ExecutionOutcome::Failed { error, retry: true }
            }
        }
    }

    async fn run(&self, order: &Order) -> Result<()> {
        self.hub.publish(order.id, OrderStatus::Routing, None).await;
        sleep(self.phase_delay).await;

        let quote = self
            .router
            .best_quote(&order.token_in, &order.token_out, order.amount_in)
            .await?;
        let min_amount_out = order.min_amount_out(quote.amount_out);

        self.hub
            .publish(
                order.id,
                OrderStatus::Building,
                Some(StatusPayload::quoted(
                    quote.source,
                    quote.price,
                    quote.amount_out,
                )),
            )
            .await;
        sleep(self.phase_delay).await;

        self.hub
            .publish(order.id, OrderStatus::Submitted, None)
            .await;
        sleep(self.phase_delay).await;

        let source = self.router.source(quote.source).ok_or_else(|| {
            EngineError::Internal(format!("chosen source {} not registered", quote.source))
        })?;

        let settlement = source
            .execute_swap(
                &SwapRequest {
                    order_id: order.id,
                    token_in: order.token_in.clone(),
                    token_out: order.token_out.clone(),
                    amount_in: order.amount_in,
                    fee: quote.fee,
                    min_amount_out,
                },
                Some(quote.price),
            )
            .await?;

        info!(
            order_id = %order.id,
            dex = %quote.source,
            tx_hash = %settlement.tx_hash,
            amount_out = settlement.amount_out,
            "order confirmed"
        );

        self.hub
            .publish(
                order.id,
                OrderStatus::Confirmed,
                Some(StatusPayload::settled(
                    quote.source,
                    settlement.executed_price,
                    settlement.tx_hash,
                    settlement.amount_out,
                )),
            )
            .await;

        Ok(())
    }
}

#[async_trait]
impl JobHandler for OrderExecutor {
    async fn process(&self, order: &Order) -> JobOutcome {
        match self.execute(order).await {
            ExecutionOutcome::Confirmed => JobOutcome::Complete,
            ExecutionOutcome::Failed { error, retry: true } => JobOutcome::Retry { error },
            ExecutionOutcome::Failed { retry: false, .. } => JobOutcome::Complete,
        }
    }
}
