//! PostgreSQL-backed order store.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::{Postgres, QueryBuilder, Row};
use tracing::debug;
use uuid::Uuid;

use super::store::{OrderStore, OrderUpdate};
use crate::domain::{DexKind, Order, OrderStatus, OrderType};
use crate::error::{EngineError, Result};

pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the orders table and its indexes if they do not exist yet
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id UUID PRIMARY KEY,
                user_id TEXT NOT NULL,
                order_type TEXT NOT NULL,
                token_in TEXT NOT NULL,
                token_out TEXT NOT NULL,
                amount_in DOUBLE PRECISION NOT NULL,
                slippage DOUBLE PRECISION NOT NULL DEFAULT 0.01,
                amount_out DOUBLE PRECISION,
                status TEXT NOT NULL,
                dex_used TEXT,
                executed_price DOUBLE PRECISION,
                tx_hash TEXT,
                error TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        for statement in [
            "CREATE INDEX IF NOT EXISTS idx_orders_user_id ON orders(user_id)",
            "CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status)",
            "CREATE INDEX IF NOT EXISTS idx_orders_created_at ON orders(created_at)",
        ] {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        debug!("orders schema initialized");
        Ok(())
    }

    fn order_from_row(row: &sqlx::postgres::PgRow) -> Result<Order> {
        let status_raw: String = row.try_get("status")?;
        let status = OrderStatus::try_from(status_raw.as_str())
            .map_err(EngineError::Internal)?;

        let dex_raw: Option<String> = row.try_get("dex_used")?;
        let dex_used = match dex_raw {
            Some(raw) => Some(
                DexKind::from_str(&raw).map_err(|e| EngineError::Internal(e.to_string()))?,
            ),
            None => None,
        };

        Ok(Order {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            order_type: OrderType::Market,
            token_in: row.try_get("token_in")?,
            token_out: row.try_get("token_out")?,
            amount_in: row.try_get("amount_in")?,
            slippage: row.try_get("slippage")?,
            amount_out: row.try_get("amount_out")?,
            status,
            dex_used,
            executed_price: row.try_get("executed_price")?,
            tx_hash: row.try_get("tx_hash")?,
            error: row.try_get("error")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, order: &Order) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, order_type, token_in, token_out, amount_in,
                slippage, amount_out, status, dex_used, executed_price,
                tx_hash, error, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(order.id)
        .bind(&order.user_id)
        .bind("market")
        .bind(&order.token_in)
        .bind(&order.token_out)
        .bind(order.amount_in)
        .bind(order.slippage)
        .bind(order.amount_out)
        .bind(order.status.as_str())
        .bind(order.dex_used.map(|d| d.as_str()))
        .bind(order.executed_price)
        .bind(&order.tx_hash)
        .bind(&order.error)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, update: &OrderUpdate) -> Result<()> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE orders SET ");
        let mut fields = builder.separated(", ");

        if let Some(status) = update.status {
            fields.push("status = ");
            fields.push_bind_unseparated(status.as_str());
        }
        if let Some(amount_out) = update.amount_out {
            fields.push("amount_out = ");
            fields.push_bind_unseparated(amount_out);
        }
        if let Some(dex_used) = update.dex_used {
            fields.push("dex_used = ");
            fields.push_bind_unseparated(dex_used.as_str());
        }
        if let Some(executed_price) = update.executed_price {
            fields.push("executed_price = ");
            fields.push_bind_unseparated(executed_price);
        }
        if let Some(ref tx_hash) = update.tx_hash {
            fields.push("tx_hash = ");
            fields.push_bind_unseparated(tx_hash.clone());
        }
        if let Some(ref error) = update.error {
            fields.push("error = ");
            fields.push_bind_unseparated(error.clone());
        }
        fields.push("updated_at = ");
        fields.push_bind_unseparated(update.updated_at);

        builder.push(" WHERE id = ");
        builder.push_bind(update.id);

        builder.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Self::order_from_row(&row)?)),
            None => Ok(None),
        }
    }
}
