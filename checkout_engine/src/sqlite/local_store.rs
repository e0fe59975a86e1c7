//! `LocalCartStore` is the crash-safe key-value store for the anonymous cart.
//!
//! It is deliberately dumb: `(product, quantity)` rows in insertion order, no validation, no
//! business rules. The reconciler owns all semantics. The one behavioral guarantee is the
//! degradation rule: a corrupt or unavailable store reads as an empty cart instead of failing.
use std::{fmt::Debug, str::FromStr};

use log::*;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use thiserror::Error;

use crate::cart_types::{LocalCartRecord, ProductId};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS local_cart (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        product_id TEXT NOT NULL UNIQUE,
        quantity   INTEGER NOT NULL CHECK (quantity >= 1)
    );
"#;

#[derive(Clone)]
pub struct LocalCartStore {
    url: String,
    pool: SqlitePool,
}

impl Debug for LocalCartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "LocalCartStore ({:?})", self.pool)
    }
}

impl LocalCartStore {
    /// Open (creating if necessary) the local cart store at the given SQLite URL.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, LocalStoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        debug!("🗃️ Local cart store ready at {url}");
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// All records, in the order they were first stored.
    ///
    /// Storage failures degrade to an empty list. The rest of the engine then behaves as if the
    /// anonymous cart were empty, which is always a state the shopper can act on.
    pub async fn get(&self) -> Vec<LocalCartRecord> {
        let result = sqlx::query_as::<_, LocalCartRecord>(
            "SELECT product_id, quantity FROM local_cart ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await;
        match result {
            Ok(records) => records,
            Err(e) => {
                warn!("🗃️ Local cart is unreadable, degrading to an empty cart: {e}");
                Vec::new()
            },
        }
    }

    /// Replace the whole record list in one transaction.
    pub async fn set(&self, records: &[LocalCartRecord]) -> Result<(), LocalStoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM local_cart").execute(&mut *tx).await?;
        for record in records {
            sqlx::query("INSERT INTO local_cart (product_id, quantity) VALUES ($1, $2)")
                .bind(record.product_id.as_str())
                .bind(i64::from(record.quantity))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Insert or overwrite the record for a product. First-insertion order is preserved on
    /// overwrite.
    pub async fn upsert(&self, product_id: &ProductId, quantity: u32) -> Result<(), LocalStoreError> {
        sqlx::query(
            r#"
            INSERT INTO local_cart (product_id, quantity) VALUES ($1, $2)
            ON CONFLICT (product_id) DO UPDATE SET quantity = excluded.quantity
            "#,
        )
        .bind(product_id.as_str())
        .bind(i64::from(quantity))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete the record for a product, if present.
    pub async fn remove(&self, product_id: &ProductId) -> Result<(), LocalStoreError> {
        sqlx::query("DELETE FROM local_cart WHERE product_id = $1")
            .bind(product_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), LocalStoreError> {
        sqlx::query("DELETE FROM local_cart").execute(&self.pool).await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum LocalStoreError {
    #[error("Local cart storage error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for LocalStoreError {
    fn from(e: sqlx::Error) -> Self {
        LocalStoreError::Database(e.to_string())
    }
}
