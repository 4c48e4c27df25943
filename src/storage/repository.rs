use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::domain::{Ledger, Platform, RawLedgerState, Transaction, TxKind};

use super::MIGRATION_001_INITIAL;

/// Persistence mirror for the ledger and the sales counts.
///
/// Writes are whole-snapshot: after every mutating service call the full
/// state is rewritten inside one SQLite transaction. Reads are tolerant:
/// rows that fail shape validation are dropped, and the missing pieces are
/// filled in by `domain::normalize`.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given path.
    /// Creates the database file if it doesn't exist.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Ledger snapshot
    // ========================

    /// Load the stored snapshot, or None when nothing was ever saved.
    /// Malformed rows are skipped, not surfaced: the caller normalizes
    /// whatever comes back.
    pub async fn load_state(&self) -> Result<Option<RawLedgerState>> {
        let meta_rows = sqlx::query("SELECT name, value FROM meta")
            .fetch_all(&self.pool)
            .await
            .context("Failed to read meta values")?;
        let meta: HashMap<String, String> = meta_rows
            .iter()
            .map(|row| (row.get("name"), row.get("value")))
            .collect();

        // cash_base is written on every save, so its absence means the
        // snapshot was never saved at all.
        if !meta.contains_key("cash_base") {
            return Ok(None);
        }
        let meta_i64 = |name: &str| meta.get(name).and_then(|v| v.parse::<i64>().ok());
        let cash_base = meta_i64("cash_base");
        let next_platform_id = meta_i64("next_platform_id");
        let next_transaction_id = meta_i64("next_transaction_id");

        let platform_rows =
            sqlx::query("SELECT id, name, balance_cents FROM platforms ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .context("Failed to list platforms")?;
        let platforms = platform_rows
            .iter()
            .map(|row| Platform {
                id: row.get("id"),
                name: row.get("name"),
                balance: row.get("balance_cents"),
            })
            .collect();

        let tx_rows = sqlx::query(
            "SELECT id, kind, platform_id, amount_cents, note, timestamp FROM transactions ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions")?;
        let transactions = tx_rows.iter().filter_map(Self::row_to_transaction).collect();

        Ok(Some(RawLedgerState {
            cash_base,
            platforms,
            transactions,
            next_platform_id,
            next_transaction_id,
        }))
    }

    /// Mirror the whole ledger into the store in one transaction.
    pub async fn save_state(&self, ledger: &Ledger) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin save")?;

        let meta_values = [
            ("cash_base", ledger.cash_base()),
            ("next_platform_id", ledger.next_platform_id()),
            ("next_transaction_id", ledger.next_transaction_id()),
        ];
        for (name, value) in meta_values {
            sqlx::query("INSERT OR REPLACE INTO meta (name, value) VALUES (?, ?)")
                .bind(name)
                .bind(value.to_string())
                .execute(&mut *tx)
                .await
                .context("Failed to save meta value")?;
        }

        sqlx::query("DELETE FROM platforms").execute(&mut *tx).await?;
        for platform in ledger.platforms() {
            sqlx::query("INSERT INTO platforms (id, name, balance_cents) VALUES (?, ?, ?)")
                .bind(platform.id)
                .bind(&platform.name)
                .bind(platform.balance)
                .execute(&mut *tx)
                .await
                .context("Failed to save platform")?;
        }

        sqlx::query("DELETE FROM transactions")
            .execute(&mut *tx)
            .await?;
        for transaction in ledger.transactions() {
            sqlx::query(
                r#"
                INSERT INTO transactions (id, kind, platform_id, amount_cents, note, timestamp)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(transaction.id)
            .bind(transaction.kind.as_str())
            .bind(transaction.platform_id)
            .bind(transaction.amount)
            .bind(&transaction.note)
            .bind(transaction.timestamp.to_rfc3339())
            .execute(&mut *tx)
            .await
            .context("Failed to save transaction")?;
        }

        tx.commit().await.context("Failed to commit save")?;
        Ok(())
    }

    /// None means the row was malformed and gets dropped on load.
    fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Option<Transaction> {
        let kind_str: String = row.get("kind");
        let timestamp_str: String = row.get("timestamp");

        Some(Transaction {
            id: row.get("id"),
            kind: TxKind::from_str(&kind_str)?,
            platform_id: row.get("platform_id"),
            amount: row.get("amount_cents"),
            note: row.get("note"),
            timestamp: DateTime::parse_from_rfc3339(&timestamp_str)
                .ok()?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Sales counts
    // ========================

    pub async fn load_sales(&self) -> Result<HashMap<String, i64>> {
        let rows = sqlx::query("SELECT product, count FROM sales")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list sales")?;

        Ok(rows
            .iter()
            .map(|row| (row.get("product"), row.get("count")))
            .collect())
    }

    pub async fn save_sales(&self, counts: &HashMap<String, i64>) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin save")?;

        sqlx::query("DELETE FROM sales").execute(&mut *tx).await?;
        for (product, count) in counts {
            sqlx::query("INSERT INTO sales (product, count) VALUES (?, ?)")
                .bind(product)
                .bind(count)
                .execute(&mut *tx)
                .await
                .context("Failed to save sale count")?;
        }

        tx.commit().await.context("Failed to commit save")?;
        Ok(())
    }
}
