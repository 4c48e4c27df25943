use std::collections::HashMap;

use chrono::{NaiveDate, Utc};

use crate::domain::{
    Cents, Inventory, Ledger, Platform, PlatformId, SaleCommand, Transaction, TransactionId,
    TxKind, normalize, parse_sale_command, singularize,
};
use crate::storage::Repository;

use super::reporting::{BalanceSheet, DayHistory, build_balance_sheet, build_day_history};
use super::AppError;

/// High-level operations for the corresponsal tools. The primary interface
/// for any client (CLI today; anything else would sit on the same calls).
///
/// The in-memory ledger and inventory are the source of truth for the
/// session; the repository is a mirror rewritten after every mutating call.
/// The service owns them mutably, so operations never interleave.
pub struct CorresponsalService {
    ledger: Ledger,
    inventory: Inventory,
    repo: Repository,
}

impl CorresponsalService {
    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Self::load(repo).await
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Self::load(repo).await
    }

    async fn load(repo: Repository) -> Result<Self, AppError> {
        let ledger = normalize(repo.load_state().await?);
        let inventory = Inventory::new(repo.load_sales().await?);
        Ok(Self {
            ledger,
            inventory,
            repo,
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    async fn persist(&self) -> Result<(), AppError> {
        self.repo.save_state(&self.ledger).await?;
        Ok(())
    }

    // ========================
    // Transactions
    // ========================

    /// Record a transaction and apply its balance effect.
    pub async fn add_transaction(
        &mut self,
        kind: TxKind,
        platform_id: Option<PlatformId>,
        amount: Cents,
        note: String,
    ) -> Result<Transaction, AppError> {
        let id = self
            .ledger
            .apply_transaction(kind, platform_id, amount, note)?;
        self.persist().await?;
        Ok(self
            .ledger
            .find_transaction(id)
            .expect("freshly applied transaction exists")
            .clone())
    }

    /// Replace a recorded transaction under the same id.
    pub async fn edit_transaction(
        &mut self,
        id: TransactionId,
        kind: TxKind,
        platform_id: Option<PlatformId>,
        amount: Cents,
        note: String,
    ) -> Result<Transaction, AppError> {
        self.ledger
            .edit_transaction(id, kind, platform_id, amount, note)?;
        self.persist().await?;
        Ok(self
            .ledger
            .find_transaction(id)
            .expect("edited transaction exists")
            .clone())
    }

    /// Delete a transaction, reversing its balance effect.
    pub async fn delete_transaction(&mut self, id: TransactionId) -> Result<(), AppError> {
        self.ledger.delete_transaction(id)?;
        self.persist().await
    }

    // ========================
    // Platforms and reconciliation
    // ========================

    pub async fn add_platform(
        &mut self,
        name: String,
        balance: Cents,
    ) -> Result<Platform, AppError> {
        let id = self.ledger.add_platform(name, balance);
        self.persist().await?;
        Ok(self
            .ledger
            .find_platform(id)
            .expect("freshly added platform exists")
            .clone())
    }

    pub async fn remove_platform(&mut self, id: PlatformId) -> Result<Platform, AppError> {
        let removed = self.ledger.remove_platform(id)?;
        self.persist().await?;
        Ok(removed)
    }

    pub async fn set_platform_balance(
        &mut self,
        id: PlatformId,
        balance: Cents,
    ) -> Result<(), AppError> {
        self.ledger.set_platform_balance(id, balance)?;
        self.persist().await
    }

    pub async fn set_cash_base(&mut self, balance: Cents) -> Result<(), AppError> {
        self.ledger.set_cash_base(balance);
        self.persist().await
    }

    /// Overwrite several platform balances at once (the end-of-count
    /// reconciliation flow).
    pub async fn sync_balances(
        &mut self,
        entries: &[(PlatformId, Cents)],
    ) -> Result<(), AppError> {
        self.ledger.sync_balances(entries);
        self.persist().await
    }

    /// Start a new accounting day. Irreversible.
    pub async fn reset_day(&mut self) -> Result<(), AppError> {
        self.ledger.reset_day();
        self.persist().await
    }

    // ========================
    // Queries
    // ========================

    pub fn balance_sheet(&self) -> BalanceSheet {
        build_balance_sheet(&self.ledger)
    }

    pub fn day_history(&self, day: NaiveDate) -> DayHistory {
        build_day_history(&self.ledger, day)
    }

    pub fn today_history(&self) -> DayHistory {
        self.day_history(Utc::now().date_naive())
    }

    // ========================
    // Sales inventory
    // ========================

    pub async fn record_sale(&mut self, product: &str, quantity: i64) -> Result<(), AppError> {
        if quantity <= 0 {
            return Err(AppError::InvalidAmount(format!(
                "quantity must be positive, got {}",
                quantity
            )));
        }
        self.inventory.record_sale(product, quantity);
        self.repo.save_sales(self.inventory.counts()).await?;
        Ok(())
    }

    /// Record a sale from free text ("vendí 2 gorras"). The product is
    /// singularized so plural and singular mentions count together.
    pub async fn record_sale_text(&mut self, text: &str) -> Result<SaleCommand, AppError> {
        let command =
            parse_sale_command(text).ok_or_else(|| AppError::UnparsedSale(text.to_string()))?;
        let product = singularize(&command.product);
        self.record_sale(&product, command.quantity).await?;
        Ok(SaleCommand {
            product,
            quantity: command.quantity,
        })
    }

    pub fn sales_ranked(&self) -> Vec<(String, i64)> {
        self.inventory.ranked()
    }

    pub async fn reset_sales(&mut self) -> Result<(), AppError> {
        self.inventory.reset();
        self.repo.save_sales(self.inventory.counts()).await?;
        Ok(())
    }

    /// Merge legacy inventory counts into the sales store (the one-time
    /// migration from the old tracker's flat map).
    pub async fn merge_sales(&mut self, counts: &HashMap<String, i64>) -> Result<(), AppError> {
        self.inventory.merge(counts);
        self.repo.save_sales(self.inventory.counts()).await?;
        Ok(())
    }
}
