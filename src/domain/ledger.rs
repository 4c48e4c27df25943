use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    Cents, Platform, PlatformId, TULLAVE_ID, TULLAVE_NAME, Transaction, TransactionId, TxKind,
    default_platforms,
};

/// Persisted ledger shape before validation. Fields the store could not
/// produce stay empty/None and are filled in by [`normalize`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLedgerState {
    pub cash_base: Option<Cents>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    pub next_platform_id: Option<PlatformId>,
    pub next_transaction_id: Option<TransactionId>,
}

/// Turn whatever the store handed back into a trusted ledger.
///
/// `None` means a fresh store: zero cash, the default platform set, empty
/// log. A present-but-partial snapshot gets per-field defaults, and a
/// TuLlave platform is reseeded if missing, since `compra_tullave` needs a
/// destination. Transactions with non-positive amounts are dropped as
/// malformed. No other code path performs shape checks.
pub fn normalize(raw: Option<RawLedgerState>) -> Ledger {
    let Some(raw) = raw else {
        return Ledger::new();
    };

    let mut platforms = raw.platforms;
    if !platforms.iter().any(|p| p.is_tullave()) {
        platforms.push(Platform::new(TULLAVE_ID, TULLAVE_NAME, 0));
    }

    let mut transactions = raw.transactions;
    transactions.retain(|t| t.amount > 0);

    // Counters resume from the stored value so ids of removed rows are never
    // reissued. Snapshots predating the counters fall back to max(id) + 1.
    let max_platform_id = platforms.iter().map(|p| p.id).max().unwrap_or(0);
    let next_platform_id = raw.next_platform_id.unwrap_or(0).max(max_platform_id + 1);
    let max_transaction_id = transactions.iter().map(|t| t.id).max().unwrap_or(0);
    let next_transaction_id = raw
        .next_transaction_id
        .unwrap_or(0)
        .max(max_transaction_id + 1);

    Ledger {
        cash_base: raw.cash_base.unwrap_or(0),
        platforms,
        transactions,
        next_platform_id,
        next_transaction_id,
    }
}

/// The balance state machine: one cash-base account, N platform accounts,
/// and the append-ordered transaction log. Every balance change flows
/// through a transaction's apply/reverse effect, except the explicit
/// reconciliation overwrites (`set_*`, `sync_balances`, `reset_day`).
///
/// Single-writer by construction: callers own the instance and invoke it
/// from one place at a time. Apply/reverse pairs are not safe under
/// interleaving, so a multi-tab or multi-user port must serialize access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    cash_base: Cents,
    platforms: Vec<Platform>,
    transactions: Vec<Transaction>,
    // Id counters only ever move forward, including across removals, so an
    // id can never point at two different rows over the ledger's lifetime.
    next_platform_id: PlatformId,
    next_transaction_id: TransactionId,
}

impl Ledger {
    /// Fresh ledger for a new store: zero cash, default platforms.
    pub fn new() -> Self {
        let platforms = default_platforms();
        let next_platform_id = platforms.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        Self {
            cash_base: 0,
            platforms,
            transactions: Vec::new(),
            next_platform_id,
            next_transaction_id: 1,
        }
    }

    // ========================
    // Accessors
    // ========================

    pub fn cash_base(&self) -> Cents {
        self.cash_base
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Next id `add_platform` will assign. Persisted with the snapshot.
    pub fn next_platform_id(&self) -> PlatformId {
        self.next_platform_id
    }

    /// Next id `apply_transaction` will assign. Persisted with the snapshot.
    pub fn next_transaction_id(&self) -> TransactionId {
        self.next_transaction_id
    }

    pub fn find_platform(&self, id: PlatformId) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.id == id)
    }

    pub fn find_transaction(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// The fixed destination of `compra_tullave` transfers.
    pub fn tullave(&self) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.is_tullave())
    }

    pub fn platforms_total(&self) -> Cents {
        self.platforms.iter().map(|p| p.balance).sum()
    }

    pub fn grand_total(&self) -> Cents {
        self.cash_base + self.platforms_total()
    }

    /// Transactions recorded on the given UTC day, most recent first.
    pub fn day_transactions(&self, day: NaiveDate) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .rev()
            .filter(|t| t.timestamp.date_naive() == day)
            .collect()
    }

    // ========================
    // Transaction operations
    // ========================

    /// Record a new transaction and apply its balance effect. The only
    /// account-mutating entry point besides edit/delete.
    pub fn apply_transaction(
        &mut self,
        kind: TxKind,
        platform_id: Option<PlatformId>,
        amount: Cents,
        note: impl Into<String>,
    ) -> Result<TransactionId, LedgerError> {
        let platform_id = self.validate(kind, platform_id, amount)?;
        let id = self.next_transaction_id;
        self.next_transaction_id += 1;

        self.apply_effect(kind, platform_id, amount);
        self.transactions
            .push(Transaction::new(id, kind, platform_id, amount, note));
        Ok(id)
    }

    /// Undo a recorded transaction: apply the exact additive inverse of its
    /// effect and remove it from the log. A second call on the same id fails
    /// with `TransactionNotFound`, so double reversal is impossible.
    pub fn reverse_transaction(&mut self, id: TransactionId) -> Result<(), LedgerError> {
        let index = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or(LedgerError::TransactionNotFound(id))?;

        let tx = self.transactions.remove(index);
        self.apply_effect(tx.kind, tx.platform_id, -tx.amount);
        Ok(())
    }

    /// Replace a recorded transaction: reverse the old effect, then apply
    /// the replacement under the original id with a fresh timestamp.
    ///
    /// The replacement is validated before anything is reversed, so a
    /// rejected edit leaves the ledger exactly as it was.
    pub fn edit_transaction(
        &mut self,
        id: TransactionId,
        kind: TxKind,
        platform_id: Option<PlatformId>,
        amount: Cents,
        note: impl Into<String>,
    ) -> Result<(), LedgerError> {
        if self.find_transaction(id).is_none() {
            return Err(LedgerError::TransactionNotFound(id));
        }
        let platform_id = self.validate(kind, platform_id, amount)?;

        self.reverse_transaction(id)?;
        self.apply_effect(kind, platform_id, amount);
        self.transactions
            .push(Transaction::new(id, kind, platform_id, amount, note));
        Ok(())
    }

    pub fn delete_transaction(&mut self, id: TransactionId) -> Result<(), LedgerError> {
        self.reverse_transaction(id)
    }

    // ========================
    // Platform operations
    // ========================

    pub fn add_platform(&mut self, name: impl Into<String>, balance: Cents) -> PlatformId {
        let id = self.next_platform_id;
        self.next_platform_id += 1;
        self.platforms.push(Platform::new(id, name, balance));
        id
    }

    /// Remove a platform account. Historical transactions referencing it are
    /// left in the log; their platform leg becomes a no-op on future
    /// reversal.
    pub fn remove_platform(&mut self, id: PlatformId) -> Result<Platform, LedgerError> {
        let index = self
            .platforms
            .iter()
            .position(|p| p.id == id)
            .ok_or(LedgerError::UnknownPlatform(Some(id)))?;
        Ok(self.platforms.remove(index))
    }

    // ========================
    // Reconciliation overwrites
    // ========================
    // These bypass the transaction log entirely and are not reversible:
    // the "sync balances" escape hatch for matching the ledger to the
    // physically counted money.

    pub fn set_platform_balance(
        &mut self,
        id: PlatformId,
        balance: Cents,
    ) -> Result<(), LedgerError> {
        let platform = self
            .platforms
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(LedgerError::UnknownPlatform(Some(id)))?;
        platform.balance = balance;
        Ok(())
    }

    pub fn set_cash_base(&mut self, balance: Cents) {
        self.cash_base = balance;
    }

    /// Overwrite several platform balances at once (the "save all" flow).
    /// Entries naming an unknown platform are skipped.
    pub fn sync_balances(&mut self, entries: &[(PlatformId, Cents)]) {
        for (id, balance) in entries {
            if let Some(platform) = self.platforms.iter_mut().find(|p| p.id == *id) {
                platform.balance = *balance;
            }
        }
    }

    /// Start a new accounting day: clear the log, zero the cash base and
    /// every platform. Irreversible.
    pub fn reset_day(&mut self) {
        self.transactions.clear();
        self.cash_base = 0;
        for platform in &mut self.platforms {
            platform.balance = 0;
        }
    }

    // ========================
    // Internals
    // ========================

    /// Check a prospective transaction without touching any balance, and
    /// resolve the platform reference it will be recorded with. Base-only
    /// kinds always record `None`.
    fn validate(
        &self,
        kind: TxKind,
        platform_id: Option<PlatformId>,
        amount: Cents,
    ) -> Result<Option<PlatformId>, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        if !kind.requires_platform() {
            return Ok(None);
        }

        let id = platform_id.ok_or(LedgerError::UnknownPlatform(None))?;
        if self.find_platform(id).is_none() {
            return Err(LedgerError::UnknownPlatform(Some(id)));
        }
        // Both legs of a compra_tullave must resolve up front so the effect
        // stays atomic.
        if kind == TxKind::CompraTullave && self.tullave().is_none() {
            return Err(LedgerError::UnknownPlatform(Some(TULLAVE_ID)));
        }
        Ok(Some(id))
    }

    /// The single effect table shared by apply, edit and reverse. Reversal
    /// passes the negated amount. A platform leg whose account no longer
    /// exists is skipped: the documented lossy edge case for reversals that
    /// outlive their platform.
    fn apply_effect(&mut self, kind: TxKind, platform_id: Option<PlatformId>, amount: Cents) {
        match kind {
            TxKind::Retiro => {
                self.credit_platform(platform_id, amount);
                self.cash_base -= amount;
            }
            TxKind::Envio | TxKind::Pago | TxKind::Recarga | TxKind::RecargaTullave => {
                self.credit_platform(platform_id, -amount);
                self.cash_base += amount;
            }
            TxKind::CompraTullave => {
                self.credit_platform(platform_id, -amount);
                let tullave_id = self.tullave().map(|p| p.id);
                self.credit_platform(tullave_id, amount);
            }
            TxKind::BaseIngreso => self.cash_base += amount,
            TxKind::BaseRetiro => self.cash_base -= amount,
        }
    }

    fn credit_platform(&mut self, id: Option<PlatformId>, delta: Cents) {
        if let Some(platform) = id.and_then(|id| self.platforms.iter_mut().find(|p| p.id == id)) {
            platform.balance += delta;
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Amount was zero or negative.
    InvalidAmount(Cents),
    /// Referenced platform does not exist (None: the kind needs a platform
    /// but no id was given).
    UnknownPlatform(Option<PlatformId>),
    /// Reverse/edit/delete named an id absent from the log.
    TransactionNotFound(TransactionId),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::InvalidAmount(amount) => {
                write!(f, "invalid amount: {} (must be positive)", amount)
            }
            LedgerError::UnknownPlatform(Some(id)) => write!(f, "unknown platform id: {}", id),
            LedgerError::UnknownPlatform(None) => {
                write!(f, "this transaction kind requires a platform")
            }
            LedgerError::TransactionNotFound(id) => write!(f, "transaction not found: {}", id),
        }
    }
}

impl std::error::Error for LedgerError {}
