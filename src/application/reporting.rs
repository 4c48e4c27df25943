use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Cents, HistoryBucket, Ledger, PlatformId, Transaction};

/// Per-platform balance line for the overview display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceLine {
    pub platform_id: PlatformId,
    pub platform_name: String,
    pub balance: Cents,
}

/// Snapshot of all balances: the cash drawer, every platform, and the
/// aggregate totals the counter staff reconcile against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub cash_base: Cents,
    pub platforms: Vec<BalanceLine>,
    pub platforms_total: Cents,
    pub grand_total: Cents,
}

/// One line of the day history, with the display name resolved the way the
/// original panels showed it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub transaction: Transaction,
    pub display_name: String,
    pub bucket: HistoryBucket,
}

/// One history panel: its entries (most recent first) and the day's net
/// flow through it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketPanel {
    pub bucket: HistoryBucket,
    pub entries: Vec<HistoryEntry>,
    pub net_flow: Cents,
}

/// The day history grouped into the three panels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayHistory {
    pub day: NaiveDate,
    pub retiros: BucketPanel,
    pub envios: BucketPanel,
    pub pagos: BucketPanel,
}

impl DayHistory {
    pub fn panels(&self) -> [&BucketPanel; 3] {
        [&self.retiros, &self.envios, &self.pagos]
    }

    pub fn is_empty(&self) -> bool {
        self.panels().iter().all(|p| p.entries.is_empty())
    }
}

pub fn build_balance_sheet(ledger: &Ledger) -> BalanceSheet {
    BalanceSheet {
        cash_base: ledger.cash_base(),
        platforms: ledger
            .platforms()
            .iter()
            .map(|p| BalanceLine {
                platform_id: p.id,
                platform_name: p.name.clone(),
                balance: p.balance,
            })
            .collect(),
        platforms_total: ledger.platforms_total(),
        grand_total: ledger.grand_total(),
    }
}

pub fn build_day_history(ledger: &Ledger, day: NaiveDate) -> DayHistory {
    let empty = |bucket| BucketPanel {
        bucket,
        entries: Vec::new(),
        net_flow: 0,
    };
    let mut retiros = empty(HistoryBucket::Retiros);
    let mut envios = empty(HistoryBucket::Envios);
    let mut pagos = empty(HistoryBucket::Pagos);

    for transaction in ledger.day_transactions(day) {
        let bucket = transaction.kind.bucket();
        let entry = HistoryEntry {
            transaction: transaction.clone(),
            display_name: display_name(ledger, transaction),
            bucket,
        };
        let panel = match bucket {
            HistoryBucket::Retiros => &mut retiros,
            HistoryBucket::Envios => &mut envios,
            HistoryBucket::Pagos => &mut pagos,
        };
        panel.net_flow += transaction.amount;
        panel.entries.push(entry);
    }

    DayHistory {
        day,
        retiros,
        envios,
        pagos,
    }
}

/// Resolve the label a transaction is shown under. Platforms deleted after
/// the fact show up as "Unknown", same as the original history did.
fn display_name(ledger: &Ledger, transaction: &Transaction) -> String {
    use crate::domain::TxKind;

    let platform_name = transaction
        .platform_id
        .and_then(|id| ledger.find_platform(id))
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    match transaction.kind {
        TxKind::CompraTullave => {
            let tullave = ledger
                .tullave()
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "TuLlave".to_string());
            format!("{} -> {}", platform_name, tullave)
        }
        TxKind::BaseIngreso => "Base (Ingreso)".to_string(),
        TxKind::BaseRetiro => "Base (Retiro)".to_string(),
        _ => platform_name,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::TxKind;

    #[test]
    fn test_balance_sheet_totals() {
        let mut ledger = Ledger::new();
        ledger.set_cash_base(10_000);
        ledger.set_platform_balance(1, 2_000).unwrap();
        ledger.set_platform_balance(2, 3_000).unwrap();

        let sheet = build_balance_sheet(&ledger);
        assert_eq!(sheet.cash_base, 10_000);
        assert_eq!(sheet.platforms_total, 5_000);
        assert_eq!(sheet.grand_total, 15_000);
        assert_eq!(sheet.platforms.len(), 4);
    }

    #[test]
    fn test_day_history_buckets_and_net_flow() {
        let mut ledger = Ledger::new();
        ledger.set_cash_base(1_000_000);
        ledger
            .apply_transaction(TxKind::Retiro, Some(1), 50_000, "a")
            .unwrap();
        ledger
            .apply_transaction(TxKind::Envio, Some(1), 20_000, "b")
            .unwrap();
        ledger
            .apply_transaction(TxKind::Pago, Some(2), 15_000, "c")
            .unwrap();
        ledger
            .apply_transaction(TxKind::Recarga, Some(3), 5_000, "d")
            .unwrap();

        let history = build_day_history(&ledger, Utc::now().date_naive());
        assert_eq!(history.retiros.entries.len(), 1);
        assert_eq!(history.retiros.net_flow, 50_000);
        assert_eq!(history.envios.entries.len(), 1);
        assert_eq!(history.pagos.entries.len(), 2);
        assert_eq!(history.pagos.net_flow, 20_000);
        assert!(!history.is_empty());
    }

    #[test]
    fn test_display_names() {
        let mut ledger = Ledger::new();
        ledger
            .apply_transaction(TxKind::CompraTullave, Some(2), 1_000, "")
            .unwrap();
        ledger
            .apply_transaction(TxKind::BaseIngreso, None, 1_000, "")
            .unwrap();
        let removed = ledger.add_platform("Nequi", 0);
        ledger
            .apply_transaction(TxKind::Retiro, Some(removed), 1_000, "")
            .unwrap();
        ledger.remove_platform(removed).unwrap();

        let history = build_day_history(&ledger, Utc::now().date_naive());
        assert_eq!(history.pagos.entries[0].display_name, "Platika -> TuLlave");
        assert_eq!(history.envios.entries[0].display_name, "Base (Ingreso)");
        assert_eq!(history.retiros.entries[0].display_name, "Unknown");
    }
}
