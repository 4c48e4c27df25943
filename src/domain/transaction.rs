use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Cents, PlatformId};

pub type TransactionId = i64;

/// The closed set of operations a corresponsal counter performs. Each kind
/// has a fixed balance-effect rule, applied by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    /// Client withdraws cash: their platform balance moves to us, our cash
    /// drawer pays out.
    Retiro,
    /// Client deposits cash to send through a platform.
    Envio,
    /// Client pays a bill in cash, we pay it from the platform.
    Pago,
    /// Phone/service recharge paid in cash.
    Recarga,
    /// TuLlave transit-card recharge paid in cash.
    RecargaTullave,
    /// Buying TuLlave credit from another platform; moves value between two
    /// platforms, cash untouched.
    CompraTullave,
    /// Cash added to the drawer outside any platform operation.
    BaseIngreso,
    /// Cash taken out of the drawer outside any platform operation.
    BaseRetiro,
}

impl TxKind {
    pub const ALL: [TxKind; 8] = [
        TxKind::Retiro,
        TxKind::Envio,
        TxKind::Pago,
        TxKind::Recarga,
        TxKind::RecargaTullave,
        TxKind::CompraTullave,
        TxKind::BaseIngreso,
        TxKind::BaseRetiro,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Retiro => "retiro",
            TxKind::Envio => "envio",
            TxKind::Pago => "pago",
            TxKind::Recarga => "recarga",
            TxKind::RecargaTullave => "recarga_tullave",
            TxKind::CompraTullave => "compra_tullave",
            TxKind::BaseIngreso => "base_ingreso",
            TxKind::BaseRetiro => "base_retiro",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "retiro" => Some(TxKind::Retiro),
            "envio" => Some(TxKind::Envio),
            "pago" => Some(TxKind::Pago),
            "recarga" => Some(TxKind::Recarga),
            "recarga_tullave" => Some(TxKind::RecargaTullave),
            "compra_tullave" => Some(TxKind::CompraTullave),
            "base_ingreso" => Some(TxKind::BaseIngreso),
            "base_retiro" => Some(TxKind::BaseRetiro),
            _ => None,
        }
    }

    /// Kinds that target a platform account. `base_ingreso`/`base_retiro`
    /// touch only the cash drawer.
    pub fn requires_platform(&self) -> bool {
        !matches!(self, TxKind::BaseIngreso | TxKind::BaseRetiro)
    }

    /// History panel this kind is displayed under.
    pub fn bucket(&self) -> HistoryBucket {
        match self {
            TxKind::Retiro | TxKind::BaseRetiro => HistoryBucket::Retiros,
            TxKind::Envio | TxKind::BaseIngreso => HistoryBucket::Envios,
            TxKind::Pago | TxKind::Recarga | TxKind::RecargaTullave | TxKind::CompraTullave => {
                HistoryBucket::Pagos
            }
        }
    }
}

impl std::fmt::Display for TxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The three panels the day history is grouped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBucket {
    /// Withdrawals: retiro, base_retiro
    Retiros,
    /// Deposits/income: envio, base_ingreso
    Envios,
    /// Payments, recharges and transfers: pago, recarga, recarga_tullave,
    /// compra_tullave
    Pagos,
}

impl HistoryBucket {
    pub const ALL: [HistoryBucket; 3] = [
        HistoryBucket::Retiros,
        HistoryBucket::Envios,
        HistoryBucket::Pagos,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HistoryBucket::Retiros => "Retiros",
            HistoryBucket::Envios => "Envios / Ingresos",
            HistoryBucket::Pagos => "Pagos / Recargas",
        }
    }
}

/// A recorded counter operation. Immutable once recorded: corrections go
/// through the ledger's edit flow (full reverse plus reapply under the same
/// id), never through field mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub kind: TxKind,
    /// Target platform; None for the base-only kinds.
    pub platform_id: Option<PlatformId>,
    /// Always positive; the kind decides the direction.
    pub amount: Cents,
    pub note: String,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        id: TransactionId,
        kind: TxKind,
        platform_id: Option<PlatformId>,
        amount: Cents,
        note: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            platform_id,
            amount,
            note: note.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in TxKind::ALL {
            assert_eq!(TxKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(TxKind::from_str("RETIRO"), Some(TxKind::Retiro));
        assert_eq!(TxKind::from_str("giro"), None);
    }

    #[test]
    fn test_base_kinds_do_not_require_platform() {
        assert!(!TxKind::BaseIngreso.requires_platform());
        assert!(!TxKind::BaseRetiro.requires_platform());
        assert!(TxKind::Retiro.requires_platform());
        assert!(TxKind::CompraTullave.requires_platform());
    }

    #[test]
    fn test_bucket_grouping() {
        assert_eq!(TxKind::Retiro.bucket(), HistoryBucket::Retiros);
        assert_eq!(TxKind::BaseRetiro.bucket(), HistoryBucket::Retiros);
        assert_eq!(TxKind::Envio.bucket(), HistoryBucket::Envios);
        assert_eq!(TxKind::BaseIngreso.bucket(), HistoryBucket::Envios);
        for kind in [
            TxKind::Pago,
            TxKind::Recarga,
            TxKind::RecargaTullave,
            TxKind::CompraTullave,
        ] {
            assert_eq!(kind.bucket(), HistoryBucket::Pagos);
        }
    }
}
