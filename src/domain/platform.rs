use serde::{Deserialize, Serialize};

use super::Cents;

pub type PlatformId = i64;

/// Fixed id of the TuLlave platform in the default set. Kept distinguished
/// because `compra_tullave` always credits it.
pub const TULLAVE_ID: PlatformId = 4;
pub const TULLAVE_NAME: &str = "TuLlave";

/// A named electronic-payment-channel balance (mobile wallet, recharge
/// network, transit card).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub id: PlatformId,
    pub name: String,
    pub balance: Cents,
}

impl Platform {
    pub fn new(id: PlatformId, name: impl Into<String>, balance: Cents) -> Self {
        Self {
            id,
            name: name.into(),
            balance,
        }
    }

    pub fn is_tullave(&self) -> bool {
        self.id == TULLAVE_ID || self.name == TULLAVE_NAME
    }
}

/// The platform set a fresh ledger starts with.
pub fn default_platforms() -> Vec<Platform> {
    vec![
        Platform::new(1, "PTM", 0),
        Platform::new(2, "Platika", 0),
        Platform::new(3, "Punto Red", 0),
        Platform::new(TULLAVE_ID, TULLAVE_NAME, 0),
    ]
}
