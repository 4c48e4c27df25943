use thiserror::Error;

use crate::domain::LedgerError;

#[derive(Error, Debug)]
pub enum AppError {
    /// Engine rejected the operation; the ledger is unchanged.
    #[error("{0}")]
    Ledger(#[from] LedgerError),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Could not understand sale command: '{0}' (try: \"vendí 2 gorras\")")]
    UnparsedSale(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
