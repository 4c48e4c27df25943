// Application layer - orchestration between the ledger engine, the sales
// inventory and the persistence mirror.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
