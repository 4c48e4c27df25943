mod inventory;
mod ledger;
mod money;
mod platform;
mod transaction;

pub use inventory::*;
pub use ledger::*;
pub use money::*;
pub use platform::*;
pub use transaction::*;
