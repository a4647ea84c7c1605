// src/master/mod.rs

pub mod sync_master;

// Re-export the public master types
pub use sync_master::{RtuMaster, RtuMasterConfig, TransactionState};
