//! Data models for Elidune circulation

pub mod account;
pub mod diagnostics;
pub mod item;
pub mod loan;

// Re-export commonly used types
pub use account::{Account, AccountId, AccountLoans};
pub use diagnostics::{DeadlockReport, DeadlockStatus, LockSnapshot, LockStatus};
pub use item::{Availability, ItemEdit, ItemId, ItemRecord};
pub use loan::LoanReceipt;
