//! Account-and-ledger consistency engine.
//!
//! This module implements the core wallet functionality:
//! - Account and ledger entry domain types
//! - The account store contract (per-account atomic conditional updates)
//! - The wallet service (offer credits, dummy credits, withdrawals)
//! - Error types for wallet operations

pub mod error;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod service_props;
#[cfg(test)]
pub(crate) mod testing;

pub use error::WalletError;
pub use service::WalletService;
pub use store::{AccountStore, CreatedAccount, StoreError};
pub use types::{
    Account, AccountStatement, CommissionSplit, DummyCredit, EntrySource, EntryType, LedgerEntry,
    NewAccount, NewLedgerEntry, OfferCredit, Withdrawal,
};
