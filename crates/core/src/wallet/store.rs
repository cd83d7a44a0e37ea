//! Account store contract.
//!
//! The store sits on a document store that provides per-key reads and
//! conditional writes. The contract here is deliberately narrow: everything
//! the wallet service needs and nothing else, so operations can be unit
//! tested against a fake.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;
use wallet_shared::UserId;

use super::types::{Account, LedgerEntry, NewAccount, NewLedgerEntry};

/// Errors surfaced by account store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The account does not exist. Callers needing creation go through
    /// `create` first.
    #[error("account not found: {0}")]
    NotFound(UserId),

    /// The conditional update was rejected because it would drive the
    /// balance negative. The balance is the one observed by the update
    /// itself, not a stale read.
    #[error("balance {balance} is insufficient for a debit of {requested}")]
    InsufficientBalance {
        /// Balance at the time of the rejected update.
        balance: Decimal,
        /// Positive amount the update tried to debit.
        requested: Decimal,
    },

    /// Transient backend failure; safe to retry reads.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result of an idempotent account creation.
#[derive(Debug, Clone)]
pub struct CreatedAccount {
    /// The account now present in the store.
    pub account: Account,
    /// True when this call inserted the record; false when an account
    /// already existed (its balance is left untouched).
    pub newly_created: bool,
}

/// Canonical per-user balance records plus their append-only ledgers.
///
/// Implementations must make `apply_delta` a single atomic conditional
/// update: the sufficiency check and the write happen against the same
/// snapshot, and two racing deltas on one account never lose an update.
/// Operations on different accounts are independent.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fetches an account by id.
    async fn find(&self, id: &UserId) -> Result<Option<Account>, StoreError>;

    /// Creates an account if absent. Never overwrites an existing account;
    /// when one exists it is returned unchanged with `newly_created: false`.
    async fn create(&self, account: NewAccount) -> Result<CreatedAccount, StoreError>;

    /// Atomically adds `delta` (possibly negative) to the balance and
    /// returns the resulting value. Fails with
    /// [`StoreError::InsufficientBalance`] when the result would be
    /// negative, leaving the balance unchanged.
    async fn apply_delta(&self, id: &UserId, delta: Decimal) -> Result<Decimal, StoreError>;

    /// Appends an immutable ledger entry, assigning its id and timestamp.
    /// Timestamps are monotonically non-decreasing per account. Issued only
    /// after the matching balance mutation is durable.
    async fn append_entry(
        &self,
        id: &UserId,
        entry: NewLedgerEntry,
    ) -> Result<LedgerEntry, StoreError>;

    /// Returns all ledger entries for an account, ascending by timestamp.
    /// Fails with [`StoreError::NotFound`] when the account does not exist.
    async fn entries(&self, id: &UserId) -> Result<Vec<LedgerEntry>, StoreError>;
}
