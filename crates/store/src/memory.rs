//! In-memory account store.
//!
//! Backed by a `DashMap` keyed by user id. Every mutation runs while
//! holding the map entry's shard lock, which makes the read-compute-write
//! on a single account atomic without any cross-account contention. This is
//! the store used by tests and by the dev server when no database is
//! configured.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use uuid::Uuid;
use wallet_shared::UserId;

use wallet_core::wallet::{
    Account, AccountStore, CreatedAccount, LedgerEntry, NewAccount, NewLedgerEntry, StoreError,
};

struct Record {
    account: Account,
    entries: Vec<LedgerEntry>,
}

/// Dashmap-backed account store.
#[derive(Default)]
pub struct MemoryStore {
    accounts: DashMap<UserId, Record>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts currently stored.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find(&self, id: &UserId) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.get(id).map(|r| r.account.clone()))
    }

    async fn create(&self, account: NewAccount) -> Result<CreatedAccount, StoreError> {
        match self.accounts.entry(account.id.clone()) {
            Entry::Occupied(occupied) => Ok(CreatedAccount {
                account: occupied.get().account.clone(),
                newly_created: false,
            }),
            Entry::Vacant(vacant) => {
                let record = Account {
                    id: account.id,
                    email: account.email,
                    balance: account.balance,
                    created_balance: account.balance,
                    created_at: Utc::now(),
                };
                vacant.insert(Record {
                    account: record.clone(),
                    entries: Vec::new(),
                });
                Ok(CreatedAccount {
                    account: record,
                    newly_created: true,
                })
            }
        }
    }

    async fn apply_delta(&self, id: &UserId, delta: Decimal) -> Result<Decimal, StoreError> {
        // get_mut holds the shard lock for the duration of the update, so
        // the check and the write see the same balance.
        let mut record = self
            .accounts
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let next = record.account.balance + delta;
        if next < Decimal::ZERO {
            return Err(StoreError::InsufficientBalance {
                balance: record.account.balance,
                requested: -delta,
            });
        }
        record.account.balance = next;
        Ok(next)
    }

    async fn append_entry(
        &self,
        id: &UserId,
        entry: NewLedgerEntry,
    ) -> Result<LedgerEntry, StoreError> {
        let mut record = self
            .accounts
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        // Clamp so per-account timestamps never go backwards even if the
        // wall clock does.
        let mut recorded_at = Utc::now();
        if let Some(last) = record.entries.last() {
            recorded_at = recorded_at.max(last.recorded_at);
        }

        let entry = LedgerEntry {
            id: Uuid::new_v4(),
            description: entry.description,
            amount: entry.amount,
            recorded_at,
            entry_type: entry.entry_type,
            source: entry.source,
        };
        record.entries.push(entry.clone());
        Ok(entry)
    }

    async fn entries(&self, id: &UserId) -> Result<Vec<LedgerEntry>, StoreError> {
        let record = self
            .accounts
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        Ok(record.entries.clone())
    }
}
