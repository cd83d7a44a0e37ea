//! In-process fakes for wallet service tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;
use wallet_shared::UserId;

use super::store::{AccountStore, CreatedAccount, StoreError};
use super::types::{Account, LedgerEntry, NewAccount, NewLedgerEntry};
use crate::identity::{EmailLookup, IdentityError};

struct Record {
    account: Account,
    entries: Vec<LedgerEntry>,
}

/// Hash-map backed store with the same atomicity contract as the real
/// backends: the map lock is held across every read-compute-write.
#[derive(Default)]
pub(crate) struct FakeStore {
    state: Mutex<HashMap<UserId, Record>>,
    fail_next_append: AtomicBool,
}

impl FakeStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Makes the next `append_entry` fail with a transient error.
    pub(crate) fn fail_next_append(&self) {
        self.fail_next_append.store(true, Ordering::SeqCst);
    }

    pub(crate) fn account_count(&self) -> usize {
        self.state.lock().unwrap().len()
    }
}

#[async_trait]
impl AccountStore for FakeStore {
    async fn find(&self, id: &UserId) -> Result<Option<Account>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.get(id).map(|r| r.account.clone()))
    }

    async fn create(&self, account: NewAccount) -> Result<CreatedAccount, StoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state.get(&account.id) {
            return Ok(CreatedAccount {
                account: existing.account.clone(),
                newly_created: false,
            });
        }
        let record = Account {
            id: account.id.clone(),
            email: account.email,
            balance: account.balance,
            created_balance: account.balance,
            created_at: Utc::now(),
        };
        state.insert(
            account.id,
            Record {
                account: record.clone(),
                entries: Vec::new(),
            },
        );
        Ok(CreatedAccount {
            account: record,
            newly_created: true,
        })
    }

    async fn apply_delta(&self, id: &UserId, delta: Decimal) -> Result<Decimal, StoreError> {
        let mut state = self.state.lock().unwrap();
        let record = state
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
        if self.fail_next_append.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected append failure".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        let record = state
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
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
        let state = self.state.lock().unwrap();
        let record = state
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        Ok(record.entries.clone())
    }
}

/// Identity provider fake: a fixed email, or a hard failure.
pub(crate) struct FakeIdentity {
    email: Option<String>,
    fail: bool,
}

impl FakeIdentity {
    pub(crate) fn known(email: &str) -> Self {
        Self {
            email: Some(email.to_string()),
            fail: false,
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            email: None,
            fail: true,
        }
    }
}

#[async_trait]
impl EmailLookup for FakeIdentity {
    async fn lookup_email(&self, _user_id: &UserId) -> Result<Option<String>, IdentityError> {
        if self.fail {
            return Err(IdentityError::Unavailable("lookup exploded".to_string()));
        }
        Ok(self.email.clone())
    }
}
