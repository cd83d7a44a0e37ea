//! Postgres account store.
//!
//! The balance mutation is a single conditional `UPDATE .. RETURNING`: the
//! sufficiency check and the write execute against the same row version
//! inside the database, so concurrent operations on one account serialize
//! on the row lock and can never lose an update or debit a stale balance.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;
use uuid::Uuid;
use wallet_shared::UserId;

use wallet_core::wallet::{
    Account, AccountStore, CreatedAccount, EntrySource, EntryType, LedgerEntry, NewAccount,
    NewLedgerEntry, StoreError,
};

/// Postgres foreign-key violation SQLSTATE.
const FK_VIOLATION: &str = "23503";

/// Postgres-backed account store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails to apply.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: String,
    email: String,
    balance: Decimal,
    created_balance: Decimal,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let id = UserId::new(row.id)
            .map_err(|e| StoreError::Unavailable(format!("corrupt account row: {e}")))?;
        Ok(Self {
            id,
            email: row.email,
            balance: row.balance,
            created_balance: row.created_balance,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: Uuid,
    description: String,
    amount: Decimal,
    entry_type: String,
    source: Option<String>,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<EntryRow> for LedgerEntry {
    type Error = StoreError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let entry_type: EntryType = row
            .entry_type
            .parse()
            .map_err(|e| StoreError::Unavailable(format!("corrupt ledger row: {e}")))?;
        let source = row
            .source
            .map(|s| {
                s.parse::<EntrySource>()
                    .map_err(|e| StoreError::Unavailable(format!("corrupt ledger row: {e}")))
            })
            .transpose()?;
        Ok(Self {
            id: row.id,
            description: row.description,
            amount: row.amount,
            recorded_at: row.recorded_at,
            entry_type,
            source,
        })
    }
}

fn unavailable(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

#[async_trait]
impl AccountStore for PgStore {
    async fn find(&self, id: &UserId) -> Result<Option<Account>, StoreError> {
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT id, email, balance, created_balance, created_at \
             FROM accounts WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        row.map(Account::try_from).transpose()
    }

    async fn create(&self, account: NewAccount) -> Result<CreatedAccount, StoreError> {
        let inserted: Option<AccountRow> = sqlx::query_as(
            "INSERT INTO accounts (id, email, balance, created_balance) \
             VALUES ($1, $2, $3, $3) \
             ON CONFLICT (id) DO NOTHING \
             RETURNING id, email, balance, created_balance, created_at",
        )
        .bind(account.id.as_str())
        .bind(&account.email)
        .bind(account.balance)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        if let Some(row) = inserted {
            return Ok(CreatedAccount {
                account: row.try_into()?,
                newly_created: true,
            });
        }

        // Lost a creation race; the existing record wins, balance untouched.
        match self.find(&account.id).await? {
            Some(existing) => Ok(CreatedAccount {
                account: existing,
                newly_created: false,
            }),
            None => Err(StoreError::Unavailable(format!(
                "account {} vanished between insert and read",
                account.id
            ))),
        }
    }

    async fn apply_delta(&self, id: &UserId, delta: Decimal) -> Result<Decimal, StoreError> {
        // One statement for the update and, when it matches nothing, the
        // balance that rejected it. Reading the balance afterwards in a
        // second query could observe a concurrent credit and report a
        // balance that no longer looks insufficient.
        let (new_balance, old_balance): (Option<Decimal>, Option<Decimal>) = sqlx::query_as(
            "WITH current AS ( \
                 SELECT balance FROM accounts WHERE id = $1 \
             ), updated AS ( \
                 UPDATE accounts SET balance = balance + $2 \
                 WHERE id = $1 AND balance + $2 >= 0 \
                 RETURNING balance \
             ) \
             SELECT (SELECT balance FROM updated), (SELECT balance FROM current)",
        )
        .bind(id.as_str())
        .bind(delta)
        .fetch_one(&self.pool)
        .await
        .map_err(unavailable)?;

        match (new_balance, old_balance) {
            (Some(balance), _) => Ok(balance),
            (None, Some(balance)) => Err(StoreError::InsufficientBalance {
                balance,
                requested: -delta,
            }),
            (None, None) => Err(StoreError::NotFound(id.clone())),
        }
    }

    async fn append_entry(
        &self,
        id: &UserId,
        entry: NewLedgerEntry,
    ) -> Result<LedgerEntry, StoreError> {
        let entry_id = Uuid::new_v4();
        // Clamp against the account's latest entry so per-account timestamps
        // never go backwards even when concurrent inserts commit out of
        // statement-start order.
        let recorded_at: DateTime<Utc> = sqlx::query_scalar(
            "INSERT INTO ledger_entries (id, account_id, description, amount, entry_type, source, recorded_at) \
             VALUES ($1, $2, $3, $4, $5, $6, GREATEST( \
                 clock_timestamp(), \
                 (SELECT max(recorded_at) FROM ledger_entries WHERE account_id = $2))) \
             RETURNING recorded_at",
        )
        .bind(entry_id)
        .bind(id.as_str())
        .bind(&entry.description)
        .bind(entry.amount)
        .bind(entry.entry_type.as_str())
        .bind(entry.source.map(EntrySource::as_str))
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(FK_VIOLATION) => {
                StoreError::NotFound(id.clone())
            }
            _ => unavailable(err),
        })?;

        Ok(LedgerEntry {
            id: entry_id,
            description: entry.description,
            amount: entry.amount,
            recorded_at,
            entry_type: entry.entry_type,
            source: entry.source,
        })
    }

    async fn entries(&self, id: &UserId) -> Result<Vec<LedgerEntry>, StoreError> {
        let rows: Vec<EntryRow> = sqlx::query_as(
            "SELECT id, description, amount, entry_type, source, recorded_at \
             FROM ledger_entries WHERE account_id = $1 \
             ORDER BY seq ASC",
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        if rows.is_empty() && self.find(id).await?.is_none() {
            return Err(StoreError::NotFound(id.clone()));
        }

        rows.into_iter().map(LedgerEntry::try_from).collect()
    }
}
