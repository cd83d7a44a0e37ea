//! Wallet domain types: accounts, ledger entries, and operation results.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wallet_shared::UserId;

/// Whether a ledger entry credits or debits the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Balance-increasing entry.
    Credit,
    /// Balance-decreasing entry.
    Withdrawal,
}

impl EntryType {
    /// Stable string form used for persistence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Withdrawal => "withdrawal",
        }
    }
}

impl std::str::FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(Self::Credit),
            "withdrawal" => Ok(Self::Withdrawal),
            other => Err(format!("unknown entry type: {other}")),
        }
    }
}

/// Where a credit came from. Withdrawals carry no source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntrySource {
    /// Credit from a completed offerwall offer.
    Offerwall,
    /// Promotional "earn" credit.
    Dummy,
}

impl EntrySource {
    /// Stable string form used for persistence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Offerwall => "Offerwall",
            Self::Dummy => "Dummy",
        }
    }
}

impl std::str::FromStr for EntrySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Offerwall" => Ok(Self::Offerwall),
            "Dummy" => Ok(Self::Dummy),
            other => Err(format!("unknown entry source: {other}")),
        }
    }
}

/// Per-user balance record, keyed by the identity provider's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable identifier from the external identity provider.
    pub id: UserId,
    /// Best-effort email captured at creation; not authoritative.
    pub email: String,
    /// Current balance. Never negative after a successful operation.
    pub balance: Decimal,
    /// Balance the account was created with. The earn path creates accounts
    /// with a non-zero initial balance and no ledger entry, so this is the
    /// baseline for reconciliation.
    pub created_balance: Decimal,
    /// Server-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Checks the reconciliation invariant: the balance equals the created
    /// balance plus the sum of all ledger entry amounts.
    ///
    /// Only meaningful when no operation is in flight for the account.
    #[must_use]
    pub fn reconciles(&self, entries: &[LedgerEntry]) -> bool {
        let total: Decimal = entries.iter().map(|e| e.amount).sum();
        self.balance == self.created_balance + total
    }
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// The user id to key the account by.
    pub id: UserId,
    /// Best-effort email (sentinel when lookup failed).
    pub email: String,
    /// Initial balance: zero on the offer path, the award amount on the
    /// earn path.
    pub balance: Decimal,
}

/// Immutable, append-only record of one balance-affecting event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Store-assigned entry id.
    pub id: Uuid,
    /// Human-readable description.
    pub description: String,
    /// Signed amount: positive for credits, negative for withdrawals.
    pub amount: Decimal,
    /// Store-assigned timestamp, monotonically non-decreasing per account.
    pub recorded_at: DateTime<Utc>,
    /// Credit or withdrawal.
    pub entry_type: EntryType,
    /// Source of the credit, unset for withdrawals.
    pub source: Option<EntrySource>,
}

/// Input for appending a ledger entry. Id and timestamp are store-assigned.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    /// Human-readable description.
    pub description: String,
    /// Signed amount.
    pub amount: Decimal,
    /// Credit or withdrawal.
    pub entry_type: EntryType,
    /// Source of the credit, unset for withdrawals.
    pub source: Option<EntrySource>,
}

impl NewLedgerEntry {
    /// Entry for the net amount of a completed offer.
    #[must_use]
    pub fn offer_credit(net_amount: Decimal) -> Self {
        Self {
            description: "credit for completed offer (after commission)".to_string(),
            amount: net_amount,
            entry_type: EntryType::Credit,
            source: Some(EntrySource::Offerwall),
        }
    }

    /// Entry for a promotional earn credit.
    #[must_use]
    pub fn dummy_credit(amount: Decimal) -> Self {
        Self {
            description: "dummy points added".to_string(),
            amount,
            entry_type: EntryType::Credit,
            source: Some(EntrySource::Dummy),
        }
    }

    /// Entry for a withdrawal. `amount` is the positive requested amount;
    /// the recorded amount is its negation.
    #[must_use]
    pub fn withdrawal(amount: Decimal) -> Self {
        Self {
            description: "withdrawal".to_string(),
            amount: -amount,
            entry_type: EntryType::Withdrawal,
            source: None,
        }
    }
}

/// Commission split applied to an offer credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommissionSplit {
    /// Amount retained by the operator.
    pub commission: Decimal,
    /// Amount credited to the user.
    pub net: Decimal,
}

impl CommissionSplit {
    /// Splits an offer amount at the given commission rate.
    #[must_use]
    pub fn of(offer_amount: Decimal, rate: Decimal) -> Self {
        let commission = offer_amount * rate;
        Self {
            commission,
            net: offer_amount - commission,
        }
    }
}

/// Result of crediting a completed offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferCredit {
    /// Balance after the net credit.
    pub new_balance: Decimal,
    /// Commission retained by the operator (not persisted to the user's
    /// ledger).
    pub commission: Decimal,
}

/// Result of a promotional earn credit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DummyCredit {
    /// Balance after the credit.
    pub new_balance: Decimal,
    /// True when the account was created by this call (initial balance set
    /// directly, no ledger entry written).
    pub created: bool,
}

/// Result of a withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdrawal {
    /// Balance after the debit.
    pub new_balance: Decimal,
}

/// Read-only view of an account and its ledger.
#[derive(Debug, Clone)]
pub struct AccountStatement {
    /// The account record.
    pub account: Account,
    /// Ledger entries, ascending by timestamp.
    pub entries: Vec<LedgerEntry>,
}
