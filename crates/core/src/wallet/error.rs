//! Wallet error taxonomy.
//!
//! Every operation failure maps to exactly one of these variants so the
//! transport layer can render a machine-readable code without inspecting
//! backend detail.

use rust_decimal::Decimal;
use thiserror::Error;
use wallet_shared::UserId;

use super::store::StoreError;

/// Errors that can occur during wallet operations.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Amount was zero or negative. Caller error, not retried.
    #[error("amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Withdrawal against an account that was never created.
    #[error("account not found: {0}")]
    AccountNotFound(UserId),

    /// Business rule violation: balance cannot cover the withdrawal.
    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Balance observed by the rejected update.
        balance: Decimal,
        /// Requested withdrawal amount.
        requested: Decimal,
    },

    /// Transient store failure.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The balance mutation committed but the ledger append failed. The
    /// account is transiently out of sync with its ledger; the committed
    /// balance is carried so a repair pass can reconcile.
    #[error("balance committed at {new_balance} but ledger append failed: {detail}")]
    PartialFailure {
        /// Balance that was durably committed.
        new_balance: Decimal,
        /// What went wrong during the append.
        detail: String,
    },
}

impl WalletError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::PartialFailure { .. } => "PARTIAL_FAILURE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount(_) | Self::InsufficientFunds { .. } => 400,
            Self::AccountNotFound(_) => 404,
            Self::StoreUnavailable(_) | Self::PartialFailure { .. } => 500,
        }
    }

    /// Returns true if this error is safe to retry. Balance mutations are
    /// never auto-retried; only read-path store failures qualify.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<StoreError> for WalletError {
    /// Context-free mapping used on read paths and balance mutations where
    /// the account is known to exist. `NotFound` on those paths means the
    /// record vanished underneath us, which is a store-level failure rather
    /// than a caller error.
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => {
                Self::StoreUnavailable(format!("account {id} disappeared mid-operation"))
            }
            StoreError::InsufficientBalance { balance, requested } => {
                Self::InsufficientFunds { balance, requested }
            }
            StoreError::Unavailable(detail) => Self::StoreUnavailable(detail),
        }
    }
}
