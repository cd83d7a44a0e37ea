//! Wallet service: the business-rule layer over the account store.
//!
//! Each operation is one atomic read-compute-write cycle against the store
//! followed by a ledger append. Collaborators are injected so the service is
//! unit-testable against fakes.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{error, info, warn};
use wallet_shared::UserId;

use super::error::WalletError;
use super::store::AccountStore;
use super::types::{
    Account, AccountStatement, CommissionSplit, DummyCredit, NewAccount, NewLedgerEntry,
    OfferCredit, Withdrawal,
};
use crate::identity::{EmailLookup, UNKNOWN_EMAIL};

/// The business-rule layer; exposes the three balance-mutating operations
/// plus a read-only statement view.
pub struct WalletService {
    store: Arc<dyn AccountStore>,
    identity: Arc<dyn EmailLookup>,
    commission_rate: Decimal,
}

impl WalletService {
    /// Creates a wallet service over the given store and identity provider.
    ///
    /// `commission_rate` is the fraction of each offer credit retained by
    /// the operator (0.20 in production).
    pub fn new(
        store: Arc<dyn AccountStore>,
        identity: Arc<dyn EmailLookup>,
        commission_rate: Decimal,
    ) -> Self {
        Self {
            store,
            identity,
            commission_rate,
        }
    }

    /// Credits the net amount of a completed offer, creating the account at
    /// zero balance on first contact.
    ///
    /// The commission is surfaced in the result and logged for operator
    /// accounting; it is not persisted to the user's own ledger.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::InvalidAmount`] for non-positive amounts,
    /// [`WalletError::StoreUnavailable`] on backend failure, and
    /// [`WalletError::PartialFailure`] when the balance committed but the
    /// ledger append did not.
    pub async fn credit_from_offer(
        &self,
        user_id: &UserId,
        offer_amount: Decimal,
    ) -> Result<OfferCredit, WalletError> {
        ensure_positive(offer_amount)?;

        self.get_or_create(user_id, Decimal::ZERO).await?;

        let split = CommissionSplit::of(offer_amount, self.commission_rate);
        let new_balance = self.store.apply_delta(user_id, split.net).await?;
        self.append(user_id, NewLedgerEntry::offer_credit(split.net), new_balance)
            .await?;

        // Operator accounting side channel; a durable commission ledger is
        // future work.
        info!(
            user_id = %user_id,
            offer_amount = %offer_amount,
            commission = %split.commission,
            "commission earned from offer credit"
        );

        Ok(OfferCredit {
            new_balance,
            commission: split.commission,
        })
    }

    /// Credits promotional "earn" points.
    ///
    /// On first contact the account is created directly with the award as
    /// its initial balance and no ledger entry is written; existing accounts
    /// get a delta plus a ledger entry.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::credit_from_offer`].
    pub async fn credit_dummy(
        &self,
        user_id: &UserId,
        amount: Decimal,
    ) -> Result<DummyCredit, WalletError> {
        ensure_positive(amount)?;

        if self.store.find(user_id).await?.is_none() {
            let email = self.resolve_email(user_id).await;
            let created = self
                .store
                .create(NewAccount {
                    id: user_id.clone(),
                    email,
                    balance: amount,
                })
                .await?;

            if created.newly_created {
                return Ok(DummyCredit {
                    new_balance: created.account.balance,
                    created: true,
                });
            }
            // Lost the creation race; fall through and credit the account
            // that won it.
        }

        let new_balance = self.store.apply_delta(user_id, amount).await?;
        self.append(user_id, NewLedgerEntry::dummy_credit(amount), new_balance)
            .await?;

        Ok(DummyCredit {
            new_balance,
            created: false,
        })
    }

    /// Withdraws from an existing account.
    ///
    /// The sufficiency check and the debit are one atomic conditional update
    /// in the store; a concurrent credit or debit can never let a
    /// withdrawal succeed against a stale balance.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::AccountNotFound`] when the account was never
    /// created and [`WalletError::InsufficientFunds`] when the balance
    /// cannot cover the amount, leaving the balance unchanged.
    pub async fn withdraw(
        &self,
        user_id: &UserId,
        withdrawal_amount: Decimal,
    ) -> Result<Withdrawal, WalletError> {
        ensure_positive(withdrawal_amount)?;

        if self.store.find(user_id).await?.is_none() {
            return Err(WalletError::AccountNotFound(user_id.clone()));
        }

        let new_balance = self.store.apply_delta(user_id, -withdrawal_amount).await?;
        self.append(
            user_id,
            NewLedgerEntry::withdrawal(withdrawal_amount),
            new_balance,
        )
        .await?;

        Ok(Withdrawal { new_balance })
    }

    /// Read-only view of an account and its ledger.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::AccountNotFound`] when the account does not
    /// exist.
    pub async fn statement(&self, user_id: &UserId) -> Result<AccountStatement, WalletError> {
        let Some(account) = self.store.find(user_id).await? else {
            return Err(WalletError::AccountNotFound(user_id.clone()));
        };
        let entries = self.store.entries(user_id).await?;
        Ok(AccountStatement { account, entries })
    }

    /// Fetches the account, creating it with the given initial balance on
    /// first contact. Creation is idempotent: a concurrent create for the
    /// same id yields exactly one record and never overwrites a balance.
    pub async fn get_or_create(
        &self,
        user_id: &UserId,
        initial_balance: Decimal,
    ) -> Result<Account, WalletError> {
        if let Some(account) = self.store.find(user_id).await? {
            return Ok(account);
        }

        let email = self.resolve_email(user_id).await;
        let created = self
            .store
            .create(NewAccount {
                id: user_id.clone(),
                email,
                balance: initial_balance,
            })
            .await?;
        Ok(created.account)
    }

    /// Resolves the user's email, degrading to the sentinel on any lookup
    /// failure. Identity problems never block the credit/debit path.
    async fn resolve_email(&self, user_id: &UserId) -> String {
        match self.identity.lookup_email(user_id).await {
            Ok(Some(email)) => email,
            Ok(None) => UNKNOWN_EMAIL.to_string(),
            Err(err) => {
                warn!(user_id = %user_id, error = %err, "could not fetch email, using sentinel");
                UNKNOWN_EMAIL.to_string()
            }
        }
    }

    /// Appends a ledger entry after a committed balance mutation. A failure
    /// here leaves balance and ledger transiently inconsistent, so it is
    /// logged distinctly and surfaced as a partial failure with the
    /// committed balance.
    async fn append(
        &self,
        user_id: &UserId,
        entry: NewLedgerEntry,
        new_balance: Decimal,
    ) -> Result<(), WalletError> {
        if let Err(err) = self.store.append_entry(user_id, entry.clone()).await {
            error!(
                user_id = %user_id,
                amount = %entry.amount,
                description = %entry.description,
                new_balance = %new_balance,
                error = %err,
                "balance committed but ledger append failed"
            );
            return Err(WalletError::PartialFailure {
                new_balance,
                detail: err.to_string(),
            });
        }
        Ok(())
    }
}

/// Rejects zero and negative amounts.
fn ensure_positive(amount: Decimal) -> Result<(), WalletError> {
    if amount <= Decimal::ZERO {
        return Err(WalletError::InvalidAmount(amount));
    }
    Ok(())
}
