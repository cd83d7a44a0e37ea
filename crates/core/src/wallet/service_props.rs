//! Property-based tests for WalletService.
//!
//! - Commission split conservation: commission + net == offer amount
//! - Balance never goes negative across arbitrary operation sequences
//! - Reconciliation: balance == created balance + sum of ledger amounts

use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;
use wallet_shared::UserId;

use super::error::WalletError;
use super::service::WalletService;
use super::testing::{FakeIdentity, FakeStore};
use super::types::CommissionSplit;

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate commission rates (1% to 99%).
fn commission_rate() -> impl Strategy<Value = Decimal> {
    (1i64..100i64).prop_map(|pct| Decimal::new(pct, 2))
}

/// One wallet operation against a single account.
#[derive(Debug, Clone)]
enum Op {
    Offer(Decimal),
    Earn(Decimal),
    Withdraw(Decimal),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        positive_amount().prop_map(Op::Offer),
        positive_amount().prop_map(Op::Earn),
        positive_amount().prop_map(Op::Withdraw),
    ]
}

fn run_ops(ops: Vec<Op>) -> (WalletService, Arc<FakeStore>, UserId) {
    let store = Arc::new(FakeStore::new());
    let svc = WalletService::new(
        store.clone(),
        Arc::new(FakeIdentity::known("props@example.com")),
        Decimal::new(20, 2),
    );
    let user = UserId::new("prop-user").unwrap();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    rt.block_on(async {
        for op in ops {
            let result = match op {
                Op::Offer(amount) => svc.credit_from_offer(&user, amount).await.map(|_| ()),
                Op::Earn(amount) => svc.credit_dummy(&user, amount).await.map(|_| ()),
                Op::Withdraw(amount) => svc.withdraw(&user, amount).await.map(|_| ()),
            };
            // The only acceptable failures on this path are business-rule
            // rejections; they must leave the account untouched.
            if let Err(err) = result {
                assert!(
                    matches!(
                        err,
                        WalletError::InsufficientFunds { .. } | WalletError::AccountNotFound(_)
                    ),
                    "unexpected error: {err:?}"
                );
            }
        }
    });

    (svc, store, user)
}

proptest! {
    /// Property: the commission split conserves the offer amount.
    #[test]
    fn prop_commission_split_conserves_amount(
        amount in positive_amount(),
        rate in commission_rate(),
    ) {
        let split = CommissionSplit::of(amount, rate);
        prop_assert_eq!(split.commission + split.net, amount);
        prop_assert!(split.net > Decimal::ZERO);
        prop_assert!(split.commission >= Decimal::ZERO);
    }

    /// Property: no operation sequence drives the balance negative, and the
    /// final balance reconciles against the ledger.
    #[test]
    fn prop_balance_reconciles_after_any_sequence(
        ops in proptest::collection::vec(op_strategy(), 1..20),
    ) {
        let (svc, _store, user) = run_ops(ops);

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let statement = rt.block_on(svc.statement(&user));

        if let Ok(statement) = statement {
            prop_assert!(statement.account.balance >= Decimal::ZERO);
            prop_assert!(statement.account.reconciles(&statement.entries));
        }
        // A statement error can only mean the whole sequence consisted of
        // rejected withdrawals and no account was ever created.
    }

    /// Property: ledger timestamps are non-decreasing in statement order.
    #[test]
    fn prop_ledger_timestamps_monotonic(
        ops in proptest::collection::vec(op_strategy(), 1..20),
    ) {
        let (svc, _store, user) = run_ops(ops);

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        if let Ok(statement) = rt.block_on(svc.statement(&user)) {
            for pair in statement.entries.windows(2) {
                prop_assert!(pair[0].recorded_at <= pair[1].recorded_at);
            }
        }
    }
}
