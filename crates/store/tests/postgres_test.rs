//! Postgres store integration tests.
//!
//! These run only when `DATABASE_URL` points at a reachable Postgres
//! instance; otherwise each test is skipped at runtime.

use std::env;
use std::sync::Arc;

use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use wallet_core::identity::NullEmailLookup;
use wallet_core::wallet::{AccountStore, NewAccount, StoreError, WalletService};
use wallet_shared::UserId;
use wallet_store::{PgStore, connect};

async fn test_store() -> Option<PgStore> {
    let url = env::var("DATABASE_URL").ok()?;
    let pool = connect(&url, 5).await.ok()?;
    let store = PgStore::new(pool);
    store.migrate().await.expect("migrations should apply");
    Some(store)
}

fn unique_user(prefix: &str) -> UserId {
    UserId::new(format!("{prefix}-{}", Uuid::new_v4())).unwrap()
}

#[tokio::test]
async fn test_create_find_round_trip() {
    let Some(store) = test_store().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let user = unique_user("round-trip");

    let created = store
        .create(NewAccount {
            id: user.clone(),
            email: "pg@example.com".to_string(),
            balance: dec!(12.50),
        })
        .await
        .unwrap();
    assert!(created.newly_created);

    let found = store.find(&user).await.unwrap().unwrap();
    assert_eq!(found.balance, dec!(12.50));
    assert_eq!(found.created_balance, dec!(12.50));
    assert_eq!(found.email, "pg@example.com");

    // Idempotent create never touches the stored balance.
    let again = store
        .create(NewAccount {
            id: user.clone(),
            email: "other@example.com".to_string(),
            balance: dec!(99),
        })
        .await
        .unwrap();
    assert!(!again.newly_created);
    assert_eq!(again.account.balance, dec!(12.50));
}

#[tokio::test]
async fn test_conditional_update_rejects_overdraft() {
    let Some(store) = test_store().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let user = unique_user("overdraft");

    store
        .create(NewAccount {
            id: user.clone(),
            email: "pg@example.com".to_string(),
            balance: dec!(30),
        })
        .await
        .unwrap();

    let err = store.apply_delta(&user, dec!(-31)).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::InsufficientBalance { balance, requested }
            if balance == dec!(30) && requested == dec!(31)
    ));

    let balance = store.apply_delta(&user, dec!(-30)).await.unwrap();
    assert_eq!(balance, Decimal::ZERO);

    let missing = store.apply_delta(&unique_user("ghost"), dec!(1)).await;
    assert!(matches!(missing, Err(StoreError::NotFound(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_ledger_timestamps_monotonic_under_concurrency() {
    let Some(store) = test_store().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let svc = Arc::new(WalletService::new(
        Arc::new(store),
        Arc::new(NullEmailLookup),
        dec!(0.20),
    ));
    let user = unique_user("pg-clock");

    svc.credit_dummy(&user, dec!(10)).await.unwrap();

    let n = 64;
    let tasks: Vec<_> = (0..n)
        .map(|_| {
            let svc = svc.clone();
            let user = user.clone();
            tokio::spawn(async move { svc.credit_dummy(&user, dec!(1)).await })
        })
        .collect();

    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    // Statement order is insert order; timestamps must never run backwards
    // even when concurrent inserts commit out of statement-start order.
    let statement = svc.statement(&user).await.unwrap();
    assert_eq!(statement.entries.len(), n);
    for pair in statement.entries.windows(2) {
        assert!(
            pair[0].recorded_at <= pair[1].recorded_at,
            "timestamps regressed: {} then {}",
            pair[0].recorded_at,
            pair[1].recorded_at
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_credits_against_postgres() {
    let Some(store) = test_store().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let svc = Arc::new(WalletService::new(
        Arc::new(store),
        Arc::new(NullEmailLookup),
        dec!(0.20),
    ));
    let user = unique_user("pg-hot");

    svc.credit_dummy(&user, dec!(10)).await.unwrap();

    let n = 32;
    let tasks: Vec<_> = (0..n)
        .map(|_| {
            let svc = svc.clone();
            let user = user.clone();
            tokio::spawn(async move { svc.credit_dummy(&user, dec!(1)).await })
        })
        .collect();

    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let statement = svc.statement(&user).await.unwrap();
    assert_eq!(statement.account.balance, dec!(10) + Decimal::from(n));
    assert_eq!(statement.entries.len(), n);
    assert!(statement.account.reconciles(&statement.entries));
}
