//! Core business logic for the rewards wallet.
//!
//! This crate contains the account-and-ledger consistency engine with ZERO
//! web or database dependencies. Store and identity-provider backends are
//! consumed through narrow async traits.
//!
//! # Modules
//!
//! - `wallet` - Account model, ledger types, store contract, wallet service
//! - `identity` - Email lookup boundary for the external identity provider

pub mod identity;
pub mod wallet;
