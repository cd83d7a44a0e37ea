//! Wallet operation routes.
//!
//! Paths and payload field names are kept compatible with the original
//! backend the mobile app already talks to: `/api/credit-offerwall`,
//! `/earn`, and `/api/withdraw`, all with camelCase JSON bodies.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::AppState;
use wallet_core::wallet::WalletError;
use wallet_shared::UserId;

/// Creates the wallet routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/credit-offerwall", post(credit_offerwall))
        .route("/earn", post(earn))
        .route("/api/withdraw", post(withdraw))
        .route("/api/wallet/{user_id}", get(get_wallet))
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for crediting a completed offerwall offer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditOfferwallRequest {
    /// The user completing the offer.
    pub user_id: String,
    /// The gross offer amount before commission.
    pub offer_amount: Decimal,
}

/// Request body for the promotional earn endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnRequest {
    /// The user earning points.
    pub user_id: String,
    /// The amount of points to award.
    pub amount: Decimal,
}

/// Request body for a withdrawal.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    /// The user withdrawing.
    pub user_id: String,
    /// The amount to withdraw.
    pub withdrawal_amount: Decimal,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/api/credit-offerwall` - Credit the net amount of a completed offer.
async fn credit_offerwall(
    State(state): State<AppState>,
    payload: Result<Json<CreditOfferwallRequest>, JsonRejection>,
) -> Response {
    // TODO: verify the offerwall callback signature before crediting.
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_body(&rejection),
    };
    let Ok(user_id) = UserId::new(payload.user_id) else {
        return invalid_user_id();
    };

    match state
        .wallet
        .credit_from_offer(&user_id, payload.offer_amount)
        .await
    {
        Ok(credit) => (
            StatusCode::OK,
            Json(json!({
                "message": "Amount credited to wallet.",
                "newBalance": credit.new_balance,
                "commission": credit.commission,
            })),
        )
            .into_response(),
        Err(err) => error_response(&err, "credit offerwall"),
    }
}

/// POST `/earn` - Award promotional points.
///
/// Returns 201 when this call created the account (initial balance set
/// directly), 200 otherwise.
async fn earn(
    State(state): State<AppState>,
    payload: Result<Json<EarnRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_body(&rejection),
    };
    let Ok(user_id) = UserId::new(payload.user_id) else {
        return invalid_user_id();
    };

    match state.wallet.credit_dummy(&user_id, payload.amount).await {
        Ok(credit) => {
            let status = if credit.created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (
                status,
                Json(json!({
                    "message": "Points added successfully.",
                    "newBalance": credit.new_balance,
                })),
            )
                .into_response()
        }
        Err(err) => error_response(&err, "earn"),
    }
}

/// POST `/api/withdraw` - Withdraw from the wallet balance.
async fn withdraw(
    State(state): State<AppState>,
    payload: Result<Json<WithdrawRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_body(&rejection),
    };
    let Ok(user_id) = UserId::new(payload.user_id) else {
        return invalid_user_id();
    };

    // TODO: hand off to the payout gateway once one is integrated.
    match state
        .wallet
        .withdraw(&user_id, payload.withdrawal_amount)
        .await
    {
        Ok(withdrawal) => (
            StatusCode::OK,
            Json(json!({
                "message": "Withdrawal successful.",
                "newBalance": withdrawal.new_balance,
            })),
        )
            .into_response(),
        Err(err) => error_response(&err, "withdraw"),
    }
}

/// GET `/api/wallet/{user_id}` - Balance and transaction history.
async fn get_wallet(State(state): State<AppState>, Path(user_id): Path<String>) -> Response {
    let Ok(user_id) = UserId::new(user_id) else {
        return invalid_user_id();
    };

    match state.wallet.statement(&user_id).await {
        Ok(statement) => {
            let transactions: Vec<_> = statement
                .entries
                .iter()
                .map(|entry| {
                    json!({
                        "id": entry.id,
                        "description": entry.description,
                        "amount": entry.amount,
                        "date": entry.recorded_at.to_rfc3339(),
                        "type": entry.entry_type,
                        "source": entry.source,
                    })
                })
                .collect();

            (
                StatusCode::OK,
                Json(json!({
                    "userId": statement.account.id,
                    "email": statement.account.email,
                    "balance": statement.account.balance,
                    "createdAt": statement.account.created_at.to_rfc3339(),
                    "transactions": transactions,
                })),
            )
                .into_response()
        }
        Err(err) => error_response(&err, "get wallet"),
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Renders a body-extraction failure in the same `{"error", "message"}`
/// shape as every other error response.
fn invalid_body(rejection: &JsonRejection) -> Response {
    (
        rejection.status(),
        Json(json!({
            "error": "INVALID_BODY",
            "message": rejection.body_text(),
        })),
    )
        .into_response()
}

fn invalid_user_id() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "INVALID_USER_ID",
            "message": "user id must be a non-empty string",
        })),
    )
        .into_response()
}

/// Maps a wallet error onto the transport taxonomy. Internal detail stays
/// in the logs; callers get the error kind plus a short message.
fn error_response(err: &WalletError, operation: &str) -> Response {
    if err.http_status_code() >= 500 {
        error!(error = %err, operation, "wallet operation failed");
    }
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string(),
        })),
    )
        .into_response()
}
