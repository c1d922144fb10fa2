//! Handlers for the `/tokens` resource.

use axum::extract::State;
use axum::Json;
use learnspace_core::billing::validate_balance;
use learnspace_db::models::token::TokenBalance;
use learnspace_db::repositories::TokenRepo;
use learnspace_events::{ChangeEvent, ChangeTopic};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /tokens`.
#[derive(Debug, Deserialize)]
pub struct SetBalanceRequest {
    pub balance: i32,
}

/// GET /api/v1/tokens
///
/// Identities created before balances existed get an empty row on first read.
pub async fn get_tokens(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<TokenBalance>>> {
    let balance = TokenRepo::ensure(&state.pool, auth.user_id, 0).await?;
    Ok(Json(DataResponse { data: balance }))
}

/// PUT /api/v1/tokens
///
/// Absolute set. Concurrent writers resolve as last-writer-wins.
pub async fn set_tokens(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<SetBalanceRequest>,
) -> AppResult<Json<DataResponse<TokenBalance>>> {
    validate_balance(input.balance)?;

    TokenRepo::ensure(&state.pool, auth.user_id, 0).await?;
    let balance = TokenRepo::set_balance(&state.pool, auth.user_id, input.balance)
        .await?
        .ok_or_else(|| AppError::not_found("TokenBalance", auth.user_id))?;

    state
        .change_bus
        .publish(ChangeEvent::updated(ChangeTopic::Tokens, auth.user_id));
    Ok(Json(DataResponse { data: balance }))
}
