//! Mocked checkout hand-off.

use axum::extract::State;
use axum::Json;
use learnspace_core::billing::Plan;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /billing/checkout`.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub price_id: String,
}

/// Where the client should redirect to complete the purchase.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
    pub plan: &'static Plan,
}

/// POST /api/v1/billing/checkout
///
/// No payment provider is contacted: the URL points straight at the
/// front-end success page with a generated session id.
pub async fn create_checkout(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CheckoutRequest>,
) -> AppResult<Json<DataResponse<CheckoutResponse>>> {
    let plan = Plan::lookup(&input.price_id)?;
    let session_id = Uuid::new_v4();
    let url = checkout_url(&state.config.checkout_base_url, session_id, plan.price_id);

    tracing::info!(user_id = auth.user_id, price_id = plan.price_id, %session_id, "Checkout started");
    Ok(Json(DataResponse {
        data: CheckoutResponse { url, plan },
    }))
}

fn checkout_url(base: &str, session_id: Uuid, price_id: &str) -> String {
    format!(
        "{}/checkout/success?session_id={session_id}&price_id={price_id}",
        base.trim_end_matches('/')
    )
}
