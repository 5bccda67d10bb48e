use axum::{Json, extract::State, response::Response};
use std::sync::Arc;

use super::{ClientIdentity, ROOT_LABEL, enforce_rate_limit, with_remaining};
use crate::error::Result;
use crate::metrics::REQUEST_TOTAL;
use crate::models::StatusResponse;
use crate::state::AppState;

pub async fn root_handler(
    State(state): State<Arc<AppState>>,
    ClientIdentity(client): ClientIdentity,
) -> Result<Response> {
    REQUEST_TOTAL.with_label_values(&[ROOT_LABEL]).inc();

    let remaining = enforce_rate_limit(&state, &state.root_limiter, &client, ROOT_LABEL).await?;

    let body = StatusResponse {
        message: "Text generation gateway is running!".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    Ok(with_remaining(Json(body), remaining))
}
