use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::Response,
};
use std::sync::Arc;
use tracing::{error, info};

use super::{ClientIdentity, GENERATE_LABEL, enforce_rate_limit, with_remaining};
use crate::error::GatewayError;
use crate::metrics::REQUEST_TOTAL;
use crate::models::{GenerateRequest, GenerateResponse};
use crate::state::AppState;
use crate::upstream::truncate_words;

// rate limit first, then body validation, then auth, then the upstream call
pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    ClientIdentity(client): ClientIdentity,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> crate::error::Result<Response> {
    REQUEST_TOTAL.with_label_values(&[GENERATE_LABEL]).inc();

    let remaining =
        enforce_rate_limit(&state, &state.generate_limiter, &client, GENERATE_LABEL).await?;

    let Json(payload) = payload.map_err(|rej| GatewayError::InvalidBody(rej.body_text()))?;

    state.verifier.verify(&payload.secret)?;

    let history = payload.conversation_history.as_deref().unwrap_or_default();
    let raw = state
        .generator
        .generate(history, &payload.prompt)
        .await
        .map_err(|e| {
            error!(error = %e, client = %client, "Text generation failed");
            e
        })?;

    info!(client = %client, history = history.len(), "Generated text");

    let body = GenerateResponse {
        generated_text: truncate_words(&raw, state.max_words),
    };
    Ok(with_remaining(Json(body), remaining))
}
