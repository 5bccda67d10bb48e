mod generate;
mod metrics;
mod root;

pub use generate::generate_handler;
pub use metrics::metrics_handler;
pub use root::root_handler;

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderValue, request::Parts},
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::config::StoreFailurePolicy;
use crate::error::GatewayError;
use crate::identity::client_identity;
use crate::metrics::{RATE_LIMITED_TOTAL, STORE_ERRORS};
use crate::rate_limit::{REMAINING_HEADER, SlidingWindowLimiter};
use crate::state::AppState;

pub const ROOT_LABEL: &str = "root";
pub const GENERATE_LABEL: &str = "generate";

/// Rate-limit bucket identity of the caller.
pub struct ClientIdentity(pub String);

impl<S> FromRequestParts<S> for ClientIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // only present when served with connect info
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(ClientIdentity(client_identity(&parts.headers, peer)))
    }
}

// Ok(Some(remaining)) when admitted, Ok(None) when the store failed and the
// policy is to fail open
async fn enforce_rate_limit(
    state: &AppState,
    limiter: &SlidingWindowLimiter,
    client: &str,
    label: &str,
) -> crate::error::Result<Option<u32>> {
    match limiter.check_limit(client, label).await {
        Ok(decision) if decision.allowed => Ok(Some(decision.remaining)),
        Ok(_) => {
            RATE_LIMITED_TOTAL.with_label_values(&[label]).inc();
            warn!(client = %client, endpoint = label, "Rate limit exceeded");
            Err(GatewayError::RateLimited {
                retry_after_secs: limiter.config().window_secs,
            })
        }
        Err(e) => {
            STORE_ERRORS.inc();
            match state.store_failure_policy {
                StoreFailurePolicy::Open => {
                    warn!(error = %e, endpoint = label, "Rate limit store failed, allowing request");
                    Ok(None)
                }
                StoreFailurePolicy::Closed => {
                    error!(error = %e, endpoint = label, "Rate limit store failed, rejecting request");
                    Err(e.into())
                }
            }
        }
    }
}

fn with_remaining(body: impl IntoResponse, remaining: Option<u32>) -> Response {
    let mut response = body.into_response();
    if let Some(remaining) = remaining {
        response
            .headers_mut()
            .insert(REMAINING_HEADER, HeaderValue::from(remaining));
    }
    response
}
