use std::sync::Arc;

use crate::auth::SecretVerifier;
use crate::config::StoreFailurePolicy;
use crate::rate_limit::SlidingWindowLimiter;
use crate::upstream::TextGenerator;

// app's shared state
pub struct AppState {
    pub generate_limiter: SlidingWindowLimiter, // expensive tier
    pub root_limiter: SlidingWindowLimiter,     // cheap tier
    pub verifier: SecretVerifier,
    pub generator: Arc<dyn TextGenerator>,
    pub max_words: usize, // words kept from the model output
    pub store_failure_policy: StoreFailurePolicy,
}
