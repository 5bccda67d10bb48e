//! Rate-limited HTTP proxy in front of a hosted text generation model.
//!
//! Requests are admitted by a sliding-window limiter whose state lives in a
//! shared key-value store, checked against a shared secret, and forwarded to
//! an OpenAI-compatible chat completions API.

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod server;
pub mod state;
pub mod upstream;
