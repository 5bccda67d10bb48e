use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::rate_limit::{MAX_WINDOW_SECS, WindowConfig};

// What to do with a request when the rate limit store cannot be read or written
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreFailurePolicy {
    // reject with 503
    #[default]
    Closed,
    // let the request through without a remaining header
    Open,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Memory,
    Redis,
}

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "textgen-gateway")]
#[command(about = "Rate-limited proxy for a hosted text generation model")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Shared secret clients must send in the generate body
    #[arg(long, env = "API_SECRET", hide_env_values = true)]
    pub api_secret: Option<String>,

    // Key for the upstream API
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, default_value = "")]
    pub openai_api_key: String,

    // Upstream API base url
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-5-nano")]
    pub model: String,

    // Upstream request timeout in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT", default_value_t = 30)]
    pub upstream_timeout: u64,

    // Words kept from the model output
    #[arg(long, env = "MAX_WORDS", default_value_t = 10)]
    pub max_words: usize,

    // Generate endpoint: max requests per window
    #[arg(long, env = "GENERATE_RATE_LIMIT", default_value_t = 10)]
    pub generate_rate_limit: u32,

    // Root endpoint: max requests per window
    #[arg(long, env = "ROOT_RATE_LIMIT", default_value_t = 60)]
    pub root_rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, env = "RATE_WINDOW", default_value_t = 60)]
    pub rate_window: u64,

    #[arg(long, env = "RATE_LIMIT_STORE", value_enum, default_value_t = StoreBackend::Memory)]
    pub store: StoreBackend,

    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,

    // Prefix for rate limit keys in the store
    #[arg(long, env = "RATE_LIMIT_PREFIX", default_value = "ratelimit")]
    pub key_prefix: String,

    #[arg(long, env = "STORE_FAILURE_POLICY", value_enum, default_value_t = StoreFailurePolicy::Closed)]
    pub store_failure_policy: StoreFailurePolicy,
}

impl Args {
    pub fn validate(&self) -> Result<(), String> {
        if self.rate_window == 0 {
            return Err("--rate-window must be at least 1 second".to_string());
        }
        if self.rate_window > MAX_WINDOW_SECS {
            return Err(format!("--rate-window must be at most {} seconds", MAX_WINDOW_SECS));
        }
        if self.max_words == 0 {
            return Err("--max-words must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn generate_window(&self) -> WindowConfig {
        WindowConfig::new(self.generate_rate_limit, self.rate_window)
    }

    pub fn root_window(&self) -> WindowConfig {
        WindowConfig::new(self.root_rate_limit, self.rate_window)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["textgen-gateway"]).unwrap();
        assert_eq!(args.generate_window(), WindowConfig::new(10, 60));
        assert_eq!(args.root_window(), WindowConfig::new(60, 60));
        assert_eq!(args.store_failure_policy, StoreFailurePolicy::Closed);
        assert_eq!(args.max_words, 10);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_policy_flag() {
        let args = Args::try_parse_from([
            "textgen-gateway",
            "--store-failure-policy",
            "open",
            "--store",
            "redis",
        ])
        .unwrap();
        assert_eq!(args.store_failure_policy, StoreFailurePolicy::Open);
        assert_eq!(args.store, StoreBackend::Redis);
    }

    #[test]
    fn test_zero_window_rejected() {
        let args = Args::try_parse_from(["textgen-gateway", "--rate-window", "0"]).unwrap();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_oversized_window_rejected() {
        let args = Args::try_parse_from([
            "textgen-gateway",
            "--rate-window",
            "18446744073709551615",
            "--generate-rate-limit",
            "1",
        ])
        .unwrap();
        assert!(args.validate().is_err());

        let max = MAX_WINDOW_SECS.to_string();
        let args = Args::try_parse_from(["textgen-gateway", "--rate-window", max.as_str()]).unwrap();
        assert!(args.validate().is_ok());
    }
}
