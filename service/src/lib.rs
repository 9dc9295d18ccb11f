use config::Config;
use intake_auth::{InMemoryRevocationList, IntakeTokenCodec, RevocationList};
use log::*;
use rate_limit::{FixedWindowRateLimiter, RateLimiter};
use std::sync::Arc;

pub mod config;
pub mod logging;
pub mod rate_limit;

/// Builds the intake token codec from the process configuration.
///
/// A missing secret is not an error here; it surfaces as a configuration error the
/// first time a link is minted or verified.
pub fn init_token_codec(config: &Config) -> IntakeTokenCodec {
    let secret = config.intake_form_secret();
    if secret.as_ref().map_or(true, |s| s.is_empty()) {
        warn!("INTAKE_FORM_SECRET is not set, intake links can not be minted or verified");
    }

    let leeway = chrono::Duration::from_std(config.intake_token_leeway()).unwrap_or_else(|e| {
        warn!("Ignoring out of range INTAKE_TOKEN_LEEWAY_MS: {e}");
        chrono::Duration::zero()
    });
    IntakeTokenCodec::new(secret).with_leeway(leeway)
}

pub fn init_revocation_list(config: &Config) -> InMemoryRevocationList {
    let list = InMemoryRevocationList::with_ids(&config.revoked_intake_tokens);
    if !list.is_empty() {
        info!("Loaded {} revoked intake token ids", list.len());
    }
    list
}

pub fn init_rate_limiter(config: &Config) -> FixedWindowRateLimiter {
    info!(
        "Intake rate limit config: max_requests={}, window={}s, capacity={}",
        config.rate_limit_max_requests, config.rate_limit_window_secs, config.rate_limit_capacity,
    );

    FixedWindowRateLimiter::new(
        config.rate_limit_max_requests,
        config.rate_limit_window(),
        config.rate_limit_capacity,
    )
}

// Service-level state containing only infrastructure concerns
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub token_codec: IntakeTokenCodec,
    pub revocations: Arc<dyn RevocationList>,
    pub rate_limiter: Arc<dyn RateLimiter>,
}

impl AppState {
    pub fn new(app_config: Config) -> Self {
        Self {
            token_codec: init_token_codec(&app_config),
            revocations: Arc::new(init_revocation_list(&app_config)),
            rate_limiter: Arc::new(init_rate_limiter(&app_config)),
            config: app_config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn config(args: &[&str]) -> Config {
        let mut argv = vec!["intake_platform_rs"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_app_state_seeds_revocation_list_from_config() {
        let state = AppState::new(config(&["--revoked-intake-tokens", "abc, ,def"]));
        assert_eq!(state.revocations.len(), 2);
    }

    #[test]
    fn test_app_state_applies_rate_limit_config() {
        let state = AppState::new(config(&["--rate-limit-max-requests", "1"]));
        assert!(state.rate_limiter.allow("10.0.0.1"));
        assert!(!state.rate_limiter.allow("10.0.0.1"));
        assert!(state.rate_limiter.allow("10.0.0.2"));
    }

    #[test]
    fn test_token_codec_accepts_largest_leeway() {
        let max = config::MAX_INTAKE_TOKEN_LEEWAY_MS.to_string();
        let codec = init_token_codec(&config(&["--intake-token-leeway-ms", &max]));
        assert_eq!(codec.leeway(), chrono::Duration::hours(24));
    }

    #[test]
    fn test_token_codec_uses_configured_leeway() {
        let codec = init_token_codec(&config(&["--intake-token-leeway-ms", "2500"]));
        assert_eq!(codec.leeway(), chrono::Duration::milliseconds(2500));
    }
}
