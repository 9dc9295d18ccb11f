use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use intake_auth::IntakeSecret;
use log::LevelFilter;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

/// Upper bound for `INTAKE_TOKEN_LEEWAY_MS`: 24 hours.
pub const MAX_INTAKE_TOKEN_LEEWAY_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The secret used to sign and verify patient intake links. Must be identical on
    /// every instance of the service. Intake link operations fail while it is unset.
    #[arg(long, env, hide_env_values = true)]
    intake_form_secret: Option<IntakeSecret>,

    /// The public base URL of the application (e.g. https://app.example).
    /// Used to build absolute intake links; links are root-relative without it.
    #[arg(long, env)]
    app_base_url: Option<String>,

    /// Clock-skew tolerance in milliseconds applied when checking intake link expiry.
    /// At most the lifetime of an expiring link.
    #[arg(
        long,
        env,
        default_value_t = 0,
        value_parser = clap::value_parser!(u64).range(0..=MAX_INTAKE_TOKEN_LEEWAY_MS)
    )]
    pub intake_token_leeway_ms: u64,

    /// Comma separated intake token ids (signature segments) to reject before they expire.
    #[arg(long, env, value_delimiter = ',', use_value_delimiter = true)]
    pub revoked_intake_tokens: Vec<String>,

    /// Maximum intake requests accepted per client address within one window
    #[arg(long, env, default_value_t = 20)]
    pub rate_limit_max_requests: u32,

    /// Length in seconds of one rate limiting window
    #[arg(long, env, default_value_t = 60)]
    pub rate_limit_window_secs: u64,

    /// Maximum number of client addresses tracked at once
    #[arg(long, env, default_value_t = 10_000)]
    pub rate_limit_capacity: usize,

    /// Comma separated addresses of reverse proxies whose `X-Forwarded-For` header is
    /// trusted. Requests from any other peer are rate limited by their own address.
    #[arg(long, env, value_delimiter = ',', use_value_delimiter = true)]
    pub trusted_proxies: Vec<IpAddr>,

    /// Seconds between sweeps of expired rate limiting windows
    #[arg(long, env, default_value_t = 300)]
    pub rate_limit_sweep_interval_secs: u64,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn intake_form_secret(&self) -> Option<IntakeSecret> {
        self.intake_form_secret.clone()
    }

    pub fn set_intake_form_secret(mut self, secret: impl Into<String>) -> Self {
        self.intake_form_secret = Some(IntakeSecret::new(secret));
        self
    }

    pub fn app_base_url(&self) -> Option<&str> {
        self.app_base_url.as_deref()
    }

    pub fn set_app_base_url(mut self, app_base_url: impl Into<String>) -> Self {
        self.app_base_url = Some(app_base_url.into());
        self
    }

    pub fn intake_token_leeway(&self) -> Duration {
        Duration::from_millis(self.intake_token_leeway_ms)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn rate_limit_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.rate_limit_sweep_interval_secs)
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}
