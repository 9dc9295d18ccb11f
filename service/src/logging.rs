use crate::config::Config;
use log::LevelFilter;
use simplelog::{self, ColorChoice, ConfigBuilder, TerminalMode};

/// Modules to filter out from logging when not in Trace mode.
/// These are typically verbose dependencies that clutter normal log output.
const FILTERED_MODULES: &[&str] = &["tower", "tower_http", "tracing", "hyper", "axum"];

/// Settings derived from `Config` that decide how the terminal logger behaves.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LogSettings {
    level: LevelFilter,
    filter_dependencies: bool,
    color: bool,
}

impl LogSettings {
    fn from_config(config: &Config) -> Self {
        Self {
            level: config.log_level_filter,
            // Trace shows everything, including dependency logs
            filter_dependencies: config.log_level_filter != LevelFilter::Trace,
            // Production output is collected by the platform, not read on a terminal
            color: !config.is_production(),
        }
    }
}

pub struct Logger {}

impl Logger {
    /// Initializes the global logger with configuration based on the provided Config.
    ///
    /// When the log level is set to Trace, all logs including dependency logs are shown.
    /// For all other log levels, verbose dependency logs are filtered out. Colored output
    /// is disabled in production.
    pub fn init_logger(config: &Config) -> Result<(), log::SetLoggerError> {
        Self::init_with_mode(config, TerminalMode::Mixed)
    }

    /// Same as `init_logger` but writes every level to stderr, keeping stdout free for
    /// command output.
    pub fn init_stderr_logger(config: &Config) -> Result<(), log::SetLoggerError> {
        Self::init_with_mode(config, TerminalMode::Stderr)
    }

    fn init_with_mode(config: &Config, mode: TerminalMode) -> Result<(), log::SetLoggerError> {
        let settings = LogSettings::from_config(config);
        let color_choice = if settings.color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };

        simplelog::TermLogger::init(
            Self::convert_level_filter(settings.level),
            Self::build_log_config(settings.filter_dependencies),
            mode,
            color_choice,
        )
    }

    /// Converts log::LevelFilter to simplelog::LevelFilter.
    fn convert_level_filter(level: LevelFilter) -> simplelog::LevelFilter {
        match level {
            LevelFilter::Off => simplelog::LevelFilter::Off,
            LevelFilter::Error => simplelog::LevelFilter::Error,
            LevelFilter::Warn => simplelog::LevelFilter::Warn,
            LevelFilter::Info => simplelog::LevelFilter::Info,
            LevelFilter::Debug => simplelog::LevelFilter::Debug,
            LevelFilter::Trace => simplelog::LevelFilter::Trace,
        }
    }

    fn build_log_config(apply_filters: bool) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        if apply_filters {
            for module in FILTERED_MODULES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }
}
