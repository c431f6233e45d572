//! Console and tracker logging.
//!
//! All output goes through the `log` facade. User-facing progress (evaluation
//! lines) is logged on [`CONSOLE_TARGET`]; progress of distributed style drivers
//! such as cross-validation is logged on [`TRACKER_TARGET`]. [`init_logging`]
//! installs an `env_logger` backend that can prefix each line with a wall clock
//! time stamp.

use std::io::Write;

/// Target for user-facing progress messages.
pub const CONSOLE_TARGET: &str = "xgboost::console";

/// Target for tracker progress messages.
pub const TRACKER_TARGET: &str = "xgboost::tracker";

/// Logger settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset
    pub default_filter: String,
    /// Prefix every line with `[HH:MM:SS]`
    pub with_time: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            default_filter: "info".to_string(),
            with_time: false,
        }
    }
}

impl LogConfig {
    /// Enable or disable time stamps.
    pub fn with_time(mut self, with_time: bool) -> Self {
        self.with_time = with_time;
        self
    }

    /// Set the filter used when `RUST_LOG` is unset.
    pub fn default_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.default_filter = filter.into();
        self
    }
}

/// Install the global logger. Returns false when a logger was already set.
pub fn init_logging(config: &LogConfig) -> bool {
    let env = env_logger::Env::default().default_filter_or(config.default_filter.as_str());
    let with_time = config.with_time;

    env_logger::Builder::from_env(env)
        .format(move |buf, record| {
            if with_time {
                write!(buf, "[{}] ", chrono::Local::now().format("%H:%M:%S"))?;
            }
            if record.target() == CONSOLE_TARGET || record.target() == TRACKER_TARGET {
                writeln!(buf, "{}", record.args())
            } else {
                writeln!(buf, "[{}] {}", record.level(), record.args())
            }
        })
        .try_init()
        .is_ok()
}

/// Verbosity derived from the `silent` and `verbosity` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Nothing but errors
    Silent = 0,
    /// Warnings
    Warning = 1,
    /// Evaluation lines and summaries
    Info = 2,
    /// Per-tree details
    Debug = 3,
}

impl From<u32> for Verbosity {
    fn from(value: u32) -> Self {
        match value {
            0 => Verbosity::Silent,
            1 => Verbosity::Warning,
            2 => Verbosity::Info,
            _ => Verbosity::Debug,
        }
    }
}
