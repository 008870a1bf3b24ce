use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "signcoach-backend";
const MAX_LOG_FILES: usize = 14;

#[derive(Debug, thiserror::Error)]
pub enum LogInitError {
    #[error("cannot open log directory '{dir}': {source}")]
    Appender {
        dir: String,
        #[source]
        source: InitError,
    },
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            enable_file_logs: false,
            log_dir: "./logs".to_string(),
        }
    }
}

impl From<&Config> for LogConfig {
    fn from(config: &Config) -> Self {
        Self {
            log_level: config.log_level.clone(),
            enable_file_logs: config.enable_file_logs,
            log_dir: config.log_dir.clone(),
        }
    }
}

/// RUST_LOG 优先；LOG_LEVEL 无法解析时回退到 info
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn file_appender(dir: &str) -> Result<RollingFileAppender, LogInitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(dir)
        .map_err(|source| LogInitError::Appender {
            dir: dir.to_string(),
            source,
        })
}

/// Installs the global subscriber. Returns `Ok(false)` when one is already
/// installed (repeated init in tests), `Ok(true)` otherwise.
pub fn init_tracing(config: &LogConfig) -> Result<bool, LogInitError> {
    let file_layer = if config.enable_file_logs {
        let appender = file_appender(&config.log_dir)?;
        Some(
            fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
                .json(),
        )
    } else {
        None
    };

    if tracing::dispatcher::has_been_set() {
        return Ok(false);
    }

    let installed = Registry::default()
        .with(build_filter(&config.log_level))
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init();
    match installed {
        Ok(()) => Ok(true),
        // 并发初始化时另一方已抢先安装
        Err(_) if tracing::dispatcher::has_been_set() => Ok(false),
        Err(e) => Err(e.into()),
    }
}
