use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use crate::signs::classifier::ClassifierConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub cors_origin: String,
    pub trust_proxy: bool,
    pub rate_limit: RateLimitConfig,
    /// JSON file replacing the built-in reference templates.
    pub templates_path: Option<String>,
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub window_secs: u64,
    pub max_requests: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 900,
            max_requests: 500,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = ClassifierConfig::default();
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 8000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
            trust_proxy: env_or_bool("TRUST_PROXY", false),
            rate_limit: RateLimitConfig {
                window_secs: env_or_parse("RATE_LIMIT_WINDOW_SECS", 900_u64),
                max_requests: env_or_parse("RATE_LIMIT_MAX", 500_u64),
            },
            templates_path: env::var("TEMPLATES_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty()),
            classifier: ClassifierConfig {
                trees: env_or_parse("CLASSIFIER_TREES", defaults.trees),
                max_depth: env_or_parse("CLASSIFIER_MAX_DEPTH", defaults.max_depth),
                samples_per_sign: env_or_parse(
                    "CLASSIFIER_SAMPLES_PER_SIGN",
                    defaults.samples_per_sign,
                ),
                seed: env_or_parse("CLASSIFIER_SEED", defaults.seed),
                ..defaults
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, OnceLock};

    use super::*;

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn managed_keys() -> &'static [&'static str] {
        &[
            "HOST",
            "PORT",
            "RUST_LOG",
            "RATE_LIMIT_MAX",
            "TEMPLATES_PATH",
            "CLASSIFIER_TREES",
            "CLASSIFIER_SEED",
            "TRUST_PROXY",
        ]
    }

    fn clear_keys(keys: &[&str]) {
        for key in keys {
            env::remove_var(key);
        }
    }

    #[test]
    fn loads_defaults_when_missing() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.rate_limit.max_requests, 500);
        assert!(cfg.templates_path.is_none());
        assert_eq!(cfg.classifier.trees, ClassifierConfig::default().trees);
    }

    #[test]
    fn parses_numeric_values() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("PORT", "4000");
        env::set_var("RATE_LIMIT_MAX", "100");
        env::set_var("CLASSIFIER_TREES", "7");
        env::set_var("CLASSIFIER_SEED", "9001");

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 4000);
        assert_eq!(cfg.rate_limit.max_requests, 100);
        assert_eq!(cfg.classifier.trees, 7);
        assert_eq!(cfg.classifier.seed, 9001);
        clear_keys(managed_keys());
    }

    #[test]
    fn invalid_values_fall_back() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("PORT", "bad");
        env::set_var("CLASSIFIER_TREES", "-3");

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.classifier.trees, ClassifierConfig::default().trees);
        clear_keys(managed_keys());
    }

    #[test]
    fn blank_templates_path_is_ignored() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("TEMPLATES_PATH", "  ");
        env::set_var("TRUST_PROXY", "yes");

        let cfg = Config::from_env();
        assert!(cfg.templates_path.is_none());
        assert!(cfg.trust_proxy);
        clear_keys(managed_keys());
    }
}
