use std::sync::Arc;

use axum::Router;
use tokio::sync::broadcast;

use signcoach_backend::config::{Config, RateLimitConfig};
use signcoach_backend::routes::build_router;
use signcoach_backend::signs::classifier::{ClassifierConfig, SignClassifier};
use signcoach_backend::signs::templates::TemplateRegistry;
use signcoach_backend::state::AppState;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
}

fn test_config(api_limit: u64) -> Config {
    // 直接构造 Config，避免 set_var 在并行测试中互相干扰
    Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 8000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        cors_origin: "http://localhost:5173".to_string(),
        trust_proxy: false,
        rate_limit: RateLimitConfig {
            window_secs: 60,
            max_requests: api_limit,
        },
        templates_path: None,
        classifier: ClassifierConfig {
            trees: 20,
            samples_per_sign: 20,
            ..ClassifierConfig::default()
        },
    }
}

pub async fn spawn_with_limits(api_limit: u64) -> TestApp {
    let config = test_config(api_limit);
    let templates = Arc::new(TemplateRegistry::builtin());
    let classifier = Arc::new(
        SignClassifier::train(&templates, &config.classifier).expect("train classifier"),
    );
    let (shutdown_tx, _) = broadcast::channel::<()>(8);

    let state = AppState::new(templates, classifier, &config, shutdown_tx);
    let app = build_router(state.clone());

    TestApp { app, state, config }
}

pub async fn spawn_test_app() -> TestApp {
    spawn_with_limits(1_000).await
}
