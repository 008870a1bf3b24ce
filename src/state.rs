use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;

use crate::config::Config;
use crate::middleware::rate_limit::RateLimitState;
use crate::signs::classifier::SignClassifier;
use crate::signs::templates::TemplateRegistry;

#[derive(Clone)]
pub struct AppState {
    templates: Arc<TemplateRegistry>,
    classifier: Arc<SignClassifier>,
    rate_limit: Arc<RateLimitState>,
    config: Arc<Config>,
    shutdown_tx: broadcast::Sender<()>,
    started_at: Instant,
}

impl AppState {
    pub fn new(
        templates: Arc<TemplateRegistry>,
        classifier: Arc<SignClassifier>,
        config: &Config,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        let rate_limit = Arc::new(RateLimitState::new(
            config.rate_limit.window_secs,
            config.rate_limit.max_requests,
        ));

        Self {
            templates,
            classifier,
            rate_limit,
            config: Arc::new(config.clone()),
            shutdown_tx,
            started_at: Instant::now(),
        }
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub fn classifier(&self) -> &SignClassifier {
        &self.classifier
    }

    pub fn rate_limit(&self) -> &Arc<RateLimitState> {
        &self.rate_limit
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shutdown_rx(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use crate::config::RateLimitConfig;
    use crate::signs::classifier::ClassifierConfig;

    use super::*;

    fn state_with(tx: broadcast::Sender<()>) -> AppState {
        let cfg = Config {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8000,
            log_level: "info".to_string(),
            enable_file_logs: false,
            log_dir: "./logs".to_string(),
            cors_origin: "*".to_string(),
            trust_proxy: false,
            rate_limit: RateLimitConfig::default(),
            templates_path: None,
            classifier: ClassifierConfig {
                trees: 3,
                samples_per_sign: 5,
                ..ClassifierConfig::default()
            },
        };
        let templates = Arc::new(TemplateRegistry::builtin());
        let classifier = Arc::new(SignClassifier::train(&templates, &cfg.classifier).unwrap());
        AppState::new(templates, classifier, &cfg, tx)
    }

    #[tokio::test]
    async fn shutdown_receiver_can_clone() {
        let (tx, _) = broadcast::channel(4);
        let state = state_with(tx.clone());

        let mut rx1 = state.shutdown_rx();
        let mut rx2 = state.shutdown_rx();
        tx.send(()).unwrap();
        rx1.recv().await.unwrap();
        rx2.recv().await.unwrap();
    }

    #[tokio::test]
    async fn classifier_labels_match_registry() {
        let (tx, _) = broadcast::channel(4);
        let state = state_with(tx);
        assert_eq!(state.classifier().labels(), state.templates().labels().as_slice());
    }
}
