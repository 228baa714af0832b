//! Status command without a dataset

use floatchat_cli::commands::StatusCommand;
use floatchat_cli::AppContext;
use floatchat_query::{FloatChatConfig, ServiceStatus};

fn config_without_dataset() -> FloatChatConfig {
    let mut config = FloatChatConfig::default();
    config.dataset.path = "/nonexistent/master_dataset.csv".into();
    config.ollama.base_url = "http://127.0.0.1:9".to_string();
    config.ollama.probe_timeout_secs = 2;
    config
}

#[tokio::test]
async fn test_offline_skips_the_service() {
    let command = StatusCommand::new(AppContext::from_config(config_without_dataset(), true));
    assert_eq!(command.check().await.unwrap(), None);
}

#[tokio::test]
async fn test_unreachable_service_does_not_need_dataset() {
    let command = StatusCommand::new(AppContext::from_config(config_without_dataset(), false));
    let status = command.check().await.unwrap();
    assert_eq!(status, Some(ServiceStatus::unreachable()));
}
