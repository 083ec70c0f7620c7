//! Herald event router.
//!
//! Main entry point. Serves GitHub webhooks over HTTP, or, when running
//! inside GitHub Actions, replays the workflow's triggering event once and
//! exits.

use std::sync::Arc;

use anyhow::{Context, Result};
use herald_api::{source, AppState, Config, RuleSource, RuleStore};
use herald_core::{Dispatcher, EnvResolver};
use herald_delivery::DeliveryClient;
use tracing::{info, warn};

const DEFAULT_LOG_FILTER: &str = "info,herald=debug,tower_http=debug";

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    init_tracing(&config.rust_log);

    info!(version = env!("CARGO_PKG_VERSION"), one_shot = config.is_one_shot(), "Starting Herald");

    let source = RuleSource::from_path(config.rules_file.as_deref());
    let rules = RuleStore::from_source(source).context("Failed to load rules")?;

    let client = DeliveryClient::new(config.to_client_config()).context("Failed to create delivery client")?;
    let dispatcher = Dispatcher::new(Arc::new(client), Arc::new(EnvResolver));

    if config.is_one_shot() {
        return run_one_shot(&config, &rules, &dispatcher).await;
    }

    serve(config, rules, dispatcher).await
}

/// Replays the event GitHub Actions handed to the workflow.
async fn run_one_shot(config: &Config, rules: &RuleStore, dispatcher: &Dispatcher) -> Result<()> {
    let event = source::replay_event(config.github_event_name.as_deref(), config.github_event_path.as_deref())
        .context("Failed to load event for one-shot run")?;

    let snapshot = rules.snapshot().await;
    let result = source::run_once(&event, &snapshot, dispatcher).await;

    info!(triggered = result.triggered_count, "Herald one-shot run complete");
    Ok(())
}

/// Serves webhooks until CTRL+C or SIGTERM.
async fn serve(config: Config, rules: RuleStore, dispatcher: Dispatcher) -> Result<()> {
    let addr = config.parse_server_addr()?;

    #[cfg(unix)]
    let reload_task = if matches!(rules.source(), RuleSource::File(_)) {
        Some(herald_api::rules::spawn_reload_on_hangup(rules.clone()).context("Failed to install SIGHUP handler")?)
    } else {
        None
    };

    info!(addr = %addr, rules = rules.len().await, "Herald is ready to receive webhooks");

    herald_api::start_server(AppState::new(rules, dispatcher), addr)
        .await
        .context("HTTP server failed")?;

    #[cfg(unix)]
    if let Some(task) = reload_task {
        task.abort();
    }

    info!("Herald shutdown complete");
    Ok(())
}

/// Initializes tracing with the configured filter.
fn init_tracing(filter: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let (filter, rejected) = match EnvFilter::try_new(filter) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new(DEFAULT_LOG_FILTER), Some(e)),
    };

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();

    if let Some(e) = rejected {
        warn!(error = %e, default = DEFAULT_LOG_FILTER, "Invalid log filter, using default");
    }
}
