pub mod adherence; // schedule expansion + reconciliation core
pub mod advisor; // LLM-backed schedule suggestions
pub mod api; // HTTP API router
pub mod config;
pub mod core_state;
pub mod db;
pub mod models;

use tracing_subscriber::EnvFilter;

/// Initialize tracing. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
