use std::sync::Arc;

use adhera::advisor::HttpScheduleAdvisor;
use adhera::api::api_router;
use adhera::api::types::{generate_token, hash_token};
use adhera::config::{Config, APP_VERSION, DEFAULT_USER_ID};
use adhera::core_state::CoreState;
use adhera::db;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    adhera::init_tracing();

    let config = Config::from_env()?;
    std::fs::create_dir_all(&config.data_dir)?;

    tracing::info!("Adhera starting v{APP_VERSION}");

    let db_path = config.db_path();
    {
        let conn = db::open_database(&db_path)?;

        // First start: mint a bearer token and print it once.
        if db::count_api_tokens(&conn)? == 0 {
            let token = generate_token();
            db::insert_api_token(&conn, &hash_token(&token), DEFAULT_USER_ID, "initial")?;
            tracing::info!("API token (store it, it is not shown again): {token}");
        }

        if config.seed_demo && db::seed::seed_demo_data(&conn, DEFAULT_USER_ID, chrono::Utc::now())? {
            tracing::info!("Seeded demo data");
        }
    }

    let advisor = Arc::new(HttpScheduleAdvisor::new(
        &config.advisor_url,
        &config.advisor_model,
        config.advisor_timeout_secs,
    ));
    let core = Arc::new(CoreState::new(db_path, advisor));
    let app = api_router(core);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Listening on http://{}", config.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutting down");
}
