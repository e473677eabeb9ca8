use tracing::info;
use user_directory::{
    config::{get_config, init_config},
    console, AppState,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "user_directory=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    // stdout belongs to the dashboard
    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    init_config()?;
    let config = get_config();
    info!(
        query_latency_ms = config.query_latency_ms,
        debounce_ms = config.search_debounce_ms,
        page_limit = config.default_page_limit,
        "starting user directory"
    );

    let app_state = AppState::new(config);
    let _debouncer = app_state.spawn_search_debouncer();

    console::run(app_state).await?;

    Ok(())
}
