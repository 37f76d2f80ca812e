use anyhow::Result;

use pagekit_backend::{app, config, domain::Record, logging, store::MemoryStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let settings = config::Settings::from_env()?;

    logging::init_logging(&settings.env, settings.log_format);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        default_page_size = settings.pagination.default_page_size,
        max_page_size = settings.pagination.max_page_size,
        "Starting pagekit backend"
    );

    let records = MemoryStore::new();
    for i in 0..settings.seed_records {
        records.insert(Record::demo(i));
    }
    if !records.is_empty() {
        tracing::info!(count = records.len(), "Seeded demo records");
    }

    let state = app::AppState::new(settings.clone(), records);
    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
