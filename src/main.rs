use std::net::SocketAddr;
use std::sync::Arc;

use cv_site_backend::{build_app, config::Config, firestore::FirestoreStore, logging, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    logging::init_logging();

    let config = Config::from_env()?;
    let store = Arc::new(FirestoreStore::new(&config));
    let state = AppState::new(store, &config.cv_data_path, &config.static_dir);
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(config.bind_socket()?).await?;

    info!(
        bind_addr = %config.bind_addr,
        bind_port = config.bind_port,
        project = %config.project_id,
        storage_bucket = %config.storage_bucket,
        "server starting"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
