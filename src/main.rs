// src/main.rs

use std::sync::Arc;

use civic_intake::{
    clock::SystemClock,
    config::Config,
    db,
    notify::LogNotifier,
    routes,
    service::ComplaintService,
    simulator::{default_steps, WorkflowSimulator},
    store::{CollectionStore, MemoryStore, PgStore},
    sweep::spawn_escalation_sweep,
    AppState,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = Config::from_env()?;

    // Storage: Postgres when configured, otherwise process memory
    let store: Arc<dyn CollectionStore> = match &config.database_url {
        Some(url) => {
            let pg = PgStore::new(db::connect(url).await?);
            pg.migrate().await?;
            Arc::new(pg)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; complaints are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let service = Arc::new(ComplaintService::new(
        store,
        Arc::new(LogNotifier),
        Arc::new(SystemClock),
    ));

    if config.seed_demo_data {
        service.seed_demo_managers().await?;
    }

    let mut state = AppState::new(Arc::clone(&service));
    if config.simulate_workflow {
        tracing::info!("workflow simulator enabled");
        let sim = Arc::new(WorkflowSimulator::new(Arc::clone(&service), default_steps()));
        state = state.with_simulator(sim);
    }

    let _sweeper = config
        .escalation_sweep
        .map(|every| spawn_escalation_sweep(Arc::clone(&service), every));

    let api = routes::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "API listening");

    axum::serve(listener, api.into_make_service()).await?;
    Ok(())
}
