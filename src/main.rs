//! Quiz Rush Back binary entrypoint wiring REST, SSE, and storage layers.

use std::{env, net::SocketAddr};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quiz_rush_back::{config::AppConfig, questions::QuestionBank, routes, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let bank_path = config.question_bank_path();
    let bank = QuestionBank::load(&bank_path)
        .with_context(|| format!("loading question bank from {}", bank_path.display()))?;
    info!(questions = bank.len(), "question bank loaded");

    let app_state = AppState::new(config, bank);

    #[cfg(feature = "couch-store")]
    spawn_storage_supervisor(app_state.clone());

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Hand the remote record store lifecycle to the storage supervisor.
#[cfg(feature = "couch-store")]
fn spawn_storage_supervisor(state: quiz_rush_back::state::SharedState) {
    use std::sync::Arc;

    use futures::FutureExt;
    use quiz_rush_back::{
        dao::record_store::{
            RecordStore,
            couchdb::{CouchConfig, CouchRecordStore},
        },
        services::storage_supervisor::{self, ConnectFn},
    };
    use tracing::warn;

    match CouchConfig::from_env() {
        Ok(config) => {
            let connect: ConnectFn = Box::new(move || {
                let config = config.clone();
                async move {
                    let store = CouchRecordStore::connect(config).await?;
                    Ok(Arc::new(store) as Arc<dyn RecordStore>)
                }
                .boxed()
            });
            tokio::spawn(storage_supervisor::run(state, connect));
        }
        Err(err) => {
            warn!(error = %err, "CouchDB not configured; records stay in the local cache");
        }
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: quiz_rush_back::state::SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
