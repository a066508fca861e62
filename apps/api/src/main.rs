mod config;
mod errors;
mod matching;
mod routes;
mod state;
mod wizard;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;
use crate::wizard::QuestionBank;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Voice Wizard API v{}", env!("CARGO_PKG_VERSION"));

    // A malformed question file aborts startup.
    let questions = QuestionBank::load_dir(&config.questions_dir, &config.fallback_profession)
        .with_context(|| {
            format!(
                "Failed to load question sets from {}",
                config.questions_dir.display()
            )
        })?;

    let state = AppState {
        config: config.clone(),
        questions: Arc::new(questions),
    };

    // The step-wizard and chat front-ends are served from their own origin.
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict to the front-end origins once they are configurable

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
