use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vigil_api::{build_router, state::AppState};
use vigil_config::Settings;
use vigil_db::{connect, indexes::ensure_indexes};
use vigil_services::AuthEvent;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "vigil_api=debug,vigil_services=debug,vigil_db=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load()?;
    info!(
        mode = ?settings.auth.mode,
        timezone = %settings.app.timezone,
        "Starting Vigil API on {}:{}",
        settings.app.host,
        settings.app.port
    );

    let db = connect(&settings.database).await?;
    ensure_indexes(&db).await?;

    let app_state = AppState::new(db, settings.clone())?;

    let audit = app_state.sessions.subscribe(|event| match event {
        AuthEvent::SignedIn { session_id, email } => {
            info!(%session_id, %email, "Signed in")
        }
        AuthEvent::SignedOut { session_id } => info!(%session_id, "Signed out"),
    });

    let app = build_router(app_state);

    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    audit.unsubscribe();
    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
