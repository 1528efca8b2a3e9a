pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, StatusCode},
    routing::{get, post},
};
use state::AppState;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.app.cors_origins);

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/join", post(routes::auth::join))
        .route("/logout", post(routes::auth::logout))
        .route("/refresh", post(routes::auth::refresh))
        .route("/me", get(routes::auth::me))
        .route("/session", get(routes::auth::session));

    let attendance_routes = Router::new()
        .route("/check-in", post(routes::attendance::check_in))
        .route("/today", get(routes::attendance::today));

    let admin_routes = Router::new()
        .route("/attendance", get(routes::admin::list_attendance))
        .route("/attendance/export", get(routes::admin::export_pdf))
        .route(
            "/stream-config",
            get(routes::stream::get_config).put(routes::stream::save_config),
        );

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/attendance", attendance_routes)
        .nest("/admin", admin_routes)
        .route("/stream", get(routes::stream::embed));

    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    if parsed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(parsed))
    }
}

/// Liveness plus a database ping. Answers 503 when MongoDB is unreachable.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let (status, label, database) = match state.db.run_command(bson::doc! { "ping": 1 }).await {
        Ok(_) => (StatusCode::OK, "ok", "up"),
        Err(e) => {
            tracing::warn!(error = %e, "Health check ping failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "down")
        }
    };

    (
        status,
        Json(serde_json::json!({
            "status": label,
            "database": database,
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
