use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/api/turnos",
            get(handlers::turnos::list_turnos).post(handlers::turnos::create_turno),
        )
        .route(
            "/api/turnos/:id",
            put(handlers::turnos::update_turno)
                .delete(handlers::turnos::cancel_turno),
        )
        .route(
            "/api/turnos/usuario/:usuario_id",
            get(handlers::turnos::list_turnos_for_usuario),
        )
        .route(
            "/api/canchas",
            get(handlers::canchas::list_canchas).post(handlers::canchas::create_cancha),
        )
        .route(
            "/api/canchas/:id",
            get(handlers::canchas::get_cancha).put(handlers::canchas::update_cancha),
        )
        .route(
            "/api/canchas/:id/disponibilidad",
            get(handlers::canchas::check_availability),
        )
        .route(
            "/api/predios",
            get(handlers::predios::list_predios).post(handlers::predios::create_predio),
        )
        .route(
            "/api/predios/:id",
            put(handlers::predios::update_predio),
        )
        .route(
            "/api/predios/propietario/:propietario_id",
            get(handlers::predios::get_predio_by_propietario),
        )
        .route("/api/usuarios", post(handlers::usuarios::create_usuario))
        .route("/api/usuarios/:id", get(handlers::usuarios::get_usuario))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::AUTHORIZATION])
        .allow_credentials(true)
}
