use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::extract;
use crate::models::slot::{parse_fecha, parse_hora};
use crate::models::{CambiosCancha, Cancha, NuevaCancha};
use crate::services::booking;
use crate::state::AppState;

// GET /api/canchas
pub async fn list_canchas(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Cancha>>, AppError> {
    let canchas = {
        let db = state.db()?;
        queries::list_canchas_activas(&db)?
    };
    Ok(Json(canchas))
}

// GET /api/canchas/:id
pub async fn get_cancha(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Cancha>, AppError> {
    let cancha = {
        let db = state.db()?;
        queries::get_cancha(&db, id)?
    };
    cancha
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("cancha {id}")))
}

// POST /api/canchas
pub async fn create_cancha(
    State(state): State<Arc<AppState>>,
    extract::Json(body): extract::Json<NuevaCancha>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let errors = body.validate();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors.join("; ")));
    }

    let cancha_id = {
        let db = state.db()?;
        if !queries::predio_exists(&db, body.predio_id)? {
            return Err(AppError::NotFound(format!("predio {}", body.predio_id)));
        }
        queries::insert_cancha(&db, &body)?
    };

    tracing::info!(cancha_id, predio_id = body.predio_id, "cancha created");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "cancha created",
            "cancha_id": cancha_id,
        })),
    ))
}

// PUT /api/canchas/:id
pub async fn update_cancha(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    extract::Json(body): extract::Json<CambiosCancha>,
) -> Result<Json<Cancha>, AppError> {
    let errors = body.validate();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors.join("; ")));
    }

    let cancha = {
        let db = state.db()?;
        if !queries::update_cancha(&db, id, &body)? {
            return Err(AppError::NotFound(format!("cancha {id}")));
        }
        queries::get_cancha(&db, id)?
    };

    tracing::info!(cancha_id = id, "cancha updated");
    cancha
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("cancha {id}")))
}

// GET /api/canchas/:id/disponibilidad
#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub fecha: String,
    pub hora_inicio: String,
    pub hora_fin: String,
    pub excluir: Option<i64>,
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    cancha_id: i64,
    fecha: String,
    hora_inicio: String,
    hora_fin: String,
    disponible: bool,
}

pub async fn check_availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    extract::Query(query): extract::Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let fecha = parse_fecha(&query.fecha).map_err(|e| AppError::Validation(e.to_string()))?;
    let hora_inicio = parse_hora(&query.hora_inicio)
        .map_err(|e| AppError::Validation(format!("hora_inicio: {e}")))?;
    let hora_fin = parse_hora(&query.hora_fin)
        .map_err(|e| AppError::Validation(format!("hora_fin: {e}")))?;

    let disponible = {
        let db = state.db()?;
        booking::check_availability(&db, id, fecha, hora_inicio, hora_fin, query.excluir)?
    };

    Ok(Json(AvailabilityResponse {
        cancha_id: id,
        fecha: fecha.to_string(),
        hora_inicio: hora_inicio.to_string(),
        hora_fin: hora_fin.to_string(),
        disponible,
    }))
}
