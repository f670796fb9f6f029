use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::db::queries;
use crate::errors::AppError;
use crate::extract;
use crate::models::{CambiosPredio, NuevoPredio, Predio};
use crate::state::AppState;

// GET /api/predios
pub async fn list_predios(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Predio>>, AppError> {
    let predios = {
        let db = state.db()?;
        queries::list_predios_activos(&db)?
    };
    Ok(Json(predios))
}

// GET /api/predios/propietario/:propietario_id
pub async fn get_predio_by_propietario(
    State(state): State<Arc<AppState>>,
    Path(propietario_id): Path<i64>,
) -> Result<Json<Predio>, AppError> {
    let predio = {
        let db = state.db()?;
        queries::get_predio_by_propietario(&db, propietario_id)?
    };

    match predio {
        Some(p) => Ok(Json(p)),
        None => {
            tracing::debug!(propietario_id, "no active predio for propietario");
            Err(AppError::NotFound(format!(
                "predio for propietario {propietario_id}"
            )))
        }
    }
}

// POST /api/predios
pub async fn create_predio(
    State(state): State<Arc<AppState>>,
    extract::Json(body): extract::Json<NuevoPredio>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let datos = body
        .validate()
        .map_err(|errors| AppError::Validation(errors.join("; ")))?;

    let predio_id = {
        let db = state.db()?;
        if !queries::usuario_exists(&db, datos.propietario_id)? {
            return Err(AppError::NotFound(format!(
                "usuario {}",
                datos.propietario_id
            )));
        }
        queries::insert_predio(&db, &datos)?
    };

    tracing::info!(predio_id, propietario_id = datos.propietario_id, "predio created");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "predio created",
            "predio_id": predio_id,
        })),
    ))
}

// PUT /api/predios/:id
pub async fn update_predio(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    extract::Json(body): extract::Json<CambiosPredio>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (horario_apertura, horario_cierre) = body
        .horarios()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let updated = {
        let db = state.db()?;
        queries::update_predio(&db, id, &body, horario_apertura, horario_cierre)?
    };

    if !updated {
        return Err(AppError::NotFound(format!("predio {id}")));
    }

    tracing::info!(predio_id = id, "predio updated");
    Ok(Json(serde_json::json!({ "message": "predio updated" })))
}
