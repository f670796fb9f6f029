use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::db::queries;
use crate::errors::AppError;
use crate::extract;
use crate::models::{NuevoUsuario, TipoUsuario, Usuario};
use crate::state::AppState;

// POST /api/usuarios
pub async fn create_usuario(
    State(state): State<Arc<AppState>>,
    extract::Json(body): extract::Json<NuevoUsuario>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let errors = body.validate();
    let tipo = match TipoUsuario::parse(&body.tipo) {
        Some(tipo) if errors.is_empty() => tipo,
        _ => return Err(AppError::Validation(errors.join("; "))),
    };

    let usuario_id = {
        let db = state.db()?;
        if queries::email_taken(&db, &body.email)? {
            return Err(AppError::Conflict("email is already registered".to_string()));
        }
        queries::insert_usuario(&db, &body, tipo)?
    };

    tracing::info!(usuario_id, tipo = tipo.as_str(), "usuario created");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "usuario created",
            "usuario_id": usuario_id,
        })),
    ))
}

// GET /api/usuarios/:id
pub async fn get_usuario(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Usuario>, AppError> {
    let usuario = {
        let db = state.db()?;
        queries::get_usuario(&db, id)?
    };
    usuario
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("usuario {id}")))
}
