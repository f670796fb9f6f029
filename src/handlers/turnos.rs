use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::extract;
use crate::models::slot::{parse_fecha, parse_hora};
use crate::models::{CambiosTurno, EstadoTurno, NuevoTurno, Turno, TurnoDetalle};
use crate::services::booking::{self, BookingError};
use crate::state::AppState;

// GET /api/turnos
pub async fn list_turnos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TurnoDetalle>>, AppError> {
    let turnos = {
        let db = state.db()?;
        queries::list_turnos(&db)?
    };
    Ok(Json(turnos))
}

// GET /api/turnos/usuario/:usuario_id
pub async fn list_turnos_for_usuario(
    State(state): State<Arc<AppState>>,
    Path(usuario_id): Path<i64>,
) -> Result<Json<Vec<TurnoDetalle>>, AppError> {
    let turnos = {
        let db = state.db()?;
        queries::list_turnos_for_usuario(&db, usuario_id)?
    };
    Ok(Json(turnos))
}

// POST /api/turnos
#[derive(Deserialize)]
pub struct CreateTurnoRequest {
    pub cancha_id: i64,
    pub usuario_id: i64,
    pub fecha: String,
    pub hora_inicio: String,
    pub hora_fin: String,
}

impl CreateTurnoRequest {
    fn parse(&self) -> Result<NuevoTurno, AppError> {
        let mut errors = vec![];
        let fecha = parse_fecha(&self.fecha).map_err(|e| errors.push(e.to_string())).ok();
        let hora_inicio = parse_hora(&self.hora_inicio)
            .map_err(|e| errors.push(format!("hora_inicio: {e}")))
            .ok();
        let hora_fin = parse_hora(&self.hora_fin)
            .map_err(|e| errors.push(format!("hora_fin: {e}")))
            .ok();

        match (fecha, hora_inicio, hora_fin) {
            (Some(fecha), Some(hora_inicio), Some(hora_fin)) => Ok(NuevoTurno {
                cancha_id: self.cancha_id,
                usuario_id: self.usuario_id,
                fecha,
                hora_inicio,
                hora_fin,
            }),
            _ => Err(AppError::Validation(errors.join("; "))),
        }
    }
}

pub async fn create_turno(
    State(state): State<Arc<AppState>>,
    extract::Json(body): extract::Json<CreateTurnoRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let nuevo = body.parse()?;

    let result = {
        let mut db = state.db()?;
        booking::create_booking(&mut db, &nuevo)
    };

    match result {
        Ok(turno_id) => {
            tracing::info!(
                turno_id,
                cancha_id = nuevo.cancha_id,
                usuario_id = nuevo.usuario_id,
                fecha = %nuevo.fecha,
                hora_inicio = %nuevo.hora_inicio,
                hora_fin = %nuevo.hora_fin,
                "turno created"
            );
            Ok((
                StatusCode::CREATED,
                Json(serde_json::json!({
                    "message": "turno created",
                    "turno_id": turno_id,
                })),
            ))
        }
        Err(e) => {
            log_rejection("create", &e);
            Err(e.into())
        }
    }
}

// PUT /api/turnos/:id
#[derive(Deserialize, Default)]
pub struct UpdateTurnoRequest {
    pub estado: Option<String>,
    pub fecha: Option<String>,
    pub hora_inicio: Option<String>,
    pub hora_fin: Option<String>,
}

impl UpdateTurnoRequest {
    fn parse(&self) -> Result<CambiosTurno, AppError> {
        let estado = self
            .estado
            .as_deref()
            .map(|s| {
                EstadoTurno::parse(s).ok_or_else(|| {
                    AppError::Validation(format!(
                        "estado must be one of pendiente, confirmado, cancelado (got {s:?})"
                    ))
                })
            })
            .transpose()?;
        let fecha = self
            .fecha
            .as_deref()
            .map(parse_fecha)
            .transpose()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let hora_inicio = self
            .hora_inicio
            .as_deref()
            .map(parse_hora)
            .transpose()
            .map_err(|e| AppError::Validation(format!("hora_inicio: {e}")))?;
        let hora_fin = self
            .hora_fin
            .as_deref()
            .map(parse_hora)
            .transpose()
            .map_err(|e| AppError::Validation(format!("hora_fin: {e}")))?;

        Ok(CambiosTurno {
            estado,
            fecha,
            hora_inicio,
            hora_fin,
        })
    }
}

pub async fn update_turno(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    extract::Json(body): extract::Json<UpdateTurnoRequest>,
) -> Result<Json<Turno>, AppError> {
    let cambios = body.parse()?;

    let result = {
        let mut db = state.db()?;
        booking::update_booking(&mut db, id, &cambios)
    };

    match result {
        Ok(turno) => {
            tracing::info!(turno_id = id, estado = %turno.estado, "turno updated");
            Ok(Json(turno))
        }
        Err(e) => {
            log_rejection("update", &e);
            Err(e.into())
        }
    }
}

// DELETE /api/turnos/:id
pub async fn cancel_turno(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = {
        let db = state.db()?;
        booking::cancel_booking(&db, id)
    };

    match result {
        Ok(()) => {
            tracing::info!(turno_id = id, "turno cancelled");
            Ok(Json(serde_json::json!({ "message": "turno cancelled" })))
        }
        Err(e) => {
            log_rejection("cancel", &e);
            Err(e.into())
        }
    }
}

/// Expected rejections are logged at `warn`; store failures are logged when the response is built.
fn log_rejection(operation: &str, err: &BookingError) {
    if !matches!(err, BookingError::Store(_)) {
        tracing::warn!(operation, reason = %err, "turno rejected");
    }
}
