//! Booking conflict detection and the turno lifecycle.
//!
//! Every write to `turnos` goes through this module. Creating or moving a
//! turno runs the availability check and the write inside one `BEGIN IMMEDIATE`
//! transaction, so two requests cannot both observe a free slot and both book
//! it. The store's overlap triggers back this up; a trigger abort surfaces as
//! [`BookingError::SlotConflict`] like any other conflict.
//!
//! Nothing here logs or retries. Callers get a typed outcome and decide what to
//! report.

use chrono::{NaiveDate, NaiveTime, Utc};
use rusqlite::{Connection, TransactionBehavior};

use crate::db::queries;
use crate::models::{CambiosTurno, EstadoTurno, NuevoTurno, Slot, Turno};

const OVERLAP_TRIGGER_MESSAGE: &str = "overlaps an active booking";

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("invalid interval: hora_inicio {hora_inicio} must be before hora_fin {hora_fin}")]
    InvalidInterval {
        hora_inicio: NaiveTime,
        hora_fin: NaiveTime,
    },

    #[error("cancha {0} does not exist or is not active")]
    CanchaNotFound(i64),

    #[error("usuario {0} does not exist")]
    UsuarioNotFound(i64),

    #[error("turno {0} does not exist")]
    TurnoNotFound(i64),

    #[error("the requested slot overlaps an existing booking")]
    SlotConflict,

    #[error("turno cannot move from {from} to {to}")]
    IllegalTransition { from: EstadoTurno, to: EstadoTurno },

    #[error("turno {0} is cancelled and can no longer be rescheduled")]
    TurnoCancelled(i64),

    #[error("store error: {0}")]
    Store(anyhow::Error),
}

impl From<anyhow::Error> for BookingError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<rusqlite::Error>() {
            Some(e) if is_overlap_violation(e) => BookingError::SlotConflict,
            _ => BookingError::Store(err),
        }
    }
}

impl From<rusqlite::Error> for BookingError {
    fn from(err: rusqlite::Error) -> Self {
        if is_overlap_violation(&err) {
            BookingError::SlotConflict
        } else {
            BookingError::Store(err.into())
        }
    }
}

fn is_overlap_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(msg)) => {
            e.code == rusqlite::ErrorCode::ConstraintViolation
                && msg.contains(OVERLAP_TRIGGER_MESSAGE)
        }
        _ => false,
    }
}

/// Reports whether `[hora_inicio, hora_fin)` is free on `cancha_id` at `fecha`.
///
/// Cancelled turnos never block a slot. `exclude_turno_id` leaves one turno out
/// of the comparison so a turno being moved does not collide with itself.
pub fn check_availability(
    conn: &Connection,
    cancha_id: i64,
    fecha: NaiveDate,
    hora_inicio: NaiveTime,
    hora_fin: NaiveTime,
    exclude_turno_id: Option<i64>,
) -> Result<bool, BookingError> {
    let slot = Slot::new(hora_inicio, hora_fin).ok_or(BookingError::InvalidInterval {
        hora_inicio,
        hora_fin,
    })?;

    if !queries::cancha_is_active(conn, cancha_id)? {
        return Err(BookingError::CanchaNotFound(cancha_id));
    }

    let activos = queries::get_active_turnos_for_day(conn, cancha_id, &fecha, exclude_turno_id)?;

    Ok(!activos.iter().any(|turno| turno.slot().overlaps(&slot)))
}

/// Books a new turno in state `pendiente` and returns its id.
pub fn create_booking(conn: &mut Connection, nuevo: &NuevoTurno) -> Result<i64, BookingError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let available = check_availability(
        &tx,
        nuevo.cancha_id,
        nuevo.fecha,
        nuevo.hora_inicio,
        nuevo.hora_fin,
        None,
    )?;
    if !queries::usuario_exists(&tx, nuevo.usuario_id)? {
        return Err(BookingError::UsuarioNotFound(nuevo.usuario_id));
    }
    if !available {
        return Err(BookingError::SlotConflict);
    }

    let fecha_reserva = Utc::now().naive_utc();
    let id = queries::insert_turno(&tx, nuevo, &fecha_reserva)?;

    tx.commit()?;
    Ok(id)
}

/// Applies a partial update and returns the stored result.
///
/// The availability check only runs when the date or times actually change
/// and the turno stays active; an `estado`-only change never hits it.
pub fn update_booking(
    conn: &mut Connection,
    turno_id: i64,
    cambios: &CambiosTurno,
) -> Result<Turno, BookingError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let actual = queries::get_turno(&tx, turno_id)?.ok_or(BookingError::TurnoNotFound(turno_id))?;

    let estado = cambios.estado.unwrap_or(actual.estado);
    if !actual.estado.can_transition_to(estado) {
        return Err(BookingError::IllegalTransition {
            from: actual.estado,
            to: estado,
        });
    }

    let actualizado = Turno {
        fecha: cambios.fecha.unwrap_or(actual.fecha),
        hora_inicio: cambios.hora_inicio.unwrap_or(actual.hora_inicio),
        hora_fin: cambios.hora_fin.unwrap_or(actual.hora_fin),
        estado,
        ..actual.clone()
    };

    let reprogramado = actualizado.fecha != actual.fecha || actualizado.slot() != actual.slot();
    if reprogramado {
        if !actual.estado.is_active() {
            return Err(BookingError::TurnoCancelled(turno_id));
        }
        if Slot::new(actualizado.hora_inicio, actualizado.hora_fin).is_none() {
            return Err(BookingError::InvalidInterval {
                hora_inicio: actualizado.hora_inicio,
                hora_fin: actualizado.hora_fin,
            });
        }
        if estado.is_active() {
            let available = check_availability(
                &tx,
                actualizado.cancha_id,
                actualizado.fecha,
                actualizado.hora_inicio,
                actualizado.hora_fin,
                Some(turno_id),
            )?;
            if !available {
                return Err(BookingError::SlotConflict);
            }
        }
    }

    if actualizado != actual {
        queries::update_turno(&tx, &actualizado)?;
    }

    tx.commit()?;
    Ok(actualizado)
}

/// Marks a turno `cancelado`. Cancelling twice is a no-op, not an error.
pub fn cancel_booking(conn: &Connection, turno_id: i64) -> Result<(), BookingError> {
    if queries::cancel_turno(conn, turno_id)? == 0 {
        return Err(BookingError::TurnoNotFound(turno_id));
    }
    Ok(())
}
