use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::slot::Slot;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turno {
    pub id: i64,
    pub cancha_id: i64,
    pub usuario_id: i64,
    pub fecha: NaiveDate,
    pub hora_inicio: NaiveTime,
    pub hora_fin: NaiveTime,
    pub estado: EstadoTurno,
    pub fecha_reserva: NaiveDateTime,
}

impl Turno {
    pub fn slot(&self) -> Slot {
        Slot {
            hora_inicio: self.hora_inicio,
            hora_fin: self.hora_fin,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EstadoTurno {
    Pendiente,
    Confirmado,
    Cancelado,
}

impl EstadoTurno {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoTurno::Pendiente => "pendiente",
            EstadoTurno::Confirmado => "confirmado",
            EstadoTurno::Cancelado => "cancelado",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pendiente" => Some(EstadoTurno::Pendiente),
            "confirmado" => Some(EstadoTurno::Confirmado),
            "cancelado" => Some(EstadoTurno::Cancelado),
            _ => None,
        }
    }

    /// Active turnos take part in conflict checks.
    pub fn is_active(&self) -> bool {
        *self != EstadoTurno::Cancelado
    }

    /// Transition policy: `cancelado` is terminal, everything else is open.
    /// Staying in the same state is always allowed.
    pub fn can_transition_to(&self, next: EstadoTurno) -> bool {
        match (self, next) {
            (EstadoTurno::Cancelado, EstadoTurno::Cancelado) => true,
            (EstadoTurno::Cancelado, _) => false,
            _ => true,
        }
    }
}

impl std::fmt::Display for EstadoTurno {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated input for a new booking.
#[derive(Debug, Clone)]
pub struct NuevoTurno {
    pub cancha_id: i64,
    pub usuario_id: i64,
    pub fecha: NaiveDate,
    pub hora_inicio: NaiveTime,
    pub hora_fin: NaiveTime,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct CambiosTurno {
    pub estado: Option<EstadoTurno>,
    pub fecha: Option<NaiveDate>,
    pub hora_inicio: Option<NaiveTime>,
    pub hora_fin: Option<NaiveTime>,
}

/// A turno joined with the names of its cancha, predio and player, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct TurnoDetalle {
    #[serde(flatten)]
    pub turno: Turno,
    pub cancha_nombre: Option<String>,
    pub cancha_tipo: Option<String>,
    pub usuario_nombre: Option<String>,
    pub predio_nombre: Option<String>,
    pub predio_direccion: Option<String>,
}
