use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cancha {
    pub id: i64,
    pub predio_id: i64,
    pub nombre: String,
    pub tipo: String,
    pub superficie: String,
    pub capacidad: i64,
    pub precio: f64,
    pub dimensiones: Option<String>,
    pub descripcion: Option<String>,
    pub techada: bool,
    pub iluminacion: bool,
    pub vestuarios: bool,
    pub estacionamiento: bool,
    pub parrilla: bool,
    pub wifi: bool,
    pub activa: bool,
    pub fecha_creacion: NaiveDateTime,
    pub predio_nombre: Option<String>,
    pub predio_direccion: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NuevaCancha {
    pub predio_id: i64,
    pub nombre: String,
    pub tipo: String,
    pub superficie: String,
    pub capacidad: i64,
    pub precio: f64,
    pub dimensiones: Option<String>,
    pub descripcion: Option<String>,
    #[serde(default)]
    pub techada: bool,
    #[serde(default)]
    pub iluminacion: bool,
    #[serde(default)]
    pub vestuarios: bool,
    #[serde(default)]
    pub estacionamiento: bool,
    #[serde(default)]
    pub parrilla: bool,
    #[serde(default)]
    pub wifi: bool,
}

impl NuevaCancha {
    /// Returns every failed rule, not just the first one.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = vec![];
        if self.nombre.trim().is_empty() {
            errors.push("nombre is required".to_string());
        }
        if self.tipo.trim().is_empty() {
            errors.push("tipo is required".to_string());
        }
        if self.superficie.trim().is_empty() {
            errors.push("superficie is required".to_string());
        }
        if self.capacidad < 2 {
            errors.push("capacidad must be at least 2 players".to_string());
        }
        if self.precio < 0.0 || !self.precio.is_finite() {
            errors.push("precio must not be negative".to_string());
        }
        errors
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CambiosCancha {
    pub nombre: Option<String>,
    pub tipo: Option<String>,
    pub superficie: Option<String>,
    pub capacidad: Option<i64>,
    pub precio: Option<f64>,
    pub dimensiones: Option<String>,
    pub descripcion: Option<String>,
    pub techada: Option<bool>,
    pub iluminacion: Option<bool>,
    pub vestuarios: Option<bool>,
    pub estacionamiento: Option<bool>,
    pub parrilla: Option<bool>,
    pub wifi: Option<bool>,
    pub activa: Option<bool>,
}

impl CambiosCancha {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = vec![];
        for (field, value) in [
            ("nombre", &self.nombre),
            ("tipo", &self.tipo),
            ("superficie", &self.superficie),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                errors.push(format!("{field} must not be empty"));
            }
        }
        if self.capacidad.is_some_and(|c| c < 2) {
            errors.push("capacidad must be at least 2 players".to_string());
        }
        if self.precio.is_some_and(|p| p < 0.0 || !p.is_finite()) {
            errors.push("precio must not be negative".to_string());
        }
        errors
    }
}
