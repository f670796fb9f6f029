use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::slot::parse_hora;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Predio {
    pub id: i64,
    pub propietario_id: i64,
    pub nombre: String,
    pub direccion: String,
    pub ciudad: String,
    pub provincia: String,
    pub telefono: Option<String>,
    pub descripcion: Option<String>,
    pub horario_apertura: NaiveTime,
    pub horario_cierre: NaiveTime,
    pub politicas_cancelacion: Option<String>,
    pub coordenadas_lat: Option<f64>,
    pub coordenadas_lng: Option<f64>,
    pub activo: bool,
    pub fecha_registro: NaiveDateTime,
    pub propietario_nombre: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NuevoPredio {
    pub propietario_id: Option<i64>,
    pub nombre: Option<String>,
    pub direccion: Option<String>,
    pub ciudad: Option<String>,
    pub provincia: Option<String>,
    pub telefono: Option<String>,
    pub descripcion: Option<String>,
    pub horario_apertura: Option<String>,
    pub horario_cierre: Option<String>,
    pub politicas_cancelacion: Option<String>,
    pub coordenadas_lat: Option<f64>,
    pub coordenadas_lng: Option<f64>,
}

/// A `NuevoPredio` with every required field present and the opening hours parsed.
#[derive(Debug, Clone)]
pub struct DatosPredio {
    pub propietario_id: i64,
    pub nombre: String,
    pub direccion: String,
    pub ciudad: String,
    pub provincia: String,
    pub telefono: Option<String>,
    pub descripcion: Option<String>,
    pub horario_apertura: NaiveTime,
    pub horario_cierre: NaiveTime,
    pub politicas_cancelacion: Option<String>,
    pub coordenadas_lat: Option<f64>,
    pub coordenadas_lng: Option<f64>,
}

impl NuevoPredio {
    /// Collects every problem so the caller can report them together.
    pub fn validate(&self) -> Result<DatosPredio, Vec<String>> {
        let mut errors = vec![];

        let required = |field: &str, value: &Option<String>, errors: &mut Vec<String>| {
            match value.as_deref().map(str::trim) {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => {
                    errors.push(format!("{field} is required"));
                    String::new()
                }
            }
        };

        if self.propietario_id.is_none() {
            errors.push("propietario_id is required".to_string());
        }
        let nombre = required("nombre", &self.nombre, &mut errors);
        let direccion = required("direccion", &self.direccion, &mut errors);
        let ciudad = required("ciudad", &self.ciudad, &mut errors);
        let provincia = required("provincia", &self.provincia, &mut errors);

        let horario_apertura = parse_horario(
            self.horario_apertura.as_deref(),
            DEFAULT_APERTURA,
            "horario_apertura",
            &mut errors,
        );
        let horario_cierre = parse_horario(
            self.horario_cierre.as_deref(),
            DEFAULT_CIERRE,
            "horario_cierre",
            &mut errors,
        );

        match (self.propietario_id, horario_apertura, horario_cierre) {
            (Some(propietario_id), Some(horario_apertura), Some(horario_cierre))
                if errors.is_empty() =>
            {
                Ok(DatosPredio {
                    propietario_id,
                    nombre,
                    direccion,
                    ciudad,
                    provincia,
                    telefono: self.telefono.clone(),
                    descripcion: self.descripcion.clone(),
                    horario_apertura,
                    horario_cierre,
                    politicas_cancelacion: self.politicas_cancelacion.clone(),
                    coordenadas_lat: self.coordenadas_lat,
                    coordenadas_lng: self.coordenadas_lng,
                })
            }
            _ => Err(errors),
        }
    }
}

const DEFAULT_APERTURA: &str = "08:00:00";
const DEFAULT_CIERRE: &str = "23:00:00";

fn parse_horario(
    raw: Option<&str>,
    default: &str,
    field: &str,
    errors: &mut Vec<String>,
) -> Option<NaiveTime> {
    let value = raw.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(default);
    match parse_hora(value) {
        Ok(hora) => Some(hora),
        Err(e) => {
            errors.push(format!("{field}: {e}"));
            None
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CambiosPredio {
    pub nombre: Option<String>,
    pub direccion: Option<String>,
    pub ciudad: Option<String>,
    pub provincia: Option<String>,
    pub telefono: Option<String>,
    pub descripcion: Option<String>,
    pub horario_apertura: Option<String>,
    pub horario_cierre: Option<String>,
    pub politicas_cancelacion: Option<String>,
    pub coordenadas_lat: Option<f64>,
    pub coordenadas_lng: Option<f64>,
    pub activo: Option<bool>,
}

impl CambiosPredio {
    /// Parsed opening hours; absent or blank values stay `None`.
    pub fn horarios(&self) -> anyhow::Result<(Option<NaiveTime>, Option<NaiveTime>)> {
        let parse = |raw: &Option<String>| -> anyhow::Result<Option<NaiveTime>> {
            match raw.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                Some(v) => parse_hora(v).map(Some),
                None => Ok(None),
            }
        };
        Ok((parse(&self.horario_apertura)?, parse(&self.horario_cierre)?))
    }
}
