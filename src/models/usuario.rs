use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usuario {
    pub id: i64,
    pub nombre: String,
    pub email: String,
    pub tipo: TipoUsuario,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub fecha_registro: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TipoUsuario {
    Jugador,
    Propietario,
}

impl TipoUsuario {
    pub fn as_str(&self) -> &'static str {
        match self {
            TipoUsuario::Jugador => "jugador",
            TipoUsuario::Propietario => "propietario",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "jugador" => Some(TipoUsuario::Jugador),
            "propietario" => Some(TipoUsuario::Propietario),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NuevoUsuario {
    pub nombre: String,
    pub email: String,
    pub tipo: String,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
}

impl NuevoUsuario {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = vec![];
        if self.nombre.trim().is_empty() {
            errors.push("nombre is required".to_string());
        }
        if !looks_like_email(&self.email) {
            errors.push("email is invalid".to_string());
        }
        if TipoUsuario::parse(&self.tipo).is_none() {
            errors.push("tipo must be jugador or propietario".to_string());
        }
        errors
    }
}

fn looks_like_email(s: &str) -> bool {
    match s.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}
