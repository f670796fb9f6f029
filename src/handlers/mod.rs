pub mod canchas;
pub mod health;
pub mod predios;
pub mod turnos;
pub mod usuarios;
