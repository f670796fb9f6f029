pub mod cancha;
pub mod predio;
pub mod slot;
pub mod turno;
pub mod usuario;

pub use cancha::{CambiosCancha, Cancha, NuevaCancha};
pub use predio::{CambiosPredio, DatosPredio, NuevoPredio, Predio};
pub use slot::Slot;
pub use turno::{CambiosTurno, EstadoTurno, NuevoTurno, Turno, TurnoDetalle};
pub use usuario::{NuevoUsuario, TipoUsuario, Usuario};
