use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::slot::{DATE_FORMAT, TIME_FORMAT};
use crate::models::{
    CambiosCancha, CambiosPredio, Cancha, DatosPredio, EstadoTurno, NuevaCancha, NuevoTurno,
    NuevoUsuario, Predio, TipoUsuario, Turno, TurnoDetalle, Usuario,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn parse_timestamp(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map_err(|e| anyhow::anyhow!("invalid stored timestamp {s:?}: {e}"))
}

fn parse_stored_time(s: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .map_err(|e| anyhow::anyhow!("invalid stored time {s:?}: {e}"))
}

fn parse_stored_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| anyhow::anyhow!("invalid stored date {s:?}: {e}"))
}

fn fmt_date(d: &NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

fn fmt_time(t: &NaiveTime) -> String {
    t.format(TIME_FORMAT).to_string()
}

// ── Usuarios ──

pub fn insert_usuario(
    conn: &Connection,
    usuario: &NuevoUsuario,
    tipo: TipoUsuario,
) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO usuarios (nombre, email, tipo, telefono, direccion) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            usuario.nombre.trim(),
            usuario.email.trim(),
            tipo.as_str(),
            usuario.telefono,
            usuario.direccion,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_usuario(conn: &Connection, id: i64) -> anyhow::Result<Option<Usuario>> {
    let row = conn
        .query_row(
            "SELECT id, nombre, email, tipo, telefono, direccion, fecha_registro FROM usuarios WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, String>(6)?,
                ))
            },
        )
        .optional()?;

    let Some((id, nombre, email, tipo, telefono, direccion, fecha_registro)) = row else {
        return Ok(None);
    };

    Ok(Some(Usuario {
        id,
        nombre,
        email,
        tipo: TipoUsuario::parse(&tipo)
            .ok_or_else(|| anyhow::anyhow!("invalid stored tipo {tipo:?}"))?,
        telefono,
        direccion,
        fecha_registro: parse_timestamp(&fecha_registro)?,
    }))
}

pub fn usuario_exists(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM usuarios WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

pub fn email_taken(conn: &Connection, email: &str) -> anyhow::Result<bool> {
    let taken: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM usuarios WHERE email = ?1",
        params![email.trim()],
        |row| row.get(0),
    )?;
    Ok(taken)
}

// ── Predios ──

const PREDIO_COLUMNS: &str = "p.id, p.propietario_id, p.nombre, p.direccion, p.ciudad, p.provincia, \
     p.telefono, p.descripcion, p.horario_apertura, p.horario_cierre, p.politicas_cancelacion, \
     p.coordenadas_lat, p.coordenadas_lng, p.activo, p.fecha_registro, u.nombre";

pub fn insert_predio(conn: &Connection, predio: &DatosPredio) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO predios (
            propietario_id, nombre, direccion, ciudad, provincia, telefono, descripcion,
            horario_apertura, horario_cierre, politicas_cancelacion, coordenadas_lat, coordenadas_lng
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            predio.propietario_id,
            predio.nombre,
            predio.direccion,
            predio.ciudad,
            predio.provincia,
            predio.telefono,
            predio.descripcion,
            fmt_time(&predio.horario_apertura),
            fmt_time(&predio.horario_cierre),
            predio.politicas_cancelacion,
            predio.coordenadas_lat,
            predio.coordenadas_lng,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn predio_exists(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM predios WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

pub fn list_predios_activos(conn: &Connection) -> anyhow::Result<Vec<Predio>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PREDIO_COLUMNS} FROM predios p
         LEFT JOIN usuarios u ON p.propietario_id = u.id
         WHERE p.activo = 1
         ORDER BY p.nombre"
    ))?;

    let rows = stmt.query_map([], |row| Ok(parse_predio_row(row)))?;

    let mut predios = vec![];
    for row in rows {
        predios.push(row??);
    }
    Ok(predios)
}

pub fn get_predio_by_propietario(
    conn: &Connection,
    propietario_id: i64,
) -> anyhow::Result<Option<Predio>> {
    let result = conn.query_row(
        &format!(
            "SELECT {PREDIO_COLUMNS} FROM predios p
             LEFT JOIN usuarios u ON p.propietario_id = u.id
             WHERE p.propietario_id = ?1 AND p.activo = 1
             ORDER BY p.id
             LIMIT 1"
        ),
        params![propietario_id],
        |row| Ok(parse_predio_row(row)),
    );

    match result {
        Ok(predio) => Ok(Some(predio?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_predio(
    conn: &Connection,
    id: i64,
    cambios: &CambiosPredio,
    horario_apertura: Option<NaiveTime>,
    horario_cierre: Option<NaiveTime>,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE predios SET
            nombre = COALESCE(?1, nombre),
            direccion = COALESCE(?2, direccion),
            ciudad = COALESCE(?3, ciudad),
            provincia = COALESCE(?4, provincia),
            telefono = COALESCE(?5, telefono),
            descripcion = COALESCE(?6, descripcion),
            horario_apertura = COALESCE(?7, horario_apertura),
            horario_cierre = COALESCE(?8, horario_cierre),
            politicas_cancelacion = COALESCE(?9, politicas_cancelacion),
            coordenadas_lat = COALESCE(?10, coordenadas_lat),
            coordenadas_lng = COALESCE(?11, coordenadas_lng),
            activo = COALESCE(?12, activo)
         WHERE id = ?13",
        params![
            cambios.nombre,
            cambios.direccion,
            cambios.ciudad,
            cambios.provincia,
            cambios.telefono,
            cambios.descripcion,
            horario_apertura.as_ref().map(fmt_time),
            horario_cierre.as_ref().map(fmt_time),
            cambios.politicas_cancelacion,
            cambios.coordenadas_lat,
            cambios.coordenadas_lng,
            cambios.activo,
            id,
        ],
    )?;
    Ok(count > 0)
}

fn parse_predio_row(row: &rusqlite::Row) -> anyhow::Result<Predio> {
    let horario_apertura: String = row.get(8)?;
    let horario_cierre: String = row.get(9)?;
    let fecha_registro: String = row.get(14)?;

    Ok(Predio {
        id: row.get(0)?,
        propietario_id: row.get(1)?,
        nombre: row.get(2)?,
        direccion: row.get(3)?,
        ciudad: row.get(4)?,
        provincia: row.get(5)?,
        telefono: row.get(6)?,
        descripcion: row.get(7)?,
        horario_apertura: parse_stored_time(&horario_apertura)?,
        horario_cierre: parse_stored_time(&horario_cierre)?,
        politicas_cancelacion: row.get(10)?,
        coordenadas_lat: row.get(11)?,
        coordenadas_lng: row.get(12)?,
        activo: row.get(13)?,
        fecha_registro: parse_timestamp(&fecha_registro)?,
        propietario_nombre: row.get(15)?,
    })
}

// ── Canchas ──

const CANCHA_COLUMNS: &str = "c.id, c.predio_id, c.nombre, c.tipo, c.superficie, c.capacidad, c.precio, \
     c.dimensiones, c.descripcion, c.techada, c.iluminacion, c.vestuarios, c.estacionamiento, \
     c.parrilla, c.wifi, c.activa, c.fecha_creacion, p.nombre, p.direccion";

pub fn insert_cancha(conn: &Connection, cancha: &NuevaCancha) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO canchas (
            predio_id, nombre, tipo, superficie, capacidad, precio, dimensiones, descripcion,
            techada, iluminacion, vestuarios, estacionamiento, parrilla, wifi
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            cancha.predio_id,
            cancha.nombre.trim(),
            cancha.tipo.trim(),
            cancha.superficie.trim(),
            cancha.capacidad,
            cancha.precio,
            cancha.dimensiones,
            cancha.descripcion,
            cancha.techada,
            cancha.iluminacion,
            cancha.vestuarios,
            cancha.estacionamiento,
            cancha.parrilla,
            cancha.wifi,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_cancha(conn: &Connection, id: i64) -> anyhow::Result<Option<Cancha>> {
    let result = conn.query_row(
        &format!(
            "SELECT {CANCHA_COLUMNS} FROM canchas c
             LEFT JOIN predios p ON c.predio_id = p.id
             WHERE c.id = ?1"
        ),
        params![id],
        |row| Ok(parse_cancha_row(row)),
    );

    match result {
        Ok(cancha) => Ok(Some(cancha?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_canchas_activas(conn: &Connection) -> anyhow::Result<Vec<Cancha>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CANCHA_COLUMNS} FROM canchas c
         LEFT JOIN predios p ON c.predio_id = p.id
         WHERE c.activa = 1
         ORDER BY p.nombre, c.nombre"
    ))?;

    let rows = stmt.query_map([], |row| Ok(parse_cancha_row(row)))?;

    let mut canchas = vec![];
    for row in rows {
        canchas.push(row??);
    }
    Ok(canchas)
}

/// True only for a cancha that exists and is marked active.
pub fn cancha_is_active(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let active: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM canchas WHERE id = ?1 AND activa = 1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(active)
}

pub fn update_cancha(conn: &Connection, id: i64, cambios: &CambiosCancha) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE canchas SET
            nombre = COALESCE(?1, nombre),
            tipo = COALESCE(?2, tipo),
            superficie = COALESCE(?3, superficie),
            capacidad = COALESCE(?4, capacidad),
            precio = COALESCE(?5, precio),
            dimensiones = COALESCE(?6, dimensiones),
            descripcion = COALESCE(?7, descripcion),
            techada = COALESCE(?8, techada),
            iluminacion = COALESCE(?9, iluminacion),
            vestuarios = COALESCE(?10, vestuarios),
            estacionamiento = COALESCE(?11, estacionamiento),
            parrilla = COALESCE(?12, parrilla),
            wifi = COALESCE(?13, wifi),
            activa = COALESCE(?14, activa)
         WHERE id = ?15",
        params![
            cambios.nombre,
            cambios.tipo,
            cambios.superficie,
            cambios.capacidad,
            cambios.precio,
            cambios.dimensiones,
            cambios.descripcion,
            cambios.techada,
            cambios.iluminacion,
            cambios.vestuarios,
            cambios.estacionamiento,
            cambios.parrilla,
            cambios.wifi,
            cambios.activa,
            id,
        ],
    )?;
    Ok(count > 0)
}

fn parse_cancha_row(row: &rusqlite::Row) -> anyhow::Result<Cancha> {
    let fecha_creacion: String = row.get(16)?;

    Ok(Cancha {
        id: row.get(0)?,
        predio_id: row.get(1)?,
        nombre: row.get(2)?,
        tipo: row.get(3)?,
        superficie: row.get(4)?,
        capacidad: row.get(5)?,
        precio: row.get(6)?,
        dimensiones: row.get(7)?,
        descripcion: row.get(8)?,
        techada: row.get(9)?,
        iluminacion: row.get(10)?,
        vestuarios: row.get(11)?,
        estacionamiento: row.get(12)?,
        parrilla: row.get(13)?,
        wifi: row.get(14)?,
        activa: row.get(15)?,
        fecha_creacion: parse_timestamp(&fecha_creacion)?,
        predio_nombre: row.get(17)?,
        predio_direccion: row.get(18)?,
    })
}

// ── Turnos ──

const TURNO_COLUMNS: &str =
    "t.id, t.cancha_id, t.usuario_id, t.fecha, t.hora_inicio, t.hora_fin, t.estado, t.fecha_reserva";

pub fn insert_turno(
    conn: &Connection,
    turno: &NuevoTurno,
    fecha_reserva: &NaiveDateTime,
) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO turnos (cancha_id, usuario_id, fecha, hora_inicio, hora_fin, estado, fecha_reserva)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            turno.cancha_id,
            turno.usuario_id,
            fmt_date(&turno.fecha),
            fmt_time(&turno.hora_inicio),
            fmt_time(&turno.hora_fin),
            EstadoTurno::Pendiente.as_str(),
            fecha_reserva.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_turno(conn: &Connection, id: i64) -> anyhow::Result<Option<Turno>> {
    let result = conn.query_row(
        &format!("SELECT {TURNO_COLUMNS} FROM turnos t WHERE t.id = ?1"),
        params![id],
        |row| Ok(parse_turno_row(row)),
    );

    match result {
        Ok(turno) => Ok(Some(turno?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Non-cancelled turnos of one cancha on one day, optionally leaving one out.
pub fn get_active_turnos_for_day(
    conn: &Connection,
    cancha_id: i64,
    fecha: &NaiveDate,
    exclude_turno_id: Option<i64>,
) -> anyhow::Result<Vec<Turno>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TURNO_COLUMNS} FROM turnos t
         WHERE t.cancha_id = ?1 AND t.fecha = ?2 AND t.estado != 'cancelado'
           AND (?3 IS NULL OR t.id != ?3)
         ORDER BY t.hora_inicio ASC"
    ))?;

    let rows = stmt.query_map(params![cancha_id, fmt_date(fecha), exclude_turno_id], |row| {
        Ok(parse_turno_row(row))
    })?;

    let mut turnos = vec![];
    for row in rows {
        turnos.push(row??);
    }
    Ok(turnos)
}

/// Writes every mutable column of `turno`; `id` and `fecha_reserva` are never touched.
pub fn update_turno(conn: &Connection, turno: &Turno) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE turnos SET fecha = ?1, hora_inicio = ?2, hora_fin = ?3, estado = ?4 WHERE id = ?5",
        params![
            fmt_date(&turno.fecha),
            fmt_time(&turno.hora_inicio),
            fmt_time(&turno.hora_fin),
            turno.estado.as_str(),
            turno.id,
        ],
    )?;
    Ok(count > 0)
}

/// Returns the number of rows matched, so an already cancelled turno still counts.
pub fn cancel_turno(conn: &Connection, id: i64) -> anyhow::Result<usize> {
    let count = conn.execute(
        "UPDATE turnos SET estado = ?1 WHERE id = ?2",
        params![EstadoTurno::Cancelado.as_str(), id],
    )?;
    Ok(count)
}

const TURNO_DETALLE_QUERY: &str = "SELECT t.id, t.cancha_id, t.usuario_id, t.fecha, t.hora_inicio, \
     t.hora_fin, t.estado, t.fecha_reserva, c.nombre, c.tipo, u.nombre, p.nombre, p.direccion
     FROM turnos t
     LEFT JOIN canchas c ON t.cancha_id = c.id
     LEFT JOIN usuarios u ON t.usuario_id = u.id
     LEFT JOIN predios p ON c.predio_id = p.id";

pub fn list_turnos(conn: &Connection) -> anyhow::Result<Vec<TurnoDetalle>> {
    let mut stmt = conn.prepare(&format!(
        "{TURNO_DETALLE_QUERY} ORDER BY t.fecha ASC, t.hora_inicio ASC"
    ))?;

    let rows = stmt.query_map([], |row| Ok(parse_turno_detalle_row(row)))?;

    let mut turnos = vec![];
    for row in rows {
        turnos.push(row??);
    }
    Ok(turnos)
}

pub fn list_turnos_for_usuario(
    conn: &Connection,
    usuario_id: i64,
) -> anyhow::Result<Vec<TurnoDetalle>> {
    let mut stmt = conn.prepare(&format!(
        "{TURNO_DETALLE_QUERY} WHERE t.usuario_id = ?1 ORDER BY t.fecha DESC, t.hora_inicio DESC"
    ))?;

    let rows = stmt.query_map(params![usuario_id], |row| Ok(parse_turno_detalle_row(row)))?;

    let mut turnos = vec![];
    for row in rows {
        turnos.push(row??);
    }
    Ok(turnos)
}

fn parse_turno_row(row: &rusqlite::Row) -> anyhow::Result<Turno> {
    let id: i64 = row.get(0)?;
    let cancha_id: i64 = row.get(1)?;
    let usuario_id: i64 = row.get(2)?;
    let fecha_str: String = row.get(3)?;
    let hora_inicio_str: String = row.get(4)?;
    let hora_fin_str: String = row.get(5)?;
    let estado_str: String = row.get(6)?;
    let fecha_reserva_str: String = row.get(7)?;

    Ok(Turno {
        id,
        cancha_id,
        usuario_id,
        fecha: parse_stored_date(&fecha_str)?,
        hora_inicio: parse_stored_time(&hora_inicio_str)?,
        hora_fin: parse_stored_time(&hora_fin_str)?,
        estado: EstadoTurno::parse(&estado_str)
            .ok_or_else(|| anyhow::anyhow!("invalid stored estado {estado_str:?}"))?,
        fecha_reserva: parse_timestamp(&fecha_reserva_str)?,
    })
}

fn parse_turno_detalle_row(row: &rusqlite::Row) -> anyhow::Result<TurnoDetalle> {
    Ok(TurnoDetalle {
        turno: parse_turno_row(row)?,
        cancha_nombre: row.get(8)?,
        cancha_tipo: row.get(9)?,
        usuario_nombre: row.get(10)?,
        predio_nombre: row.get(11)?,
        predio_direccion: row.get(12)?,
    })
}
