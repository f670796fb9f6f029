use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use reservagol::config::AppConfig;
use reservagol::db;
use reservagol::routes;
use reservagol::state::AppState;

// ── Helpers ──

fn test_config() -> AppConfig {
    AppConfig {
        port: 3001,
        database_url: ":memory:".to_string(),
        cors_origins: vec!["http://localhost:3000".to_string()],
    }
}

fn test_state() -> Arc<AppState> {
    let conn = db::init_db(":memory:").unwrap();
    Arc::new(AppState::new(conn, test_config()))
}

fn test_app(state: Arc<AppState>) -> Router {
    routes::app(state)
}

async fn send(state: &Arc<AppState>, request: Request<Body>) -> (StatusCode, Value) {
    let res = test_app(state.clone()).oneshot(request).await.unwrap();
    let status = res.status();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Creates a propietario, a predio and one cancha. Returns (usuario_id, cancha_id).
async fn seed(state: &Arc<AppState>) -> (i64, i64) {
    let (status, body) = send(
        state,
        with_json(
            "POST",
            "/api/usuarios",
            json!({"nombre": "Marta", "email": "marta@example.com", "tipo": "propietario"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let usuario_id = body["usuario_id"].as_i64().unwrap();

    let (status, body) = send(
        state,
        with_json(
            "POST",
            "/api/predios",
            json!({
                "propietario_id": usuario_id,
                "nombre": "Complejo Norte",
                "direccion": "Av. Libertador 1000",
                "ciudad": "Córdoba",
                "provincia": "Córdoba"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let predio_id = body["predio_id"].as_i64().unwrap();

    let (status, body) = send(
        state,
        with_json(
            "POST",
            "/api/canchas",
            json!({
                "predio_id": predio_id,
                "nombre": "Cancha 5",
                "tipo": "futbol5",
                "superficie": "sintetico",
                "capacidad": 10,
                "precio": 20000,
                "iluminacion": true
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let cancha_id = body["cancha_id"].as_i64().unwrap();

    (usuario_id, cancha_id)
}

async fn book(
    state: &Arc<AppState>,
    usuario_id: i64,
    cancha_id: i64,
    inicio: &str,
    fin: &str,
) -> (StatusCode, Value) {
    send(
        state,
        with_json(
            "POST",
            "/api/turnos",
            json!({
                "cancha_id": cancha_id,
                "usuario_id": usuario_id,
                "fecha": "2024-06-01",
                "hora_inicio": inicio,
                "hora_fin": fin
            }),
        ),
    )
    .await
}

// ── Health ──

#[tokio::test]
async fn test_health() {
    let state = test_state();
    let (status, body) = send(&state, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// ── Turnos ──

#[tokio::test]
async fn test_create_turno_then_overlap_conflicts() {
    let state = test_state();
    let (usuario_id, cancha_id) = seed(&state).await;

    let (status, body) = book(&state, usuario_id, cancha_id, "10:00", "11:00").await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["turno_id"].as_i64().is_some());

    let (status, body) = book(&state, usuario_id, cancha_id, "10:30", "11:30").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("overlaps"));
}

#[tokio::test]
async fn test_touching_turnos_both_succeed() {
    let state = test_state();
    let (usuario_id, cancha_id) = seed(&state).await;

    let (status, _) = book(&state, usuario_id, cancha_id, "10:00", "11:00").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = book(&state, usuario_id, cancha_id, "11:00", "12:00").await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&state, get("/api/turnos")).await;
    let turnos = body.as_array().unwrap();
    assert_eq!(turnos.len(), 2);
    assert_eq!(turnos[0]["hora_inicio"], "10:00:00");
    assert_eq!(turnos[0]["estado"], "pendiente");
    assert_eq!(turnos[0]["cancha_nombre"], "Cancha 5");
    assert_eq!(turnos[0]["predio_nombre"], "Complejo Norte");
}

#[tokio::test]
async fn test_cancel_frees_slot_and_is_idempotent() {
    let state = test_state();
    let (usuario_id, cancha_id) = seed(&state).await;

    let (_, body) = book(&state, usuario_id, cancha_id, "10:00", "11:00").await;
    let turno_id = body["turno_id"].as_i64().unwrap();

    let (status, _) = send(&state, delete(&format!("/api/turnos/{turno_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&state, delete(&format!("/api/turnos/{turno_id}"))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = book(&state, usuario_id, cancha_id, "10:30", "11:30").await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&state, get(&format!("/api/turnos/usuario/{usuario_id}"))).await;
    let estados: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["estado"].as_str().unwrap())
        .collect();
    assert_eq!(estados.len(), 2);
    assert!(estados.contains(&"cancelado"));
    assert!(estados.contains(&"pendiente"));
}

#[tokio::test]
async fn test_cancel_unknown_turno_is_not_found() {
    let state = test_state();
    let (status, body) = send(&state, delete("/api/turnos/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("turno 999"));
}

#[tokio::test]
async fn test_empty_interval_rejected_without_write() {
    let state = test_state();
    let (usuario_id, cancha_id) = seed(&state).await;

    let (status, _) = book(&state, usuario_id, cancha_id, "10:00", "10:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&state, get("/api/turnos")).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_time_rejected() {
    let state = test_state();
    let (usuario_id, cancha_id) = seed(&state).await;

    let (status, body) = book(&state, usuario_id, cancha_id, "10h", "11:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("hora_inicio"));
}

#[tokio::test]
async fn test_unknown_cancha_is_not_found() {
    let state = test_state();
    let (usuario_id, _) = seed(&state).await;

    let (status, _) = book(&state, usuario_id, 4242, "10:00", "11:00").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_estado_and_reschedule() {
    let state = test_state();
    let (usuario_id, cancha_id) = seed(&state).await;

    let (_, body) = book(&state, usuario_id, cancha_id, "10:00", "11:00").await;
    let first = body["turno_id"].as_i64().unwrap();
    let (_, body) = book(&state, usuario_id, cancha_id, "12:00", "13:00").await;
    let second = body["turno_id"].as_i64().unwrap();

    let (status, body) = send(
        &state,
        with_json("PUT", &format!("/api/turnos/{first}"), json!({"estado": "confirmado"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["estado"], "confirmado");
    assert_eq!(body["hora_inicio"], "10:00:00");

    let (status, _) = send(
        &state,
        with_json(
            "PUT",
            &format!("/api/turnos/{second}"),
            json!({"hora_inicio": "10:30", "hora_fin": "11:30"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &state,
        with_json(
            "PUT",
            &format!("/api/turnos/{second}"),
            json!({"hora_inicio": "11:00", "hora_fin": "12:30"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hora_inicio"], "11:00:00");
    assert_eq!(body["hora_fin"], "12:30:00");
}

#[tokio::test]
async fn test_cancelled_turno_cannot_be_reactivated() {
    let state = test_state();
    let (usuario_id, cancha_id) = seed(&state).await;

    let (_, body) = book(&state, usuario_id, cancha_id, "10:00", "11:00").await;
    let turno_id = body["turno_id"].as_i64().unwrap();
    send(&state, delete(&format!("/api/turnos/{turno_id}"))).await;

    let (status, _) = send(
        &state,
        with_json("PUT", &format!("/api/turnos/{turno_id}"), json!({"estado": "pendiente"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_unknown_turno_is_not_found() {
    let state = test_state();
    let (status, _) = send(
        &state,
        with_json("PUT", "/api/turnos/31337", json!({"estado": "confirmado"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Availability ──

#[tokio::test]
async fn test_availability_endpoint() {
    let state = test_state();
    let (usuario_id, cancha_id) = seed(&state).await;
    let (_, body) = book(&state, usuario_id, cancha_id, "10:00", "11:00").await;
    let turno_id = body["turno_id"].as_i64().unwrap();

    let uri = format!(
        "/api/canchas/{cancha_id}/disponibilidad?fecha=2024-06-01&hora_inicio=10:30&hora_fin=11:30"
    );
    let (status, body) = send(&state, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["disponible"], false);

    let (_, body) = send(&state, get(&format!("{uri}&excluir={turno_id}"))).await;
    assert_eq!(body["disponible"], true);

    let uri = format!(
        "/api/canchas/{cancha_id}/disponibilidad?fecha=2024-06-01&hora_inicio=11:00&hora_fin=12:00"
    );
    let (_, body) = send(&state, get(&uri)).await;
    assert_eq!(body["disponible"], true);

    let uri = format!(
        "/api/canchas/{cancha_id}/disponibilidad?fecha=2024-06-01&hora_inicio=12:00&hora_fin=11:00"
    );
    let (status, _) = send(&state, get(&uri)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deactivated_cancha_cannot_be_booked() {
    let state = test_state();
    let (usuario_id, cancha_id) = seed(&state).await;

    let (status, body) = send(
        &state,
        with_json("PUT", &format!("/api/canchas/{cancha_id}"), json!({"activa": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["activa"], false);

    let (status, _) = book(&state, usuario_id, cancha_id, "10:00", "11:00").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&state, get("/api/canchas")).await;
    assert!(body.as_array().unwrap().is_empty());
}

// ── Directory ──

#[tokio::test]
async fn test_cancha_validation() {
    let state = test_state();
    seed(&state).await;

    let (status, body) = send(
        &state,
        with_json(
            "POST",
            "/api/canchas",
            json!({
                "predio_id": 1,
                "nombre": "",
                "tipo": "futbol5",
                "superficie": "sintetico",
                "capacidad": 1,
                "precio": 100
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("nombre"));
    assert!(error.contains("capacidad"));
}

#[tokio::test]
async fn test_cancha_for_unknown_predio() {
    let state = test_state();
    let (status, _) = send(
        &state,
        with_json(
            "POST",
            "/api/canchas",
            json!({
                "predio_id": 77,
                "nombre": "Cancha X",
                "tipo": "futbol7",
                "superficie": "cesped",
                "capacidad": 14,
                "precio": 30000
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_cancha() {
    let state = test_state();
    let (_, cancha_id) = seed(&state).await;

    let (status, body) = send(&state, get(&format!("/api/canchas/{cancha_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nombre"], "Cancha 5");
    assert_eq!(body["predio_nombre"], "Complejo Norte");
    assert_eq!(body["iluminacion"], true);

    let (status, _) = send(&state, get("/api/canchas/9999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_predio_lookup_and_update() {
    let state = test_state();
    let (usuario_id, _) = seed(&state).await;

    let (status, body) = send(&state, get(&format!("/api/predios/propietario/{usuario_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nombre"], "Complejo Norte");
    assert_eq!(body["horario_apertura"], "08:00:00");
    let predio_id = body["id"].as_i64().unwrap();

    let (status, _) = send(
        &state,
        with_json(
            "PUT",
            &format!("/api/predios/{predio_id}"),
            json!({"horario_cierre": "22:00", "telefono": "351-555-0101"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&state, get("/api/predios")).await;
    let predios = body.as_array().unwrap();
    assert_eq!(predios.len(), 1);
    assert_eq!(predios[0]["horario_cierre"], "22:00:00");
    assert_eq!(predios[0]["telefono"], "351-555-0101");
    assert_eq!(predios[0]["propietario_nombre"], "Marta");

    let (status, _) = send(&state, get("/api/predios/propietario/4040")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_predio_missing_fields() {
    let state = test_state();
    let (status, body) = send(
        &state,
        with_json("POST", "/api/predios", json!({"nombre": "Sin Dueño"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("propietario_id"));
    assert!(error.contains("direccion"));
}

#[tokio::test]
async fn test_usuario_duplicate_email_and_lookup() {
    let state = test_state();
    let (usuario_id, _) = seed(&state).await;

    let (status, _) = send(
        &state,
        with_json(
            "POST",
            "/api/usuarios",
            json!({"nombre": "Otra Marta", "email": "marta@example.com", "tipo": "jugador"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&state, get(&format!("/api/usuarios/{usuario_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "marta@example.com");
    assert_eq!(body["tipo"], "propietario");

    let (status, _) = send(&state, get("/api/usuarios/8080")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_usuario_validation() {
    let state = test_state();
    let (status, _) = send(
        &state,
        with_json(
            "POST",
            "/api/usuarios",
            json!({"nombre": "Pepe", "email": "pepe", "tipo": "admin"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_body_field_is_bad_request_json() {
    let state = test_state();
    let (usuario_id, cancha_id) = seed(&state).await;

    let (status, body) = send(
        &state,
        with_json(
            "POST",
            "/api/turnos",
            json!({
                "cancha_id": cancha_id,
                "fecha": "2024-06-01",
                "hora_inicio": "10:00",
                "hora_fin": "11:00"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("usuario_id"), "{body}");

    let (status, body) = send(
        &state,
        with_json(
            "POST",
            "/api/turnos",
            json!({
                "cancha_id": "x",
                "usuario_id": usuario_id,
                "fecha": "2024-06-01",
                "hora_inicio": "10:00",
                "hora_fin": "11:00"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");

    let (_, body) = send(&state, get("/api/turnos")).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_wrongly_typed_update_is_bad_request_json() {
    let state = test_state();
    let (usuario_id, cancha_id) = seed(&state).await;
    let (status, body) = book(&state, usuario_id, cancha_id, "10:00", "11:00").await;
    assert_eq!(status, StatusCode::CREATED);
    let turno_id = body["turno_id"].as_i64().unwrap();

    let (status, body) = send(
        &state,
        with_json(
            "PUT",
            &format!("/api/turnos/{turno_id}"),
            json!({"estado": 3}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");
}

#[tokio::test]
async fn test_availability_missing_param_is_bad_request_json() {
    let state = test_state();
    let (_, cancha_id) = seed(&state).await;

    let (status, body) = send(
        &state,
        get(&format!("/api/canchas/{cancha_id}/disponibilidad?fecha=2024-06-01")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("hora_inicio"), "{body}");
}
