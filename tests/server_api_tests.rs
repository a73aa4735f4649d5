use pokebracket::config::AppConfig;
use pokebracket::data::{PoolSnapshot, SnapshotSource};
use pokebracket::server::routes::route_request;
use pokebracket::server::AppState;
use pokebracket::tournament::{BaseStat, CategoryRelations, Contestant};

fn state(pool_size: usize) -> AppState {
    let contestants = (1..=12)
        .map(|id| {
            let kind = ["fire", "water", "grass"][id as usize % 3];
            Contestant::new(id, format!("mon-{id}"), [kind], [BaseStat::new("total", 100 + i64::from(id))])
        })
        .collect();
    let snapshot = PoolSnapshot {
        fetched_at: "2024-05-01T12:00:00+00:00".to_string(),
        source: "fixture".to_string(),
        contestants,
        categories: vec![
            CategoryRelations::new("fire", &["grass"]),
            CategoryRelations::new("water", &["fire"]),
            CategoryRelations::new("grass", &["water"]),
        ],
    };
    let config = AppConfig {
        pool_size,
        max_fetch_attempts: 1_000,
        ..AppConfig::default()
    };
    AppState::load(config, Box::new(SnapshotSource::new("fixture", snapshot)), Some(7))
}

fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).expect("response should be valid json")
}

#[test]
fn health_endpoint_returns_ok_json() {
    let response = route_request("GET", "/api/health", "", &state(4));
    assert_eq!(response.status_code, 200);
    assert_eq!(response.content_type, "application/json");
    let payload = json(&response.body);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["source"], "snapshot:fixture");
    assert_eq!(payload["categories"], 3);
}

#[test]
fn index_page_is_served() {
    let response = route_request("GET", "/", "", &state(4));
    assert_eq!(response.status_code, 200);
    assert!(response.content_type.starts_with("text/html"));
    assert!(response.body.contains("/api/contestants"));
}

#[test]
fn contestants_then_tournament_plays_the_stored_pool() {
    let state = state(8);

    let drawn = route_request("GET", "/api/contestants", "", &state);
    assert_eq!(drawn.status_code, 200);
    let drawn = json(&drawn.body);
    let session = drawn["session"].as_str().expect("session id").to_string();
    let drawn_ids: Vec<u64> = drawn["contestants"]
        .as_array()
        .expect("contestants array")
        .iter()
        .map(|c| c["id"].as_u64().expect("id"))
        .collect();
    assert_eq!(drawn_ids.len(), 8);
    assert_eq!(state.sessions.len(), 1);

    let body = format!(r#"{{"session":"{session}"}}"#);
    let played = route_request("POST", "/api/tournament", &body, &state);
    assert_eq!(played.status_code, 200);
    let played = json(&played.body);
    assert_eq!(played["session"], session.as_str());
    assert_eq!(played["pool_size"], 8);
    assert_eq!(played["rounds"].as_array().map(Vec::len), Some(3));

    let first_round: Vec<u64> = played["rounds"][0]["battles"]
        .as_array()
        .expect("battles array")
        .iter()
        .flat_map(|b| [b["first"]["id"].as_u64(), b["second"]["id"].as_u64()])
        .flatten()
        .collect();
    assert_eq!(first_round, drawn_ids);

    let champion = played["champion"]["id"].as_u64().expect("champion id");
    assert!(drawn_ids.contains(&champion));
    assert!(state.sessions.is_empty());

    let replay = route_request("POST", "/api/tournament", &body, &state);
    assert_eq!(replay.status_code, 404);
}

#[test]
fn tournament_without_session_draws_a_fresh_pool() {
    let state = state(4);
    for body in ["", "{}"] {
        let response = route_request("POST", "/api/tournament", body, &state);
        assert_eq!(response.status_code, 200);
        let payload = json(&response.body);
        assert!(payload.get("session").is_none());
        assert_eq!(payload["rounds"].as_array().map(Vec::len), Some(2));
    }
}

#[test]
fn unknown_session_is_not_found() {
    let response = route_request(
        "POST",
        "/api/tournament",
        r#"{"session":"6f1c1d1e-8f7a-4a7e-9a43-0c2e4b3c9d11"}"#,
        &state(4),
    );
    assert_eq!(response.status_code, 404);
    assert!(json(&response.body)["message"]
        .as_str()
        .is_some_and(|m| m.contains("unknown session")));
}

#[test]
fn malformed_body_is_a_bad_request() {
    let state = state(4);
    for body in ["{not json", r#"{"session":"not-a-uuid"}"#] {
        let response = route_request("POST", "/api/tournament", body, &state);
        assert_eq!(response.status_code, 400, "body: {body}");
        assert_eq!(json(&response.body)["status"], "error");
    }
}

#[test]
fn catalog_too_small_for_pool_is_a_bad_gateway() {
    let response = route_request("GET", "/api/contestants", "", &state(16));
    assert_eq!(response.status_code, 502);
}

#[test]
fn unknown_route_is_not_found() {
    let state = state(4);
    assert_eq!(route_request("GET", "/api/pokemon", "", &state).status_code, 404);
    assert_eq!(route_request("DELETE", "/api/tournament", "", &state).status_code, 404);
}
