//! Map shapes, pipe logs and notes over HTTP.

use axum::http::StatusCode;
use serde_json::{Value, json};

use waterline_integration_tests::TestApp;

fn pipeline(title: &str) -> Value {
    json!({
        "kind": "polyline",
        "geojson": {
            "type": "Feature",
            "geometry": { "type": "LineString", "coordinates": [[125.6, 7.1], [125.7, 7.2]] },
            "properties": {}
        },
        "title": title,
        "size": "2in"
    })
}

#[tokio::test]
async fn test_deleted_shape_is_gone() {
    let app = TestApp::new().await;
    let engr = app.login("engr").await;

    let (status, shape) = app.post("/api/shapes", &engr, &pipeline("Main line")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(shape["status"], "Active");
    assert_eq!(shape["color"], "#3388ff");

    let uri = format!("/api/shapes/{}", shape["id"]);
    let (status, _) = app.delete(&uri, &engr).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&uri, Some(&engr)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, shapes) = app.get("/api/shapes", Some(&engr)).await;
    assert_eq!(shapes, json!([]));
}

#[tokio::test]
async fn test_pipe_log_updates_shape_size() {
    let app = TestApp::new().await;
    let engr = app.login("engr").await;
    let (_, shape) = app.post("/api/shapes", &engr, &pipeline("Main line")).await;
    let logs_uri = format!("/api/shapes/{}/logs", shape["id"]);

    let (status, first) = app
        .post(&logs_uri, &engr, &json!({ "size": "3in", "remarks": "upsized" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["shape"]["size"], "3in");
    assert_eq!(first["log"]["size"], "3in");

    let (_, second) = app.post(&logs_uri, &engr, &json!({ "size": "4in" })).await;
    assert_eq!(second["shape"]["size"], "4in");

    let (status, logs) = app.get(&logs_uri, Some(&engr)).await;
    assert_eq!(status, StatusCode::OK);
    let sizes: Vec<&str> = logs
        .as_array()
        .map(|logs| logs.iter().filter_map(|log| log["size"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(sizes, ["3in", "4in"]);

    let (_, current) = app
        .get(&format!("/api/shapes/{}", shape["id"]), Some(&engr))
        .await;
    assert_eq!(current["size"], "4in");
}

#[tokio::test]
async fn test_shape_update_does_not_change_size() {
    let app = TestApp::new().await;
    let engr = app.login("engr").await;
    let (_, shape) = app.post("/api/shapes", &engr, &pipeline("Main line")).await;
    let uri = format!("/api/shapes/{}", shape["id"]);

    let mut edit = pipeline("Main line (east)");
    edit["size"] = json!("8in");
    let (status, updated) = app.put(&uri, &engr, &edit).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Main line (east)");
    assert_eq!(updated["size"], "2in");

    let (_, logs) = app.get(&format!("{uri}/logs"), Some(&engr)).await;
    assert_eq!(logs, json!([]));
}

#[tokio::test]
async fn test_invalid_shape_is_rejected() {
    let app = TestApp::new().await;
    let engr = app.login("engr").await;

    let mut shape = pipeline("Main line");
    shape["geojson"] = json!("LINESTRING(125.6 7.1, 125.7 7.2)");
    let (status, body) = app.post("/api/shapes", &engr, &shape).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "geojson must be a JSON object");
}

#[tokio::test]
async fn test_note_lifecycle() {
    let app = TestApp::new().await;
    let engr = app.login("engr").await;
    let viewer = app.login("viewer").await;

    let (status, note) = app
        .post(
            "/api/notes",
            &engr,
            &json!({ "title": "Leak", "body": "Check meter 4", "latitude": 7.07, "longitude": 125.61 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/notes/{}", note["id"]);

    let (status, updated) = app
        .put(
            &uri,
            &engr,
            &json!({ "title": "Leak fixed", "body": "", "latitude": 7.07, "longitude": 125.61 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Leak fixed");

    let (status, _) = app.delete(&uri, &viewer).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post(
            "/api/notes",
            &engr,
            &json!({ "title": "Off map", "latitude": 91.0, "longitude": 0.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
