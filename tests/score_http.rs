mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::app::spawn_test_app;
use common::fixtures::{frame, sign_landmarks};
use common::http::{assert_json_error, send_json};

#[tokio::test]
async fn it_scores_exact_match_as_perfect() {
    let app = spawn_test_app().await;
    let body = json!({
        "word": "HELLO",
        "frames": [frame(sign_landmarks("HELLO", 0.0, 0.0, Some(1.0)))],
    });
    let (status, _, resp) = send_json(&app.app, Method::POST, "/api/score", Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["word"], "HELLO");
    assert_eq!(resp["score"], 100.0);
    assert_eq!(resp["passed"], true);
    assert_eq!(resp["low_confidence"], false);
    assert!(!resp["tips"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn it_echoes_requested_word() {
    let app = spawn_test_app().await;
    let body = json!({
        "word": "hello",
        "frames": [frame(sign_landmarks("HELLO", 0.0, 0.0, None))],
    });
    let (status, _, resp) = send_json(&app.app, Method::POST, "/api/score", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["word"], "hello");
}

#[tokio::test]
async fn it_averages_frames() {
    let app = spawn_test_app().await;
    let near = frame(sign_landmarks("V", 0.01, 0.01, None));
    let body = json!({ "word": "V", "frames": [near.clone(), near.clone(), near] });
    let (status, _, resp) = send_json(&app.app, Method::POST, "/api/score", Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    let score = resp["score"].as_f64().unwrap();
    assert!((score - 100.0 * (-0.002_f64).exp()).abs() < 1e-6);
    assert_eq!(resp["passed"], true);
}

#[tokio::test]
async fn it_fails_wrong_shape_with_corrective_tips() {
    let app = spawn_test_app().await;
    let body = json!({
        "word": "A",
        "frames": [frame(sign_landmarks("HELLO", 0.0, 0.0, None))],
    });
    let (status, _, resp) = send_json(&app.app, Method::POST, "/api/score", Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["passed"], false);
    assert!(resp["score"].as_f64().unwrap() < 75.0);
    assert!(resp["tips"].as_array().unwrap().len() >= 2);
}

#[tokio::test]
async fn it_flags_invisible_attempt() {
    let app = spawn_test_app().await;
    let body = json!({
        "word": "B",
        "frames": [frame(sign_landmarks("Y", 0.0, 0.0, Some(0.0)))],
    });
    let (status, _, resp) = send_json(&app.app, Method::POST, "/api/score", Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["score"], 100.0);
    assert_eq!(resp["low_confidence"], true);
}

#[tokio::test]
async fn it_unknown_word_is_404() {
    let app = spawn_test_app().await;
    let body = json!({
        "word": "ZEBRA",
        "frames": [frame(sign_landmarks("A", 0.0, 0.0, None))],
    });
    let (status, _, resp) = send_json(&app.app, Method::POST, "/api/score", Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_json_error(&resp, "UNKNOWN_SYMBOL");
}

#[tokio::test]
async fn it_rejects_empty_and_invalid_frames() {
    let app = spawn_test_app().await;

    let (status, _, resp) = send_json(
        &app.app,
        Method::POST,
        "/api/score",
        Some(json!({ "word": "A", "frames": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&resp, "NO_FRAMES");

    let mut short = sign_landmarks("A", 0.0, 0.0, None);
    short.pop();
    let body = json!({
        "word": "A",
        "frames": [frame(sign_landmarks("A", 0.0, 0.0, None)), frame(short)],
    });
    let (status, _, resp) = send_json(&app.app, Method::POST, "/api/score", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&resp, "WRONG_LANDMARK_COUNT");
}

#[tokio::test]
async fn it_rejects_too_many_frames() {
    let app = spawn_test_app().await;
    let one = frame(sign_landmarks("A", 0.0, 0.0, None));
    let frames: Vec<_> = std::iter::repeat(one).take(121).collect();
    let (status, _, resp) = send_json(
        &app.app,
        Method::POST,
        "/api/score",
        Some(json!({ "word": "A", "frames": frames })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&resp, "TOO_MANY_FRAMES");
}

#[tokio::test]
async fn it_verdict_uses_mean_of_differing_frames() {
    let app = spawn_test_app().await;
    let body = json!({
        "word": "HELLO",
        "frames": [
            frame(sign_landmarks("HELLO", 0.0, 0.0, None)),
            frame(sign_landmarks("HELLO", 0.05_f64.sqrt(), 0.0, None)),
        ],
    });
    let (status, _, resp) = send_json(&app.app, Method::POST, "/api/score", Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    let expected = (100.0 + 100.0 * (-0.5_f64).exp()) / 2.0;
    assert!((resp["score"].as_f64().unwrap() - expected).abs() < 1e-6);
    assert_eq!(resp["passed"], true);
    let tips = resp["tips"].as_array().unwrap();
    assert_eq!(tips.len(), 1);
    assert!(tips[0].as_str().unwrap().starts_with("Almost"));
}

#[tokio::test]
async fn it_ignores_occluded_outlier() {
    let app = spawn_test_app().await;
    let mut landmarks = sign_landmarks("B", 0.0, 0.0, None);
    landmarks[3] = json!({ "x": 1e200, "y": 0.5, "z": 0.0, "v": 0.0 });
    let body = json!({ "word": "B", "frames": [frame(landmarks)] });
    let (status, _, resp) = send_json(&app.app, Method::POST, "/api/score", Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["score"], 100.0);
    assert_eq!(resp["passed"], true);
}
