//! End-to-end checks of `POST /predict` through the public router.
//!
//! Most tests replace the model with a weighted-average forecaster; the
//! last one serves `tests/fixtures/mean_window.onnx`, a ReduceMean over
//! the timestep axis with output shape (1, 1).

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use forecast_serve::{
    create_router, AppState, Config, Forecaster, InferenceError, InputWindow, LstmPredictor,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

/// Linearly weighted average: recent steps count more.
struct WeightedAverage;

impl Forecaster for WeightedAverage {
    fn forecast(&self, window: &InputWindow) -> Result<f32, InferenceError> {
        let tensor = window.to_tensor()?;
        let (weighted, total) = tensor
            .iter()
            .enumerate()
            .fold((0.0f32, 0.0f32), |(acc, total), (i, &v)| {
                let w = (i + 1) as f32;
                (acc + w * v, total + w)
            });
        Ok(weighted / total)
    }
}

fn app() -> Router {
    create_router(AppState::new(WeightedAverage))
}

async fn post(app: Router, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");

    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = serde_json::from_slice(&bytes).expect("response body is JSON");
    (status, json)
}

#[tokio::test]
async fn thirty_integers_return_a_forecast() {
    let body = json!({ "sequence": (1..=30).collect::<Vec<u32>>() }).to_string();

    let (status, json) = post(app(), &body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_object().expect("object").len(), 1);
    let forecast = json["forecast"].as_f64().expect("float forecast");
    // sum(i^2) / sum(i) over 1..=30
    assert!((forecast - 9455.0 / 465.0).abs() < 1e-4);
}

#[tokio::test]
async fn three_values_are_rejected() {
    let (status, json) = post(app(), r#"{"sequence": [1, 2, 3]}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({ "error": "Input must be a list of 30 numeric values." }));
}

#[tokio::test]
async fn missing_sequence_is_rejected() {
    let (status, json) = post(app(), "{}").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({ "error": "Input must be a list of 30 numeric values." }));
}

#[tokio::test]
async fn empty_sequence_is_rejected() {
    let (status, json) = post(app(), r#"{"sequence": []}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({ "error": "Input must be a list of 30 numeric values." }));
}

#[tokio::test]
async fn non_numeric_element_is_a_server_error() {
    let mut sequence: Vec<Value> = (1..=30).map(|v| json!(v)).collect();
    sequence[29] = json!(null);
    let body = json!({ "sequence": sequence }).to_string();

    let (status, json) = post(app(), &body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json.as_object().expect("object").len(), 1);
    assert_eq!(json["error"], "sequence[29] is not a numeric value: null");
}

#[tokio::test]
async fn concurrent_requests_share_one_model() {
    let app = app();
    let body = json!({ "sequence": vec![2.5; 30] }).to_string();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let app = app.clone();
            let body = body.clone();
            tokio::spawn(async move { post(app, &body).await })
        })
        .collect();

    for handle in handles {
        let (status, json) = handle.await.expect("task");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["forecast"].as_f64(), Some(2.5));
    }
}

#[tokio::test]
async fn onnx_model_serves_window_mean() {
    let config = Config {
        model_path: std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures/mean_window.onnx"),
        ..Config::default()
    };
    let app = create_router(AppState::new(LstmPredictor::load(config).expect("fixture loads")));
    let body = json!({ "sequence": (1..=30).collect::<Vec<u32>>() }).to_string();

    let (status, json) = post(app.clone(), &body).await;
    assert_eq!(status, StatusCode::OK);
    assert!((json["forecast"].as_f64().expect("float forecast") - 15.5).abs() < 1e-5);

    let (status, again) = post(app, &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, again);
}
