//! Scrape endpoint.
//!
//! A single `GET` route at the configured path returns every registered
//! family in the Prometheus text format. There is no authentication and no
//! other route.
//!
//! # Example
//!
//! ```ignore
//! use neato_exporter::api;
//!
//! let app = api::router("/metrics").with_state(state);
//! ```

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};

use crate::metrics::MetricsError;
use crate::state::AppState;

/// Create the scrape router serving metrics at `path`.
///
/// `path` must start with `/`; [`crate::Config::validate`] checks this.
pub fn router(path: &str) -> Router<Arc<AppState>> {
    Router::new().route(path, get(metrics))
}

/// Metrics endpoint.
async fn metrics(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let body = state.metrics.encode()?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
        body,
    ))
}

/// Handler errors.
#[derive(Debug)]
pub enum AppError {
    Metrics(MetricsError),
}

impl From<MetricsError> for AppError {
    fn from(e: MetricsError) -> Self {
        AppError::Metrics(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Metrics(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use neato_types::{Robot, RobotState, State as OperatingState};
    use tower::ServiceExt;

    use crate::metrics::RobotMetrics;

    fn create_test_state() -> Arc<AppState> {
        AppState::new(RobotMetrics::new().unwrap())
    }

    async fn response_body(response: axum::response::Response) -> String {
        let body = response.into_body();
        let bytes = body.collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_metrics_endpoint_serves_gauges() {
        let state = create_test_state();
        let robot = Robot::new("Kitchen", "SN1");
        state.metrics.set_battery(&robot, 66);
        state.metrics.set_area(&robot, 12.25);
        state.metrics.set_state(
            &robot,
            &RobotState {
                state: OperatingState::Idle,
                ..Default::default()
            },
        );

        let app = router("/metrics").with_state(state);
        let response = app.oneshot(get_request("/metrics")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            prometheus::TEXT_FORMAT
        );

        let body = response_body(response).await;
        assert!(body.contains("# TYPE neato_battery gauge"));
        assert!(body.contains("# TYPE neato_area gauge"));
        assert!(body.contains("# TYPE neato_state gauge"));
        assert!(body.contains(r#"state="idle""#));
        assert!(body.lines().any(|l| l.starts_with("neato_area{") && l.ends_with(" 12.25")));
    }

    #[tokio::test]
    async fn test_metrics_endpoint_before_first_poll() {
        let app = router("/metrics").with_state(create_test_state());
        let response = app.oneshot(get_request("/metrics")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_body(response).await;
        assert!(!body.contains("neato_battery{"));
    }

    #[tokio::test]
    async fn test_custom_path() {
        let state = create_test_state();

        let app = router("/neato/metrics").with_state(Arc::clone(&state));
        let response = app.oneshot(get_request("/neato/metrics")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let app = router("/neato/metrics").with_state(state);
        let response = app.oneshot(get_request("/metrics")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_other_routes_not_found() {
        let app = router("/metrics").with_state(create_test_state());
        let response = app.oneshot(get_request("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_post_not_allowed() {
        let app = router("/metrics").with_state(create_test_state());
        let request = Request::builder()
            .method("POST")
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_app_error_response() {
        let response =
            AppError::Metrics(MetricsError::Encode("bad utf-8".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response_body(response).await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "Failed to encode metrics: bad utf-8");
    }
}
