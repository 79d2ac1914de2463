//! Integration Tests - Facade Attached to an axum Router
//!
//! Drives the instrumented router in-process with `tower::ServiceExt`
//! and checks the `/metrics` output.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use http_metrics_facade::adapters::http::demo_routes;
use http_metrics_facade::{MetricsRegistry, PrometheusMetrics};

// ---- Helpers ----

fn instrumented() -> (Arc<PrometheusMetrics>, Router) {
    let metrics = Arc::new(PrometheusMetrics::new(Arc::new(MetricsRegistry::new())).unwrap());
    let app = metrics.attach(demo_routes());
    (metrics, app)
}

async fn call(app: &Router, method: &str, uri: &str) -> StatusCode {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(req).await.unwrap().status()
}

async fn scrape(app: &Router) -> (Option<String>, String) {
    let req = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

// ---- Integration Tests ----

#[tokio::test]
async fn test_scrape_reports_server_up_after_construction() {
    let (_metrics, app) = instrumented();
    let (content_type, body) = scrape(&app).await;

    assert_eq!(content_type.as_deref(), Some(prometheus::TEXT_FORMAT));
    assert!(body.contains("# TYPE server_status gauge"));
    assert!(body.contains("\nserver_status 1\n"));
}

#[tokio::test]
async fn test_set_server_status_is_visible_in_scrape() {
    let (metrics, app) = instrumented();

    metrics.set_server_status(false);
    assert!(scrape(&app).await.1.contains("\nserver_status 0\n"));

    metrics.set_server_status(true);
    assert!(scrape(&app).await.1.contains("\nserver_status 1\n"));
}

#[tokio::test]
async fn test_templated_route_404_is_counted_once() {
    let (_metrics, app) = instrumented();

    assert_eq!(call(&app, "GET", "/users/42").await, StatusCode::NOT_FOUND);
    assert_eq!(call(&app, "GET", "/users/1").await, StatusCode::OK);

    let (_, body) = scrape(&app).await;
    let series: Vec<&str> = body
        .lines()
        .filter(|l| l.starts_with("http_requests_total{"))
        .collect();
    assert_eq!(
        series,
        vec!["http_requests_total{method=\"GET\",route=\"/users/:id\",status=\"404\"} 1"]
    );
}

#[tokio::test]
async fn test_unmatched_path_uses_raw_path() {
    let (_metrics, app) = instrumented();

    assert_eq!(call(&app, "GET", "/unknown").await, StatusCode::NOT_FOUND);

    let (_, body) = scrape(&app).await;
    assert!(body.contains("http_requests_total{method=\"GET\",route=\"/unknown\",status=\"404\"} 1"));
}

#[tokio::test]
async fn test_server_errors_are_counted_per_method() {
    let (_metrics, app) = instrumented();

    call(&app, "GET", "/fail").await;
    call(&app, "GET", "/fail").await;
    // POST is not routed on /fail: axum answers 405 for the matched path.
    call(&app, "POST", "/fail").await;

    let (_, body) = scrape(&app).await;
    assert!(body.contains("http_requests_total{method=\"GET\",route=\"/fail\",status=\"500\"} 2"));
    assert!(body.contains("http_requests_total{method=\"POST\",route=\"/fail\",status=\"405\"} 1"));
}

#[tokio::test]
async fn test_successful_requests_leave_no_series() {
    let (_metrics, app) = instrumented();

    call(&app, "GET", "/").await;
    call(&app, "GET", "/users/2").await;

    let (_, body) = scrape(&app).await;
    assert!(!body.contains("http_requests_total"));
}

#[tokio::test]
async fn test_custom_gauge_registered_twice_is_one_metric() {
    let (metrics, app) = instrumented();

    let first = metrics.add_custom_gauge("queue_depth", "depth", &[]).unwrap();
    first.with_label_values(&[]).set(12.0);
    let second = metrics.add_custom_gauge("queue_depth", "depth", &[]).unwrap();
    assert_eq!(second.with_label_values(&[]).get(), 12.0);

    let (_, body) = scrape(&app).await;
    assert_eq!(body.matches("# TYPE queue_depth gauge").count(), 1);
    assert!(body.contains("\nqueue_depth 12\n"));
    assert_eq!(metrics.registry().custom_len(), 1);
}

#[tokio::test]
async fn test_conflicting_custom_counter_is_rejected() {
    let (metrics, _app) = instrumented();

    metrics
        .add_custom_counter("jobs_total", "Jobs", &["queue"])
        .unwrap();
    assert!(metrics.add_custom_counter("jobs_total", "Jobs", &["shard"]).is_err());
    assert!(metrics.add_custom_counter("jobs_total", "Other help", &["queue"]).is_err());
    assert!(metrics.add_custom_counter("jobs_total", "Jobs", &["queue"]).is_ok());
}

#[tokio::test]
async fn test_every_sample_has_a_matching_type_line() {
    let (metrics, app) = instrumented();

    metrics
        .add_custom_counter("jobs_total", "Jobs", &["queue"])
        .unwrap()
        .with_label_values(&["mail"])
        .inc();
    call(&app, "GET", "/fail").await;
    call(&app, "GET", "/nope").await;

    let (_, body) = scrape(&app).await;
    let mut declared: Vec<(String, String)> = Vec::new();
    for line in body.lines() {
        if let Some(rest) = line.strip_prefix("# TYPE ") {
            let mut parts = rest.split_whitespace();
            let name = parts.next().unwrap().to_string();
            let kind = parts.next().unwrap().to_string();
            declared.push((name, kind));
        } else if !line.starts_with('#') && !line.is_empty() {
            let name = line.split(['{', ' ']).next().unwrap();
            let (last_name, _) = declared.last().expect("sample before any # TYPE");
            assert_eq!(last_name, name, "sample {line} not under its # TYPE");
        }
    }

    assert!(declared.contains(&("http_requests_total".into(), "counter".into())));
    assert!(declared.contains(&("server_status".into(), "gauge".into())));
    assert!(declared.contains(&("jobs_total".into(), "counter".into())));
}

#[tokio::test]
async fn test_scrape_does_not_count_itself() {
    let (_metrics, app) = instrumented();

    scrape(&app).await;
    scrape(&app).await;

    let (_, body) = scrape(&app).await;
    assert!(!body.contains("route=\"/metrics\""));
}
