use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use fulfillment_dashboard::api::{create_router, DashboardService};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

const ORDERS: &str = "\
order_id,order_date,ship_date,delivery_date,units_sold,unit_price,shipping_cost,fulfillment_cost,delivery_status,region,warehouse_id,product_category
1,2024-01-01,2024-01-02,2024-01-05,2,10,1,1,Late,US,W1,Electronics
2,2024-01-02,2024-01-03,2024-01-04,1,20,2,2,On Time,US,W2,Electronics
3,2024-01-03,2024-01-03,2024-01-06,5,5,1,1,On Time,EU,W1,Books
";

fn app(service: Arc<DashboardService>) -> Router {
    create_router(service, 1024 * 1024)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn upload(csv: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/upload")
        .header("content-type", "text/csv")
        .body(Body::from(csv.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_check() {
    let (status, json) = send(app(Arc::new(DashboardService::new())), get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn dashboard_before_upload_reports_missing_input() {
    let service = Arc::new(DashboardService::new());
    let (status, json) = send(app(service.clone()), get("/api/v1/dashboard")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"]["status"], "missing_input");

    let (status, _) = send(app(service), get("/api/v1/options")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_then_filter() {
    let service = Arc::new(DashboardService::new());

    let (status, json) = send(app(service.clone()), upload(ORDERS)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["rows"], 3);
    assert_eq!(json["options"]["regions"], serde_json::json!(["EU", "US"]));

    let (status, json) = send(app(service.clone()), get("/api/v1/dashboard?regions=US")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"]["status"], "ready");
    assert_eq!(json["outcome"]["kpis"]["total_revenue"], 40.0);
    assert_eq!(json["outcome"]["kpis"]["total_profit"], 34.0);
    assert_eq!(json["outcome"]["kpi_display"]["on_time_rate"], "50.0%");
    assert_eq!(json["charts"].as_array().map(|c| c.len()), Some(6));

    // re-rendering the same upload never re-parses
    let (hits, misses) = service.cache_stats().await;
    assert_eq!(misses, 1);
    assert!(hits >= 1);
}

#[tokio::test]
async fn empty_selection_is_no_data() {
    let service = Arc::new(DashboardService::new());
    send(app(service.clone()), upload(ORDERS)).await;

    let (status, json) = send(app(service), get("/api/v1/dashboard?warehouses=")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"]["status"], "no_data");
    assert_eq!(json["outcome"]["filtered_rows"], 0);
    assert_eq!(json["charts"], serde_json::json!([]));
}

#[tokio::test]
async fn malformed_upload_is_rejected_and_previous_kept() {
    let service = Arc::new(DashboardService::new());
    send(app(service.clone()), upload(ORDERS)).await;

    let (status, json) = send(app(service.clone()), upload("order_id,region\n1,US\n")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().contains("missing required columns"));

    let (_, json) = send(app(service), get("/api/v1/dashboard")).await;
    assert_eq!(json["outcome"]["filtered_rows"], 3);
}
