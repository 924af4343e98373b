use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use chrono::{TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use sensorflow_occupancy::{
    routes, EngineSettings, MemoryReadingStore, OccupancyEngine, Reading, ReadingStore,
    SectionRegistry,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Bucket {
    rate: f64,
    occupied: u32,
    total: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SensorEntry {
    sensor_id: String,
    sensor_display_name: String,
    daily: Bucket,
    weekly: Bucket,
    monthly: Bucket,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GlobalStats {
    daily: Bucket,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SectionReport {
    section_name: String,
    per_sensor_stats: Vec<SensorEntry>,
    global_stats: GlobalStats,
    calculation_method: String,
    business_hours: String,
    working_days: String,
}

/// Serve the router on an ephemeral port and return its base URL.
async fn spawn_app(store: MemoryReadingStore) -> Result<String> {
    // ---
    let store: Arc<dyn ReadingStore> = Arc::new(store);
    let engine = Arc::new(OccupancyEngine::new(
        store,
        SectionRegistry::default(),
        EngineSettings::default(),
    ));
    let app = routes::router(engine);

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

#[tokio::test]
async fn section_endpoint_reports_interview_day() -> Result<()> {
    // ---
    let base = spawn_app(MemoryReadingStore::new(vec![Reading::occupancy(
        "desk-vs41-03-01",
        Utc.with_ymd_and_hms(2025, 3, 24, 10, 0, 0).unwrap(),
        "1",
    )]))
    .await?;
    let url = format!("{base}/occupancy/sections/interview?start_date=2025-03-24&end_date=2025-03-24");

    let response = Client::new().get(&url).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    let report: SectionReport = response.json().await?;

    assert_eq!(report.section_name, "interview");
    assert_eq!(report.per_sensor_stats.len(), 2);
    assert_eq!(report.business_hours, "09:00-12:30, 14:00-18:30");
    assert_eq!(report.working_days, "Monday-Friday");
    assert!(!report.calculation_method.is_empty());

    let first = &report.per_sensor_stats[0];
    assert_eq!(first.sensor_id, "desk-vs41-03-01");
    assert_eq!(first.sensor_display_name, "Interview room 1");
    assert_eq!(first.daily.occupied, 1);
    assert_eq!(first.daily.total, 16);
    assert_eq!(first.daily.rate, 6.25);
    assert_eq!(first.weekly.rate, first.daily.rate);
    assert_eq!(first.monthly.total, first.daily.total);

    assert_eq!(report.global_stats.daily.occupied, 1);
    assert_eq!(report.global_stats.daily.total, 32);
    assert_eq!(report.global_stats.daily.rate, 3.13);

    Ok(())
}

#[tokio::test]
async fn client_and_store_errors_map_to_status() -> Result<()> {
    // ---
    let base = spawn_app(MemoryReadingStore::default()).await?;
    let client = Client::new();

    let unknown = client
        .get(format!("{base}/occupancy/sections/kitchen"))
        .send()
        .await?;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let inverted = client
        .get(format!(
            "{base}/occupancy/sections/interview?start_date=2025-03-28&end_date=2025-03-24"
        ))
        .send()
        .await?;
    assert_eq!(inverted.status(), StatusCode::BAD_REQUEST);

    let unbounded = client
        .get(format!(
            "{base}/occupancy/sections/interview?start_date=0001-01-01&end_date=9999-12-31"
        ))
        .send()
        .await?;
    assert_eq!(unbounded.status(), StatusCode::BAD_REQUEST);

    let mut down = MemoryReadingStore::default();
    down.set_unavailable(true);
    let down_base = spawn_app(down).await?;
    let unavailable = client
        .get(format!("{down_base}/occupancy/sections/interview"))
        .send()
        .await?;
    assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);

    Ok(())
}

#[tokio::test]
async fn sensor_and_listing_endpoints() -> Result<()> {
    // ---
    let base = spawn_app(MemoryReadingStore::default()).await?;
    let client = Client::new();

    let names: Vec<String> = client
        .get(format!("{base}/occupancy/sections"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(names, vec!["desk", "meeting", "phone", "interview"]);

    let sensor: SensorEntry = client
        .get(format!(
            "{base}/occupancy/sensors/desk-vs41-02-01?start_date=2025-03-22&end_date=2025-03-23"
        ))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(sensor.sensor_display_name, "Phone booth 1");
    assert_eq!(sensor.daily.total, 0);
    assert_eq!(sensor.daily.rate, 0.0);

    let health: serde_json::Value = client
        .get(format!("{base}/health"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["sections"], 4);

    Ok(())
}
