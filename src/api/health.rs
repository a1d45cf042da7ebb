use axum::{extract::State, Json};
use deadpool_postgres::Pool;
use serde::Serialize;
use std::time::Instant;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    postgres_connected: bool,
    uptime_seconds: u64,
}

pub async fn health_check(
    State((pool, start_time)): State<(Pool, Instant)>,
) -> Json<HealthResponse> {
    // Test PostgreSQL connection
    let postgres_connected = pool.get().await.is_ok();

    Json(HealthResponse {
        status: if postgres_connected {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        postgres_connected,
        uptime_seconds: start_time.elapsed().as_secs(),
    })
}
