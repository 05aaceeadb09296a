//! Liveness and readiness endpoints.
//!
//! `/health` never touches the database so orchestrators can tell a hung
//! process from a lost database. `/ready` reports what the database check saw.

use std::time::Instant;

use actix_web::{HttpResponse, get, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::db::DbPool;

#[derive(Debug, Serialize, ToSchema)]
pub struct LivenessResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub checked_at: DateTime<Utc>,
}

/// What the readiness check found in the database.
#[derive(Debug, Serialize, ToSchema)]
pub struct DatabaseCheck {
    pub reachable: bool,
    /// Round trip of the ping in milliseconds
    pub latency_ms: u64,
    /// Migrations the running binary expects but the schema lacks
    pub pending_migrations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DatabaseCheck {
    fn is_ready(&self) -> bool {
        self.reachable && self.pending_migrations.is_empty()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessResponse {
    /// `ready` or `unavailable`
    pub status: &'static str,
    pub database: DatabaseCheck,
}

async fn check_database(pool: &DbPool) -> DatabaseCheck {
    let started = Instant::now();
    let ping = pool.ping().await;
    let latency_ms = started.elapsed().as_millis() as u64;

    if let Err(e) = ping {
        return DatabaseCheck {
            reachable: false,
            latency_ms,
            pending_migrations: Vec::new(),
            error: Some(e.to_string()),
        };
    }

    match pool.pending_migrations().await {
        Ok(pending_migrations) => DatabaseCheck {
            reachable: true,
            latency_ms,
            pending_migrations,
            error: None,
        },
        Err(e) => DatabaseCheck {
            reachable: true,
            latency_ms,
            pending_migrations: Vec::new(),
            error: Some(e.to_string()),
        },
    }
}

/// Process liveness.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Process is up", body = LivenessResponse)
    )
)]
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(LivenessResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        checked_at: Utc::now(),
    })
}

/// Ready once the database answers and the schema is fully migrated.
#[utoipa::path(
    get,
    path = "/api/v1/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Ready to serve traffic", body = ReadinessResponse),
        (status = 503, description = "Database unreachable, failing or behind on migrations", body = ReadinessResponse)
    )
)]
#[get("/ready")]
pub async fn ready(pool: web::Data<DbPool>) -> HttpResponse {
    let database = check_database(&pool).await;

    if database.is_ready() {
        return HttpResponse::Ok().json(ReadinessResponse {
            status: "ready",
            database,
        });
    }

    warn!(
        "Readiness check failed (reachable={}, pending={}, error={:?})",
        database.reachable,
        database.pending_migrations.len(),
        database.error
    );
    HttpResponse::ServiceUnavailable().json(ReadinessResponse {
        status: "unavailable",
        database,
    })
}

pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(ready);
}
