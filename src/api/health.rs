use actix_web::{get, web, HttpResponse, Responder};
use serde::Serialize;
use tracing::error;

use crate::upstream::UpstreamClient;

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    upstream: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Readiness check endpoint
///
/// Checks the upstream API accepts our client credentials.
/// Use for Kubernetes readiness probes - removes from load balancer if this fails.
///
/// Returns 503 while the upstream is unavailable; a valid cached token is reused.
#[get("/ready")]
async fn readiness_check(client: web::Data<UpstreamClient>) -> impl Responder {
    match client.authenticate().await {
        Ok(()) => HttpResponse::Ok().json(HealthResponse {
            status: "ready".to_string(),
            upstream: "authenticated".to_string(),
            error: None,
        }),
        Err(e) => {
            error!("Readiness check failed: upstream unavailable: {}", e);
            HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: "not_ready".to_string(),
                upstream: "unavailable".to_string(),
                error: Some(e.to_string()),
            })
        }
    }
}

/// Liveness check endpoint
///
/// Simple check that the process is alive. Does not check dependencies.
#[get("/live")]
async fn liveness_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "alive".to_string(),
        upstream: "not_checked".to_string(),
        error: None,
    })
}

pub fn health_config(config: &mut web::ServiceConfig) {
    config.service(readiness_check).service(liveness_check);
}
