use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::config::MissingSenderPolicy;
use crate::metrics;

#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub env: String,
    pub missing_sender_policy: MissingSenderPolicy,
}

impl ServiceInfo {
    pub fn new(env: String, missing_sender_policy: MissingSenderPolicy) -> Self {
        Self {
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            env,
            missing_sender_policy,
        }
    }
}

/// GET /
pub async fn service_info(info: web::Data<ServiceInfo>) -> HttpResponse {
    HttpResponse::Ok().json(info.get_ref())
}

/// GET /health
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(service_info))
        .route("/health", web::get().to(health))
        .route("/metrics", web::get().to(metrics::serve_metrics));
}
