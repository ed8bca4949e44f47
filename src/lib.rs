pub mod app;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod models;
pub mod validate;

use gateway::{BackendGateway, HttpGateway};
use std::sync::Arc;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Builds the gateway from the environment: `API_BASE_URL`, defaulting to
/// the local development backend.
pub fn build_gateway() -> Arc<dyn BackendGateway> {
    let base_url = std::env::var("API_BASE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    Arc::new(HttpGateway::new(base_url))
}
