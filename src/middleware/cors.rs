use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// Any origin may read the job listing and trigger scrapes.
pub fn permissive_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(Any)
}
