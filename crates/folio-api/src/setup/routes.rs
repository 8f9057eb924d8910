//! Route configuration and setup

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Json, Router,
};
use folio_core::Config;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;

/// Room for multipart boundaries and the `folder` field
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;
const HTTP_CONCURRENCY_LIMIT: usize = 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;
    let body_limit = upload_body_limit(config);

    let api = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/upload", post(handlers::upload::upload_files))
        .route(
            "/works",
            get(handlers::works::list_works).post(handlers::works::create_work),
        )
        .route(
            "/works/{id}",
            get(handlers::works::get_work)
                .put(handlers::works::update_work)
                .delete(handlers::works::delete_work),
        )
        .route("/tags", get(handlers::tags::list_tag_names))
        .route("/tags/{tag}/works", get(handlers::works::list_works_by_tag))
        .route(
            "/admin/tags",
            get(handlers::tags::list_tags).post(handlers::tags::create_tag),
        )
        .route(
            "/admin/tags/{id}",
            put(handlers::tags::update_tag).delete(handlers::tags::delete_tag),
        )
        .route("/admin/tags/usage/{name}", get(handlers::tags::tag_usage))
        .route(
            "/config",
            get(handlers::profile::get_profile).put(handlers::profile::upsert_profile),
        )
        .route("/admin/cleanup", post(handlers::cleanup::run_cleanup))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }));

    let app = Router::new()
        .nest("/api", api)
        .merge(RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Largest request the upload endpoint can legitimately receive
fn upload_body_limit(config: &Config) -> usize {
    let per_file = usize::try_from(config.max_file_size_bytes()).unwrap_or(usize::MAX);
    per_file
        .saturating_mul(config.upload.max_files)
        .saturating_add(MULTIPART_OVERHEAD_BYTES)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let mut all = vec![("DATABASE_URL", "postgres://localhost/folio")];
        all.extend_from_slice(vars);
        Config::from_lookup(|key| {
            all.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    #[test]
    fn test_body_limit_covers_full_batch() {
        let cfg = config(&[("UPLOAD_MAX_SIZE_MB", "2"), ("UPLOAD_MAX_FILES", "3")]);
        assert_eq!(
            upload_body_limit(&cfg),
            3 * 2 * 1024 * 1024 + MULTIPART_OVERHEAD_BYTES
        );
    }

    #[test]
    fn test_invalid_cors_origin_is_rejected() {
        let cfg = config(&[("CORS_ORIGINS", "https://ok.example,bad\norigin")]);
        assert!(setup_cors(&cfg).is_err());
    }
}
