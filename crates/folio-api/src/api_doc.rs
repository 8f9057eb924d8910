//! OpenAPI documentation, served at `/api/openapi.json` and rendered at `/docs`.

use folio_core::models;
use utoipa::OpenApi;

use crate::error;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Folio API",
        version = "0.1.0",
        description = "Portfolio content API: works, tags, and the profile, with staged image uploads and orphan-file cleanup against the object store. All endpoints live under /api/."
    ),
    paths(
        // Uploads
        handlers::upload::upload_files,
        // Works
        handlers::works::list_works,
        handlers::works::get_work,
        handlers::works::list_works_by_tag,
        handlers::works::create_work,
        handlers::works::update_work,
        handlers::works::delete_work,
        // Tags
        handlers::tags::list_tag_names,
        handlers::tags::list_tags,
        handlers::tags::create_tag,
        handlers::tags::update_tag,
        handlers::tags::delete_tag,
        handlers::tags::tag_usage,
        // Profile
        handlers::profile::get_profile,
        handlers::profile::upsert_profile,
        // Maintenance
        handlers::cleanup::run_cleanup,
        handlers::health::health_check,
    ),
    components(schemas(
        error::ErrorResponse,
        models::Work,
        models::WorkInput,
        models::WorkKind,
        models::Profile,
        models::ProfileInput,
        models::Tag,
        models::CreateTagRequest,
        models::UpdateTagRequest,
        models::TagUsage,
        handlers::upload::UploadedFile,
        handlers::cleanup::CleanupRequest,
        handlers::cleanup::CleanupResponse,
        handlers::health::HealthCheckResponse,
    )),
    tags(
        (name = "uploads", description = "Image uploads to the object store"),
        (name = "works", description = "Portfolio works"),
        (name = "tags", description = "Gallery tags"),
        (name = "profile", description = "Profile and site settings"),
        (name = "cleanup", description = "Orphaned file cleanup"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;
