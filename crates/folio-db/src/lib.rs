//! Folio Database Layer
//!
//! Postgres repositories for works, the profile singleton, and tags, plus the
//! store traits the services depend on so they can run against in-memory doubles.

pub mod db;
pub mod store_traits;

pub use db::{ProfileRepository, TagRepository, WorkRepository};
pub use store_traits::{ProfileStore, TagStore, WorkStore};
