//! Folio Storage Library
//!
//! Object store abstraction for portfolio uploads, with a Supabase Storage backend
//! and a local filesystem backend.
//!
//! # Object paths and public URLs
//!
//! Objects live in a single bucket under `{folder}/{unix_millis}-{random}.{ext}`.
//! Every backend exposes them at
//! `{base_url}/storage/v1/object/public/{bucket}/{path}`, and that URL is what the
//! database stores. Path generation and URL parsing live in the `keys` module so
//! all backends stay consistent.

pub mod factory;
pub mod keys;
pub mod listing;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-supabase")]
pub mod supabase;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use folio_core::StorageBackend;
pub use keys::{generate_object_path, parse_public_url, public_url, ObjectRef};
pub use listing::list_all_objects;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-supabase")]
pub use supabase::SupabaseStorage;
pub use traits::{
    ListEntry, RemoveFailure, RemoveOutcome, Storage, StorageError, StorageObject, StorageResult,
};
