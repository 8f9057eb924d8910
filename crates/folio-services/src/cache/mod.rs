//! In-process caches

pub mod tag_cache;

pub use tag_cache::{InMemoryTagCache, TagCache};
