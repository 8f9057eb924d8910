//! Content services for works, the profile, and tags
//!
//! Writes that can drop a file reference safe-delete the dropped object right
//! away and then schedule a background orphan sweep.

pub mod profile;
pub mod tags;
pub mod works;

pub use profile::ProfileService;
pub use tags::TagService;
pub use works::{split_gallery, WorkService};
