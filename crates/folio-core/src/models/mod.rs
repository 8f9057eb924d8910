//! Data models for the portfolio
//!
//! Works, the profile singleton, and tags, plus the request DTOs that create and
//! update them.

mod profile;
mod tag;
mod work;

pub use profile::*;
pub use tag::*;
pub use work::*;
