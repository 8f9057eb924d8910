//! Database repositories for the portfolio content tables

pub mod profile;
pub mod tag;
pub mod work;

pub use profile::ProfileRepository;
pub use tag::TagRepository;
pub use work::WorkRepository;
