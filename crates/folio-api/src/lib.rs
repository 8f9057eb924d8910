//! Folio API Library
//!
//! HTTP handlers, error rendering, and application setup for the portfolio API.

mod api_doc;
mod handlers;
mod response;
pub mod setup;
mod telemetry;

pub mod error;
pub mod state;

pub use api_doc::ApiDoc;
pub use error::ErrorResponse;
pub use state::AppState;
