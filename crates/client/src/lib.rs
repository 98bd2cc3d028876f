//! Typed client for the annotation platform's public HTTP API.
//!
//! Exposes the [`AnnotationPlatform`](platform::AnnotationPlatform) trait
//! used by the upload pipeline and its reqwest-backed implementation.

pub mod api;
pub mod error;
pub mod models;
pub mod platform;

pub use api::SuperviselyApi;
pub use error::ApiError;
pub use platform::AnnotationPlatform;
