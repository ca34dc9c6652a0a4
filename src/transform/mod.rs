//! Request and response transformation pipeline
//!
//! Pure functions over the typed payloads in [`crate::types`]; nothing here
//! performs I/O.

pub mod image_config;
pub mod normalizer;
pub mod prompt;
pub mod response;
pub mod tables;

pub use image_config::{AspectRatio, ImageDefaults, ImageSize};
pub use normalizer::normalize_request;
pub use response::transform_image_response;
pub use tables::ModelTables;
