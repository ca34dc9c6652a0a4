//! Proxy module
//!
//! Handles request forwarding to fal and catalog lookups on OpenRouter.

pub mod fal;
pub mod headers;
pub mod openrouter;

pub use fal::FalClient;
pub use openrouter::OpenRouterClient;
