//! HTTP Handlers

mod service;
mod tryon;

pub use service::*;
pub use tryon::*;
