//! Command Handlers 实现

mod tryon_handlers;

pub use tryon_handlers::*;
