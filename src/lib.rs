#![allow(clippy::new_without_default)] // Default not always appropriate for stateful types
#![allow(clippy::derivable_impls)] // Explicit Default impls can be clearer

pub mod config;
pub mod events;
pub mod ideas;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod shutdown;
pub mod storage;
mod utils;
pub mod validation;

// Server module (HTTP/WebSocket API)
pub mod server;

pub use models::*;
