//! Vidgate library
//!
//! Video data API gateway with API-key rotation and quota-aware fetching.

// Public modules
pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod schemas;
pub mod server;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use error::ApiError;
pub use server::App;
pub use services::{KeyPool, QuotaAwareFetcher, VideoService};
