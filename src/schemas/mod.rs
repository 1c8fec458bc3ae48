//! Schema module
//!
//! Wire models for the external video-data API and the normalized records
//! served to the frontend.

pub mod videos;

pub use videos::{ItemListResponse, SearchResult, VideoRecord, VideoResource};
