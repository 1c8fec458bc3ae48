//! API endpoint handlers module
//!
//! Contains all HTTP endpoint handler implementations.

pub mod admin;
pub mod health;
pub mod videos;
