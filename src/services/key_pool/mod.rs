//! Key Pool Module
//!
//! This module provides the API-key rotation and quota-bookkeeping layer that
//! mediates every call to the external video-data API. A `KeyPool` hides a
//! fixed, ordered set of key slots behind one logical selection pointer,
//! absorbs per-key quota exhaustion and upstream rejection, and reports the
//! one condition no rotation can recover from (`AllKeysExhausted`).
//!
//! # Example
//! ```ignore
//! use vidgate::services::key_pool::{KeyPool, PoolConfig};
//!
//! let pool = KeyPool::new(vec!["key-a".into(), "key-b".into()], PoolConfig::default());
//!
//! let secret = pool.current()?;
//! // ... issue a request with `secret` ...
//! pool.record_success();
//! ```

mod pool;
mod slot;

pub use pool::{KeyPool, KeyPoolError, PoolConfig, PoolSnapshot};
pub use slot::{FailureInfo, KeySlot};
