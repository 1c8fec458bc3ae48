//! Services module
//!
//! The key pool and quota-aware fetcher form the credential-rotation core;
//! the video service is the consumer layer the HTTP handlers talk to.

pub mod fetcher;
pub mod key_pool;
pub mod videos;

pub use fetcher::{FetchError, QuotaAwareFetcher, DEFAULT_MAX_RETRIES};
pub use key_pool::{FailureInfo, KeyPool, KeyPoolError, KeySlot, PoolConfig, PoolSnapshot};
pub use videos::VideoService;
