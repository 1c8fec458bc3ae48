//! Key Pool Implementation
//!
//! This module provides the `KeyPool` that owns the ordered list of API keys,
//! the current-selection pointer, per-key usage counters, and the failed set.
//! All state lives behind one mutex so that a selection transition is atomic
//! with the usage-counter reads that gate it; otherwise two concurrent
//! requests could both observe a slot as under quota and push it over the
//! ceiling before either rotates.

use super::slot::{FailureInfo, KeySlot};
use serde::Serialize;
use std::sync::Mutex;
use thiserror::Error;

// ============================================================================
// Pool Configuration
// ============================================================================

/// Configuration for key pool behavior
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Usage ceiling per key before it is treated as exhausted
    pub max_usage_per_slot: u32,
    /// Fraction of the ceiling at which a successful request proactively rotates
    pub switch_threshold: f64,
    /// Surface a failed proactive switch to the `record_success` caller
    /// instead of swallowing it with a warning
    pub surface_switch_failure: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_usage_per_slot: 9000,
            switch_threshold: 0.9,
            surface_switch_failure: false,
        }
    }
}

impl PoolConfig {
    pub fn with_max_usage(mut self, max: u32) -> Self {
        self.max_usage_per_slot = max;
        self
    }

    pub fn with_switch_threshold(mut self, fraction: f64) -> Self {
        self.switch_threshold = fraction;
        self
    }

    pub fn with_surface_switch_failure(mut self, surface: bool) -> Self {
        self.surface_switch_failure = surface;
        self
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors reported by pool selection operations
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum KeyPoolError {
    /// No keys configured at all; callers degrade instead of failing hard
    #[error("no API keys configured")]
    EmptyPool,

    /// Every key is either quota-failed or at its usage ceiling
    #[error("all API keys are exhausted or failed")]
    AllKeysExhausted,
}

// ============================================================================
// Key Pool
// ============================================================================

/// A fixed, ordered pool of API keys with rotation and quota bookkeeping.
///
/// Constructed once at startup and shared via `Arc`. Slots are never added or
/// removed; an administrative [`KeyPool::reset_all`] clears failed flags and
/// zeroes counters without recreating the pool.
#[derive(Debug)]
pub struct KeyPool {
    config: PoolConfig,
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    slots: Vec<KeySlot>,
    current_index: usize,
}

impl KeyPool {
    /// Create a pool from the configured key strings.
    ///
    /// Blank entries are excluded here; placeholder-sentinel filtering happens
    /// upstream in `Settings` where the sentinel is defined.
    pub fn new(secrets: Vec<String>, config: PoolConfig) -> Self {
        let slots: Vec<KeySlot> = secrets
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .enumerate()
            .map(|(idx, secret)| KeySlot::new(idx, secret))
            .collect();

        if slots.is_empty() {
            tracing::warn!("Key pool created with no usable API keys, serving in degraded mode");
        } else {
            tracing::info!(
                key_count = slots.len(),
                max_usage = config.max_usage_per_slot,
                "Initialized API key pool"
            );
        }

        Self {
            config,
            inner: Mutex::new(Inner {
                slots,
                current_index: 0,
            }),
        }
    }

    /// The key backing the next outbound request.
    ///
    /// An empty pool is an expected runtime state (no keys configured), not a
    /// crash: callers treat it as "operate in degraded, no-data mode".
    pub fn current(&self) -> Result<String, KeyPoolError> {
        let inner = self.inner.lock().unwrap();
        inner
            .slots
            .get(inner.current_index)
            .map(|slot| slot.secret().to_string())
            .ok_or(KeyPoolError::EmptyPool)
    }

    /// Rotate to the next usable key and return its secret.
    ///
    /// Scans forward from `current_index + 1`, wrapping circularly through all
    /// slots exactly once, and selects the first slot that is neither failed
    /// nor at the usage ceiling. The current slot is only re-selected when it
    /// is the last stop of the wrap and nothing else qualifies; consecutive
    /// calls therefore always make forward progress. On exhaustion the
    /// pointer is left unchanged.
    pub fn advance(&self) -> Result<String, KeyPoolError> {
        let mut inner = self.inner.lock().unwrap();
        self.advance_locked(&mut inner)
    }

    /// Record a successful request on the current key.
    ///
    /// When the new count reaches `switch_threshold` of the ceiling, the pool
    /// proactively rotates so the next request starts on a fresh key. A failed
    /// proactive switch is swallowed with a warning (the pool keeps serving
    /// from the soon-to-be-exhausted key) unless `surface_switch_failure` is
    /// configured. No-op on an empty pool.
    pub fn record_success(&self) -> Result<(), KeyPoolError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.slots.is_empty() {
            return Ok(());
        }

        let idx = inner.current_index;
        inner.slots[idx].record_use();
        let usage = inner.slots[idx].usage_count();

        let threshold = self.config.switch_threshold * self.config.max_usage_per_slot as f64;
        if (usage as f64) >= threshold {
            match self.advance_locked(&mut inner) {
                Ok(_) => {
                    tracing::debug!(
                        from = idx,
                        to = inner.current_index,
                        usage,
                        "Proactively rotated API key near usage ceiling"
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        slot = idx,
                        usage,
                        error = %err,
                        "Proactive key switch failed, continuing on current key"
                    );
                    if self.config.surface_switch_failure {
                        return Err(err);
                    }
                }
            }
        }

        Ok(())
    }

    /// Record a failed request on the current key and rotate.
    ///
    /// Quota-related failures (see [`FailureInfo::is_quota_related`]) mark the
    /// current slot failed until an explicit reset; re-marking an
    /// already-failed slot is a no-op. Regardless of classification the pool
    /// rotates, returning the newly selected secret so the caller can retry
    /// with a different key. Exhaustion is propagated here — the request that
    /// triggered this call cannot be retried with any key.
    pub fn record_failure(&self, failure: &FailureInfo) -> Result<String, KeyPoolError> {
        let mut inner = self.inner.lock().unwrap();

        if failure.is_quota_related() {
            let idx = inner.current_index;
            if let Some(slot) = inner.slots.get_mut(idx) {
                if !slot.is_failed() {
                    slot.mark_failed();
                    tracing::warn!(
                        slot = idx,
                        status = ?failure.status,
                        "API key marked failed after quota rejection"
                    );
                }
            }
        }

        self.advance_locked(&mut inner)
    }

    /// Administrative reset: clear every failed flag and zero every usage
    /// counter. Does not change the selection pointer.
    pub fn reset_all(&self) {
        let mut inner = self.inner.lock().unwrap();
        for slot in &mut inner.slots {
            slot.reset();
        }
        tracing::info!(key_count = inner.slots.len(), "Key pool usage and failed flags reset");
    }

    /// Read-only status for observability; never mutates pool state.
    pub fn snapshot(&self) -> PoolSnapshot {
        let inner = self.inner.lock().unwrap();
        let max = self.config.max_usage_per_slot;
        PoolSnapshot {
            current_index: inner.current_index,
            total_slots: inner.slots.len(),
            active_slot_count: inner.slots.iter().filter(|s| s.is_available(max)).count(),
            failed_indices: inner
                .slots
                .iter()
                .filter(|s| s.is_failed())
                .map(|s| s.index())
                .collect(),
            usage_counts: inner.slots.iter().map(|s| s.usage_count()).collect(),
        }
    }

    /// Number of configured slots
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().slots.len()
    }

    /// Whether the pool has no keys at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn advance_locked(&self, inner: &mut Inner) -> Result<String, KeyPoolError> {
        let total = inner.slots.len();
        if total == 0 {
            return Err(KeyPoolError::AllKeysExhausted);
        }

        for step in 1..=total {
            let idx = (inner.current_index + step) % total;
            if inner.slots[idx].is_available(self.config.max_usage_per_slot) {
                inner.current_index = idx;
                return Ok(inner.slots[idx].secret().to_string());
            }
        }

        Err(KeyPoolError::AllKeysExhausted)
    }
}

// ============================================================================
// Pool Snapshot
// ============================================================================

/// Point-in-time view of pool state for the status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct PoolSnapshot {
    /// Slot backing the next request
    pub current_index: usize,
    /// Total configured slots
    pub total_slots: usize,
    /// Slots that are neither failed nor at the ceiling
    pub active_slot_count: usize,
    /// Indices of quota-failed slots
    pub failed_indices: Vec<usize>,
    /// Usage counter per slot, in slot order
    pub usage_counts: Vec<u32>,
}

// ============================================================================
// Tests
// ============================================================================
