//! Key slot state and failure classification
//!
//! A `KeySlot` is one configured API key together with the bookkeeping the
//! pool keeps for it: how often it has been used in the current reset epoch
//! and whether the upstream has rejected it for quota reasons.

/// One configured API key and its bookkeeping state.
///
/// Slots are created once at pool construction and never added or removed;
/// `usage_count` and `failed` are mutated only by the pool, under its lock.
#[derive(Debug, Clone)]
pub struct KeySlot {
    /// Ordinal position in the configured key list, stable for the process lifetime
    index: usize,
    /// The API key itself
    secret: String,
    /// Requests served by this key in the current reset epoch
    usage_count: u32,
    /// Set when the upstream rejects this key for quota reasons; cleared only by reset
    failed: bool,
}

impl KeySlot {
    pub fn new(index: usize, secret: impl Into<String>) -> Self {
        Self {
            index,
            secret: secret.into(),
            usage_count: 0,
            failed: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn usage_count(&self) -> u32 {
        self.usage_count
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Whether this slot may back another request under the given ceiling
    pub fn is_available(&self, max_usage: u32) -> bool {
        !self.failed && self.usage_count < max_usage
    }

    pub(super) fn record_use(&mut self) {
        self.usage_count += 1;
    }

    /// Idempotent: re-marking an already-failed slot has no further effect
    pub(super) fn mark_failed(&mut self) {
        self.failed = true;
    }

    pub(super) fn reset(&mut self) {
        self.usage_count = 0;
        self.failed = false;
    }
}

/// Outcome of a failed upstream request, as the pool needs to see it.
///
/// The fetcher builds one of these from either a non-success HTTP response
/// (status + body) or a transport-level error (no status at all).
#[derive(Debug, Clone)]
pub struct FailureInfo {
    /// HTTP status of the response, if one was received
    pub status: Option<u16>,
    /// Error payload or transport error description
    pub message: String,
}

impl FailureInfo {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Classify this failure as quota-related.
    ///
    /// HTTP 403 is the upstream's quota signal; some deployments return other
    /// statuses with a quota-ish message instead, so the message is also
    /// matched case-insensitively for "quota" or "exceeded".
    pub fn is_quota_related(&self) -> bool {
        if self.status == Some(403) {
            return true;
        }
        let message = self.message.to_lowercase();
        message.contains("quota") || message.contains("exceeded")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_availability() {
        let mut slot = KeySlot::new(0, "key-a");
        assert!(slot.is_available(2));

        slot.record_use();
        assert!(slot.is_available(2));
        assert_eq!(slot.usage_count(), 1);

        slot.record_use();
        assert!(!slot.is_available(2), "slot at ceiling is not available");
    }

    #[test]
    fn test_slot_failed_and_reset() {
        let mut slot = KeySlot::new(1, "key-b");
        slot.record_use();
        slot.mark_failed();
        assert!(slot.is_failed());
        assert!(!slot.is_available(100));

        slot.reset();
        assert!(!slot.is_failed());
        assert_eq!(slot.usage_count(), 0);
        assert!(slot.is_available(100));
    }

    #[test]
    fn test_quota_classification_by_status() {
        assert!(FailureInfo::new(Some(403), "forbidden").is_quota_related());
        assert!(!FailureInfo::new(Some(500), "internal error").is_quota_related());
        assert!(!FailureInfo::new(None, "connection refused").is_quota_related());
    }

    #[test]
    fn test_quota_classification_by_message() {
        assert!(FailureInfo::new(Some(429), "Daily QUOTA exhausted").is_quota_related());
        assert!(FailureInfo::new(None, "rate limit exceeded").is_quota_related());
        assert!(!FailureInfo::new(Some(404), "not found").is_quota_related());
    }
}
