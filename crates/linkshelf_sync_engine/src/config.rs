//! Configuration for the sync engine.

use linkshelf_protocol::MatchRule;
use std::time::Duration;

/// Configuration for a sync engine instance.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long a notice stays visible before it self-clears.
    pub notice_ttl: Duration,
    /// Comparison rule for delete-by-text lookups.
    pub delete_match: MatchRule,
    /// Maximum number of feed events merged per call to `process_events`.
    pub event_batch_limit: usize,
}

impl EngineConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self {
            notice_ttl: Duration::from_secs(3),
            delete_match: MatchRule::Normalized,
            event_batch_limit: 256,
        }
    }

    /// Sets the notice lifetime.
    pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.notice_ttl = ttl;
        self
    }

    /// Sets the delete lookup rule.
    pub fn with_delete_match(mut self, rule: MatchRule) -> Self {
        self.delete_match = rule;
        self
    }

    /// Sets the per-call event batch limit. Zero is treated as one.
    pub fn with_event_batch_limit(mut self, limit: usize) -> Self {
        self.event_batch_limit = limit.max(1);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
