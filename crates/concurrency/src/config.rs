//! Engine configuration
//!
//! `BatchConfig` is the plain, already-validated form of the drive
//! configuration that the engine consumes. The TOML layer lives in the
//! engine crate.

use std::time::Duration;

use kvdrive_core::Limits;

/// Default cap on staged operations per batch
pub const DEFAULT_MAX_OPERATIONS_PER_BATCH: usize = 100_000;

/// What a request does when another connection holds the batch slot
///
/// Applies to `begin` and to plain single-key writes. The slot owner
/// itself is never made to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitPolicy {
    /// Fail immediately with a conflict
    #[default]
    FailFast,
    /// Wait for the slot to be released
    Block {
        /// Give up after this long; `None` waits forever
        timeout: Option<Duration>,
    },
}

/// Configuration for a [`crate::BatchTransactionEngine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Behaviour while another connection owns the batch slot
    pub wait_policy: WaitPolicy,
    /// Maximum operations one ledger may hold
    pub max_operations_per_batch: usize,
    /// Size limits applied on staging and single-key writes
    pub limits: Limits,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            wait_policy: WaitPolicy::default(),
            max_operations_per_batch: DEFAULT_MAX_OPERATIONS_PER_BATCH,
            limits: Limits::default(),
        }
    }
}

impl BatchConfig {
    /// Set the wait policy
    pub fn with_wait_policy(mut self, policy: WaitPolicy) -> Self {
        self.wait_policy = policy;
        self
    }

    /// Set the per-batch operation cap
    pub fn with_max_operations(mut self, max: usize) -> Self {
        self.max_operations_per_batch = max;
        self
    }

    /// Set the size limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BatchConfig::default();
        assert_eq!(config.wait_policy, WaitPolicy::FailFast);
        assert_eq!(config.max_operations_per_batch, DEFAULT_MAX_OPERATIONS_PER_BATCH);
        assert_eq!(config.limits, Limits::default());
    }

    #[test]
    fn test_builder_methods() {
        let policy = WaitPolicy::Block {
            timeout: Some(Duration::from_millis(50)),
        };
        let config = BatchConfig::default()
            .with_wait_policy(policy)
            .with_max_operations(3)
            .with_limits(Limits::with_small_limits());

        assert_eq!(config.wait_policy, policy);
        assert_eq!(config.max_operations_per_batch, 3);
        assert_eq!(config.limits, Limits::with_small_limits());
    }
}
