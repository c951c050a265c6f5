use crate::core::{REQUESTED_UNBOUNDED, StreamDslError, validate_positive_argument};

/// Flat-map operator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatMapSettings {
  max_concurrency: usize,
  prefetch:        usize,
  delay_error:     bool,
}

impl FlatMapSettings {
  /// Sentinel lifting the bound on simultaneously subscribed inners.
  pub const UNBOUNDED_CONCURRENCY: usize = usize::MAX;
  /// Default bound on simultaneously subscribed inners.
  pub const DEFAULT_MAX_CONCURRENCY: usize = 256;
  /// Default per-inner request batch.
  pub const DEFAULT_PREFETCH: usize = 32;

  /// Creates a configuration with immediate error delivery.
  ///
  /// # Errors
  ///
  /// Returns [`StreamDslError`] when `max_concurrency` or `prefetch` is zero.
  pub const fn new(max_concurrency: usize, prefetch: usize) -> Result<Self, StreamDslError> {
    let max_concurrency = match validate_positive_argument("max_concurrency", max_concurrency) {
      | Ok(value) => value,
      | Err(error) => return Err(error),
    };
    let prefetch = match validate_positive_argument("prefetch", prefetch) {
      | Ok(value) => value,
      | Err(error) => return Err(error),
    };
    Ok(Self { max_concurrency, prefetch, delay_error: false })
  }

  /// Selects whether terminal errors are deferred until all sources drain.
  #[must_use]
  pub const fn delay_error(mut self, delay: bool) -> Self {
    self.delay_error = delay;
    self
  }

  /// Returns the bound on simultaneously subscribed inners.
  #[must_use]
  pub const fn max_concurrency(&self) -> usize {
    self.max_concurrency
  }

  /// Returns the per-inner request batch.
  #[must_use]
  pub const fn prefetch(&self) -> usize {
    self.prefetch
  }

  /// Returns `true` when terminal errors are deferred.
  #[must_use]
  pub const fn is_delay_error(&self) -> bool {
    self.delay_error
  }

  /// Returns `true` when the concurrency bound is lifted.
  #[must_use]
  pub const fn is_unbounded_concurrency(&self) -> bool {
    self.max_concurrency == Self::UNBOUNDED_CONCURRENCY
  }

  /// Returns the per-inner replenish threshold.
  #[must_use]
  pub const fn limit(&self) -> usize {
    self.prefetch - (self.prefetch >> 2)
  }

  /// Returns the demand requested from upstream at subscription time.
  #[must_use]
  pub const fn initial_request(&self) -> u64 {
    if self.is_unbounded_concurrency() {
      REQUESTED_UNBOUNDED
    } else {
      self.max_concurrency as u64
    }
  }
}

impl Default for FlatMapSettings {
  fn default() -> Self {
    Self { max_concurrency: Self::DEFAULT_MAX_CONCURRENCY, prefetch: Self::DEFAULT_PREFETCH, delay_error: false }
  }
}
