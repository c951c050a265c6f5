use rivulet_utils_rs::ArcShared;

use crate::core::{FusedSubscription, Subscription};

/// Subscription handle handed to a subscriber, tagged by capability.
///
/// The tag replaces a runtime capability probe: a producer that supports
/// queue fusion hands out the fused variant and the consumer decides during
/// `on_subscribe` whether to negotiate.
pub enum StreamSubscription<T> {
  /// Plain demand-driven subscription.
  Plain(ArcShared<dyn Subscription>),
  /// Subscription whose producer offers queue fusion.
  Fused(ArcShared<dyn FusedSubscription<T>>),
}

impl<T> StreamSubscription<T> {
  /// Adds demand, regardless of the capability tag.
  pub fn request(&self, n: u64) {
    match self {
      | Self::Plain(subscription) => subscription.request(n),
      | Self::Fused(subscription) => subscription.request(n),
    }
  }

  /// Cancels the subscription, regardless of the capability tag.
  pub fn cancel(&self) {
    match self {
      | Self::Plain(subscription) => subscription.cancel(),
      | Self::Fused(subscription) => subscription.cancel(),
    }
  }

  /// Returns the fused handle when the producer offers fusion.
  #[must_use]
  pub fn as_fused(&self) -> Option<&ArcShared<dyn FusedSubscription<T>>> {
    match self {
      | Self::Plain(_) => None,
      | Self::Fused(subscription) => Some(subscription),
    }
  }
}

impl<T> Clone for StreamSubscription<T> {
  fn clone(&self) -> Self {
    match self {
      | Self::Plain(subscription) => Self::Plain(subscription.clone()),
      | Self::Fused(subscription) => Self::Fused(subscription.clone()),
    }
  }
}

impl<T> core::fmt::Debug for StreamSubscription<T> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      | Self::Plain(_) => f.debug_struct("StreamSubscription::Plain").finish(),
      | Self::Fused(_) => f.debug_struct("StreamSubscription::Fused").finish(),
    }
  }
}
