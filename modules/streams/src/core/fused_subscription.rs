use rivulet_utils_rs::ArcShared;

use crate::core::{FusionMode, Subscription};

/// Subscription whose producer can expose its queue directly to the consumer.
///
/// Fusion is negotiated once, right after `on_subscribe`: the consumer asks
/// for [`FusionMode::Sync`] first, then [`FusionMode::Async`], and falls back
/// to plain signaling when both are refused. In `Sync` mode the queue holds
/// the whole sequence and `request` must never be called; in `Async` mode the
/// producer enqueues and then invokes the wake-up registered through
/// [`FusedSubscription::set_wakeup`] instead of delivering through `on_next`.
pub trait FusedSubscription<T>: Subscription {
  /// Negotiates a fusion mode; the answer is the mode actually granted.
  fn request_fusion(&self, requested: FusionMode) -> FusionMode;

  /// Dequeues the next element of the fused queue, if any.
  fn poll(&self) -> Option<T>;

  /// Returns `true` when the fused queue holds no elements.
  fn is_empty(&self) -> bool;

  /// Returns the number of buffered elements.
  fn len(&self) -> usize;

  /// Drops every buffered element.
  fn clear(&self);

  /// Registers the consumer wake-up used in [`FusionMode::Async`] mode.
  fn set_wakeup(&self, wakeup: ArcShared<dyn Fn() + Send + Sync>) {
    let _ = wakeup;
  }
}
