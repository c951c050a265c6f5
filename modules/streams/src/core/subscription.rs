/// Demand and cancellation handle linking a subscriber to its producer.
///
/// Implementations are shared handles: every method takes `&self` and must be
/// safe to call from any thread. `request(0)` is a contract violation the
/// producer reports through its dropped-error hook rather than a terminal.
pub trait Subscription: Send + Sync {
  /// Adds `n` elements of demand; [`crate::core::REQUESTED_UNBOUNDED`] means infinite demand.
  fn request(&self, n: u64);

  /// Cancels the subscription; buffered elements are discarded, never emitted.
  fn cancel(&self);
}
