use crate::core::Subscription;

/// Subscription for sources that terminate during `subscribe`.
pub(in crate::core) struct NoopSubscription;

impl Subscription for NoopSubscription {
  fn request(&self, _n: u64) {}

  fn cancel(&self) {}
}
