use core::marker::PhantomData;

use rivulet_utils_rs::ArcShared;

use crate::core::{Publisher, StreamSubscription, Subscriber, Subscription};

use super::noop_subscription::NoopSubscription;

/// Completes immediately without emitting.
pub struct EmptySource<T> {
  _pd: PhantomData<fn() -> T>,
}

impl<T> EmptySource<T> {
  /// Creates an empty source.
  #[must_use]
  pub const fn new() -> Self {
    Self { _pd: PhantomData }
  }
}

impl<T> Default for EmptySource<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Send + 'static> Publisher<T> for EmptySource<T> {
  fn subscribe(&self, subscriber: ArcShared<dyn Subscriber<T>>) {
    subscriber.on_subscribe(StreamSubscription::Plain(
      ArcShared::new(NoopSubscription).into_dyn(|subscription| subscription as &dyn Subscription),
    ));
    subscriber.on_complete();
  }
}
