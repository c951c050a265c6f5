use core::marker::PhantomData;

use rivulet_utils_rs::ArcShared;

use crate::core::{Publisher, StreamSubscription, Subscriber, Subscription};

use super::noop_subscription::NoopSubscription;

/// Signals the subscription handshake and then stays silent forever.
pub struct NeverSource<T> {
  _pd: PhantomData<fn() -> T>,
}

impl<T> NeverSource<T> {
  /// Creates a silent source.
  #[must_use]
  pub const fn new() -> Self {
    Self { _pd: PhantomData }
  }
}

impl<T> Default for NeverSource<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Send + 'static> Publisher<T> for NeverSource<T> {
  fn subscribe(&self, subscriber: ArcShared<dyn Subscriber<T>>) {
    subscriber.on_subscribe(StreamSubscription::Plain(
      ArcShared::new(NoopSubscription).into_dyn(|subscription| subscription as &dyn Subscription),
    ));
  }
}
