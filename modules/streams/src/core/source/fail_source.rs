use core::marker::PhantomData;

use rivulet_utils_rs::ArcShared;

use crate::core::{Publisher, StreamError, StreamSubscription, Subscriber, Subscription};

use super::noop_subscription::NoopSubscription;

/// Fails immediately with a fixed error.
pub struct FailSource<T> {
  error: StreamError,
  _pd:   PhantomData<fn() -> T>,
}

impl<T> FailSource<T> {
  /// Creates a failing source.
  #[must_use]
  pub const fn new(error: StreamError) -> Self {
    Self { error, _pd: PhantomData }
  }
}

impl<T: Send + 'static> Publisher<T> for FailSource<T> {
  fn subscribe(&self, subscriber: ArcShared<dyn Subscriber<T>>) {
    subscriber.on_subscribe(StreamSubscription::Plain(
      ArcShared::new(NoopSubscription).into_dyn(|subscription| subscription as &dyn Subscription),
    ));
    subscriber.on_error(self.error.clone());
  }
}
