use rivulet_utils_rs::{ArcShared, SpinSyncMutex};

use crate::core::{Publisher, StreamSubscription, Subscriber, Subscription};

/// Emits one element against the first unit of demand, then completes.
pub struct JustSource<T> {
  value: T,
}

impl<T> JustSource<T> {
  /// Creates a single-element source.
  #[must_use]
  pub const fn new(value: T) -> Self {
    Self { value }
  }
}

impl<T: Clone + Send + Sync + 'static> Publisher<T> for JustSource<T> {
  fn subscribe(&self, subscriber: ArcShared<dyn Subscriber<T>>) {
    let subscription = ArcShared::new(JustSubscription {
      downstream: subscriber.clone(),
      value:      SpinSyncMutex::new(Some(self.value.clone())),
    });
    subscriber
      .on_subscribe(StreamSubscription::Plain(subscription.into_dyn(|subscription| subscription as &dyn Subscription)));
  }
}

struct JustSubscription<T> {
  downstream: ArcShared<dyn Subscriber<T>>,
  value:      SpinSyncMutex<Option<T>>,
}

impl<T: Send + Sync + 'static> Subscription for JustSubscription<T> {
  fn request(&self, n: u64) {
    if n == 0 {
      return;
    }
    let taken = self.value.lock().take();
    if let Some(value) = taken {
      self.downstream.on_next(value);
      self.downstream.on_complete();
    }
  }

  fn cancel(&self) {
    let _ = self.value.lock().take();
  }
}
