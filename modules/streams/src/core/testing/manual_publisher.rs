use core::sync::atomic::{AtomicBool, Ordering};

use portable_atomic::AtomicU64;
use rivulet_utils_rs::{ArcShared, SpinSyncMutex};

use crate::core::{Publisher, StreamError, StreamSubscription, Subscriber, Subscription, add_cap};

/// Hand-driven single-subscriber publisher.
///
/// The probe records requested demand but does not enforce it: tests drive
/// `emit` directly, including past demand, to provoke overflow handling.
pub struct ManualPublisher<T> {
  core: ArcShared<ManualCore<T>>,
}

struct ManualCore<T> {
  subscriber: SpinSyncMutex<Option<ArcShared<dyn Subscriber<T>>>>,
  requested:  AtomicU64,
  cancelled:  AtomicBool,
}

impl<T: Send + 'static> ManualPublisher<T> {
  /// Creates an unsubscribed probe.
  #[must_use]
  pub fn new() -> Self {
    Self {
      core: ArcShared::new(ManualCore {
        subscriber: SpinSyncMutex::new(None),
        requested:  AtomicU64::new(0),
        cancelled:  AtomicBool::new(false),
      }),
    }
  }

  /// Converts the probe into a publisher trait object.
  #[must_use]
  pub fn handle(&self) -> ArcShared<dyn Publisher<T>> {
    ArcShared::new(self.clone()).into_dyn(|publisher| publisher as &dyn Publisher<T>)
  }

  /// Delivers one element to the subscriber, demand notwithstanding.
  pub fn emit(&self, value: T) {
    let subscriber = { self.core.subscriber.lock().clone() };
    if let Some(subscriber) = subscriber {
      subscriber.on_next(value);
    }
  }

  /// Delivers the completion terminal.
  pub fn complete(&self) {
    let subscriber = { self.core.subscriber.lock().clone() };
    if let Some(subscriber) = subscriber {
      subscriber.on_complete();
    }
  }

  /// Delivers the failure terminal.
  pub fn fail(&self, error: StreamError) {
    let subscriber = { self.core.subscriber.lock().clone() };
    if let Some(subscriber) = subscriber {
      subscriber.on_error(error);
    }
  }

  /// Returns the subscriber attached to this probe, if any.
  #[must_use]
  pub fn subscriber(&self) -> Option<ArcShared<dyn Subscriber<T>>> {
    self.core.subscriber.lock().clone()
  }

  /// Returns the cumulative demand requested by the subscriber.
  #[must_use]
  pub fn requested(&self) -> u64 {
    self.core.requested.load(Ordering::Acquire)
  }

  /// Returns `true` once the subscriber cancelled.
  #[must_use]
  pub fn is_cancelled(&self) -> bool {
    self.core.cancelled.load(Ordering::Acquire)
  }
}

impl<T: Send + 'static> Default for ManualPublisher<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Clone for ManualPublisher<T> {
  fn clone(&self) -> Self {
    Self { core: self.core.clone() }
  }
}

impl<T: Send + 'static> Publisher<T> for ManualPublisher<T> {
  fn subscribe(&self, subscriber: ArcShared<dyn Subscriber<T>>) {
    {
      let mut slot = self.core.subscriber.lock();
      if slot.is_some() {
        return;
      }
      *slot = Some(subscriber.clone());
    }
    let subscription = self.core.clone().into_dyn(|core| core as &dyn Subscription);
    subscriber.on_subscribe(StreamSubscription::Plain(subscription));
  }
}

impl<T: Send + 'static> Subscription for ManualCore<T> {
  fn request(&self, n: u64) {
    add_cap(&self.requested, n);
  }

  fn cancel(&self) {
    self.cancelled.store(true, Ordering::Release);
  }
}
