use core::{
  iter::Peekable,
  sync::atomic::{AtomicBool, Ordering},
};

use portable_atomic::AtomicU64;
use rivulet_utils_rs::{ArcShared, SpinSyncMutex};

use crate::core::{
  FusedSubscription, FusionMode, Publisher, StreamSubscription, Subscriber, Subscription, add_cap, produced,
};

/// Emits every element of a cloneable iterator.
///
/// Each subscriber gets its own cursor. Like [`super::RangeSource`], the
/// subscription grants [`FusionMode::Sync`] so consumers can drain the
/// sequence by polling.
pub struct IterSource<I> {
  iter: I,
}

impl<I> IterSource<I> {
  /// Creates a source over the given iterator.
  #[must_use]
  pub const fn new(iter: I) -> Self {
    Self { iter }
  }
}

impl<I, T> Publisher<T> for IterSource<I>
where
  I: Iterator<Item = T> + Clone + Send + Sync + 'static,
  T: Send + 'static,
{
  fn subscribe(&self, subscriber: ArcShared<dyn Subscriber<T>>) {
    let subscription = ArcShared::new(IterSubscription {
      downstream: subscriber.clone(),
      cursor:     SpinSyncMutex::new(self.iter.clone().peekable()),
      requested:  AtomicU64::new(0),
      cancelled:  AtomicBool::new(false),
      finished:   AtomicBool::new(false),
      fused:      AtomicBool::new(false),
    });
    subscriber.on_subscribe(StreamSubscription::Fused(
      subscription.into_dyn(|subscription| subscription as &dyn FusedSubscription<T>),
    ));
  }
}

struct IterSubscription<I: Iterator> {
  downstream: ArcShared<dyn Subscriber<I::Item>>,
  cursor:     SpinSyncMutex<Peekable<I>>,
  requested:  AtomicU64,
  cancelled:  AtomicBool,
  finished:   AtomicBool,
  fused:      AtomicBool,
}

impl<I, T> IterSubscription<I>
where
  I: Iterator<Item = T> + Send + 'static,
  T: Send + 'static,
{
  fn take_next(&self) -> Option<T> {
    self.cursor.lock().next()
  }

  fn exhausted(&self) -> bool {
    self.cursor.lock().peek().is_none()
  }

  fn finish(&self) {
    if !self.finished.swap(true, Ordering::AcqRel) {
      self.downstream.on_complete();
    }
  }

  fn drive(&self) {
    let mut emitted = 0_u64;
    loop {
      let requested = self.requested.load(Ordering::Acquire);
      while emitted < requested {
        if self.cancelled.load(Ordering::Acquire) {
          return;
        }
        match self.take_next() {
          | Some(value) => {
            self.downstream.on_next(value);
            emitted += 1;
          },
          | None => {
            self.finish();
            return;
          },
        }
      }
      if self.exhausted() {
        if !self.cancelled.load(Ordering::Acquire) {
          self.finish();
        }
        return;
      }
      if emitted == 0 || produced(&self.requested, emitted) == 0 {
        return;
      }
      emitted = 0;
    }
  }
}

impl<I, T> Subscription for IterSubscription<I>
where
  I: Iterator<Item = T> + Send + 'static,
  T: Send + 'static,
{
  fn request(&self, n: u64) {
    if n == 0 || self.fused.load(Ordering::Acquire) {
      return;
    }
    if add_cap(&self.requested, n) == 0 {
      self.drive();
    }
  }

  fn cancel(&self) {
    self.cancelled.store(true, Ordering::Release);
  }
}

impl<I, T> FusedSubscription<T> for IterSubscription<I>
where
  I: Iterator<Item = T> + Send + 'static,
  T: Send + 'static,
{
  fn request_fusion(&self, requested: FusionMode) -> FusionMode {
    if requested == FusionMode::Sync {
      self.fused.store(true, Ordering::Release);
      FusionMode::Sync
    } else {
      FusionMode::None
    }
  }

  fn poll(&self) -> Option<T> {
    self.take_next()
  }

  fn is_empty(&self) -> bool {
    self.exhausted()
  }

  fn len(&self) -> usize {
    self.cursor.lock().size_hint().0
  }

  fn clear(&self) {
    let mut cursor = self.cursor.lock();
    while cursor.next().is_some() {}
  }
}
