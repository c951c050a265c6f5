use core::sync::atomic::{AtomicBool, Ordering};

use portable_atomic::AtomicU64;
use rivulet_utils_rs::{ArcShared, SpinSyncMutex};

use crate::core::{
  FusedSubscription, FusionMode, Publisher, StreamSubscription, Subscriber, Subscription, add_cap, produced,
};

/// Emits a consecutive run of integers.
///
/// The subscription grants [`FusionMode::Sync`] on request, in which case the
/// whole run is drained by polling and no demand signaling happens at all.
pub struct RangeSource {
  start: u64,
  count: u64,
}

impl RangeSource {
  /// Creates a range emitting `count` integers starting at `start`.
  #[must_use]
  pub const fn new(start: u64, count: u64) -> Self {
    Self { start, count }
  }
}

impl Publisher<u64> for RangeSource {
  fn subscribe(&self, subscriber: ArcShared<dyn Subscriber<u64>>) {
    let subscription = ArcShared::new(RangeSubscription {
      downstream: subscriber.clone(),
      cursor:     SpinSyncMutex::new(RangeCursor { next: self.start, end: self.start.saturating_add(self.count) }),
      requested:  AtomicU64::new(0),
      cancelled:  AtomicBool::new(false),
      finished:   AtomicBool::new(false),
      fused:      AtomicBool::new(false),
    });
    subscriber.on_subscribe(StreamSubscription::Fused(
      subscription.into_dyn(|subscription| subscription as &dyn FusedSubscription<u64>),
    ));
  }
}

struct RangeCursor {
  next: u64,
  end:  u64,
}

struct RangeSubscription {
  downstream: ArcShared<dyn Subscriber<u64>>,
  cursor:     SpinSyncMutex<RangeCursor>,
  requested:  AtomicU64,
  cancelled:  AtomicBool,
  finished:   AtomicBool,
  fused:      AtomicBool,
}

impl RangeSubscription {
  fn take_next(&self) -> Option<u64> {
    let mut cursor = self.cursor.lock();
    if cursor.next == cursor.end {
      return None;
    }
    let value = cursor.next;
    cursor.next += 1;
    Some(value)
  }

  fn remaining(&self) -> u64 {
    let cursor = self.cursor.lock();
    cursor.end - cursor.next
  }

  fn finish(&self) {
    if !self.finished.swap(true, Ordering::AcqRel) {
      self.downstream.on_complete();
    }
  }

  // Emission pass owned by whichever caller moved `requested` off zero; it
  // exits only after bringing the counter back to zero or finishing the run.
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
      if self.remaining() == 0 {
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

impl Subscription for RangeSubscription {
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

impl FusedSubscription<u64> for RangeSubscription {
  fn request_fusion(&self, requested: FusionMode) -> FusionMode {
    if requested == FusionMode::Sync {
      self.fused.store(true, Ordering::Release);
      FusionMode::Sync
    } else {
      FusionMode::None
    }
  }

  fn poll(&self) -> Option<u64> {
    self.take_next()
  }

  fn is_empty(&self) -> bool {
    self.remaining() == 0
  }

  fn len(&self) -> usize {
    usize::try_from(self.remaining()).unwrap_or(usize::MAX)
  }

  fn clear(&self) {
    let mut cursor = self.cursor.lock();
    cursor.next = cursor.end;
  }
}
