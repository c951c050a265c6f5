use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use portable_atomic::AtomicU64;
use rivulet_utils_rs::{ArcShared, MpscQueue, SpinSyncMutex};

use crate::core::{
  FusedSubscription, FusionMode, Publisher, StreamError, StreamSubscription, Subscriber, Subscription, add_cap,
};

/// Hand-driven publisher probe that offers queue fusion.
///
/// Configured with the one mode it supports; the negotiation answer is
/// recorded so tests can assert the handshake outcome. A `Sync` probe is
/// preloaded through [`FusedManualPublisher::enqueue`] before subscribing; an
/// `Async` probe delivers through [`FusedManualPublisher::emit`], which
/// enqueues and fires the registered wake-up.
pub struct FusedManualPublisher<T> {
  core: ArcShared<FusedManualCore<T>>,
}

struct FusedManualCore<T> {
  mode:       FusionMode,
  granted:    AtomicU8,
  queue:      MpscQueue<T>,
  subscriber: SpinSyncMutex<Option<ArcShared<dyn Subscriber<T>>>>,
  wakeup:     SpinSyncMutex<Option<ArcShared<dyn Fn() + Send + Sync>>>,
  requested:  AtomicU64,
  cancelled:  AtomicBool,
}

impl<T: Send + 'static> FusedManualPublisher<T> {
  /// Creates a probe granting [`FusionMode::Sync`].
  #[must_use]
  pub fn sync_fused() -> Self {
    Self::with_mode(FusionMode::Sync)
  }

  /// Creates a probe granting [`FusionMode::Async`].
  #[must_use]
  pub fn async_fused() -> Self {
    Self::with_mode(FusionMode::Async)
  }

  /// Creates a probe that refuses fusion entirely.
  #[must_use]
  pub fn unfused() -> Self {
    Self::with_mode(FusionMode::None)
  }

  fn with_mode(mode: FusionMode) -> Self {
    Self {
      core: ArcShared::new(FusedManualCore {
        mode,
        granted: AtomicU8::new(FusionMode::None.as_u8()),
        queue: MpscQueue::unbounded(),
        subscriber: SpinSyncMutex::new(None),
        wakeup: SpinSyncMutex::new(None),
        requested: AtomicU64::new(0),
        cancelled: AtomicBool::new(false),
      }),
    }
  }

  /// Converts the probe into a publisher trait object.
  #[must_use]
  pub fn handle(&self) -> ArcShared<dyn Publisher<T>> {
    ArcShared::new(self.clone()).into_dyn(|publisher| publisher as &dyn Publisher<T>)
  }

  /// Enqueues an element without signaling; used to preload `Sync` probes.
  pub fn enqueue(&self, value: T) {
    let _ = self.core.queue.offer(value);
  }

  /// Delivers one element the way the negotiated mode prescribes.
  pub fn emit(&self, value: T) {
    match FusionMode::from_u8(self.core.granted.load(Ordering::Acquire)) {
      | FusionMode::Async => {
        let _ = self.core.queue.offer(value);
        let wakeup = { self.core.wakeup.lock().clone() };
        if let Some(wakeup) = wakeup {
          wakeup();
        }
      },
      | FusionMode::Sync | FusionMode::None => {
        let subscriber = { self.core.subscriber.lock().clone() };
        if let Some(subscriber) = subscriber {
          subscriber.on_next(value);
        }
      },
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

  /// Returns the fusion mode granted during the handshake.
  #[must_use]
  pub fn granted_mode(&self) -> FusionMode {
    FusionMode::from_u8(self.core.granted.load(Ordering::Acquire))
  }

  /// Returns the number of elements sitting in the fused queue.
  #[must_use]
  pub fn buffered(&self) -> usize {
    self.core.queue.len()
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

impl<T> Clone for FusedManualPublisher<T> {
  fn clone(&self) -> Self {
    Self { core: self.core.clone() }
  }
}

impl<T: Send + 'static> Publisher<T> for FusedManualPublisher<T> {
  fn subscribe(&self, subscriber: ArcShared<dyn Subscriber<T>>) {
    {
      let mut slot = self.core.subscriber.lock();
      if slot.is_some() {
        return;
      }
      *slot = Some(subscriber.clone());
    }
    let subscription = self.core.clone().into_dyn(|core| core as &dyn FusedSubscription<T>);
    subscriber.on_subscribe(StreamSubscription::Fused(subscription));
  }
}

impl<T: Send + 'static> Subscription for FusedManualCore<T> {
  fn request(&self, n: u64) {
    add_cap(&self.requested, n);
  }

  fn cancel(&self) {
    self.cancelled.store(true, Ordering::Release);
  }
}

impl<T: Send + 'static> FusedSubscription<T> for FusedManualCore<T> {
  fn request_fusion(&self, requested: FusionMode) -> FusionMode {
    let granted = if requested == self.mode { self.mode } else { FusionMode::None };
    if granted != FusionMode::None {
      self.granted.store(granted.as_u8(), Ordering::Release);
    }
    granted
  }

  fn poll(&self) -> Option<T> {
    self.queue.poll()
  }

  fn is_empty(&self) -> bool {
    self.queue.is_empty()
  }

  fn len(&self) -> usize {
    self.queue.len()
  }

  fn clear(&self) {
    while self.queue.poll().is_some() {}
  }

  fn set_wakeup(&self, wakeup: ArcShared<dyn Fn() + Send + Sync>) {
    *self.wakeup.lock() = Some(wakeup);
  }
}
