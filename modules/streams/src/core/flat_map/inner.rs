use core::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};

use rivulet_utils_rs::{ArcShared, QueueError, SpinSyncMutex, SpscConsumer, SpscProducer, WeakShared, spsc_ring};

use crate::core::{
  Attr, AttrValue, FusionMode, Introspect, SignalHooks, StreamError, StreamSubscription, Subscriber,
};

use super::FlatMapMain;

/// Per-inner subscriber feeding the flat-map coordinator.
///
/// Negotiates queue fusion on subscribe; unfused inners buffer into a bounded
/// ring of `prefetch` capacity that only the coordinator's drain consumes.
/// Emission accounting replenishes the producer in batches of
/// `prefetch - prefetch / 4`.
pub struct FlatMapInner<T, R> {
  parent:       WeakShared<FlatMapMain<T, R>>,
  prefetch:     usize,
  limit:        usize,
  subscription: SpinSyncMutex<Option<StreamSubscription<R>>>,
  mode:         AtomicU8,
  producer:     SpinSyncMutex<Option<SpscProducer<R>>>,
  consumer:     SpinSyncMutex<Option<SpscConsumer<R>>>,
  done:         AtomicBool,
  cancelled:    AtomicBool,
  produced:     AtomicUsize,
}

impl<T: Send + 'static, R: Send + 'static> FlatMapInner<T, R> {
  /// Creates an inner bound to its coordinator.
  #[must_use]
  pub fn new(parent: WeakShared<FlatMapMain<T, R>>, prefetch: usize) -> ArcShared<Self> {
    ArcShared::new(Self {
      parent,
      prefetch,
      limit: prefetch - (prefetch >> 2),
      subscription: SpinSyncMutex::new(None),
      mode: AtomicU8::new(FusionMode::None.as_u8()),
      producer: SpinSyncMutex::new(None),
      consumer: SpinSyncMutex::new(None),
      done: AtomicBool::new(false),
      cancelled: AtomicBool::new(false),
      produced: AtomicUsize::new(0),
    })
  }

  /// Converts an inner handle into a subscriber trait object.
  #[must_use]
  pub fn as_subscriber(inner: &ArcShared<Self>) -> ArcShared<dyn Subscriber<R>> {
    inner.clone().into_dyn(|inner| inner as &dyn Subscriber<R>)
  }

  /// Returns the fusion mode negotiated with the producer.
  #[must_use]
  pub fn source_mode(&self) -> FusionMode {
    FusionMode::from_u8(self.mode.load(Ordering::Acquire))
  }

  /// Cancels the producer subscription once; buffered elements are left for
  /// the coordinator's drain to discard.
  pub fn cancel(&self) {
    if self.cancelled.swap(true, Ordering::AcqRel) {
      return;
    }
    let subscription = { self.subscription.lock().clone() };
    if let Some(subscription) = subscription {
      subscription.cancel();
    }
  }

  pub(in crate::core) fn is_done(&self) -> bool {
    self.done.load(Ordering::Acquire)
  }

  pub(in crate::core) fn mark_done(&self) {
    self.done.store(true, Ordering::Release);
  }

  /// Dequeues the next buffered element, fused or not.
  pub(in crate::core) fn poll(&self) -> Option<R> {
    match self.source_mode() {
      | FusionMode::Sync | FusionMode::Async => {
        let subscription = { self.subscription.lock().clone() };
        subscription.as_ref().and_then(StreamSubscription::as_fused).and_then(|fused| fused.poll())
      },
      | FusionMode::None => self.consumer.lock().as_mut().and_then(SpscConsumer::poll),
    }
  }

  pub(in crate::core) fn queue_is_empty(&self) -> bool {
    match self.source_mode() {
      | FusionMode::Sync | FusionMode::Async => {
        let subscription = { self.subscription.lock().clone() };
        subscription.as_ref().and_then(StreamSubscription::as_fused).map_or(true, |fused| fused.is_empty())
      },
      | FusionMode::None => self.consumer.lock().as_ref().map_or(true, SpscConsumer::is_empty),
    }
  }

  pub(in crate::core) fn buffered(&self) -> usize {
    match self.source_mode() {
      | FusionMode::Sync | FusionMode::Async => {
        let subscription = { self.subscription.lock().clone() };
        subscription.as_ref().and_then(StreamSubscription::as_fused).map_or(0, |fused| fused.len())
      },
      | FusionMode::None => self.consumer.lock().as_ref().map_or(0, SpscConsumer::len),
    }
  }

  /// Discards every buffered element during teardown.
  ///
  /// Elements go through the discard hook when one is installed; otherwise a
  /// fused queue is dropped wholesale via `clear`.
  pub(in crate::core) fn discard_queue(&self, hooks: &SignalHooks<R>) {
    match self.source_mode() {
      | FusionMode::Sync | FusionMode::Async => {
        let subscription = { self.subscription.lock().clone() };
        if let Some(fused) = subscription.as_ref().and_then(StreamSubscription::as_fused) {
          if hooks.has_discard() {
            while let Some(value) = fused.poll() {
              hooks.discard(value);
            }
          } else {
            fused.clear();
          }
        }
      },
      | FusionMode::None => {
        let mut consumer = self.consumer.lock();
        if let Some(consumer) = consumer.as_mut() {
          while let Some(value) = consumer.poll() {
            hooks.discard(value);
          }
        }
      },
    }
  }

  /// Accounts one drained element and replenishes the producer at the batch
  /// threshold. Never signals a `Sync`-fused producer.
  pub(in crate::core) fn emitted_one(&self) {
    let produced = self.produced.fetch_add(1, Ordering::Relaxed) + 1;
    if produced == self.limit {
      self.produced.store(0, Ordering::Relaxed);
      self.request_more(self.limit as u64);
    }
  }

  fn request_more(&self, n: u64) {
    if self.source_mode() == FusionMode::Sync {
      return;
    }
    let subscription = { self.subscription.lock().clone() };
    if let Some(subscription) = subscription {
      subscription.request(n);
    }
  }

  fn offer(&self, value: R) -> Result<(), R> {
    let mut producer = self.producer.lock();
    if producer.is_none() {
      let (ring_producer, ring_consumer) = spsc_ring(self.prefetch);
      *self.consumer.lock() = Some(ring_consumer);
      *producer = Some(ring_producer);
    }
    match producer.as_mut() {
      | Some(ring_producer) => ring_producer.offer(value).map_err(QueueError::into_inner),
      | None => Ok(()),
    }
  }
}

impl<T: Send + 'static, R: Send + 'static> Subscriber<R> for FlatMapInner<T, R> {
  fn on_subscribe(&self, subscription: StreamSubscription<R>) {
    {
      let mut slot = self.subscription.lock();
      if slot.is_some() {
        drop(slot);
        subscription.cancel();
        return;
      }
      *slot = Some(subscription.clone());
    }
    if self.cancelled.load(Ordering::Acquire) {
      subscription.cancel();
      return;
    }
    let Some(parent) = self.parent.upgrade() else {
      subscription.cancel();
      return;
    };
    if let Some(fused) = subscription.as_fused() {
      if fused.request_fusion(FusionMode::Sync) == FusionMode::Sync {
        // The fused queue holds the whole sequence; no request may ever be
        // issued against a Sync-fused producer.
        self.mode.store(FusionMode::Sync.as_u8(), Ordering::Release);
        self.done.store(true, Ordering::Release);
        parent.drain();
        return;
      }
      if fused.request_fusion(FusionMode::Async) == FusionMode::Async {
        self.mode.store(FusionMode::Async.as_u8(), Ordering::Release);
        let weak = self.parent.clone();
        let wakeup = ArcShared::new(move || {
          if let Some(parent) = weak.upgrade() {
            parent.drain();
          }
        });
        fused.set_wakeup(wakeup.into_dyn(|wakeup| wakeup as &(dyn Fn() + Send + Sync)));
        subscription.request(self.prefetch as u64);
        return;
      }
    }
    subscription.request(self.prefetch as u64);
  }

  fn on_next(&self, value: R) {
    let Some(parent) = self.parent.upgrade() else {
      return;
    };
    if self.source_mode() == FusionMode::Async {
      // Async-fused producers deliver through their queue and the wake-up;
      // an element arriving here has nowhere to go.
      parent.drop_next(value);
      return;
    }
    if parent.is_terminal_delivered() {
      parent.drop_next(value);
      return;
    }
    match self.offer(value) {
      | Ok(()) => parent.drain(),
      | Err(rejected) => {
        self.cancel();
        // Record the overflow before the done flag so the drain cannot retire
        // this inner and complete ahead of the error.
        parent.record_inner_overflow(rejected);
        self.mark_done();
        parent.drain();
      },
    }
  }

  fn on_error(&self, error: StreamError) {
    let Some(parent) = self.parent.upgrade() else {
      return;
    };
    if self.done.load(Ordering::Acquire) {
      parent.drop_error(error);
      return;
    }
    // Same ordering as the overflow path: failure first, done flag second.
    parent.record_inner_error(error);
    self.mark_done();
    parent.drain();
  }

  fn on_complete(&self) {
    if self.done.swap(true, Ordering::AcqRel) {
      return;
    }
    if let Some(parent) = self.parent.upgrade() {
      parent.drain();
    }
  }
}

impl<T: Send + 'static, R: Send + 'static> Introspect for FlatMapInner<T, R> {
  fn scan(&self, attr: Attr) -> Option<AttrValue> {
    match attr {
      | Attr::Prefetch => Some(AttrValue::Count(self.prefetch)),
      | Attr::Terminated => Some(AttrValue::Truth(self.is_done())),
      | Attr::Cancelled => Some(AttrValue::Truth(self.cancelled.load(Ordering::Acquire))),
      | Attr::Buffered => Some(AttrValue::Count(self.buffered())),
      | Attr::LargeBuffered => Some(AttrValue::Amount(self.buffered() as u64)),
      | Attr::RunStyle => Some(AttrValue::Style("sync")),
      | Attr::RequestedFromDownstream | Attr::Error | Attr::DelayError => None,
    }
  }
}
