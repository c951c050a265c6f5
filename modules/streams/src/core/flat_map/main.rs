use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use portable_atomic::AtomicU64;
use rivulet_utils_rs::{ArcShared, MpscQueue, QueueError, SpinSyncMutex, WeakShared};

use crate::core::{
  Attr, AttrValue, Introspect, MapFn, MappedStream, SignalHooks, StreamError, StreamSubscription, Subscriber,
  Subscription, add_cap, produced,
};

use super::{ContinueFn, ErrorSlot, FlatMapInner, FlatMapSettings, InnerSlots};

/// Per-subscription flat-map coordinator.
///
/// Receives upstream elements, maps them, and merges scalar results and
/// inner-sequence elements into one serialized downstream. All emission runs
/// inside the drain loop, which is owned by whichever thread moves the
/// work-in-progress counter off zero; every other caller just registers its
/// signal and leaves.
pub struct FlatMapMain<T, R> {
  downstream:    ArcShared<dyn Subscriber<R>>,
  mapper:        MapFn<T, R>,
  settings:      FlatMapSettings,
  hooks:         SignalHooks<R>,
  continue_hook: Option<ContinueFn<T>>,
  self_handle:   WeakShared<FlatMapMain<T, R>>,
  upstream:      SpinSyncMutex<Option<StreamSubscription<T>>>,
  requested:     AtomicU64,
  wip:           AtomicUsize,
  last_index:    AtomicUsize,
  done:          AtomicBool,
  cancelled:     AtomicBool,
  error:         ErrorSlot,
  scalar_queue:  SpinSyncMutex<Option<ArcShared<MpscQueue<R>>>>,
  inners:        InnerSlots<T, R>,
}

impl<T: Send + 'static, R: Send + 'static> FlatMapMain<T, R> {
  /// Creates a coordinator serving `downstream`.
  #[must_use]
  pub fn new(
    downstream: ArcShared<dyn Subscriber<R>>,
    mapper: MapFn<T, R>,
    settings: FlatMapSettings,
    hooks: SignalHooks<R>,
    continue_hook: Option<ContinueFn<T>>,
  ) -> ArcShared<Self> {
    ArcShared::new_cyclic(|self_handle| Self {
      downstream,
      mapper,
      settings,
      hooks,
      continue_hook,
      self_handle: self_handle.clone(),
      upstream: SpinSyncMutex::new(None),
      requested: AtomicU64::new(0),
      wip: AtomicUsize::new(0),
      last_index: AtomicUsize::new(0),
      done: AtomicBool::new(false),
      cancelled: AtomicBool::new(false),
      error: ErrorSlot::new(),
      scalar_queue: SpinSyncMutex::new(None),
      inners: InnerSlots::new(),
    })
  }

  /// Converts a coordinator handle into a subscriber trait object.
  #[must_use]
  pub fn as_subscriber(main: &ArcShared<Self>) -> ArcShared<dyn Subscriber<T>> {
    main.clone().into_dyn(|main| main as &dyn Subscriber<T>)
  }

  /// Schedules a drain pass; the caller that moves `wip` off zero runs it.
  pub(in crate::core) fn drain(&self) {
    if self.wip.fetch_add(1, Ordering::AcqRel) == 0 {
      self.drain_loop();
    }
  }

  pub(in crate::core) fn is_terminal_delivered(&self) -> bool {
    self.error.is_terminated()
  }

  pub(in crate::core) fn drop_next(&self, value: R) {
    self.hooks.drop_next(value);
  }

  pub(in crate::core) fn drop_error(&self, error: StreamError) {
    self.hooks.drop_error(error);
  }

  /// Records a failure signaled by an inner sequence.
  ///
  /// The caller raises the inner's done flag only after this returns, so a
  /// concurrent drain can never complete past an unrecorded failure.
  pub(in crate::core) fn record_inner_error(&self, error: StreamError) {
    if let Some(hook) = &self.continue_hook {
      hook(error, None);
      return;
    }
    if let Err(dropped) = self.error.accumulate(error) {
      self.hooks.drop_error(dropped);
    }
  }

  /// Records an inner buffer overflow; the rejected element is discarded.
  pub(in crate::core) fn record_inner_overflow(&self, rejected: R) {
    self.hooks.discard(rejected);
    if let Err(dropped) = self.error.accumulate(StreamError::Overflow) {
      self.hooks.drop_error(dropped);
    }
  }

  fn map_failure(&self, error: StreamError, element: Option<T>) {
    if let Some(hook) = &self.continue_hook {
      hook(error, element);
      self.replenish_upstream(1);
      return;
    }
    self.cancel_upstream();
    if self.done.load(Ordering::Acquire) {
      self.hooks.drop_error(error);
      return;
    }
    match self.error.accumulate(error) {
      | Ok(()) => {
        self.done.store(true, Ordering::Release);
        self.drain();
      },
      | Err(dropped) => self.hooks.drop_error(dropped),
    }
  }

  fn try_emit_scalar(&self, value: R) {
    if self.wip.compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire).is_ok() {
      let requested = self.requested.load(Ordering::Acquire);
      let scalar_empty = self.scalar_queue.lock().as_ref().map_or(true, |queue| queue.is_empty());
      if requested != 0 && scalar_empty && !self.cancelled.load(Ordering::Acquire) {
        self.downstream.on_next(value);
        produced(&self.requested, 1);
        self.replenish_upstream(1);
      } else {
        self.offer_scalar(value);
      }
      self.drain_loop();
    } else {
      self.offer_scalar(value);
      self.drain();
    }
  }

  fn offer_scalar(&self, value: R) {
    let queue = self.scalar_queue_handle();
    match queue.offer(value) {
      | Ok(()) => {},
      | Err(QueueError::Closed(rejected)) => self.hooks.discard(rejected),
      | Err(QueueError::Full(rejected)) => {
        self.hooks.discard(rejected);
        if let Err(dropped) = self.error.accumulate(StreamError::Overflow) {
          self.hooks.drop_error(dropped);
        }
      },
    }
  }

  fn scalar_queue_handle(&self) -> ArcShared<MpscQueue<R>> {
    let mut slot = self.scalar_queue.lock();
    match &*slot {
      | Some(queue) => queue.clone(),
      | None => {
        let queue = if self.settings.is_unbounded_concurrency() {
          ArcShared::new(MpscQueue::unbounded())
        } else {
          ArcShared::new(MpscQueue::bounded(self.settings.max_concurrency()))
        };
        *slot = Some(queue.clone());
        queue
      },
    }
  }

  fn upstream_subscription(&self) -> Option<StreamSubscription<T>> {
    self.upstream.lock().clone()
  }

  fn cancel_upstream(&self) {
    if let Some(subscription) = self.upstream_subscription() {
      subscription.cancel();
    }
  }

  fn replenish_upstream(&self, amount: u64) {
    if self.settings.is_unbounded_concurrency() || self.cancelled.load(Ordering::Acquire) {
      return;
    }
    if let Some(subscription) = self.upstream_subscription() {
      subscription.request(amount);
    }
  }

  fn scalar_len(&self) -> usize {
    self.scalar_queue.lock().as_ref().map_or(0, |queue| queue.len())
  }

  fn buffered_total(&self) -> u64 {
    let mut total = self.scalar_len() as u64;
    for inner in self.inners.snapshot() {
      total += inner.buffered() as u64;
    }
    total
  }

  fn discard_all(&self) {
    let scalar = { self.scalar_queue.lock().clone() };
    if let Some(queue) = scalar {
      for value in queue.close() {
        self.hooks.discard(value);
      }
    }
    for inner in self.inners.take_all() {
      inner.cancel();
      inner.discard_queue(&self.hooks);
    }
  }

  fn terminate_with_pending_error(&self) {
    let Some(error) = self.error.take() else {
      return;
    };
    self.cancel_upstream();
    self.discard_all();
    self.downstream.on_error(error);
  }

  // The serialized merge pass. Only one thread is ever in here; re-entrant
  // signals show up as `wip` increments and re-run the loop body.
  fn drain_loop(&self) {
    let mut missed = 1_usize;
    'outer: loop {
      if self.cancelled.load(Ordering::Acquire) {
        self.discard_all();
        return;
      }
      if !self.settings.is_delay_error() && self.error.is_pending() {
        self.terminate_with_pending_error();
        return;
      }

      let done = self.done.load(Ordering::Acquire);
      let scalar = { self.scalar_queue.lock().clone() };
      let mut progress = false;

      // Scalar results first, up to available demand.
      let mut requested = self.requested.load(Ordering::Acquire);
      if let Some(queue) = &scalar {
        let mut emitted = 0_u64;
        while emitted < requested {
          if self.cancelled.load(Ordering::Acquire) {
            self.discard_all();
            return;
          }
          match queue.poll() {
            | Some(value) => {
              self.downstream.on_next(value);
              emitted += 1;
            },
            | None => break,
          }
        }
        if emitted > 0 {
          progress = true;
          requested = produced(&self.requested, emitted);
          self.replenish_upstream(emitted);
        }
      }

      // Round-robin sweep over the inner slots. Emission is bounded by
      // demand; retiring a terminated inner is not.
      let slot_count = self.inners.slot_count();
      if slot_count > 0 {
        let mut index = self.last_index.load(Ordering::Relaxed);
        if index >= slot_count {
          index = 0;
        }
        for _ in 0..slot_count {
          if self.cancelled.load(Ordering::Acquire) {
            self.discard_all();
            return;
          }
          if !self.settings.is_delay_error() && self.error.is_pending() {
            self.last_index.store(index, Ordering::Relaxed);
            continue 'outer;
          }
          if let Some(inner) = self.inners.get(index) {
            let inner_done = inner.is_done();
            let empty = inner.queue_is_empty();
            if inner_done && empty {
              self.inners.remove(index);
              self.replenish_upstream(1);
              progress = true;
            } else if requested > 0 && !empty {
              if let Some(value) = inner.poll() {
                self.downstream.on_next(value);
                requested = produced(&self.requested, 1);
                inner.emitted_one();
                progress = true;
              }
            }
          }
          index += 1;
          if index == slot_count {
            index = 0;
          }
        }
        self.last_index.store(index, Ordering::Relaxed);
      }

      if done && self.inners.active_count() == 0 && scalar.as_ref().map_or(true, |queue| queue.is_empty()) {
        match self.error.take() {
          | Some(error) => self.downstream.on_error(error),
          | None => self.downstream.on_complete(),
        }
        return;
      }

      if progress {
        continue;
      }

      let previous = self.wip.fetch_sub(missed, Ordering::AcqRel);
      if previous == missed {
        return;
      }
      missed = previous - missed;
    }
  }
}

impl<T: Send + 'static, R: Send + 'static> Subscriber<T> for FlatMapMain<T, R> {
  fn on_subscribe(&self, subscription: StreamSubscription<T>) {
    {
      let mut slot = self.upstream.lock();
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
    if let Some(main) = self.self_handle.upgrade() {
      let handle = main.into_dyn(|main| main as &dyn Subscription);
      self.downstream.on_subscribe(StreamSubscription::Plain(handle));
    }
    subscription.request(self.settings.initial_request());
  }

  fn on_next(&self, element: T) {
    if self.done.load(Ordering::Acquire) {
      return;
    }
    match (self.mapper)(&element) {
      | Err(error) => self.map_failure(error, Some(element)),
      | Ok(MappedStream::Just(value)) => self.try_emit_scalar(value),
      | Ok(MappedStream::Empty) => self.replenish_upstream(1),
      | Ok(MappedStream::Callable(call)) => match call() {
        | Ok(Some(value)) => self.try_emit_scalar(value),
        | Ok(None) => self.replenish_upstream(1),
        | Err(error) => self.map_failure(error, Some(element)),
      },
      | Ok(MappedStream::Stream(publisher)) => {
        let inner = FlatMapInner::new(self.self_handle.clone(), self.settings.prefetch());
        if self.inners.add(&inner) {
          publisher.subscribe(FlatMapInner::as_subscriber(&inner));
        } else {
          inner.cancel();
        }
      },
    }
  }

  fn on_error(&self, error: StreamError) {
    if self.done.load(Ordering::Acquire) {
      self.hooks.drop_error(error);
      return;
    }
    match self.error.accumulate(error) {
      | Ok(()) => {
        self.done.store(true, Ordering::Release);
        self.drain();
      },
      | Err(dropped) => self.hooks.drop_error(dropped),
    }
  }

  fn on_complete(&self) {
    if self.done.swap(true, Ordering::AcqRel) {
      return;
    }
    self.drain();
  }
}

impl<T: Send + 'static, R: Send + 'static> Subscription for FlatMapMain<T, R> {
  fn request(&self, n: u64) {
    if n == 0 {
      self.hooks.drop_error(StreamError::InvalidDemand { requested: n });
      return;
    }
    add_cap(&self.requested, n);
    self.drain();
  }

  fn cancel(&self) {
    if self.cancelled.swap(true, Ordering::AcqRel) {
      return;
    }
    self.cancel_upstream();
    for inner in self.inners.close() {
      inner.cancel();
    }
    self.drain();
  }
}

impl<T: Send + 'static, R: Send + 'static> Introspect for FlatMapMain<T, R> {
  fn scan(&self, attr: Attr) -> Option<AttrValue> {
    match attr {
      | Attr::RequestedFromDownstream => Some(AttrValue::Amount(self.requested.load(Ordering::Acquire))),
      | Attr::Prefetch => Some(AttrValue::Count(self.settings.prefetch())),
      | Attr::Terminated => Some(AttrValue::Truth(self.error.is_terminated())),
      | Attr::Cancelled => Some(AttrValue::Truth(self.cancelled.load(Ordering::Acquire))),
      | Attr::Error => self.error.pending().map(AttrValue::Failure),
      | Attr::Buffered => {
        let total = self.buffered_total();
        Some(AttrValue::Count(usize::try_from(total.min(u64::from(u32::MAX))).unwrap_or(usize::MAX)))
      },
      | Attr::LargeBuffered => Some(AttrValue::Amount(self.buffered_total())),
      | Attr::DelayError => Some(AttrValue::Truth(self.settings.is_delay_error())),
      | Attr::RunStyle => Some(AttrValue::Style("sync")),
    }
  }
}
