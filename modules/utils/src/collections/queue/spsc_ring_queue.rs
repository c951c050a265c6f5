use alloc::{boxed::Box, vec::Vec};
use core::{
  cell::UnsafeCell,
  sync::atomic::{AtomicUsize, Ordering},
};

use crate::sync::ArcShared;

use super::QueueError;


/// Creates a bounded single-producer single-consumer ring.
///
/// The capacity is rounded up to the next power of two. The returned handles
/// are the only way to touch the ring: each is unique and mutably borrowed per
/// operation, which is what makes the single-producer / single-consumer
/// contract hold without a lock.
#[must_use]
pub fn spsc_ring<T: Send>(capacity: usize) -> (SpscProducer<T>, SpscConsumer<T>) {
  let capacity = capacity.max(1).next_power_of_two();
  let mut slots = Vec::with_capacity(capacity);
  slots.resize_with(capacity, || UnsafeCell::new(None));
  let core = ArcShared::new(RingCore {
    mask:  capacity - 1,
    slots: slots.into_boxed_slice(),
    head:  AtomicUsize::new(0),
    tail:  AtomicUsize::new(0),
  });
  (SpscProducer { core: core.clone() }, SpscConsumer { core })
}

struct RingCore<T> {
  mask:  usize,
  slots: Box<[UnsafeCell<Option<T>>]>,
  head:  AtomicUsize,
  tail:  AtomicUsize,
}

// The handles guarantee one producer and one consumer; disjoint slot access is
// enforced by the head/tail protocol below.
unsafe impl<T: Send> Send for RingCore<T> {}
unsafe impl<T: Send> Sync for RingCore<T> {}

impl<T> RingCore<T> {
  const fn capacity(&self) -> usize {
    self.mask + 1
  }

  fn len(&self) -> usize {
    let tail = self.tail.load(Ordering::Acquire);
    let head = self.head.load(Ordering::Acquire);
    tail.wrapping_sub(head)
  }
}

/// Producing handle of an SPSC ring.
pub struct SpscProducer<T> {
  core: ArcShared<RingCore<T>>,
}

impl<T: Send> SpscProducer<T> {
  /// Attempts to enqueue an element.
  ///
  /// # Errors
  ///
  /// Returns [`QueueError::Full`] with the element when the ring is at
  /// capacity.
  pub fn offer(&mut self, value: T) -> Result<(), QueueError<T>> {
    let core = &*self.core;
    let tail = core.tail.load(Ordering::Relaxed);
    let head = core.head.load(Ordering::Acquire);
    if tail.wrapping_sub(head) == core.capacity() {
      return Err(QueueError::Full(value));
    }
    // Safety: only this producer writes at `tail`, and the slot is outside the
    // consumer's published range until the store below.
    unsafe {
      *core.slots[tail & core.mask].get() = Some(value);
    }
    core.tail.store(tail.wrapping_add(1), Ordering::Release);
    Ok(())
  }

  /// Returns the number of buffered elements.
  #[must_use]
  pub fn len(&self) -> usize {
    self.core.len()
  }

  /// Returns `true` when no elements are buffered.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns the ring capacity.
  #[must_use]
  pub fn capacity(&self) -> usize {
    self.core.capacity()
  }
}

impl<T> core::fmt::Debug for SpscProducer<T> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("SpscProducer").finish()
  }
}

/// Consuming handle of an SPSC ring.
pub struct SpscConsumer<T> {
  core: ArcShared<RingCore<T>>,
}

impl<T: Send> SpscConsumer<T> {
  /// Dequeues the oldest element, if any.
  pub fn poll(&mut self) -> Option<T> {
    let core = &*self.core;
    let head = core.head.load(Ordering::Relaxed);
    let tail = core.tail.load(Ordering::Acquire);
    if head == tail {
      return None;
    }
    // Safety: only this consumer reads at `head`, and the producer published
    // the slot with the release store observed above.
    let value = unsafe { (*core.slots[head & core.mask].get()).take() };
    core.head.store(head.wrapping_add(1), Ordering::Release);
    value
  }

  /// Returns the number of buffered elements.
  #[must_use]
  pub fn len(&self) -> usize {
    self.core.len()
  }

  /// Returns `true` when no elements are buffered.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns the ring capacity.
  #[must_use]
  pub fn capacity(&self) -> usize {
    self.core.capacity()
  }
}

impl<T> core::fmt::Debug for SpscConsumer<T> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("SpscConsumer").finish()
  }
}
