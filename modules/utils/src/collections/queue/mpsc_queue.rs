use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::sync::SpinSyncMutex;

use super::{QueueBuffer, QueueError};


/// Multi-producer single-consumer shared queue.
///
/// A [`QueueBuffer`] behind a spin lock with an atomic length mirror, so
/// producers on any thread can offer while `len` stays lock-free for
/// introspection.
#[derive(Debug)]
pub struct MpscQueue<T> {
  state: SpinSyncMutex<QueueBuffer<T>>,
  len:   AtomicUsize,
}

impl<T> MpscQueue<T> {
  /// Creates a queue that rejects offers past `capacity`.
  #[must_use]
  pub const fn bounded(capacity: usize) -> Self {
    Self { state: SpinSyncMutex::new(QueueBuffer::new(Some(capacity))), len: AtomicUsize::new(0) }
  }

  /// Creates a queue that grows without bound.
  #[must_use]
  pub const fn unbounded() -> Self {
    Self { state: SpinSyncMutex::new(QueueBuffer::new(None)), len: AtomicUsize::new(0) }
  }

  /// Attempts to enqueue an element.
  ///
  /// # Errors
  ///
  /// Returns [`QueueError::Full`] when the capacity bound is reached and
  /// [`QueueError::Closed`] after [`MpscQueue::close`]; both hand the element
  /// back.
  pub fn offer(&self, value: T) -> Result<(), QueueError<T>> {
    let result = self.state.lock().offer(value);
    if result.is_ok() {
      self.len.fetch_add(1, Ordering::Release);
    }
    result
  }

  /// Dequeues the oldest element, if any.
  pub fn poll(&self) -> Option<T> {
    let polled = self.state.lock().poll();
    if polled.is_some() {
      self.len.fetch_sub(1, Ordering::Release);
    }
    polled
  }

  /// Closes the queue and returns every element buffered at that point.
  pub fn close(&self) -> Vec<T> {
    let remainder: Vec<T> = self.state.lock().close().into_iter().collect();
    self.len.fetch_sub(remainder.len(), Ordering::Release);
    remainder
  }

  /// Returns the current queue length without acquiring the lock.
  #[must_use]
  pub fn len(&self) -> usize {
    self.len.load(Ordering::Acquire)
  }

  /// Returns `true` when no elements are buffered.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}
