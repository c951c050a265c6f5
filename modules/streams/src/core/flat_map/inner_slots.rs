use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use rivulet_utils_rs::{ArcShared, SpinSyncMutex};

use super::FlatMapInner;

#[cfg(test)]
mod tests;

/// Slotted set of active inner subscribers.
///
/// Removal overwrites a slot with the empty sentinel instead of compacting,
/// so the drain can keep round-robin indices stable across a sweep. Freed
/// slots are reused before the array grows.
pub(in crate::core) struct InnerSlots<T, R> {
  state:  SpinSyncMutex<SlotState<T, R>>,
  active: AtomicUsize,
}

struct SlotState<T, R> {
  slots:  Vec<Option<ArcShared<FlatMapInner<T, R>>>>,
  closed: bool,
}

impl<T: Send + 'static, R: Send + 'static> InnerSlots<T, R> {
  pub(in crate::core) const fn new() -> Self {
    Self { state: SpinSyncMutex::new(SlotState { slots: Vec::new(), closed: false }), active: AtomicUsize::new(0) }
  }

  /// Places `inner` into a free slot, growing the array when none is free.
  ///
  /// Returns `false` once the set is closed; the caller must cancel the
  /// newcomer itself.
  pub(in crate::core) fn add(&self, inner: &ArcShared<FlatMapInner<T, R>>) -> bool {
    let mut state = self.state.lock();
    if state.closed {
      return false;
    }
    let free = state.slots.iter().position(Option::is_none);
    match free {
      | Some(index) => state.slots[index] = Some(inner.clone()),
      | None => state.slots.push(Some(inner.clone())),
    }
    self.active.fetch_add(1, Ordering::Release);
    true
  }

  /// Overwrites the slot at `index` with the empty sentinel.
  pub(in crate::core) fn remove(&self, index: usize) {
    let mut state = self.state.lock();
    if index < state.slots.len() && state.slots[index].take().is_some() {
      self.active.fetch_sub(1, Ordering::Release);
    }
  }

  /// Returns the inner at `index`, or `None` for a sentinel slot.
  pub(in crate::core) fn get(&self, index: usize) -> Option<ArcShared<FlatMapInner<T, R>>> {
    let state = self.state.lock();
    state.slots.get(index).and_then(Clone::clone)
  }

  /// Returns the slot array length, sentinel slots included.
  pub(in crate::core) fn slot_count(&self) -> usize {
    self.state.lock().slots.len()
  }

  /// Returns the number of active inners.
  pub(in crate::core) fn active_count(&self) -> usize {
    self.active.load(Ordering::Acquire)
  }

  /// Closes the set against further adds and returns the active inners,
  /// leaving the slots in place for the drain to discard.
  pub(in crate::core) fn close(&self) -> Vec<ArcShared<FlatMapInner<T, R>>> {
    let mut state = self.state.lock();
    state.closed = true;
    state.slots.iter().flatten().cloned().collect()
  }

  /// Closes the set and empties every slot.
  pub(in crate::core) fn take_all(&self) -> Vec<ArcShared<FlatMapInner<T, R>>> {
    let mut state = self.state.lock();
    state.closed = true;
    let taken: Vec<_> = state.slots.iter_mut().filter_map(Option::take).collect();
    self.active.store(0, Ordering::Release);
    taken
  }

  /// Returns clones of every active inner.
  pub(in crate::core) fn snapshot(&self) -> Vec<ArcShared<FlatMapInner<T, R>>> {
    self.state.lock().slots.iter().flatten().cloned().collect()
  }
}
