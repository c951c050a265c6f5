use alloc::vec::Vec;

use rivulet_utils_rs::{ArcShared, SpinSyncMutex};

use crate::core::{StreamError, StreamSubscription, Subscriber};

/// Demand-aware sink probe recording every signal it receives.
///
/// Demand requested before the subscription arrives is buffered and forwarded
/// during `on_subscribe`. Terminals are counted rather than collapsed so tests
/// can assert uniqueness under races.
pub struct TestSubscriber<T> {
  state: SpinSyncMutex<ProbeState<T>>,
}

struct ProbeState<T> {
  subscription:   Option<StreamSubscription<T>>,
  values:         Vec<T>,
  errors:         Vec<StreamError>,
  completions:    usize,
  pending_demand: u64,
}

impl<T: Send + 'static> TestSubscriber<T> {
  /// Creates a probe that will request `initial_demand` once subscribed.
  #[must_use]
  pub fn with_demand(initial_demand: u64) -> ArcShared<Self> {
    ArcShared::new(Self {
      state: SpinSyncMutex::new(ProbeState {
        subscription:   None,
        values:         Vec::new(),
        errors:         Vec::new(),
        completions:    0,
        pending_demand: initial_demand,
      }),
    })
  }

  /// Creates a probe with infinite demand.
  #[must_use]
  pub fn unbounded() -> ArcShared<Self> {
    Self::with_demand(crate::core::REQUESTED_UNBOUNDED)
  }

  /// Converts a probe handle into a subscriber trait object.
  #[must_use]
  pub fn as_subscriber(probe: &ArcShared<Self>) -> ArcShared<dyn Subscriber<T>> {
    probe.clone().into_dyn(|probe| probe as &dyn Subscriber<T>)
  }

  /// Requests additional demand, buffering it until subscribed.
  pub fn request(&self, n: u64) {
    let subscription = {
      let mut state = self.state.lock();
      if state.subscription.is_none() {
        state.pending_demand = state.pending_demand.saturating_add(n);
        None
      } else {
        state.subscription.clone()
      }
    };
    if let Some(subscription) = subscription {
      subscription.request(n);
    }
  }

  /// Cancels the subscription, if one arrived.
  pub fn cancel(&self) {
    let subscription = { self.state.lock().subscription.clone() };
    if let Some(subscription) = subscription {
      subscription.cancel();
    }
  }

  /// Returns the subscription handle, if one arrived.
  #[must_use]
  pub fn subscription(&self) -> Option<StreamSubscription<T>> {
    self.state.lock().subscription.clone()
  }

  /// Returns the number of received elements.
  #[must_use]
  pub fn value_count(&self) -> usize {
    self.state.lock().values.len()
  }

  /// Returns the first received error, if any.
  #[must_use]
  pub fn error(&self) -> Option<StreamError> {
    self.state.lock().errors.first().cloned()
  }

  /// Returns the number of received error terminals.
  #[must_use]
  pub fn error_count(&self) -> usize {
    self.state.lock().errors.len()
  }

  /// Returns the number of received completion terminals.
  #[must_use]
  pub fn completion_count(&self) -> usize {
    self.state.lock().completions
  }

  /// Returns `true` when a completion terminal arrived.
  #[must_use]
  pub fn is_completed(&self) -> bool {
    self.completion_count() > 0
  }

  /// Returns `true` when any terminal arrived.
  #[must_use]
  pub fn is_terminated(&self) -> bool {
    let state = self.state.lock();
    state.completions > 0 || !state.errors.is_empty()
  }
}

impl<T: Clone + Send + 'static> TestSubscriber<T> {
  /// Returns a copy of the received elements in delivery order.
  #[must_use]
  pub fn values(&self) -> Vec<T> {
    self.state.lock().values.clone()
  }
}

impl<T: Clone + PartialEq + core::fmt::Debug + Send + 'static> TestSubscriber<T> {
  /// Asserts the exact delivery sequence.
  ///
  /// # Panics
  ///
  /// Panics when the received elements differ from `expected`.
  pub fn assert_values(&self, expected: &[T]) {
    assert_eq!(self.values(), expected);
  }
}

impl<T: Send + 'static> TestSubscriber<T> {
  /// Asserts that exactly one completion and no error arrived.
  ///
  /// # Panics
  ///
  /// Panics on a missing or duplicated terminal.
  pub fn assert_complete(&self) {
    let state = self.state.lock();
    assert_eq!(state.completions, 1, "expected exactly one completion");
    assert!(state.errors.is_empty(), "unexpected error: {:?}", state.errors);
  }

  /// Asserts that exactly one error matching `predicate` and no completion arrived.
  ///
  /// # Panics
  ///
  /// Panics on a missing, duplicated, or non-matching terminal.
  pub fn assert_error(&self, predicate: impl FnOnce(&StreamError) -> bool) {
    let state = self.state.lock();
    assert_eq!(state.completions, 0, "unexpected completion");
    assert_eq!(state.errors.len(), 1, "expected exactly one error, got {:?}", state.errors);
    assert!(predicate(&state.errors[0]), "error did not match: {:?}", state.errors[0]);
  }

  /// Asserts that no terminal arrived yet.
  ///
  /// # Panics
  ///
  /// Panics when a terminal was already delivered.
  pub fn assert_no_terminal(&self) {
    let state = self.state.lock();
    assert_eq!(state.completions, 0, "unexpected completion");
    assert!(state.errors.is_empty(), "unexpected error: {:?}", state.errors);
  }
}

impl<T: Send + 'static> Subscriber<T> for TestSubscriber<T> {
  fn on_subscribe(&self, subscription: StreamSubscription<T>) {
    let pending = {
      let mut state = self.state.lock();
      if state.subscription.is_some() {
        None
      } else {
        state.subscription = Some(subscription.clone());
        Some(core::mem::take(&mut state.pending_demand))
      }
    };
    match pending {
      | None => subscription.cancel(),
      | Some(demand) if demand > 0 => subscription.request(demand),
      | Some(_) => {},
    }
  }

  fn on_next(&self, value: T) {
    self.state.lock().values.push(value);
  }

  fn on_error(&self, error: StreamError) {
    self.state.lock().errors.push(error);
  }

  fn on_complete(&self) {
    self.state.lock().completions += 1;
  }
}
