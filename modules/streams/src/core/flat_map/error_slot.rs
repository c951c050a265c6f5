use rivulet_utils_rs::SpinSyncMutex;

use crate::core::StreamError;


/// Error coordinator with terminate-once semantics.
///
/// Errors compose into a pending aggregate until a terminal is taken; after
/// that the slot is sealed and every further deposit bounces back to the
/// caller for its dropped-error hook.
pub(in crate::core) struct ErrorSlot {
  state: SpinSyncMutex<ErrorSlotState>,
}

enum ErrorSlotState {
  Empty,
  Pending(StreamError),
  Terminated,
}

impl ErrorSlot {
  pub(in crate::core) const fn new() -> Self {
    Self { state: SpinSyncMutex::new(ErrorSlotState::Empty) }
  }

  /// Composes `error` into the pending slot.
  ///
  /// # Errors
  ///
  /// Returns the error back once the slot is terminated.
  pub(in crate::core) fn accumulate(&self, error: StreamError) -> Result<(), StreamError> {
    let mut state = self.state.lock();
    match core::mem::replace(&mut *state, ErrorSlotState::Terminated) {
      | ErrorSlotState::Empty => {
        *state = ErrorSlotState::Pending(error);
        Ok(())
      },
      | ErrorSlotState::Pending(pending) => {
        *state = ErrorSlotState::Pending(pending.compose(error));
        Ok(())
      },
      | ErrorSlotState::Terminated => Err(error),
    }
  }

  /// Seals the slot and returns the pending error, if any.
  pub(in crate::core) fn take(&self) -> Option<StreamError> {
    let mut state = self.state.lock();
    match core::mem::replace(&mut *state, ErrorSlotState::Terminated) {
      | ErrorSlotState::Pending(pending) => Some(pending),
      | ErrorSlotState::Empty | ErrorSlotState::Terminated => None,
    }
  }

  /// Returns a copy of the pending error without sealing the slot.
  pub(in crate::core) fn pending(&self) -> Option<StreamError> {
    match &*self.state.lock() {
      | ErrorSlotState::Pending(pending) => Some(pending.clone()),
      | ErrorSlotState::Empty | ErrorSlotState::Terminated => None,
    }
  }

  /// Returns `true` while an error awaits delivery.
  pub(in crate::core) fn is_pending(&self) -> bool {
    matches!(&*self.state.lock(), ErrorSlotState::Pending(_))
  }

  /// Returns `true` once a terminal has been taken.
  pub(in crate::core) fn is_terminated(&self) -> bool {
    matches!(&*self.state.lock(), ErrorSlotState::Terminated)
  }
}
