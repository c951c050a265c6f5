use crate::core::{StreamError, StreamSubscription};

/// Consumer side of the reactive contract.
///
/// `on_subscribe` is called exactly once before any element; a redundant call
/// must cancel the extra subscription and be otherwise ignored. `on_error` and
/// `on_complete` are terminal and mutually exclusive; extra terminals are
/// dropped through hooks, never surfaced. Elements are only delivered against
/// outstanding demand.
pub trait Subscriber<T>: Send + Sync {
  /// Receives the subscription handle.
  fn on_subscribe(&self, subscription: StreamSubscription<T>);

  /// Receives one element.
  fn on_next(&self, value: T);

  /// Receives the failure terminal.
  fn on_error(&self, error: StreamError);

  /// Receives the completion terminal.
  fn on_complete(&self);
}
