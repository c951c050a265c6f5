use rivulet_utils_rs::ArcShared;

use crate::core::Subscriber;

/// Producer side of the reactive contract.
pub trait Publisher<T>: Send + Sync {
  /// Attaches a subscriber; the producer must call `on_subscribe` before any
  /// other signal.
  fn subscribe(&self, subscriber: ArcShared<dyn Subscriber<T>>);
}
