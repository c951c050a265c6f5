use core::fmt;

/// Errors returned by queue offers.
///
/// Rejected offers hand the element back so the caller can discard it through
/// its own hooks instead of losing it inside the queue.
#[derive(Debug, PartialEq, Eq)]
pub enum QueueError<T> {
  /// The queue is at capacity.
  Full(T),
  /// The queue has been closed and accepts no further elements.
  Closed(T),
}

impl<T> QueueError<T> {
  /// Consumes the error and returns the rejected element.
  pub fn into_inner(self) -> T {
    match self {
      | Self::Full(value) | Self::Closed(value) => value,
    }
  }

  /// Returns `true` when the offer failed because the queue was full.
  #[must_use]
  pub const fn is_full(&self) -> bool {
    matches!(self, Self::Full(_))
  }
}

impl<T> fmt::Display for QueueError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | Self::Full(_) => write!(f, "queue is full"),
      | Self::Closed(_) => write!(f, "queue is closed"),
    }
  }
}
