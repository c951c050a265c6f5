/// Queue-fusion negotiation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FusionMode {
  /// No fusion; elements are signaled through `on_next`.
  None,
  /// The producer's queue is fully populated on subscribe and is drained by
  /// polling alone; the consumer must never issue a request.
  Sync,
  /// The producer enqueues asynchronously and signals readiness through the
  /// registered wake-up callback.
  Async,
}

impl FusionMode {
  /// Encodes the mode for storage in an atomic cell.
  #[must_use]
  pub const fn as_u8(self) -> u8 {
    match self {
      | Self::None => 0,
      | Self::Sync => 1,
      | Self::Async => 2,
    }
  }

  /// Decodes a stored mode; unknown encodings fall back to [`FusionMode::None`].
  #[must_use]
  pub const fn from_u8(value: u8) -> Self {
    match value {
      | 1 => Self::Sync,
      | 2 => Self::Async,
      | _ => Self::None,
    }
  }
}
