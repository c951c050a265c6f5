use alloc::{string::String, vec, vec::Vec};
use core::fmt;


/// Errors flowing through the reactive terminal channel.
///
/// User failures are carried verbatim in [`StreamError::Failed`] and are never
/// wrapped; delayed-error accumulation composes them into
/// [`StreamError::Multiple`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
  /// A source, mapper, or callable failed with the given message.
  Failed(String),
  /// A value arrived with no buffer slot and no demand to absorb it.
  Overflow,
  /// A downstream issued a non-positive request.
  InvalidDemand {
    /// The offending request amount.
    requested: u64,
  },
  /// Aggregate of failures collected while terminal delivery was deferred.
  Multiple(Vec<StreamError>),
}

impl StreamError {
  /// Creates a user failure from a message.
  pub fn failed(message: impl Into<String>) -> Self {
    Self::Failed(message.into())
  }

  /// Returns `true` when this error is, or contains, a buffer overflow.
  #[must_use]
  pub fn is_overflow(&self) -> bool {
    match self {
      | Self::Overflow => true,
      | Self::Multiple(errors) => errors.iter().any(Self::is_overflow),
      | Self::Failed(_) | Self::InvalidDemand { .. } => false,
    }
  }

  /// Composes two errors into an aggregate, flattening nested aggregates.
  #[must_use]
  pub fn compose(self, other: StreamError) -> StreamError {
    let mut errors = match self {
      | Self::Multiple(errors) => errors,
      | single => vec![single],
    };
    match other {
      | Self::Multiple(more) => errors.extend(more),
      | single => errors.push(single),
    }
    Self::Multiple(errors)
  }
}

impl fmt::Display for StreamError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | Self::Failed(message) => write!(f, "{message}"),
      | Self::Overflow => write!(f, "could not emit value due to lack of requests and a full buffer"),
      | Self::InvalidDemand { requested } => write!(f, "invalid demand: {requested}"),
      | Self::Multiple(errors) => {
        write!(f, "multiple errors:")?;
        for error in errors {
          write!(f, " [{error}]")?;
        }
        Ok(())
      },
    }
  }
}
