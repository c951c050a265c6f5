use crate::core::StreamError;

/// Attribute keys answered by the operator state machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attr {
  /// Outstanding downstream demand.
  RequestedFromDownstream,
  /// Configured per-inner request batch.
  Prefetch,
  /// Whether a terminal signal has been delivered.
  Terminated,
  /// Whether the downstream has cancelled.
  Cancelled,
  /// The error waiting for delayed delivery, if any.
  Error,
  /// Buffered element count, saturating at `u32::MAX`.
  Buffered,
  /// Exact buffered element count.
  LargeBuffered,
  /// Whether terminal delivery is deferred until all sources drain.
  DelayError,
  /// How the drain executes relative to its callers.
  RunStyle,
}

/// Attribute values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
  /// A demand-sized quantity.
  Amount(u64),
  /// An element or configuration count.
  Count(usize),
  /// A boolean state.
  Truth(bool),
  /// A pending error.
  Failure(StreamError),
  /// A named execution style.
  Style(&'static str),
}

/// Queryable runtime state, answered without touching the hot paths.
pub trait Introspect {
  /// Returns the value for `attr`, or `None` when the attribute does not
  /// apply to this component.
  fn scan(&self, attr: Attr) -> Option<AttrValue>;
}
