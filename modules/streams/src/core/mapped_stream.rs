use alloc::boxed::Box;

use rivulet_utils_rs::ArcShared;

use crate::core::{Publisher, StreamError};

/// Deferred synchronous evaluation producing zero or one element.
pub type CallableFn<T> = Box<dyn FnOnce() -> Result<Option<T>, StreamError> + Send>;

/// Mapper applied to each upstream element.
///
/// The element is borrowed so a failing mapper leaves it with the operator,
/// which can then hand it to the continue hook instead of losing it.
pub type MapFn<T, R> = ArcShared<dyn Fn(&T) -> Result<MappedStream<R>, StreamError> + Send + Sync>;

/// Wraps a mapper closure into the shared handle the operator threads around.
pub fn map_fn<T, R>(
  mapper: impl Fn(&T) -> Result<MappedStream<R>, StreamError> + Send + Sync + 'static,
) -> MapFn<T, R> {
  ArcShared::new(mapper)
    .into_dyn(|mapper| mapper as &(dyn Fn(&T) -> Result<MappedStream<R>, StreamError> + Send + Sync))
}

/// Result of mapping one upstream element, tagged by evaluation shape.
///
/// Scalar shapes bypass inner-subscriber allocation entirely: their single
/// element takes the coordinator's scalar fast path.
pub enum MappedStream<T> {
  /// A single immediately available element.
  Just(T),
  /// No element at all.
  Empty,
  /// A synchronous computation run at map time; it may fail.
  Callable(CallableFn<T>),
  /// A full inner sequence driven through its own subscription.
  Stream(ArcShared<dyn Publisher<T>>),
}

impl<T> MappedStream<T> {
  /// Wraps a synchronous computation.
  pub fn callable(call: impl FnOnce() -> Result<Option<T>, StreamError> + Send + 'static) -> Self {
    Self::Callable(Box::new(call))
  }
}

impl<T> core::fmt::Debug for MappedStream<T> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    let name = match self {
      | Self::Just(_) => "MappedStream::Just",
      | Self::Empty => "MappedStream::Empty",
      | Self::Callable(_) => "MappedStream::Callable",
      | Self::Stream(_) => "MappedStream::Stream",
    };
    f.debug_struct(name).finish()
  }
}
