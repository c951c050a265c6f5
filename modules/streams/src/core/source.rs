use rivulet_utils_rs::ArcShared;

use crate::core::{Publisher, StreamError};

pub use empty_source::EmptySource;
pub use fail_source::FailSource;
pub use iter_source::IterSource;
pub use just_source::JustSource;
pub use never_source::NeverSource;
pub use range_source::RangeSource;

/// Source completing immediately.
mod empty_source;
/// Source failing immediately.
mod fail_source;
/// Synchronously fuseable source over an iterator.
mod iter_source;
/// Single-element source.
mod just_source;
/// Source that never signals.
mod never_source;
/// Subscription for sources that terminate during subscribe.
mod noop_subscription;
/// Synchronously fuseable numeric range source.
mod range_source;

#[cfg(test)]
mod tests;

/// Emits the `count` integers starting at `start`, then completes.
#[must_use]
pub fn range(start: u64, count: u64) -> ArcShared<dyn Publisher<u64>> {
  ArcShared::new(RangeSource::new(start, count)).into_dyn(|source| source as &dyn Publisher<u64>)
}

/// Emits every element of `elements`, then completes.
#[must_use]
pub fn iter<I>(elements: I) -> ArcShared<dyn Publisher<I::Item>>
where
  I: IntoIterator,
  I::IntoIter: Clone + Send + Sync + 'static,
  I::Item: Send + 'static, {
  ArcShared::new(IterSource::new(elements.into_iter())).into_dyn(|source| source as &dyn Publisher<I::Item>)
}

/// Emits a single element, then completes.
#[must_use]
pub fn just<T: Clone + Send + Sync + 'static>(value: T) -> ArcShared<dyn Publisher<T>> {
  ArcShared::new(JustSource::new(value)).into_dyn(|source| source as &dyn Publisher<T>)
}

/// Completes immediately without emitting.
#[must_use]
pub fn empty<T: Send + 'static>() -> ArcShared<dyn Publisher<T>> {
  ArcShared::new(EmptySource::new()).into_dyn(|source| source as &dyn Publisher<T>)
}

/// Fails immediately with `error`.
#[must_use]
pub fn fail<T: Send + 'static>(error: StreamError) -> ArcShared<dyn Publisher<T>> {
  ArcShared::new(FailSource::new(error)).into_dyn(|source| source as &dyn Publisher<T>)
}

/// Signals the subscription and then nothing else.
#[must_use]
pub fn never<T: Send + 'static>() -> ArcShared<dyn Publisher<T>> {
  ArcShared::new(NeverSource::new()).into_dyn(|source| source as &dyn Publisher<T>)
}
