use rivulet_utils_rs::ArcShared;

use crate::core::{MapFn, MappedStream, Publisher, SignalHooks, StreamDslError, StreamError, Subscriber, map_fn};

pub use flat_map_settings::FlatMapSettings;
pub use inner::FlatMapInner;
pub use main::FlatMapMain;

pub(in crate::core) use error_slot::ErrorSlot;
pub(in crate::core) use inner_slots::InnerSlots;

/// Error coordinator with terminate-once semantics.
mod error_slot;
/// Operator configuration.
mod flat_map_settings;
/// Per-inner subscriber.
mod inner;
/// Slotted set of active inner subscribers.
mod inner_slots;
/// Per-subscription coordinator and drain loop.
mod main;


/// Hook receiving recovered errors in continue mode.
///
/// The element is attached when the operator still owns it at failure time
/// (mapper and callable failures); inner-sequence failures carry `None`.
pub type ContinueFn<T> = ArcShared<dyn Fn(StreamError, Option<T>) + Send + Sync>;

/// Merge operator mapping each upstream element to an inner sequence and
/// interleaving every concurrently active inner into one downstream.
///
/// Ordering across inners is unspecified; per-inner order is preserved.
pub struct FlatMap<T, R> {
  source:        ArcShared<dyn Publisher<T>>,
  mapper:        MapFn<T, R>,
  settings:      FlatMapSettings,
  hooks:         SignalHooks<R>,
  continue_hook: Option<ContinueFn<T>>,
}

impl<T: Send + 'static, R: Send + 'static> FlatMap<T, R> {
  /// Creates the operator over `source` with the given mapper and settings.
  pub fn new(
    source: ArcShared<dyn Publisher<T>>,
    mapper: impl Fn(&T) -> Result<MappedStream<R>, StreamError> + Send + Sync + 'static,
    settings: FlatMapSettings,
  ) -> Self {
    Self { source, mapper: map_fn(mapper), settings, hooks: SignalHooks::new(), continue_hook: None }
  }

  /// Replaces the dropped-signal hooks.
  #[must_use]
  pub fn with_hooks(mut self, hooks: SignalHooks<R>) -> Self {
    self.hooks = hooks;
    self
  }

  /// Opts into continue mode: recoverable failures are reported to `hook`,
  /// the offending element is dropped, and a replacement is requested from
  /// upstream instead of terminating.
  #[must_use]
  pub fn error_mode_continue(mut self, hook: impl Fn(StreamError, Option<T>) + Send + Sync + 'static) -> Self {
    self.continue_hook =
      Some(ArcShared::new(hook).into_dyn(|hook| hook as &(dyn Fn(StreamError, Option<T>) + Send + Sync)));
    self
  }

  /// Converts the operator into a publisher trait object.
  #[must_use]
  pub fn handle(self) -> ArcShared<dyn Publisher<R>> {
    ArcShared::new(self).into_dyn(|operator| operator as &dyn Publisher<R>)
  }
}

impl<T: Send + 'static, R: Send + 'static> Publisher<R> for FlatMap<T, R> {
  fn subscribe(&self, subscriber: ArcShared<dyn Subscriber<R>>) {
    let main = FlatMapMain::new(
      subscriber,
      self.mapper.clone(),
      self.settings,
      self.hooks.clone(),
      self.continue_hook.clone(),
    );
    self.source.subscribe(FlatMapMain::as_subscriber(&main));
  }
}

/// Builds a flat-map merge operator with immediate error delivery.
///
/// # Errors
///
/// Returns [`StreamDslError`] when `max_concurrency` or `prefetch` is zero.
pub fn flat_map<T: Send + 'static, R: Send + 'static>(
  source: ArcShared<dyn Publisher<T>>,
  mapper: impl Fn(&T) -> Result<MappedStream<R>, StreamError> + Send + Sync + 'static,
  max_concurrency: usize,
  prefetch: usize,
) -> Result<FlatMap<T, R>, StreamDslError> {
  let settings = FlatMapSettings::new(max_concurrency, prefetch)?;
  Ok(FlatMap::new(source, mapper, settings))
}

/// Builds a flat-map merge operator that defers errors until all sources
/// drain.
///
/// # Errors
///
/// Returns [`StreamDslError`] when `max_concurrency` or `prefetch` is zero.
pub fn flat_map_delay_error<T: Send + 'static, R: Send + 'static>(
  source: ArcShared<dyn Publisher<T>>,
  mapper: impl Fn(&T) -> Result<MappedStream<R>, StreamError> + Send + Sync + 'static,
  max_concurrency: usize,
  prefetch: usize,
) -> Result<FlatMap<T, R>, StreamDslError> {
  let settings = FlatMapSettings::new(max_concurrency, prefetch)?.delay_error(true);
  Ok(FlatMap::new(source, mapper, settings))
}
