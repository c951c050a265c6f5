use rivulet_utils_rs::ArcShared;

use crate::core::StreamError;

/// Callbacks receiving signals that can no longer reach the downstream.
///
/// A terminal already delivered, a cancellation in flight, or a discarded
/// buffer all route here so nothing is silently lost. Hooks are configured
/// per operator; the defaults do nothing.
pub struct SignalHooks<T> {
  error_dropped: Option<ArcShared<dyn Fn(StreamError) + Send + Sync>>,
  next_dropped:  Option<ArcShared<dyn Fn(T) + Send + Sync>>,
  discard:       Option<ArcShared<dyn Fn(T) + Send + Sync>>,
}

impl<T> SignalHooks<T> {
  /// Creates hooks that drop every signal silently.
  #[must_use]
  pub const fn new() -> Self {
    Self { error_dropped: None, next_dropped: None, discard: None }
  }

  /// Installs the callback invoked for errors arriving after termination.
  #[must_use]
  pub fn on_error_dropped(mut self, hook: impl Fn(StreamError) + Send + Sync + 'static) -> Self {
    self.error_dropped = Some(ArcShared::new(hook).into_dyn(|h| h as &(dyn Fn(StreamError) + Send + Sync)));
    self
  }

  /// Installs the callback invoked for elements arriving after termination.
  #[must_use]
  pub fn on_next_dropped(mut self, hook: impl Fn(T) + Send + Sync + 'static) -> Self {
    self.next_dropped = Some(ArcShared::new(hook).into_dyn(|h| h as &(dyn Fn(T) + Send + Sync)));
    self
  }

  /// Installs the callback invoked for buffered elements discarded on
  /// cancellation or error teardown.
  #[must_use]
  pub fn on_discard(mut self, hook: impl Fn(T) + Send + Sync + 'static) -> Self {
    self.discard = Some(ArcShared::new(hook).into_dyn(|h| h as &(dyn Fn(T) + Send + Sync)));
    self
  }

  /// Returns `true` when a discard callback is installed.
  ///
  /// Buffers whose owners can drop elements wholesale use this to skip
  /// element-by-element draining when nobody is listening.
  #[must_use]
  pub const fn has_discard(&self) -> bool {
    self.discard.is_some()
  }

  /// Routes an error that lost the terminal race.
  pub fn drop_error(&self, error: StreamError) {
    if let Some(hook) = &self.error_dropped {
      hook(error);
    }
  }

  /// Routes an element that arrived after termination.
  pub fn drop_next(&self, value: T) {
    if let Some(hook) = &self.next_dropped {
      hook(value);
    }
  }

  /// Routes a buffered element that will never be emitted.
  pub fn discard(&self, value: T) {
    if let Some(hook) = &self.discard {
      hook(value);
    }
  }
}

impl<T> Default for SignalHooks<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Clone for SignalHooks<T> {
  fn clone(&self) -> Self {
    Self {
      error_dropped: self.error_dropped.clone(),
      next_dropped:  self.next_dropped.clone(),
      discard:       self.discard.clone(),
    }
  }
}

impl<T> core::fmt::Debug for SignalHooks<T> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("SignalHooks").finish()
  }
}
