use alloc::sync::{Arc, Weak};
use core::ptr;

#[cfg(test)]
mod tests;

/// Shared ownership handle backed by [`alloc::sync::Arc`].
///
/// Equality is pointer identity, which is what the reactive layer needs when
/// it compares subscriptions and inner subscribers for sameness.
#[repr(transparent)]
pub struct ArcShared<T: ?Sized>(Arc<T>);

impl<T: ?Sized> ArcShared<T> {
  /// Creates a new `ArcShared` by wrapping the provided value.
  pub fn new(value: T) -> Self
  where
    T: Sized, {
    Self(Arc::new(value))
  }

  /// Creates a shared handle whose value may hold a non-owning reference to itself.
  pub fn new_cyclic<F>(build: F) -> Self
  where
    T: Sized,
    F: FnOnce(&WeakShared<T>) -> T, {
    Self(Arc::new_cyclic(|weak| build(&WeakShared(weak.clone()))))
  }

  /// Returns a non-owning handle to the shared value.
  #[must_use]
  pub fn downgrade(&self) -> WeakShared<T> {
    WeakShared(Arc::downgrade(&self.0))
  }

  /// Consumes the shared handle and returns the raw pointer.
  #[must_use]
  pub fn into_raw(self) -> *const T {
    Arc::into_raw(self.0)
  }

  /// Reconstructs the shared handle from a raw pointer.
  ///
  /// # Safety
  ///
  /// The pointer must originate from `ArcShared::into_raw`.
  pub unsafe fn from_raw(raw: *const T) -> Self {
    Self(unsafe { Arc::from_raw(raw) })
  }

  /// Converts the shared handle into another dynamically sized representation.
  pub fn into_dyn<U: ?Sized, F>(self, cast: F) -> ArcShared<U>
  where
    F: FnOnce(&T) -> &U, {
    let raw = self.into_raw();
    unsafe {
      let reference = &*raw;
      let trait_reference = cast(reference);
      let trait_ptr = ptr::from_ref(trait_reference);
      ArcShared::from_raw(trait_ptr)
    }
  }
}

impl<T: ?Sized> core::ops::Deref for ArcShared<T> {
  type Target = T;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl<T: ?Sized> core::fmt::Debug for ArcShared<T> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("ArcShared").finish()
  }
}

impl<T: ?Sized> PartialEq for ArcShared<T> {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }
}

impl<T: ?Sized> Eq for ArcShared<T> {}

impl<T: ?Sized> Clone for ArcShared<T> {
  fn clone(&self) -> Self {
    Self(self.0.clone())
  }
}

/// Non-owning companion to [`ArcShared`].
///
/// Upgrading fails once every owning handle is gone, which the reactive layer
/// uses to let inner subscribers outlive their coordinator without keeping it
/// alive.
#[repr(transparent)]
pub struct WeakShared<T: ?Sized>(Weak<T>);

impl<T: ?Sized> WeakShared<T> {
  /// Creates a handle that never upgrades.
  #[must_use]
  pub const fn dangling() -> Self
  where
    T: Sized, {
    Self(Weak::new())
  }

  /// Attempts to recover an owning handle.
  #[must_use]
  pub fn upgrade(&self) -> Option<ArcShared<T>> {
    self.0.upgrade().map(ArcShared)
  }
}

impl<T: ?Sized> Clone for WeakShared<T> {
  fn clone(&self) -> Self {
    Self(self.0.clone())
  }
}

impl<T: ?Sized> core::fmt::Debug for WeakShared<T> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("WeakShared").finish()
  }
}
