use core::sync::atomic::Ordering;

use portable_atomic::AtomicU64;

#[cfg(test)]
mod tests;

/// Demand value treated as infinite.
///
/// Once a counter reaches the sentinel it stays there; saturation replaces
/// overflow everywhere demand is accumulated.
pub const REQUESTED_UNBOUNDED: u64 = u64::MAX;

/// Adds demand to a requested counter, saturating at [`REQUESTED_UNBOUNDED`].
///
/// Returns the value observed before the addition, which callers use to
/// detect the zero-to-positive transition that starts an emission pass.
pub fn add_cap(requested: &AtomicU64, amount: u64) -> u64 {
  let mut current = requested.load(Ordering::Acquire);
  loop {
    if current == REQUESTED_UNBOUNDED {
      return REQUESTED_UNBOUNDED;
    }
    let next = current.saturating_add(amount);
    match requested.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire) {
      | Ok(previous) => return previous,
      | Err(observed) => current = observed,
    }
  }
}

/// Subtracts emitted elements from a requested counter.
///
/// Returns the remaining demand. The counter never goes below zero and the
/// unbounded sentinel is left untouched.
pub fn produced(requested: &AtomicU64, amount: u64) -> u64 {
  let mut current = requested.load(Ordering::Acquire);
  loop {
    if current == REQUESTED_UNBOUNDED {
      return REQUESTED_UNBOUNDED;
    }
    let next = current.saturating_sub(amount);
    match requested.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire) {
      | Ok(_) => return next,
      | Err(observed) => current = observed,
    }
  }
}
