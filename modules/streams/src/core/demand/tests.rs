use portable_atomic::AtomicU64;

use super::{REQUESTED_UNBOUNDED, add_cap, produced};

#[test]
fn add_cap_reports_the_previous_value() {
  let requested = AtomicU64::new(0);
  assert_eq!(add_cap(&requested, 5), 0);
  assert_eq!(add_cap(&requested, 3), 5);
  assert_eq!(requested.load(core::sync::atomic::Ordering::Acquire), 8);
}

#[test]
fn add_cap_saturates_at_the_sentinel() {
  let requested = AtomicU64::new(u64::MAX - 1);
  add_cap(&requested, 10);
  assert_eq!(requested.load(core::sync::atomic::Ordering::Acquire), REQUESTED_UNBOUNDED);
  assert_eq!(add_cap(&requested, 1), REQUESTED_UNBOUNDED);
}

#[test]
fn produced_never_underflows() {
  let requested = AtomicU64::new(2);
  assert_eq!(produced(&requested, 1), 1);
  assert_eq!(produced(&requested, 5), 0);
}

#[test]
fn produced_leaves_unbounded_alone() {
  let requested = AtomicU64::new(REQUESTED_UNBOUNDED);
  assert_eq!(produced(&requested, 1_000), REQUESTED_UNBOUNDED);
}
