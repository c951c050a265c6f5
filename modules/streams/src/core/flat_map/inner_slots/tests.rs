use rivulet_utils_rs::{ArcShared, WeakShared};

use super::InnerSlots;
use crate::core::flat_map::{FlatMapInner, FlatMapMain};

type Slots = InnerSlots<u64, u64>;

fn inner() -> ArcShared<FlatMapInner<u64, u64>> {
  FlatMapInner::new(WeakShared::<FlatMapMain<u64, u64>>::dangling(), 4)
}

#[test]
fn add_reuses_freed_slots() {
  let slots = Slots::new();
  let first = inner();
  let second = inner();
  assert!(slots.add(&first));
  assert!(slots.add(&second));
  assert_eq!(slots.slot_count(), 2);
  assert_eq!(slots.active_count(), 2);

  slots.remove(0);
  assert_eq!(slots.active_count(), 1);
  assert_eq!(slots.slot_count(), 2);
  assert!(slots.get(0).is_none());

  let third = inner();
  assert!(slots.add(&third));
  assert_eq!(slots.slot_count(), 2);
  assert_eq!(slots.get(0), Some(third));
}

#[test]
fn remove_is_sentinel_overwrite_not_compaction() {
  let slots = Slots::new();
  let first = inner();
  let second = inner();
  slots.add(&first);
  slots.add(&second);
  slots.remove(0);
  assert_eq!(slots.get(1), Some(second));
}

#[test]
fn close_refuses_further_adds() {
  let slots = Slots::new();
  let first = inner();
  slots.add(&first);
  let active = slots.close();
  assert_eq!(active, [first.clone()]);
  assert!(!slots.add(&inner()));
  assert_eq!(slots.get(0), Some(first));
}

#[test]
fn take_all_empties_every_slot() {
  let slots = Slots::new();
  slots.add(&inner());
  slots.add(&inner());
  assert_eq!(slots.take_all().len(), 2);
  assert_eq!(slots.active_count(), 0);
  assert!(slots.get(0).is_none());
  assert!(!slots.add(&inner()));
}
