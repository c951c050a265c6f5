use super::{ArcShared, WeakShared};

trait Speak {
  fn speak(&self) -> u32;
}

struct Fixed(u32);

impl Speak for Fixed {
  fn speak(&self) -> u32 {
    self.0
  }
}

#[test]
fn pointer_equality_distinguishes_allocations() {
  let left = ArcShared::new(7_u32);
  let same = left.clone();
  let right = ArcShared::new(7_u32);
  assert_eq!(left, same);
  assert_ne!(left, right);
}

#[test]
fn into_dyn_preserves_the_value() {
  let concrete = ArcShared::new(Fixed(41));
  let spoken: ArcShared<dyn Speak> = concrete.into_dyn(|value| value as &dyn Speak);
  assert_eq!(spoken.speak(), 41);
}

#[test]
fn weak_upgrade_fails_after_drop() {
  let strong = ArcShared::new(3_u8);
  let weak = strong.downgrade();
  assert!(weak.upgrade().is_some());
  drop(strong);
  assert!(weak.upgrade().is_none());
}

#[test]
fn dangling_never_upgrades() {
  let weak: WeakShared<u8> = WeakShared::dangling();
  assert!(weak.upgrade().is_none());
}

#[test]
fn new_cyclic_hands_out_a_self_handle() {
  struct Node {
    handle: WeakShared<Node>,
  }

  let node = ArcShared::new_cyclic(|weak| Node { handle: weak.clone() });
  let upgraded = node.handle.upgrade().unwrap();
  assert_eq!(node, upgraded);
}
