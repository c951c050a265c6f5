use alloc::vec;

use super::{empty, fail, iter, just, never, range};
use crate::core::{FusionMode, StreamError, StreamSubscription, TestSubscriber};

#[test]
fn range_respects_demand() {
  let probe = TestSubscriber::with_demand(3);
  range(1, 10).subscribe(TestSubscriber::as_subscriber(&probe));
  probe.assert_values(&[1, 2, 3]);
  probe.assert_no_terminal();

  probe.request(7);
  probe.assert_values(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
  probe.assert_complete();
}

#[test]
fn range_completes_under_unbounded_demand() {
  let probe = TestSubscriber::unbounded();
  range(5, 4).subscribe(TestSubscriber::as_subscriber(&probe));
  probe.assert_values(&[5, 6, 7, 8]);
  probe.assert_complete();
}

#[test]
fn range_grants_sync_fusion_and_drains_by_poll() {
  let probe = TestSubscriber::<u64>::with_demand(0);
  range(1, 3).subscribe(TestSubscriber::as_subscriber(&probe));
  let subscription = probe.subscription().unwrap();
  let fused = subscription.as_fused().expect("range subscription must offer fusion");
  assert_eq!(fused.request_fusion(FusionMode::Sync), FusionMode::Sync);
  assert_eq!(fused.len(), 3);
  assert_eq!(fused.poll(), Some(1));
  assert_eq!(fused.poll(), Some(2));
  assert_eq!(fused.poll(), Some(3));
  assert!(fused.is_empty());
  assert_eq!(fused.poll(), None);
}

#[test]
fn sync_fused_range_ignores_requests() {
  let probe = TestSubscriber::<u64>::with_demand(0);
  range(1, 3).subscribe(TestSubscriber::as_subscriber(&probe));
  let subscription = probe.subscription().unwrap();
  let fused = subscription.as_fused().unwrap();
  assert_eq!(fused.request_fusion(FusionMode::Sync), FusionMode::Sync);
  subscription.request(10);
  assert_eq!(probe.value_count(), 0);
  assert_eq!(fused.len(), 3);
}

#[test]
fn range_refuses_async_fusion() {
  let probe = TestSubscriber::<u64>::with_demand(0);
  range(1, 3).subscribe(TestSubscriber::as_subscriber(&probe));
  let subscription = probe.subscription().unwrap();
  let fused = subscription.as_fused().unwrap();
  assert_eq!(fused.request_fusion(FusionMode::Async), FusionMode::None);
}

#[test]
fn iter_emits_every_element_in_order() {
  let probe = TestSubscriber::unbounded();
  iter(vec!["a", "b", "c"]).subscribe(TestSubscriber::as_subscriber(&probe));
  probe.assert_values(&["a", "b", "c"]);
  probe.assert_complete();
}

#[test]
fn iter_resumes_after_demand_pause() {
  let probe = TestSubscriber::with_demand(1);
  iter(vec![10_u64, 20, 30]).subscribe(TestSubscriber::as_subscriber(&probe));
  probe.assert_values(&[10]);
  probe.request(2);
  probe.assert_values(&[10, 20, 30]);
  probe.assert_complete();
}

#[test]
fn just_emits_once_then_completes() {
  let probe = TestSubscriber::with_demand(0);
  just(42_u64).subscribe(TestSubscriber::as_subscriber(&probe));
  probe.assert_no_terminal();
  probe.request(1);
  probe.assert_values(&[42]);
  probe.assert_complete();
}

#[test]
fn empty_completes_immediately() {
  let probe = TestSubscriber::<u64>::with_demand(0);
  empty().subscribe(TestSubscriber::as_subscriber(&probe));
  assert_eq!(probe.value_count(), 0);
  probe.assert_complete();
}

#[test]
fn fail_errors_immediately() {
  let probe = TestSubscriber::<u64>::with_demand(0);
  fail(StreamError::failed("boom")).subscribe(TestSubscriber::as_subscriber(&probe));
  probe.assert_error(|error| *error == StreamError::failed("boom"));
}

#[test]
fn never_only_hands_out_the_subscription() {
  let probe = TestSubscriber::<u64>::unbounded();
  never().subscribe(TestSubscriber::as_subscriber(&probe));
  assert!(probe.subscription().is_some());
  assert_eq!(probe.value_count(), 0);
  probe.assert_no_terminal();
}

#[test]
fn subscription_handle_reports_its_capability() {
  let probe = TestSubscriber::<u64>::with_demand(0);
  range(1, 1).subscribe(TestSubscriber::as_subscriber(&probe));
  assert!(matches!(probe.subscription(), Some(StreamSubscription::Fused(_))));

  let probe = TestSubscriber::<u64>::with_demand(0);
  just(1_u64).subscribe(TestSubscriber::as_subscriber(&probe));
  assert!(matches!(probe.subscription(), Some(StreamSubscription::Plain(_))));
}
