use std::sync::{Arc, Mutex};

use rivulet_streams_rs::core::{
  FusedManualPublisher, FusionMode, ManualPublisher, MappedStream, SignalHooks, StreamError, TestSubscriber, empty,
  fail, flat_map, flat_map_delay_error, iter, range,
};

#[test]
fn normal_unbounded_merges_every_inner() {
  let operator =
    flat_map(range(1, 1000), |v: &u64| Ok(MappedStream::Stream(range(*v, 2))), 256, 32).unwrap().handle();
  let probe = TestSubscriber::unbounded();
  operator.subscribe(TestSubscriber::as_subscriber(&probe));

  let values = probe.values();
  assert_eq!(values.len(), 2000);
  let mut sorted = values.clone();
  sorted.sort_unstable();
  let mut expected: Vec<u64> = (1..=1000_u64).flat_map(|v| [v, v + 1]).collect();
  expected.sort_unstable();
  assert_eq!(sorted, expected);
  probe.assert_complete();
}

#[test]
fn backpressured_delivery_tracks_demand_exactly() {
  let operator =
    flat_map(range(1, 1000), |v: &u64| Ok(MappedStream::Stream(range(*v, 2))), 256, 32).unwrap().handle();
  let probe = TestSubscriber::with_demand(0);
  operator.subscribe(TestSubscriber::as_subscriber(&probe));
  assert_eq!(probe.value_count(), 0);

  probe.request(1000);
  assert_eq!(probe.value_count(), 1000);
  probe.assert_no_terminal();

  probe.request(1000);
  assert_eq!(probe.value_count(), 2000);
  probe.assert_complete();
}

#[test]
fn per_inner_order_is_preserved() {
  let operator =
    flat_map(range(0, 50), |v: &u64| Ok(MappedStream::Stream(range(*v * 100, 10))), 256, 32).unwrap().handle();
  let probe = TestSubscriber::with_demand(0);
  operator.subscribe(TestSubscriber::as_subscriber(&probe));
  probe.request(500);

  let values = probe.values();
  assert_eq!(values.len(), 500);
  for inner in 0..50_u64 {
    let base = inner * 100;
    let of_inner: Vec<u64> = values.iter().copied().filter(|v| *v >= base && *v < base + 10).collect();
    let expected: Vec<u64> = (base..base + 10).collect();
    assert_eq!(of_inner, expected, "inner {inner} out of order");
  }
  probe.assert_complete();
}

#[test]
fn mapper_failure_terminates_with_that_error() {
  let operator = flat_map(iter(vec![1_u64, 2, 3]), |_: &u64| Err::<MappedStream<u64>, _>(StreamError::failed("map")),
    256, 32)
  .unwrap()
  .handle();
  let probe = TestSubscriber::unbounded();
  operator.subscribe(TestSubscriber::as_subscriber(&probe));
  assert_eq!(probe.value_count(), 0);
  probe.assert_error(|error| *error == StreamError::failed("map"));
}

#[test]
fn delay_error_emits_all_values_then_the_failure() {
  let operator = flat_map_delay_error(
    iter(vec![0_usize, 1, 2]),
    |index: &usize| {
      Ok(match *index {
        | 0 => MappedStream::Stream(iter(vec![1_u64, 2])),
        | 1 => MappedStream::Stream(fail(StreamError::failed("t"))),
        | _ => MappedStream::Stream(iter(vec![3_u64, 4])),
      })
    },
    256,
    32,
  )
  .unwrap()
  .handle();
  let probe = TestSubscriber::unbounded();
  operator.subscribe(TestSubscriber::as_subscriber(&probe));

  let mut values = probe.values();
  values.sort_unstable();
  assert_eq!(values, [1, 2, 3, 4]);
  probe.assert_error(|error| *error == StreamError::failed("t"));
}

#[test]
fn scalar_fast_path_under_deferred_demand() {
  let operator = flat_map(range(1, 500), |v: &u64| Ok(MappedStream::Just(*v)), 256, 32).unwrap().handle();
  let probe = TestSubscriber::with_demand(0);
  operator.subscribe(TestSubscriber::as_subscriber(&probe));
  assert_eq!(probe.value_count(), 0);

  probe.request(500);
  let mut values = probe.values();
  values.sort_unstable();
  let expected: Vec<u64> = (1..=500).collect();
  assert_eq!(values, expected);
  probe.assert_complete();
}

#[test]
fn scalar_overflow_with_bounded_concurrency() {
  let upstream = ManualPublisher::<u64>::new();
  let operator = flat_map(upstream.handle(), |v: &u64| Ok(MappedStream::Just(*v)), 1, 1).unwrap().handle();
  let probe = TestSubscriber::with_demand(0);
  operator.subscribe(TestSubscriber::as_subscriber(&probe));

  upstream.emit(1);
  upstream.emit(2);
  probe.assert_error(StreamError::is_overflow);
  assert!(upstream.is_cancelled());
  assert_eq!(probe.value_count(), 0);
}

#[test]
fn single_concurrency_drains_inners_sequentially() {
  let operator = flat_map(range(1, 5), |v: &u64| Ok(MappedStream::Stream(range(*v * 10, 2))), 1, 4).unwrap().handle();
  let probe = TestSubscriber::unbounded();
  operator.subscribe(TestSubscriber::as_subscriber(&probe));
  probe.assert_values(&[10, 11, 20, 21, 30, 31, 40, 41, 50, 51]);
  probe.assert_complete();
}

#[test]
fn mixed_scalars_and_inners_conserve_elements() {
  let operator = flat_map(
    range(1, 100),
    |v: &u64| {
      Ok(if v % 2 == 0 { MappedStream::Just(*v) } else { MappedStream::Stream(iter(vec![*v, *v])) })
    },
    32,
    8,
  )
  .unwrap()
  .handle();
  let probe = TestSubscriber::unbounded();
  operator.subscribe(TestSubscriber::as_subscriber(&probe));

  let mut values = probe.values();
  values.sort_unstable();
  let mut expected: Vec<u64> = Vec::new();
  for v in 1..=100_u64 {
    if v % 2 == 0 {
      expected.push(v);
    } else {
      expected.push(v);
      expected.push(v);
    }
  }
  expected.sort_unstable();
  assert_eq!(values, expected);
  probe.assert_complete();
}

#[test]
fn empty_mapper_results_complete_without_values() {
  let operator = flat_map(range(1, 10), |_: &u64| Ok(MappedStream::<u64>::Empty), 2, 2).unwrap().handle();
  let probe = TestSubscriber::unbounded();
  operator.subscribe(TestSubscriber::as_subscriber(&probe));
  assert_eq!(probe.value_count(), 0);
  probe.assert_complete();
}

#[test]
fn empty_inner_sequences_complete_without_values() {
  let operator = flat_map(range(1, 10), |_: &u64| Ok(MappedStream::Stream(empty::<u64>())), 2, 2).unwrap().handle();
  let probe = TestSubscriber::unbounded();
  operator.subscribe(TestSubscriber::as_subscriber(&probe));
  assert_eq!(probe.value_count(), 0);
  probe.assert_complete();
}

#[test]
fn callable_results_take_the_scalar_path() {
  let operator = flat_map(
    range(1, 10),
    |v: &u64| {
      let value = *v;
      Ok(MappedStream::callable(move || Ok(if value % 2 == 0 { Some(value) } else { None })))
    },
    4,
    4,
  )
  .unwrap()
  .handle();
  let probe = TestSubscriber::unbounded();
  operator.subscribe(TestSubscriber::as_subscriber(&probe));

  let mut values = probe.values();
  values.sort_unstable();
  assert_eq!(values, [2, 4, 6, 8, 10]);
  probe.assert_complete();
}

#[test]
fn failing_callable_terminates_immediately() {
  let operator = flat_map(
    range(1, 10),
    |_: &u64| Ok(MappedStream::<u64>::callable(|| Err(StreamError::failed("call")))),
    4,
    4,
  )
  .unwrap()
  .handle();
  let probe = TestSubscriber::unbounded();
  operator.subscribe(TestSubscriber::as_subscriber(&probe));
  assert_eq!(probe.value_count(), 0);
  probe.assert_error(|error| *error == StreamError::failed("call"));
}

#[test]
fn cancellation_discards_buffers_and_stops_emission() {
  let discards = Arc::new(Mutex::new(Vec::new()));
  let sink = discards.clone();

  let upstream = ManualPublisher::<u64>::new();
  let inner_source = ManualPublisher::<u64>::new();
  let inner_handle = inner_source.clone();
  let operator = flat_map(upstream.handle(), move |_: &u64| Ok(MappedStream::Stream(inner_handle.handle())), 4, 8)
    .unwrap()
    .with_hooks(SignalHooks::new().on_discard(move |value| sink.lock().unwrap().push(value)))
    .handle();
  let probe = TestSubscriber::with_demand(0);
  operator.subscribe(TestSubscriber::as_subscriber(&probe));

  upstream.emit(1);
  inner_source.emit(10);
  inner_source.emit(11);
  assert_eq!(probe.value_count(), 0);

  probe.cancel();
  assert!(upstream.is_cancelled());
  assert!(inner_source.is_cancelled());
  {
    let mut discarded = discards.lock().unwrap();
    discarded.sort_unstable();
    assert_eq!(discarded.as_slice(), &[10, 11]);
  }

  inner_source.emit(12);
  inner_source.complete();
  assert_eq!(probe.value_count(), 0);
  probe.assert_no_terminal();
}

#[test]
fn continue_mode_skips_mapper_failures() {
  let recovered = Arc::new(Mutex::new(Vec::new()));
  let sink = recovered.clone();

  let operator = flat_map(
    range(1, 6),
    |v: &u64| {
      if *v == 3 { Err(StreamError::failed("skip me")) } else { Ok(MappedStream::Just(*v)) }
    },
    2,
    2,
  )
  .unwrap()
  .error_mode_continue(move |error, element| sink.lock().unwrap().push((error, element)))
  .handle();
  let probe = TestSubscriber::unbounded();
  operator.subscribe(TestSubscriber::as_subscriber(&probe));

  let mut values = probe.values();
  values.sort_unstable();
  assert_eq!(values, [1, 2, 4, 5, 6]);
  probe.assert_complete();
  assert_eq!(recovered.lock().unwrap().as_slice(), &[(StreamError::failed("skip me"), Some(3))]);
}

#[test]
fn continue_mode_retires_failing_inners() {
  let recovered = Arc::new(Mutex::new(Vec::new()));
  let sink = recovered.clone();

  let operator = flat_map(
    range(0, 3),
    |v: &u64| {
      Ok(if *v == 1 {
        MappedStream::Stream(fail(StreamError::failed("inner")))
      } else {
        MappedStream::Stream(iter(vec![*v * 10, *v * 10 + 1]))
      })
    },
    4,
    4,
  )
  .unwrap()
  .error_mode_continue(move |error, element| sink.lock().unwrap().push((error, element)))
  .handle();
  let probe = TestSubscriber::unbounded();
  operator.subscribe(TestSubscriber::as_subscriber(&probe));

  let mut values = probe.values();
  values.sort_unstable();
  assert_eq!(values, [0, 1, 20, 21]);
  probe.assert_complete();
  assert_eq!(recovered.lock().unwrap().as_slice(), &[(StreamError::failed("inner"), None)]);
}

#[test]
fn async_fused_inner_delivers_through_its_queue() {
  let upstream = ManualPublisher::<u64>::new();
  let inner_source = FusedManualPublisher::<u64>::async_fused();
  let inner_handle = inner_source.clone();
  let operator = flat_map(upstream.handle(), move |_: &u64| Ok(MappedStream::Stream(inner_handle.handle())), 4, 8)
    .unwrap()
    .handle();
  let probe = TestSubscriber::unbounded();
  operator.subscribe(TestSubscriber::as_subscriber(&probe));

  upstream.emit(1);
  assert_eq!(inner_source.granted_mode(), FusionMode::Async);

  inner_source.emit(7);
  inner_source.emit(8);
  probe.assert_values(&[7, 8]);

  inner_source.complete();
  upstream.complete();
  probe.assert_complete();
}

#[test]
fn async_fused_inner_failure_surfaces_after_delivered_values() {
  let upstream = ManualPublisher::<u64>::new();
  let inner_source = FusedManualPublisher::<u64>::async_fused();
  let inner_handle = inner_source.clone();
  let operator = flat_map(upstream.handle(), move |_: &u64| Ok(MappedStream::Stream(inner_handle.handle())), 4, 8)
    .unwrap()
    .handle();
  let probe = TestSubscriber::unbounded();
  operator.subscribe(TestSubscriber::as_subscriber(&probe));

  upstream.emit(1);
  inner_source.emit(7);
  inner_source.fail(StreamError::failed("async"));
  probe.assert_values(&[7]);
  probe.assert_error(|error| *error == StreamError::failed("async"));
  assert!(upstream.is_cancelled());
}

#[test]
fn plain_inners_replenish_in_prefetch_batches() {
  let upstream = ManualPublisher::<u64>::new();
  let inner_source = ManualPublisher::<u64>::new();
  let inner_handle = inner_source.clone();
  let operator = flat_map(upstream.handle(), move |_: &u64| Ok(MappedStream::Stream(inner_handle.handle())), 4, 4)
    .unwrap()
    .handle();
  let probe = TestSubscriber::unbounded();
  operator.subscribe(TestSubscriber::as_subscriber(&probe));

  upstream.emit(1);
  assert_eq!(inner_source.requested(), 4);

  let mut emitted = 0_u64;
  for value in 0..10_u64 {
    assert!(inner_source.requested() > emitted, "no outstanding inner demand before element {value}");
    inner_source.emit(value);
    emitted += 1;
  }
  // limit = prefetch - prefetch / 4 = 3, so three batches have been granted.
  assert!(inner_source.requested() >= 10);

  inner_source.complete();
  upstream.complete();
  probe.assert_values(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
  probe.assert_complete();
}
