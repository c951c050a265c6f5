use std::{
  sync::{Arc, Mutex},
  thread,
};

use rivulet_streams_rs::core::{
  ManualPublisher, MappedStream, SignalHooks, StreamError, TestSubscriber, flat_map, flat_map_delay_error,
};

#[test]
fn complete_versus_error_yields_exactly_one_terminal() {
  const ROUNDS: usize = 300;

  for round in 0..ROUNDS {
    let dropped = Arc::new(Mutex::new(Vec::new()));
    let sink = dropped.clone();

    let upstream = ManualPublisher::<usize>::new();
    let first = ManualPublisher::<u64>::new();
    let second = ManualPublisher::<u64>::new();
    let sources = [first.clone(), second.clone()];
    let operator = flat_map(upstream.handle(), move |index: &usize| Ok(MappedStream::Stream(sources[*index].handle())),
      2, 8)
    .unwrap()
    .with_hooks(SignalHooks::new().on_error_dropped(move |error| sink.lock().unwrap().push(error)))
    .handle();
    let probe = TestSubscriber::unbounded();
    operator.subscribe(TestSubscriber::as_subscriber(&probe));

    upstream.emit(0);
    upstream.emit(1);
    upstream.complete();

    let completer = thread::spawn(move || first.complete());
    let failer = thread::spawn(move || second.fail(StreamError::failed("expected")));
    completer.join().unwrap();
    failer.join().unwrap();

    let terminals = probe.completion_count() + probe.error_count();
    assert_eq!(terminals, 1, "round {round}: expected exactly one terminal");
    // One inner completing can never finish the merge while the other is
    // still live, so the failure must win the terminal.
    probe.assert_error(|error| *error == StreamError::failed("expected"));
    assert!(dropped.lock().unwrap().is_empty(), "round {round}: error was dropped instead of delivered");
  }
}

#[test]
fn delayed_mode_drops_racing_values_never_the_error() {
  const ROUNDS: usize = 200;

  for round in 0..ROUNDS {
    let upstream = ManualPublisher::<usize>::new();
    let first = ManualPublisher::<u64>::new();
    let second = ManualPublisher::<u64>::new();
    let sources = [first.clone(), second.clone()];
    let operator =
      flat_map_delay_error(upstream.handle(), move |index: &usize| Ok(MappedStream::Stream(sources[*index].handle())),
        2, 8)
      .unwrap()
      .handle();
    let probe = TestSubscriber::unbounded();
    operator.subscribe(TestSubscriber::as_subscriber(&probe));

    upstream.emit(0);
    upstream.emit(1);
    upstream.complete();

    let emitter = thread::spawn(move || {
      first.emit(1);
      first.complete();
    });
    let failer = thread::spawn(move || {
      second.fail(StreamError::failed("late"));
      second.complete();
    });
    emitter.join().unwrap();
    failer.join().unwrap();

    assert!(probe.value_count() <= 1, "round {round}: conservation violated");
    probe.assert_error(|error| *error == StreamError::failed("late"));
  }
}

#[test]
fn concurrent_inners_conserve_elements_and_per_inner_order() {
  const PER_INNER: u64 = 2_000;

  let upstream = ManualPublisher::<usize>::new();
  let first = ManualPublisher::<u64>::new();
  let second = ManualPublisher::<u64>::new();
  let sources = [first.clone(), second.clone()];
  let operator = flat_map(upstream.handle(), move |index: &usize| Ok(MappedStream::Stream(sources[*index].handle())),
    2, 16)
  .unwrap()
  .handle();
  let probe = TestSubscriber::unbounded();
  operator.subscribe(TestSubscriber::as_subscriber(&probe));

  upstream.emit(0);
  upstream.emit(1);

  let drive = |source: ManualPublisher<u64>, tag: u64| {
    thread::spawn(move || {
      let mut emitted = 0_u64;
      while emitted < PER_INNER {
        if source.requested() > emitted {
          source.emit(tag + emitted);
          emitted += 1;
        } else {
          thread::yield_now();
        }
      }
      source.complete();
    })
  };
  let left = drive(first, 1_000_000);
  let right = drive(second, 2_000_000);
  left.join().unwrap();
  right.join().unwrap();
  upstream.complete();

  let values = probe.values();
  assert_eq!(values.len(), 2 * PER_INNER as usize);
  for tag in [1_000_000_u64, 2_000_000] {
    let of_inner: Vec<u64> = values.iter().copied().filter(|v| *v >= tag && *v < tag + PER_INNER).collect();
    let expected: Vec<u64> = (tag..tag + PER_INNER).collect();
    assert_eq!(of_inner, expected);
  }
  probe.assert_complete();
}

#[test]
fn concurrent_requests_never_exceed_demand() {
  const PER_INNER: u64 = 1_000;

  let upstream = ManualPublisher::<usize>::new();
  let inner = ManualPublisher::<u64>::new();
  let inner_handle = inner.clone();
  let operator =
    flat_map(upstream.handle(), move |_: &usize| Ok(MappedStream::Stream(inner_handle.handle())), 1, 16)
      .unwrap()
      .handle();
  let probe = TestSubscriber::with_demand(0);
  operator.subscribe(TestSubscriber::as_subscriber(&probe));
  upstream.emit(0);

  let feeder = {
    let source = inner.clone();
    thread::spawn(move || {
      let mut emitted = 0_u64;
      while emitted < PER_INNER {
        if source.requested() > emitted {
          source.emit(emitted);
          emitted += 1;
        } else {
          thread::yield_now();
        }
      }
      source.complete();
    })
  };

  let requester = {
    let probe = probe.clone();
    thread::spawn(move || {
      for _ in 0..(PER_INNER / 10) {
        probe.request(10);
        thread::yield_now();
      }
    })
  };

  requester.join().unwrap();
  feeder.join().unwrap();
  upstream.complete();

  assert!(probe.value_count() as u64 <= PER_INNER);
  probe.request(10);
  assert_eq!(probe.value_count() as u64, PER_INNER);
  probe.assert_complete();
}
