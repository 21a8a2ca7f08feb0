//! Tests for the effect algebra.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::effect::prelude::*;
use crate::testing::{ManualScheduler, RecordingStore};

type TestStore = RecordingStore<u32, String>;

fn setup() -> (ManualScheduler, Arc<TestStore>) {
    let scheduler = ManualScheduler::new();
    let store = TestStore::new(0, scheduler.clone());
    (scheduler, store)
}

/// Dispatches `msg` and succeeds.
fn say(msg: &'static str) -> Effect<TestStore> {
    Effect::new(move |access: StoreAccess<TestStore>| async move {
        access.dispatch(msg.to_string());
        Ok(())
    })
}

/// Dispatches `msg` and fails with it.
fn fail_with(msg: &'static str) -> Effect<TestStore> {
    Effect::new(move |access: StoreAccess<TestStore>| async move {
        access.dispatch(msg.to_string());
        Err(EffectError::new(msg))
    })
}

fn counted<T: Clone + Send + Sync + 'static>(hits: &Arc<AtomicUsize>, value: T) -> Effect<TestStore, T> {
    let hits = hits.clone();
    Effect::new(move |_| {
        hits.fetch_add(1, Ordering::SeqCst);
        futures::future::ok(value.clone())
    })
}

type Log = Arc<Mutex<Vec<&'static str>>>;

/// Records `name` when invoked, before any polling.
fn mark(log: &Log, name: &'static str) -> Effect<TestStore> {
    let log = log.clone();
    Effect::new(move |_| {
        log.lock().unwrap().push(name);
        futures::future::ok(())
    })
}

fn run<T, E>(scheduler: &ManualScheduler, store: &Arc<TestStore>, effect: &Effect<TestStore, T, E>) -> Option<Result<T, E>>
where
    T: Send + 'static,
    E: Send + 'static,
{
    scheduler.block_on(effect.run(store.access()))
}

// Construction
#[test]
fn test_construction_performs_no_work() {
    let (scheduler, store) = setup();
    let hits = Arc::new(AtomicUsize::new(0));

    let _composite = seq!(
        say("a"),
        sequence(vec![say("b"), fail_with("c")]),
        par(vec![say("d"), say("e")]),
        catch(fail_with("f"), say("g")),
        counted(&hits, 1).fmap(|_| say("h")),
        delay(Duration::from_millis(10), say("i")),
        noop(),
    )
    .map(|_| 0u8)
    .context("composite");

    assert!(store.actions().is_empty());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn test_running_twice_performs_work_twice() {
    let (scheduler, store) = setup();
    let effect = say("again");

    run(&scheduler, &store, &effect);
    run(&scheduler, &store, &effect);

    assert_eq!(store.actions(), vec!["again", "again"]);
}

#[test]
fn test_clone_runs_same_work() {
    let (scheduler, store) = setup();
    let effect = say("x");
    let cloned = effect.clone();

    run(&scheduler, &store, &cloned);
    assert_eq!(store.actions(), vec!["x"]);
}

// AndThen
#[test]
fn test_and_then_runs_in_order_and_yields_second() {
    let (scheduler, store) = setup();
    let effect = say("first").and_then(pure::<TestStore, _, EffectError>(42));

    assert_eq!(run(&scheduler, &store, &effect), Some(Ok(42)));
    assert_eq!(store.actions(), vec!["first"]);
}

#[test]
fn test_and_then_does_not_run_second_after_failure() {
    let (scheduler, store) = setup();
    let effect = fail_with("first").and_then(say("second"));

    assert_eq!(
        run(&scheduler, &store, &effect),
        Some(Err(EffectError::new("first")))
    );
    assert_eq!(store.actions(), vec!["first"]);
}

// Fmap
#[test]
fn test_fmap_feeds_result_forward() {
    let (scheduler, store) = setup();
    let effect = pure::<TestStore, _, EffectError>(20).fmap(|n| pure(n + 1));

    assert_eq!(run(&scheduler, &store, &effect), Some(Ok(21)));
}

#[test]
fn test_fmap_branches_on_result() {
    let (scheduler, store) = setup();
    let effect = pure::<TestStore, _, EffectError>(true)
        .fmap(|ok| if ok { say("yes") } else { say("no") });

    run(&scheduler, &store, &effect);
    assert_eq!(store.actions(), vec!["yes"]);
}

#[test]
fn test_fmap_not_called_on_failure() {
    let (scheduler, store) = setup();
    let calls = Arc::new(AtomicUsize::new(0));

    let seen = calls.clone();
    let effect = fail::<TestStore, u32, _>(EffectError::new("nope")).fmap(move |n| {
        seen.fetch_add(1, Ordering::SeqCst);
        pure(n)
    });

    assert_eq!(
        run(&scheduler, &store, &effect),
        Some(Err(EffectError::new("nope")))
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// Map / MapErr
#[test]
fn test_map_transforms_value() {
    let (scheduler, store) = setup();
    let effect = pure::<TestStore, _, EffectError>(21).map(|x| x * 2);

    assert_eq!(run(&scheduler, &store, &effect), Some(Ok(42)));
}

#[test]
fn test_map_err_transforms_error() {
    let (scheduler, store) = setup();
    let effect = fail::<TestStore, u8, _>("raw").map_err(|e| format!("wrapped: {}", e));

    assert_eq!(
        run(&scheduler, &store, &effect),
        Some(Err("wrapped: raw".to_string()))
    );
}

#[test]
fn test_discard_keeps_failure() {
    let (scheduler, store) = setup();
    let effect = fail::<TestStore, u8, _>(EffectError::new("x")).discard();

    assert_eq!(
        run(&scheduler, &store, &effect),
        Some(Err(EffectError::new("x")))
    );
}

// Sequence
#[test]
fn test_sequence_runs_in_order_and_yields_last() {
    let (scheduler, store) = setup();
    let hits = Arc::new(AtomicUsize::new(0));
    let effect = sequence(vec![counted(&hits, 1), counted(&hits, 2), counted(&hits, 3)]);

    assert_eq!(run(&scheduler, &store, &effect), Some(Ok(Some(3))));
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[test]
fn test_sequence_dispatch_order() {
    let (scheduler, store) = setup();
    let effect = sequence(vec![say("1"), say("2"), say("3")]);

    run(&scheduler, &store, &effect);
    assert_eq!(store.actions(), vec!["1", "2", "3"]);
}

#[test]
fn test_sequence_halts_on_failure() {
    let (scheduler, store) = setup();
    let effect = sequence(vec![say("1"), fail_with("2"), say("3")]);

    assert_eq!(
        run(&scheduler, &store, &effect),
        Some(Err(EffectError::new("2")))
    );
    assert_eq!(store.actions(), vec!["1", "2"]);
}

#[test]
fn test_sequence_empty_is_noop() {
    let (scheduler, store) = setup();
    let effect = sequence(Vec::<Effect<TestStore, u8>>::new());

    assert_eq!(run(&scheduler, &store, &effect), Some(Ok(None)));
    assert!(store.actions().is_empty());
}

#[test]
fn test_seq_macro_mixes_result_types() {
    let (scheduler, store) = setup();
    let effect = seq!(say("a"), pure(7u8), pure("done"));

    assert_eq!(run(&scheduler, &store, &effect), Some(Ok("done")));
    assert_eq!(store.actions(), vec!["a"]);
}

// Par
#[test]
fn test_par_starts_all_without_waiting() {
    let (scheduler, store) = setup();
    let slow = |msg: &'static str| say(msg).delay(Duration::from_millis(100));
    let effect = par(vec![slow("left"), slow("right")]);

    assert_eq!(run(&scheduler, &store, &effect), Some(Ok(())));
    assert!(store.actions().is_empty());
    assert_eq!(scheduler.pending(), 2);

    scheduler.advance(Duration::from_millis(100));
    let mut actions = store.actions();
    actions.sort();
    assert_eq!(actions, vec!["left", "right"]);
}

#[test]
fn test_par_members_are_scheduled_not_inline() {
    let (scheduler, store) = setup();
    let effect = par(vec![say("a"), say("b")]);

    let mut done = scheduler.spawn(effect.run(store.access()));
    assert!(store.actions().is_empty());

    scheduler.run_until_stalled();
    assert_eq!(done.try_recv(), Ok(Some(Ok(()))));
    let mut actions = store.actions();
    actions.sort();
    assert_eq!(actions, vec!["a", "b"]);
}

#[test]
fn test_par_ignores_member_failure() {
    let (scheduler, store) = setup();
    let effect = par(vec![fail_with("bad"), say("good")]);

    assert_eq!(run(&scheduler, &store, &effect), Some(Ok(())));
    scheduler.run_until_stalled();

    let mut actions = store.actions();
    actions.sort();
    assert_eq!(actions, vec!["bad", "good"]);
}

#[test]
fn test_par_macro_mixes_result_types() {
    let (scheduler, store) = setup();
    let effect = par!(say("a"), pure::<TestStore, _, EffectError>(1u8));

    assert_eq!(run(&scheduler, &store, &effect), Some(Ok(())));
    assert_eq!(store.actions(), vec!["a"]);
}

#[test]
fn test_par_invokes_members_before_resolving() {
    let (_scheduler, store) = setup();
    let log = Log::default();
    let effect = par(vec![mark(&log, "a"), mark(&log, "b")]);

    let _pending = effect.run(store.access());
    assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
}

#[test]
fn test_par_members_start_before_next_sequence_step() {
    let (scheduler, store) = setup();
    let log = Log::default();
    let effect = sequence(vec![
        par(vec![mark(&log, "a"), mark(&log, "b")]),
        mark(&log, "after"),
    ]);

    assert_eq!(run(&scheduler, &store, &effect), Some(Ok(Some(()))));
    assert_eq!(*log.lock().unwrap(), vec!["a", "b", "after"]);
}

#[test]
fn test_queued_par_members_start_before_next_sequence_step() {
    let (scheduler, store) = setup();
    let log = Log::default();

    store.queue().push(sequence(vec![
        par(vec![mark(&log, "a"), mark(&log, "b")]),
        mark(&log, "after"),
    ]));
    store.interceptor().flush(&store);
    assert!(log.lock().unwrap().is_empty());

    scheduler.run_until_stalled();
    assert_eq!(*log.lock().unwrap(), vec!["a", "b", "after"]);
}

// Catch
#[test]
fn test_catch_skips_fallback_on_success() {
    let (scheduler, store) = setup();
    let hits = Arc::new(AtomicUsize::new(0));
    let effect = catch(pure::<TestStore, _, EffectError>(1), counted(&hits, 2));

    assert_eq!(run(&scheduler, &store, &effect), Some(Ok(1)));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn test_catch_runs_fallback_once_on_failure() {
    let (scheduler, store) = setup();
    let hits = Arc::new(AtomicUsize::new(0));
    let effect = fail_with("primary").map(|_| 0).catch(counted(&hits, 2));

    assert_eq!(run(&scheduler, &store, &effect), Some(Ok(2)));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(store.actions(), vec!["primary"]);
}

#[test]
fn test_catch_fallback_failure_propagates() {
    let (scheduler, store) = setup();
    let effect = catch(fail_with("a"), fail_with("b"));

    assert_eq!(
        run(&scheduler, &store, &effect),
        Some(Err(EffectError::new("b")))
    );
}

#[test]
fn test_catch_either_keeps_both_types() {
    let (scheduler, store) = setup();

    let primary_ok =
        pure::<TestStore, _, EffectError>(5u8).catch_either(pure::<_, _, EffectError>("fallback"));
    let primary_failed = fail::<TestStore, u8, _>(EffectError::new("x"))
        .catch_either(pure::<_, _, EffectError>("fallback"));

    assert_eq!(run(&scheduler, &store, &primary_ok), Some(Ok(Either::Left(5))));
    assert_eq!(
        run(&scheduler, &store, &primary_failed),
        Some(Ok(Either::Right("fallback")))
    );
}

// Delay
#[test]
fn test_delay_waits_for_clock() {
    let (scheduler, store) = setup();
    let effect = delay(Duration::from_millis(500), say("late"));

    let mut done = scheduler.spawn(effect.run(store.access()));
    scheduler.run_until_stalled();
    assert!(store.actions().is_empty());

    scheduler.advance(Duration::from_millis(499));
    assert!(store.actions().is_empty());

    scheduler.advance(Duration::from_millis(1));
    assert_eq!(store.actions(), vec!["late"]);
    assert_eq!(done.try_recv(), Ok(Some(Ok(()))));

    scheduler.advance(Duration::from_secs(10));
    assert_eq!(store.actions(), vec!["late"]);
}

#[test]
fn test_delay_does_not_block_other_effects() {
    let (scheduler, store) = setup();

    let _slow = scheduler.spawn(say("slow").delay(Duration::from_secs(1)).run(store.access()));
    let _fast = scheduler.spawn(say("fast").run(store.access()));
    scheduler.run_until_stalled();

    assert_eq!(store.actions(), vec!["fast"]);
    scheduler.advance(Duration::from_secs(1));
    assert_eq!(store.actions(), vec!["fast", "slow"]);
}

#[test]
fn test_delay_zero_runs_after_scheduling() {
    let (scheduler, store) = setup();
    let effect = say("now").delay(Duration::ZERO);

    assert_eq!(run(&scheduler, &store, &effect), Some(Ok(())));
    assert_eq!(store.actions(), vec!["now"]);
}

// Constructors
#[test]
fn test_noop_is_identity() {
    let (scheduler, store) = setup();
    let effect = noop::<TestStore, EffectError>().and_then(pure::<TestStore, _, EffectError>(3));

    assert_eq!(run(&scheduler, &store, &effect), Some(Ok(3)));
    assert!(store.actions().is_empty());
}

#[test]
fn test_from_fn_reads_state() {
    let scheduler = ManualScheduler::new();
    let store = TestStore::new(11, scheduler.clone());
    let effect = from_fn(|access: &StoreAccess<TestStore>| Ok::<_, EffectError>(access.get_state() * 2));

    assert_eq!(scheduler.block_on(effect.run(store.access())), Some(Ok(22)));
}

// Context and tracing
#[test]
fn test_context_builds_trail() {
    let (scheduler, store) = setup();
    let effect = fail_with("timeout").context("fetching user").context("loading page");

    let err = run(&scheduler, &store, &effect)
        .expect("finished")
        .expect_err("failed");
    assert_eq!(err.message(), "timeout");
    assert_eq!(err.context_trail(), &["fetching user", "loading page"]);
}

#[test]
fn test_instrument_preserves_result() {
    let (scheduler, store) = setup();
    let effect = pure::<TestStore, _, EffectError>(9).instrument(tracing::info_span!("test_span"));

    assert_eq!(run(&scheduler, &store, &effect), Some(Ok(9)));
}
