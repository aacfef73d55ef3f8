use super::*;
use crate::error::JanitorError;
use crate::proceed;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

async fn assert_resolves_every_variant<T>(value: T)
where
    T: Clone + PartialEq + Debug + Send + 'static,
{
    assert_eq!(resolve(Deferred::value(value.clone())).await.unwrap(), value);

    let v = value.clone();
    assert_eq!(resolve(Deferred::supplier(move || Ok(v))).await.unwrap(), value);

    let v = value.clone();
    assert_eq!(
        resolve(Deferred::future(async move { Ok(v) })).await.unwrap(),
        value
    );

    let v = value.clone();
    assert_eq!(
        resolve(Deferred::lazy(move || async move { Ok(v) }))
            .await
            .unwrap(),
        value
    );
}

#[tokio::test]
async fn test_resolve_is_uniform_across_variants() {
    assert_resolves_every_variant(5).await;
    assert_resolves_every_variant(true).await;
    assert_resolves_every_variant(false).await;
    assert_resolves_every_variant(0).await;
    assert_resolves_every_variant(1.23).await;
    assert_resolves_every_variant("test".to_string()).await;
    assert_resolves_every_variant(String::new()).await;
    assert_resolves_every_variant(vec![1, 2, 3]).await;
    assert_resolves_every_variant(Option::<u8>::None).await;
}

#[tokio::test]
async fn test_resolve_supplier_failure_becomes_error() {
    let result =
        resolve(Deferred::<u8>::supplier(|| Err(JanitorError::Raw("boom".into())))).await;
    assert_eq!(result.unwrap_err().to_string(), "Error: boom");
}

#[tokio::test]
async fn test_supplier_is_invoked_once() {
    let calls = AtomicUsize::new(0);
    let deferred = Deferred::supplier(|| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(7)
    });
    assert_eq!(deferred.resolve().await.unwrap(), 7);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_for_each_empty_never_invokes_task() {
    let calls = AtomicUsize::new(0);
    let results = for_each(Vec::<u8>::new(), |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Ok(()) }
    })
    .await
    .unwrap();
    assert!(results.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_for_each_settles_each_task_before_the_next() {
    let log = Arc::new(Mutex::new(Vec::new()));

    for_each(["a", "b", "c"], |item| {
        let log = Arc::clone(&log);
        log.lock().unwrap().push(format!("start {item}"));
        async move {
            tokio::task::yield_now().await;
            tokio::time::sleep(Duration::from_millis(2)).await;
            log.lock().unwrap().push(format!("end {item}"));
            Ok(())
        }
    })
    .await
    .unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["start a", "end a", "start b", "end b", "start c", "end c"]
    );
}

#[tokio::test]
async fn test_for_each_stops_at_first_failure() {
    let visited = Mutex::new(Vec::new());

    let result = for_each([1, 2, 3], |n| {
        visited.lock().unwrap().push(n);
        async move {
            if n == 2 {
                Err(JanitorError::Raw(format!("item {n}")))
            } else {
                Ok(n)
            }
        }
    })
    .await;

    assert_eq!(result.unwrap_err().to_string(), "Error: item 2");
    assert_eq!(*visited.lock().unwrap(), vec![1, 2]);
}

#[tokio::test]
async fn test_for_all_keeps_input_order() {
    let finished = Arc::new(Mutex::new(Vec::new()));

    let results = for_all([30u64, 5, 15], |delay| {
        let finished = Arc::clone(&finished);
        async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            finished.lock().unwrap().push(delay);
            Ok(delay)
        }
    })
    .await
    .unwrap();

    assert_eq!(results, vec![30, 5, 15]);
    assert_eq!(*finished.lock().unwrap(), vec![5, 15, 30]);
}

#[tokio::test]
async fn test_for_all_starts_every_task_before_awaiting() {
    let log = Arc::new(Mutex::new(Vec::new()));

    for_all(["x", "y"], |item| {
        let log = Arc::clone(&log);
        async move {
            log.lock().unwrap().push(format!("start {item}"));
            tokio::time::sleep(Duration::from_millis(5)).await;
            log.lock().unwrap().push(format!("end {item}"));
            Ok(())
        }
    })
    .await
    .unwrap();

    let log = log.lock().unwrap();
    assert_eq!(&log[..2], &["start x", "start y"]);
}

#[tokio::test]
async fn test_for_all_fails_fast() {
    let started = Instant::now();

    let result = for_all([0u64, 2_000], |delay| async move {
        if delay == 0 {
            return Err(JanitorError::Raw("fast failure".into()));
        }
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(delay)
    })
    .await;

    assert!(result.is_err());
    assert!(started.elapsed() < Duration::from_millis(1_000));
}

async fn gated_step(condition: Deferred<'_, bool>, ran: &AtomicBool) -> Outcome<()> {
    proceed!(only_if(condition).await);
    ran.store(true, Ordering::SeqCst);
    Ok(Flow::Proceed(()))
}

#[tokio::test]
async fn test_false_condition_skips_everything_after_it() {
    let ran = AtomicBool::new(false);
    let outcome = gated_step(Deferred::value(false), &ran).await.unwrap();
    assert!(outcome.is_skipped());
    assert!(!ran.load(Ordering::SeqCst));

    let outcome = gated_step(Deferred::future(async { Ok(false) }), &ran)
        .await
        .unwrap();
    assert!(outcome.is_skipped());
    assert!(!ran.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_true_condition_runs_next_step() {
    let ran = AtomicBool::new(false);
    let outcome = gated_step(Deferred::lazy(|| async { Ok(true) }), &ran)
        .await
        .unwrap();
    assert!(outcome.is_proceed());
    assert!(ran.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_when_accepts_literals() {
    assert_eq!(when(true).await.unwrap(), Flow::Proceed(()));
    assert_eq!(when(false).await.unwrap(), Flow::Skipped);
    assert_eq!(
        when(Deferred::supplier(|| Ok(true))).await.unwrap(),
        Flow::Proceed(())
    );
}

#[tokio::test]
async fn test_when_propagates_condition_failure() {
    let result = when(Deferred::<bool>::failed(JanitorError::Undefined)).await;
    assert!(matches!(result, Err(JanitorError::Undefined)));
}

async fn count_visits(items: &[bool], all: bool) -> (bool, usize) {
    let visits = AtomicUsize::new(0);
    let predicate = |value: &bool| {
        visits.fetch_add(1, Ordering::SeqCst);
        Deferred::value(*value)
    };
    let result = if all {
        if_all(items, predicate).await.unwrap()
    } else {
        if_any(items, predicate).await.unwrap()
    };
    (result, visits.load(Ordering::SeqCst))
}

#[tokio::test]
async fn test_if_any_visits_every_item() {
    assert_eq!(count_visits(&[true, true, true], false).await, (true, 3));
    assert_eq!(count_visits(&[false, false], false).await, (false, 2));
    assert_eq!(count_visits(&[true, false, false], false).await, (true, 3));
    assert_eq!(count_visits(&[], false).await, (false, 0));
}

#[tokio::test]
async fn test_if_all_visits_every_item() {
    assert_eq!(count_visits(&[true, true, true], true).await, (true, 3));
    assert_eq!(count_visits(&[false, false], true).await, (false, 2));
    assert_eq!(count_visits(&[false, true, true], true).await, (false, 3));
    assert_eq!(count_visits(&[], true).await, (true, 0));
}

#[tokio::test]
async fn test_if_any_propagates_predicate_failure() {
    let result = if_any([1, 2], |n| {
        if n == 2 {
            Deferred::failed(JanitorError::Raw("bad predicate".into()))
        } else {
            Deferred::value(false)
        }
    })
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_attempt_handles_synchronous_failure_once() {
    let calls = AtomicUsize::new(0);
    let outcome = attempt(
        || Err::<Deferred<'static, ()>, _>(JanitorError::Raw("sync".into())),
        |error| {
            assert_eq!(error.to_string(), "Error: sync");
            calls.fetch_add(1, Ordering::SeqCst);
            async {}
        },
    )
    .await;

    assert_eq!(outcome, Attempt::Thrown);
    assert!(outcome.is_failed());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_attempt_handles_later_rejection_once() {
    let calls = AtomicUsize::new(0);
    let outcome = attempt(
        || {
            Ok(Deferred::<()>::future(async {
                tokio::task::yield_now().await;
                Err(JanitorError::Document("rejected".into()))
            }))
        },
        |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async {}
        },
    )
    .await;

    assert_eq!(outcome, Attempt::Handled);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_attempt_success_never_calls_handler() {
    let calls = AtomicUsize::new(0);
    let outcome = attempt(
        || Ok(Deferred::lazy(|| async { Ok(42) })),
        |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async {}
        },
    )
    .await;

    assert_eq!(outcome.completed(), Some(42));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
