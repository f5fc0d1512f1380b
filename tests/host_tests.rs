//! Caller-side adapter: argument validation, spill recovery, and async dispatch.

use std::time::Duration;

use serde_json::json;
use spillbuf::descriptor::MIN_SPILL_CAPACITY;
use spillbuf::{DemoLib, Error};

#[test]
fn consumer_sequence() {
    let lib = DemoLib::linked();

    assert_eq!(lib.to_upper("Initial value").unwrap(), "INITIAL VALUE");
    assert_eq!(lib.add_int32(&json!(1), &json!(1)).unwrap(), 2);
    assert_eq!(lib.add_double(&json!(2.9), &json!(2.0)).unwrap(), 4.9);
    assert_eq!(lib.base64_encode("Test").unwrap(), "VGVzdA==");
    assert_eq!(
        lib.filter_json(&json!({"a": "foo", "b": "bar"}), "foo").unwrap(),
        json!({"b": "bar"})
    );
}

#[test]
fn fractional_arguments_truncate_toward_zero() {
    let lib = DemoLib::linked();
    assert_eq!(lib.add_int32(&json!(2.9), &json!(-1.9)).unwrap(), 1);
    assert_eq!(lib.add_int64(&json!(1e15), &json!(0.5)).unwrap(), 1_000_000_000_000_000);
}

#[test]
fn invalid_arguments_never_reach_the_callee() {
    let lib = DemoLib::linked();
    for bad in [json!("1"), json!(null), json!([1]), json!({"n": 1})] {
        let err = lib.add_int32(&bad, &json!(1)).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)), "{bad}");
    }
    assert!(matches!(
        lib.add_double(&json!(true), &json!(1.0)),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        lib.sleep(&json!("2")),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn grown_results_are_recovered_from_spill() {
    let lib = DemoLib::linked();
    // U+0149 is 2 bytes and upper-cases to 3 bytes, so the output outgrows
    // its input-sized buffer.
    let text = "\u{149}".repeat(MIN_SPILL_CAPACITY);
    let upper = lib.to_upper(&text).unwrap();
    assert_eq!(upper, "\u{2bc}N".repeat(MIN_SPILL_CAPACITY));
    assert_eq!(lib.spill_manager().tracker().released(), 1);
}

#[test]
fn large_base64_output_is_sized_up_front() {
    let lib = DemoLib::linked();
    let text = "a".repeat(30_000);
    let encoded = lib.base64_encode(&text).unwrap();
    assert_eq!(encoded.len(), 40_000);
    assert_eq!(lib.spill_manager().tracker().released(), 0);
}

#[test]
fn counter_increments_and_spawn_is_idempotent() {
    let lib = DemoLib::linked();
    let before = lib.read_counter();
    let after = lib.increment_counter();
    assert!(after > before);

    lib.spawn_thread().unwrap();
    assert!(!lib.spawn_thread().unwrap(), "second spawn must not start a new ticker");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn async_sleep_keeps_the_caller_responsive() {
    let lib = DemoLib::linked();
    lib.spawn_thread().unwrap();
    let start = lib.read_counter();

    let mut call = lib.sleep_async(&json!(2)).unwrap();
    let mut reads_while_pending = 0;
    let mut poll = tokio::time::interval(Duration::from_millis(100));
    loop {
        tokio::select! {
            done = &mut call => {
                done.unwrap();
                break;
            }
            _ = poll.tick() => {
                let _ = lib.read_counter();
                reads_while_pending += 1;
            }
        }
    }

    assert!(reads_while_pending >= 5, "only {reads_while_pending} reads completed");
    assert!(lib.read_counter() > start);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn async_sleep_validates_before_dispatch() {
    let lib = DemoLib::linked();
    assert!(matches!(
        lib.sleep_async(&json!({"s": 1})),
        Err(Error::InvalidArgument(_))
    ));
    let negative = lib.sleep_async(&json!(-1)).unwrap();
    assert!(matches!(negative.await, Err(Error::InvalidArgument(_))));
}
