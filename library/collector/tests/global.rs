use std::panic;
use std::sync::Arc;
use std::thread;

use cyclic_alloc::RcHeap;
use cyclic_collector::{global, CollectorConfig, WorkerId};

fn worker(raw: usize) -> WorkerId {
    WorkerId::from_raw(raw).unwrap()
}

// Everything touching the process-wide collector lives in one test, so the
// steps can't interleave with each other.
#[test]
fn global_collector_lifecycle() {
    let _ = env_logger::builder().is_test(true).try_init();

    assert!(!global::is_initialized());
    assert!(panic::catch_unwind(|| global::rendezvous(worker(1))).is_err());
    assert!(panic::catch_unwind(global::deinit).is_err());

    let heap = Arc::new(RcHeap::new());
    let config = CollectorConfig::default().with_tick_threshold(u32::MAX);
    global::init(heap.clone(), config.clone());
    assert!(global::is_initialized());

    let again = heap.clone();
    let config2 = config.clone();
    assert!(
        panic::catch_unwind(panic::AssertUnwindSafe(move || global::init(again, config2)))
            .is_err()
    );
    // The failed second init left the original collector in place
    assert!(global::is_initialized());

    let a = heap.allocate();
    let b = heap.allocate();
    heap.add_edge(a, b).unwrap();
    heap.add_edge(b, a).unwrap();
    heap.release(a).unwrap();
    heap.release(b).unwrap();

    global::add_worker(worker(1));
    global::add_worker(worker(2));
    global::schedule_collection();
    let other = thread::spawn(|| {
        global::rendezvous(worker(2));
        global::remove_worker(worker(2));
    });
    global::rendezvous(worker(1));
    other.join().unwrap();

    // Worker 2 deregistered after the scan, collecting on its way out
    assert!(heap.is_empty());
    assert_eq!(global::stats().reclaimed, 2);
    assert_eq!(global::collect(), 0);
    assert_eq!(global::get().first_worker(), Some(worker(1)));

    global::remove_worker(worker(1));
    global::deinit();
    assert!(!global::is_initialized());
    assert!(panic::catch_unwind(global::deinit).is_err());
}
