use std::{sync::Arc, thread};
use wireflow_config::Capacity;
use wireflow_link::{ChannelHandle, SenderCounts};

#[test]
fn nth_decrement_reports_zero() {
    let counts = SenderCounts::new();
    let chan = ChannelHandle::new::<i64>(Capacity::Bounded(1));

    for _ in 0..5 {
        counts.increment(chan.id());
    }
    assert_eq!(counts.count(chan.id()), 5);

    for _ in 0..4 {
        assert!(!counts.decrement(chan.id()));
    }
    assert!(counts.decrement(chan.id()));
    assert_eq!(counts.count(chan.id()), 0);
}

#[test]
fn untracked_channel_may_close() {
    let counts = SenderCounts::new();
    let chan = ChannelHandle::new::<i64>(Capacity::Bounded(1));

    assert!(counts.decrement(chan.id()));

    counts.increment(chan.id());
    assert!(counts.decrement(chan.id()));
    // underflow stays permissive
    assert!(counts.decrement(chan.id()));
}

#[test]
fn concurrent_releases_reach_zero_exactly_once() {
    let counts = Arc::new(SenderCounts::new());
    let chan = ChannelHandle::new::<i64>(Capacity::Bounded(1));
    let id = chan.id();

    for _ in 0..8 {
        counts.increment(id);
    }

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let counts = counts.clone();
            thread::spawn(move || counts.decrement(id))
        })
        .collect();
    let zeroes = workers
        .into_iter()
        .map(|worker| worker.join().unwrap())
        .filter(|&reached_zero| reached_zero)
        .count();

    assert_eq!(zeroes, 1);
    assert_eq!(counts.count(id), 0);
}
