//! Admission properties of the sliding-window limiter against the in-memory
//! store and a manual clock.

use std::sync::Arc;
use std::time::Duration;

use textgen_gateway::clock::ManualClock;
use textgen_gateway::rate_limit::{MemoryStore, SlidingWindowLimiter, WindowConfig};

const START: i64 = 1_760_000_000_000;

fn limiter(limit: u32, window_secs: u64) -> (SlidingWindowLimiter, ManualClock) {
    let clock = ManualClock::new(START);
    let store = Arc::new(MemoryStore::with_clock(Arc::new(clock.clone())));
    let limiter = SlidingWindowLimiter::new(
        WindowConfig::new(limit, window_secs),
        store,
        Arc::new(clock.clone()),
    );
    (limiter, clock)
}

#[tokio::test]
async fn quota_enforced_within_one_instant() {
    let (limiter, _clock) = limiter(4, 60);

    for _ in 0..4 {
        assert!(limiter.check_limit("a", "generate").await.unwrap().allowed);
    }
    let decision = limiter.check_limit("a", "generate").await.unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.remaining, 0);
}

#[tokio::test]
async fn window_expiry_readmits() {
    let (limiter, clock) = limiter(4, 60);
    for _ in 0..4 {
        limiter.check_limit("a", "generate").await.unwrap();
    }

    clock.advance(Duration::from_secs(61));
    let decision = limiter.check_limit("a", "generate").await.unwrap();
    assert!(decision.allowed);
    assert_eq!(decision.remaining, 3);
}

#[tokio::test]
async fn exhausting_one_key_leaves_others_alone() {
    let (limiter, _clock) = limiter(2, 60);
    for _ in 0..3 {
        limiter.check_limit("clientA", "generate").await.unwrap();
    }

    assert!(!limiter.check_limit("clientA", "generate").await.unwrap().allowed);
    assert!(limiter.check_limit("clientA", "root").await.unwrap().allowed);
    assert!(limiter.check_limit("clientB", "generate").await.unwrap().allowed);
}

#[tokio::test]
async fn rejected_requests_do_not_consume_quota() {
    let (limiter, clock) = limiter(3, 60);

    // stagger admissions so they age out one at a time
    for _ in 0..3 {
        assert!(limiter.check_limit("a", "generate").await.unwrap().allowed);
        clock.advance(Duration::from_secs(10));
    }
    for _ in 0..20 {
        assert!(!limiter.check_limit("a", "generate").await.unwrap().allowed);
    }

    // first admission was at START; at START + 61s exactly one slot is free
    clock.set(START + 61_000);
    assert!(limiter.check_limit("a", "generate").await.unwrap().allowed);
    assert!(!limiter.check_limit("a", "generate").await.unwrap().allowed);
}

#[tokio::test]
async fn remaining_is_limit_minus_admitted() {
    let (limiter, _clock) = limiter(6, 60);
    for k in 1..=6u32 {
        let decision = limiter.check_limit("a", "root").await.unwrap();
        assert_eq!(decision.remaining, 6 - k);
    }
}

#[tokio::test]
async fn ten_per_minute_scenario() {
    let (limiter, clock) = limiter(10, 60);

    let remaining: Vec<u32> = {
        let mut out = Vec::new();
        for _ in 0..10 {
            let decision = limiter.check_limit("1.2.3.4", "generate").await.unwrap();
            assert!(decision.allowed);
            out.push(decision.remaining);
        }
        out
    };
    assert_eq!(remaining, (0..10).rev().collect::<Vec<u32>>());

    let eleventh = limiter.check_limit("1.2.3.4", "generate").await.unwrap();
    assert!(!eleventh.allowed);
    assert_eq!(eleventh.remaining, 0);

    clock.advance(Duration::from_secs(61));
    let twelfth = limiter.check_limit("1.2.3.4", "generate").await.unwrap();
    assert!(twelfth.allowed);
    assert_eq!(twelfth.remaining, 9);
}

#[tokio::test]
async fn limiters_sharing_a_store_share_state() {
    let clock = ManualClock::new(START);
    let store = Arc::new(MemoryStore::with_clock(Arc::new(clock.clone())));
    let config = WindowConfig::new(2, 60);
    let first = SlidingWindowLimiter::new(config, store.clone(), Arc::new(clock.clone()));
    let second = SlidingWindowLimiter::new(config, store, Arc::new(clock));

    assert!(first.check_limit("a", "generate").await.unwrap().allowed);
    assert!(second.check_limit("a", "generate").await.unwrap().allowed);
    assert!(!first.check_limit("a", "generate").await.unwrap().allowed);
}
