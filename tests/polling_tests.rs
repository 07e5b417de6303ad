//! Bounded polling tests
//!
//! Time is paused in every test so intervals and timeouts are exact.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use wallet_flows::polling::{FetchErrorPolicy, PollOutcome, PollService, PollSettings};

fn counting_fetch(
    attempts: &Arc<AtomicU32>,
) -> impl FnMut() -> std::future::Ready<Result<u32, std::io::Error>> {
    let attempts = attempts.clone();
    move || std::future::ready(Ok(attempts.fetch_add(1, Ordering::SeqCst) + 1))
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_wait_stops_before_next_attempt() {
    let service = Arc::new(PollService::new(|_: &u32| false));
    let attempts = Arc::new(AtomicU32::new(0));

    let poller = {
        let service = service.clone();
        let fetch = counting_fetch(&attempts);
        tokio::spawn(async move {
            service
                .poll(fetch, Duration::from_secs(10), Duration::from_secs(1))
                .await
        })
    };

    // Two attempts fire at 1s and 2s; cancel halfway to the third
    tokio::time::sleep(Duration::from_millis(2500)).await;
    let started_cancel = Instant::now();
    service.cancel();

    let outcome = poller.await.unwrap().unwrap();
    assert_eq!(outcome, PollOutcome::Cancelled);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert!(started_cancel.elapsed() < Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_handle_works_from_another_task() {
    let service = PollService::new(|_: &u32| false);
    let token = service.cancel_handle();
    let attempts = Arc::new(AtomicU32::new(0));

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        token.cancel();
    });

    let outcome = service
        .poll(counting_fetch(&attempts), Duration::from_secs(10), Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(outcome, PollOutcome::Cancelled);
    assert_eq!(attempts.load(Ordering::SeqCst), 0);
    assert!(service.is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn test_settings_drive_timeout_and_interval() {
    let service = PollService::new(|count: &u32| *count == 100);
    let attempts = Arc::new(AtomicU32::new(0));
    let settings = PollSettings {
        timeout: Duration::from_secs(3),
        interval: Duration::from_millis(500),
        on_error: FetchErrorPolicy::Continue,
    };
    let started = Instant::now();

    let outcome = service
        .poll_with(counting_fetch(&attempts), &settings)
        .await
        .unwrap();

    assert_eq!(outcome, PollOutcome::TimedOut);
    assert_eq!(attempts.load(Ordering::SeqCst), 6);
    assert_eq!(started.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_interval_longer_than_timeout_never_fetches() {
    let service = PollService::new(|_: &u32| true);
    let attempts = Arc::new(AtomicU32::new(0));

    let outcome = service
        .poll(counting_fetch(&attempts), Duration::from_secs(1), Duration::from_secs(2))
        .await
        .unwrap();

    assert_eq!(outcome, PollOutcome::TimedOut);
    assert_eq!(attempts.load(Ordering::SeqCst), 0);
    assert_eq!(outcome.matched(), None);
}
