//! Unit tests for poll metrics

use finsight::core::poller::Poller;
use finsight::error::FetchError;
use finsight::metrics::Metrics;
use finsight::models::Tier;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::Duration;

#[tokio::test]
async fn test_poll_counters_by_poller_name() {
    let metrics = Arc::new(Metrics::new().unwrap());
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let poller = Poller::builder("markets", Duration::from_secs(60), move || {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            if n == 1 {
                Err(FetchError::Decode {
                    url: "http://test/api/markets/overview".to_string(),
                    message: "expected object".to_string(),
                })
            } else {
                Ok(n)
            }
        }
    })
    .metrics(Some(metrics.clone()))
    .build();

    poller.refresh_now().await.unwrap();
    assert!(poller.refresh_now().await.is_err());
    poller.refresh_now().await.unwrap();

    let attempts = metrics.poll_attempts_total.with_label_values(&["markets"]).get();
    let failures = metrics.poll_failures_total.with_label_values(&["markets"]).get();
    assert_eq!(attempts, 3);
    assert_eq!(failures, 1);

    let text = metrics.export().unwrap();
    assert!(text.contains("poll_attempts_total{poller=\"markets\"} 3"));
}

#[test]
fn test_record_tier() {
    let metrics = Metrics::new().unwrap();
    metrics.record_tier(Tier::Elite);
    assert_eq!(metrics.active_tier.get(), 2);
    metrics.record_tier(Tier::Free);
    assert_eq!(metrics.active_tier.get(), 0);
}
