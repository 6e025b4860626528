//! Unit tests for feed filters and aggregate stats

use finsight::models::{Market, SignalKind};
use finsight::signals::{FeedFilter, FeedStats};

use crate::common::entry;

fn mixed_feed() -> Vec<finsight::models::SignalEntry> {
    let mut feed = vec![
        entry(1, SignalKind::Buy),
        entry(2, SignalKind::Sell),
        entry(3, SignalKind::Buy),
        entry(4, SignalKind::Watch),
        entry(5, SignalKind::Avoid),
    ];
    feed[1].market = Some(Market::Us);
    feed[3].market = Some(Market::Crypto);
    feed[0].confidence = 0.9;
    feed[1].confidence = 0.7;
    feed[2].confidence = 0.65;
    feed[3].confidence = 0.5;
    feed[4].confidence = 0.6;
    feed
}

#[test]
fn test_stats_count_every_entry() {
    let feed = mixed_feed();
    let stats = FeedStats::from_entries(&feed);

    assert_eq!(stats.total, 5);
    assert_eq!(stats.count(SignalKind::Buy), 2);
    assert_eq!(stats.count(SignalKind::Sell), 1);
    assert_eq!(stats.count(SignalKind::Avoid), 1);
    assert_eq!(stats.count(SignalKind::Watch), 1);
    // (0.9 + 0.7 + 0.65 + 0.5 + 0.6) / 5 = 0.67
    assert!((stats.avg_confidence - 0.67).abs() < 1e-9);
}

#[test]
fn test_stats_for_empty_feed() {
    let stats = FeedStats::from_entries(&[]);
    assert_eq!(stats.total, 0);
    assert_eq!(stats.avg_confidence, 0.0);
    assert_eq!(stats.counts.len(), 4);
    assert!(stats.counts.values().all(|count| *count == 0));
}

#[test]
fn test_filter_by_market_and_signal() {
    let feed = mixed_feed();

    let asx = FeedFilter::all().with_market(Market::Asx).apply(&feed);
    assert_eq!(asx.iter().map(|e| e.id.0).collect::<Vec<_>>(), vec![1, 3, 5]);

    let asx_buys = FeedFilter::all()
        .with_market(Market::Asx)
        .with_signal(SignalKind::Buy)
        .apply(&feed);
    assert_eq!(asx_buys.iter().map(|e| e.id.0).collect::<Vec<_>>(), vec![1, 3]);

    assert_eq!(FeedFilter::all().apply(&feed).len(), feed.len());
}
