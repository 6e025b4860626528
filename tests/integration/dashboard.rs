use std::time::Duration;

use finsight::config::DashboardConfig;
use finsight::core::{tier_cell, Dashboard};
use finsight::enrollment::EnrollmentFlow;
use finsight::models::{Market, SignalId, SignalKind, Tier};
use finsight::signals::{FeedFilter, SelectAction};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::test_utils::{
    mock_chart_data, mock_market_overview, signal_json, watchlist_item_json, TestBackend,
};

fn mixed_feed(ids: &[i64]) -> Value {
    let kinds = ["BUY", "SELL", "WATCH", "AVOID", "BUY"];
    Value::Array(
        ids.iter()
            .enumerate()
            .map(|(i, id)| signal_json(*id, kinds[i % kinds.len()]))
            .collect(),
    )
}

async fn mount_backend(backend: &TestBackend) {
    Mock::given(method("GET"))
        .and(path("/api/signals"))
        .and(query_param("plan", "FREE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mixed_feed(&[1, 2, 3, 4, 5])))
        .mount(&backend.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/signals"))
        .and(query_param("plan", "PRO"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mixed_feed(&[6, 1, 2, 3, 4, 5])))
        .mount(&backend.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/watchlist"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([watchlist_item_json("BHP.AX", Some(45.2))])),
        )
        .mount(&backend.server)
        .await;
    mock_market_overview(&backend.server).await;
    mock_chart_data(&backend.server).await;
}

async fn wait_for<F: Fn() -> bool>(condition: F) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition reached in time");
}

#[tokio::test]
async fn test_start_loads_every_source() {
    let backend = TestBackend::new().await;
    mount_backend(&backend).await;

    let (_writer, reader) = tier_cell(Tier::Free);
    let dashboard = Dashboard::new(backend.api.clone(), reader, &DashboardConfig::default(), None);
    dashboard.start().await;

    wait_for(|| {
        !dashboard.feed().is_loading()
            && !dashboard.watchlist().is_loading()
            && !dashboard.market_overview().loading
            && !dashboard.chart_data().loading
    })
    .await;

    assert_eq!(dashboard.feed().entries().len(), 5);
    assert!(dashboard.watchlist().contains("BHP.AX"));
    assert_eq!(dashboard.market_overview().data.unwrap().instrument_count(), 3);
    assert_eq!(dashboard.chart_data().data.unwrap().len(), 2);

    dashboard.stop().await;
}

#[tokio::test]
async fn test_feed_view_gates_free_tier() {
    let backend = TestBackend::new().await;
    mount_backend(&backend).await;

    let (_writer, reader) = tier_cell(Tier::Free);
    let dashboard = Dashboard::new(backend.api.clone(), reader, &DashboardConfig::default(), None);
    dashboard.start().await;
    wait_for(|| !dashboard.feed().is_loading()).await;

    let view = dashboard.feed_view(FeedFilter::all()).await;
    assert_eq!(view.tier, Tier::Free);
    assert_eq!(view.stats.total, 5);
    assert_eq!(view.stats.count(SignalKind::Buy), 2);
    // Initial load flags nothing
    assert_eq!(view.highlighted, None);

    let gated = view.gated();
    assert_eq!(gated.len(), 5);
    assert!(gated[..3].iter().all(|g| !g.is_obscured()));
    assert!(gated[3..].iter().all(|g| g.is_obscured()));
    assert_eq!(gated[0].select(), SelectAction::Open(SignalId(1)));
    assert_eq!(gated[4].select(), SelectAction::Upgrade);

    // Gating restarts at the top of a filtered view; stats still cover the whole feed
    let filtered = dashboard
        .feed_view(FeedFilter::all().with_signal(SignalKind::Buy))
        .await;
    assert_eq!(filtered.entries.len(), 2);
    assert!(filtered.gated().iter().all(|g| !g.is_obscured()));
    assert_eq!(filtered.stats.total, 5);

    let us_only = dashboard
        .feed_view(FeedFilter::all().with_market(Market::Us))
        .await;
    assert!(us_only.entries.is_empty());

    dashboard.stop().await;
}

#[tokio::test]
async fn test_enrollment_upgrade_refreshes_feed() {
    let backend = TestBackend::new().await;
    mount_backend(&backend).await;
    Mock::given(method("POST"))
        .and(path("/api/beta-signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "pending"})))
        .mount(&backend.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/beta-verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"plan": "PRO"})))
        .mount(&backend.server)
        .await;

    let (writer, reader) = tier_cell(Tier::Free);
    let enrollment = EnrollmentFlow::new(backend.api.clone(), writer);
    let dashboard = Dashboard::new(backend.api.clone(), reader, &DashboardConfig::default(), None);
    dashboard.start().await;
    wait_for(|| dashboard.feed().entries().len() == 5).await;

    enrollment.open();
    enrollment.choose_tier(Tier::Pro).unwrap();
    enrollment.set_name("Ada").unwrap();
    enrollment.set_email("ada@example.com").unwrap();
    enrollment.submit_details().await.unwrap();
    enrollment.input_code("123456").unwrap();
    assert_eq!(enrollment.submit_code().await.unwrap(), Tier::Pro);

    // No timer tick needed: the tier change triggers a refresh with the new plan
    wait_for(|| dashboard.feed().entries().len() == 6).await;
    assert_eq!(dashboard.tier(), Tier::Pro);
    assert_eq!(dashboard.feed().newest(), Some(SignalId(6)));

    let view = dashboard.feed_view(FeedFilter::all()).await;
    assert_eq!(view.tier, Tier::Pro);
    assert!(view.gated().iter().all(|g| !g.is_obscured()));

    let pro_requests = backend
        .requests_to("/api/signals")
        .await
        .into_iter()
        .filter(|req| req.url.query().unwrap_or_default().contains("plan=PRO"))
        .count();
    assert!(pro_requests >= 1);

    dashboard.stop().await;
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let backend = TestBackend::new().await;
    mount_backend(&backend).await;

    let (_writer, reader) = tier_cell(Tier::Free);
    let dashboard = Dashboard::new(backend.api.clone(), reader, &DashboardConfig::default(), None);
    dashboard.start().await;
    dashboard.stop().await;
    dashboard.stop().await;

    assert_eq!(dashboard.tier(), Tier::Free);
}

#[tokio::test]
async fn test_new_signal_is_highlighted_then_expires() {
    let backend = TestBackend::new().await;
    Mock::given(method("GET"))
        .and(path("/api/signals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mixed_feed(&[1, 2, 3])))
        .up_to_n_times(1)
        .mount(&backend.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/signals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mixed_feed(&[4, 1, 2, 3])))
        .mount(&backend.server)
        .await;
    mount_backend(&backend).await;

    let config = DashboardConfig {
        highlight_duration: Duration::from_millis(300),
        ..DashboardConfig::default()
    };
    let (_writer, reader) = tier_cell(Tier::Free);
    let dashboard = Dashboard::new(backend.api.clone(), reader, &config, None);
    dashboard.start().await;
    wait_for(|| dashboard.feed().entries().len() == 3).await;
    assert_eq!(dashboard.feed_view(FeedFilter::all()).await.highlighted, None);

    dashboard.feed().refresh_now().await.unwrap();

    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let view = dashboard.feed_view(FeedFilter::all()).await;
            if view.highlighted == Some(SignalId(4)) {
                assert!(view.is_highlighted(SignalId(4)));
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("new signal highlighted");

    // The mark expires on its own, without another poll
    tokio::time::sleep(Duration::from_millis(400)).await;
    let view = dashboard.feed_view(FeedFilter::all()).await;
    assert_eq!(view.highlighted, None);
    assert_eq!(view.entries.len(), 4);

    dashboard.stop().await;
}

#[tokio::test]
async fn test_second_start_does_not_duplicate_tier_refresh() {
    let backend = TestBackend::new().await;
    mount_backend(&backend).await;
    Mock::given(method("POST"))
        .and(path("/api/beta-signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "pending"})))
        .mount(&backend.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/beta-verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"plan": "PRO"})))
        .mount(&backend.server)
        .await;

    let (writer, reader) = tier_cell(Tier::Free);
    let enrollment = EnrollmentFlow::new(backend.api.clone(), writer);
    let dashboard = Dashboard::new(backend.api.clone(), reader, &DashboardConfig::default(), None);
    dashboard.start().await;
    dashboard.start().await;
    wait_for(|| dashboard.feed().entries().len() == 5).await;

    enrollment.open();
    enrollment.choose_tier(Tier::Pro).unwrap();
    enrollment.set_name("Ada").unwrap();
    enrollment.set_email("ada@example.com").unwrap();
    enrollment.submit_details().await.unwrap();
    enrollment.input_code("123456").unwrap();
    enrollment.submit_code().await.unwrap();

    wait_for(|| dashboard.feed().entries().len() == 6).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    let pro_requests = backend
        .requests_to("/api/signals")
        .await
        .into_iter()
        .filter(|req| req.url.query().unwrap_or_default().contains("plan=PRO"))
        .count();
    assert_eq!(pro_requests, 1);

    dashboard.stop().await;
}
