//! Prometheus metrics for the polling layer

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::models::Tier;

pub struct Metrics {
    registry: Registry,
    pub poll_attempts_total: IntCounterVec,
    pub poll_failures_total: IntCounterVec,
    pub poll_results_discarded_total: IntCounterVec,
    pub active_tier: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let poll_attempts_total = IntCounterVec::new(
            Opts::new("poll_attempts_total", "Refresh attempts dispatched per poller"),
            &["poller"],
        )?;
        let poll_failures_total = IntCounterVec::new(
            Opts::new("poll_failures_total", "Refresh attempts that failed per poller"),
            &["poller"],
        )?;
        let poll_results_discarded_total = IntCounterVec::new(
            Opts::new(
                "poll_results_discarded_total",
                "Results dropped because a newer attempt was already applied",
            ),
            &["poller"],
        )?;
        let active_tier = IntGauge::new("active_tier", "Active tier (0=FREE, 1=PRO, 2=ELITE)")?;

        registry.register(Box::new(poll_attempts_total.clone()))?;
        registry.register(Box::new(poll_failures_total.clone()))?;
        registry.register(Box::new(poll_results_discarded_total.clone()))?;
        registry.register(Box::new(active_tier.clone()))?;

        Ok(Self {
            registry,
            poll_attempts_total,
            poll_failures_total,
            poll_results_discarded_total,
            active_tier,
        })
    }

    pub fn record_tier(&self, tier: Tier) {
        self.active_tier.set(tier.rank() as i64);
    }

    /// Render all metrics in the Prometheus text format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
