/*
[INPUT]:  MetricsSnapshot from GET /api/metrics
[OUTPUT]: Chart-ready queue series, rounded display values, polled metrics view
[POS]:    Core - metrics aggregation for the dashboard
[UPDATE]: When the dashboard shows new derived values
*/

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use taskq_adapter::{MetricsSnapshot, Priority, TaskQueueApi};

use crate::poller::{PollSnapshot, PollingStore, Subscription};

/// One bar of the queue-depth chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuePoint {
    pub name: &'static str,
    pub tasks: u64,
}

/// Queue depth per priority, always High, Medium, Low.
pub fn queue_series(snapshot: &MetricsSnapshot) -> Vec<QueuePoint> {
    Priority::ALL
        .iter()
        .map(|priority| QueuePoint {
            name: priority.label(),
            tasks: snapshot.queue_sizes.get(*priority),
        })
        .collect()
}

/// Values exactly as the dashboard prints them.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsDisplay {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub failed_tasks: u64,
    pub pending_tasks: u64,
    pub processing_tasks: u64,
    /// e.g. `1235ms`
    pub avg_processing_time: String,
    /// e.g. `97.5%`
    pub success_rate: String,
    /// Success rate clamped to 0..=100 for gauges
    pub success_ratio: f64,
    pub queue: Vec<QueuePoint>,
}

impl MetricsDisplay {
    pub fn from_snapshot(snapshot: &MetricsSnapshot) -> Self {
        let success_ratio = if snapshot.success_rate.is_finite() {
            snapshot.success_rate.clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self {
            total_tasks: snapshot.total_tasks,
            completed_tasks: snapshot.completed_tasks,
            failed_tasks: snapshot.failed_tasks,
            pending_tasks: snapshot.pending_tasks,
            processing_tasks: snapshot.processing_tasks,
            avg_processing_time: format!("{}ms", snapshot.avg_processing_time.round() as i64),
            success_rate: format!("{:.1}%", snapshot.success_rate),
            success_ratio,
            queue: queue_series(snapshot),
        }
    }
}

/// Dashboard view model: polls metrics while active.
pub struct MetricsView {
    api: Arc<dyn TaskQueueApi>,
    interval: Duration,
    subscription: Option<Subscription<MetricsSnapshot>>,
}

impl MetricsView {
    pub fn new(api: Arc<dyn TaskQueueApi>, interval: Duration) -> Self {
        Self {
            api,
            interval,
            subscription: None,
        }
    }

    pub fn activate(&mut self) {
        if self.subscription.is_some() {
            return;
        }
        info!(interval_ms = self.interval.as_millis() as u64, "metrics polling started");
        let api = self.api.clone();
        self.subscription = Some(PollingStore::start(
            "metrics",
            move || {
                let api = api.clone();
                async move { api.get_metrics().await }
            },
            self.interval,
        ));
    }

    pub fn deactivate(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn refresh(&self) {
        if let Some(subscription) = &self.subscription {
            subscription.refresh();
        }
    }

    pub fn snapshot(&self) -> PollSnapshot<MetricsSnapshot> {
        self.subscription
            .as_ref()
            .map(Subscription::snapshot)
            .unwrap_or_default()
    }

    pub fn display(&self) -> Option<MetricsDisplay> {
        self.snapshot().data.as_ref().map(MetricsDisplay::from_snapshot)
    }
}

impl Drop for MetricsView {
    fn drop(&mut self) {
        self.deactivate();
    }
}
