use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct VisibilityMetrics;

impl VisibilityMetrics {
    pub fn record_toggle(applied: bool) {
        let outcome = if applied { "applied" } else { "ignored" };
        ::metrics::counter!(phase_metric!(counter, "visibility", "toggles"), "outcome" => outcome)
            .increment(1);
    }
}

impl PhaseMetrics for VisibilityMetrics {
    fn register_metrics() {
        let _ = metrics::counter!(phase_metric!(counter, "visibility", "toggles"));
    }

    fn phase_name() -> &'static str {
        "visibility"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![MetricDoc {
            name: phase_metric!(counter, "visibility", "toggles"),
            metric_type: MetricType::Counter,
            help: "Dev-mode toggle requests, applied or ignored by the gate mode",
        }]
    }
}
