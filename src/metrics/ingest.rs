//! Ingest phase metrics: fetch outcomes and row-level data quality.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct IngestMetrics;

impl IngestMetrics {
    pub fn record_fetch_success(rows_decoded: usize, rows_dropped: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "ingest", "fetches_succeeded")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "ingest", "rows_decoded"))
            .increment(rows_decoded as u64);
        ::metrics::histogram!(phase_metric!(histogram, "ingest", "rows_dropped_per_fetch"))
            .record(rows_dropped as f64);
        ::metrics::histogram!(phase_metric!(histogram, "ingest", "fetch_duration_seconds"))
            .record(duration_secs);
    }

    pub fn record_fetch_failure(kind: &'static str) {
        ::metrics::counter!(phase_metric!(counter, "ingest", "fetches_failed"), "kind" => kind)
            .increment(1);
    }

    /// A row whose date could not be parsed.
    pub fn record_row_dropped() {
        ::metrics::counter!(phase_metric!(counter, "normalize", "rows_dropped")).increment(1);
    }
}

impl PhaseMetrics for IngestMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "ingest", "fetches_succeeded"));
        let _ = counter!(phase_metric!(counter, "ingest", "fetches_failed"));
        let _ = counter!(phase_metric!(counter, "ingest", "rows_decoded"));
        let _ = counter!(phase_metric!(counter, "normalize", "rows_dropped"));
        let _ = histogram!(phase_metric!(histogram, "ingest", "rows_dropped_per_fetch"));
        let _ = histogram!(phase_metric!(histogram, "ingest", "fetch_duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "ingest"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "ingest", "fetches_succeeded"),
                metric_type: MetricType::Counter,
                help: "Feed fetches that decoded successfully",
            },
            MetricDoc {
                name: phase_metric!(counter, "ingest", "fetches_failed"),
                metric_type: MetricType::Counter,
                help: "Feed fetches that failed, by kind",
            },
            MetricDoc {
                name: phase_metric!(counter, "ingest", "rows_decoded"),
                metric_type: MetricType::Counter,
                help: "CSV rows decoded across all fetches",
            },
            MetricDoc {
                name: phase_metric!(counter, "normalize", "rows_dropped"),
                metric_type: MetricType::Counter,
                help: "Rows dropped because their date did not parse",
            },
            MetricDoc {
                name: phase_metric!(histogram, "ingest", "rows_dropped_per_fetch"),
                metric_type: MetricType::Histogram,
                help: "Dropped rows per successful fetch",
            },
            MetricDoc {
                name: phase_metric!(histogram, "ingest", "fetch_duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Wall time of a successful fetch",
            },
        ]
    }
}
