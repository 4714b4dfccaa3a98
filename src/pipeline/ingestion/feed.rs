use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, debug_span, error, info, instrument};

use crate::app::ports::HttpClientPort;
use crate::common::constants::COL_DATE;
use crate::common::error::{DateParseError, FeedError, Result};
use crate::common::types::{NormalizedAction, RawRow};
use crate::metrics::IngestMetrics;
use crate::pipeline::ingestion::csv_rows::decode_rows;
use crate::pipeline::processing::normalize::Normalizer;

/// A row excluded from the feed because its date did not parse.
#[derive(Debug, Clone, Serialize)]
pub struct RejectedRow {
    /// 1-based position among decoded data rows (header not counted).
    pub row_number: usize,
    pub raw_date: String,
    #[serde(serialize_with = "serialize_display")]
    pub reason: DateParseError,
}

fn serialize_display<S: serde::Serializer>(
    value: &DateParseError,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Result of one successful fetch: the surviving actions plus an audit of
/// the rows that were dropped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedSnapshot {
    pub actions: Vec<NormalizedAction>,
    pub rows_decoded: usize,
    pub rejected: Vec<RejectedRow>,
}

impl FeedSnapshot {
    pub fn rows_dropped(&self) -> usize {
        self.rejected.len()
    }
}

pub struct FeedIngestor {
    http: Arc<dyn HttpClientPort>,
    normalizer: Arc<dyn Normalizer>,
}

impl FeedIngestor {
    pub fn new(http: Arc<dyn HttpClientPort>, normalizer: Arc<dyn Normalizer>) -> Self {
        Self { http, normalizer }
    }

    /// Fetch, decode and normalize the sheet at `source_url`.
    ///
    /// Rows with bad dates never fail the fetch; transport errors, non-2xx
    /// statuses, non-UTF-8 bodies and CSV errors do.
    #[instrument(skip(self))]
    pub async fn fetch(&self, source_url: &str) -> Result<FeedSnapshot> {
        let start = Instant::now();
        let result = self.fetch_inner(source_url).await;
        match &result {
            Ok(snapshot) => {
                IngestMetrics::record_fetch_success(
                    snapshot.rows_decoded,
                    snapshot.rows_dropped(),
                    start.elapsed().as_secs_f64(),
                );
                info!(
                    actions = snapshot.actions.len(),
                    dropped = snapshot.rows_dropped(),
                    "feed fetched"
                );
            }
            Err(e) => IngestMetrics::record_fetch_failure(e.kind()),
        }
        result
    }

    async fn fetch_inner(&self, source_url: &str) -> Result<FeedSnapshot> {
        let resp = self
            .http
            .get(source_url)
            .await
            .map_err(FeedError::Transport)?;
        if !resp.is_success() {
            return Err(FeedError::Status {
                status: resp.status,
                url: source_url.to_string(),
            });
        }
        debug!(
            bytes = resp.bytes.len(),
            content_type = %resp.content_type,
            "feed body received"
        );

        let text = String::from_utf8(resp.bytes)?;
        let rows = decode_rows(&text)?;
        Ok(self.normalize_rows(rows))
    }

    /// Fetch the feed, collapsing any failure into an empty list.
    ///
    /// Callers cannot tell "no actions" from "fetch failed" through this
    /// method; use [`FeedIngestor::fetch`] when the difference matters.
    pub async fn fetch_feed(&self, source_url: &str) -> Vec<NormalizedAction> {
        match self.fetch(source_url).await {
            Ok(snapshot) => snapshot.actions,
            Err(e) => {
                error!(url = source_url, kind = e.kind(), "Error fetching sheet data: {}", e);
                Vec::new()
            }
        }
    }

    /// Normalize decoded rows, keeping successes in input order.
    pub fn normalize_rows(&self, rows: Vec<RawRow>) -> FeedSnapshot {
        let rows_decoded = rows.len();
        let mut actions = Vec::with_capacity(rows_decoded);
        let mut rejected = Vec::new();

        for (index, row) in rows.iter().enumerate() {
            let row_number = index + 1;
            let _row = debug_span!("row", row = row_number).entered();
            match self.normalizer.normalize_or_drop(row) {
                Ok(action) => actions.push(action),
                Err(reason) => {
                    rejected.push(RejectedRow {
                        row_number,
                        raw_date: row.get(COL_DATE).to_string(),
                        reason,
                    });
                }
            }
        }

        FeedSnapshot {
            actions,
            rows_decoded,
            rejected,
        }
    }
}
