pub mod app;
pub mod common;
pub mod completion;
pub mod config;
pub mod infra;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod server;
pub mod visibility;

pub use common::error::{ConfigError, DateParseError, FeedError};
pub use common::types::{AttributedImage, ImageAttribution, NormalizedAction, RawRow};
pub use pipeline::ingestion::{FeedIngestor, FeedSnapshot};
pub use pipeline::processing::date_parser::{parse_csv_date, parse_csv_date_with_year};
pub use pipeline::processing::normalize::{FieldNormalizer, Normalizer, NormalizerProfile};
pub use visibility::{GateMode, VisibilityGate};
