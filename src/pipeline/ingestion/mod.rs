pub mod csv_rows;
pub mod feed;

pub use csv_rows::decode_rows;
pub use feed::{FeedIngestor, FeedSnapshot, RejectedRow};
