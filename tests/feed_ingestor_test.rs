mod common;

use std::sync::atomic::Ordering;

use chrono::NaiveDate;
use common::{ingestor, FakeHttp, SHEET_CSV, SHEET_URL};
use countdown_feed::{AttributedImage, DateParseError, FeedError};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_bad_date_row_is_dropped_not_fatal() {
    let feed = ingestor(FakeHttp::ok(SHEET_CSV));
    let actions = feed.fetch_feed(SHEET_URL).await;

    assert_eq!(actions.len(), 3);
    assert_eq!(
        actions.iter().map(|a| a.date).collect::<Vec<_>>(),
        vec![ymd(2025, 10, 18), ymd(2025, 10, 19), ymd(2025, 10, 20)]
    );
}

#[tokio::test]
async fn test_rows_are_normalized() {
    let feed = ingestor(FakeHttp::ok(SHEET_CSV));
    let actions = feed.fetch_feed(SHEET_URL).await;

    let first = &actions[0];
    assert_eq!(first.headline, "Call your representative");
    assert_eq!(first.labels, vec!["urgent", "phone"]);
    assert_eq!(first.link_text, "Get the script");
    assert_eq!(
        first.image_back,
        AttributedImage {
            url: "front1.png".to_string(),
            artist_name: "Ada".to_string(),
            artist_url: "https://ada.example".to_string(),
        }
    );

    let second = &actions[1];
    assert_eq!(second.link_text, "Learn more");
    assert_eq!(second.link_url, "#");
    assert_eq!(second.image_back.url, "back2.png");
    assert_eq!(second.image_back.artist_name, "Bo");
    assert_eq!(second.image_back.artist_url, "");

    assert_eq!(actions[2].labels, vec!["testing"]);
}

#[tokio::test]
async fn test_snapshot_reports_rejected_rows() {
    let feed = ingestor(FakeHttp::ok(SHEET_CSV));
    let snapshot = feed.fetch(SHEET_URL).await.unwrap();

    assert_eq!(snapshot.rows_decoded, 4);
    assert_eq!(snapshot.actions.len(), 3);
    assert_eq!(snapshot.rows_dropped(), 1);
    let rejected = &snapshot.rejected[0];
    assert_eq!(rejected.row_number, 3);
    assert_eq!(rejected.raw_date, "sometime soon");
    assert_eq!(
        rejected.reason,
        DateParseError::Unrecognized("sometime soon".to_string())
    );
}

// A failed fetch and an empty sheet look the same through `fetch_feed`.
// That collapse is intentional; `fetch` keeps the distinction.
#[tokio::test]
async fn test_non_success_status_collapses_to_empty() {
    let feed = ingestor(FakeHttp::status(404, SHEET_CSV));
    assert!(feed.fetch_feed(SHEET_URL).await.is_empty());

    let feed = ingestor(FakeHttp::status(503, SHEET_CSV));
    match feed.fetch(SHEET_URL).await {
        Err(FeedError::Status { status, url }) => {
            assert_eq!(status, 503);
            assert_eq!(url, SHEET_URL);
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_transport_failure_collapses_to_empty() {
    let feed = ingestor(FakeHttp::failing("connection refused"));
    assert!(feed.fetch_feed(SHEET_URL).await.is_empty());
    assert!(matches!(
        feed.fetch(SHEET_URL).await,
        Err(FeedError::Transport(msg)) if msg == "connection refused"
    ));
}

#[tokio::test]
async fn test_invalid_utf8_body_is_a_fetch_error() {
    let feed = ingestor(FakeHttp::bytes(200, vec![b'd', b'a', 0xff, 0xfe]));
    assert!(matches!(feed.fetch(SHEET_URL).await, Err(FeedError::Body(_))));
    assert!(feed.fetch_feed(SHEET_URL).await.is_empty());
}

#[tokio::test]
async fn test_empty_sheet_is_success_with_no_actions() {
    let feed = ingestor(FakeHttp::ok("date,headline\n"));
    let snapshot = feed.fetch(SHEET_URL).await.unwrap();
    assert!(snapshot.actions.is_empty());
    assert_eq!(snapshot.rows_decoded, 0);
}

#[tokio::test]
async fn test_single_request_per_fetch() {
    let http = std::sync::Arc::new(FakeHttp::status(500, ""));
    let feed = countdown_feed::FeedIngestor::new(
        http.clone(),
        std::sync::Arc::new(countdown_feed::FieldNormalizer::default()),
    );
    feed.fetch_feed(SHEET_URL).await;
    assert_eq!(http.requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unknown_columns_ignored_and_missing_columns_default() {
    let csv = "Date Notes,date,extra\nignored,3/28/26,whatever\n";
    let feed = ingestor(FakeHttp::ok(csv));
    let actions = feed.fetch_feed(SHEET_URL).await;
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].date, ymd(2026, 3, 28));
    assert_eq!(actions[0].headline, "");
    assert!(actions[0].labels.is_empty());
}
