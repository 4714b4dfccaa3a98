#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use countdown_feed::app::ports::{HttpClientPort, HttpGetResult};
use countdown_feed::{FeedIngestor, FieldNormalizer};

pub const SHEET_URL: &str = "https://sheets.example/export?format=csv";

/// Answers every GET with a canned response and counts requests.
pub struct FakeHttp {
    response: Result<HttpGetResult, String>,
    pub requests: AtomicUsize,
}

impl FakeHttp {
    pub fn ok(body: &str) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self::bytes(status, body.as_bytes().to_vec())
    }

    pub fn bytes(status: u16, bytes: Vec<u8>) -> Self {
        Self {
            response: Ok(HttpGetResult {
                status,
                bytes,
                content_type: "text/csv".to_string(),
            }),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            requests: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl HttpClientPort for FakeHttp {
    async fn get(&self, _url: &str) -> Result<HttpGetResult, String> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

pub fn ingestor(http: FakeHttp) -> FeedIngestor {
    FeedIngestor::new(Arc::new(http), Arc::new(FieldNormalizer::default()))
}

/// Three good rows and one with an unparseable date.
pub const SHEET_CSV: &str = "\
date,headline,details,labels,link_text,link_url,social_message,image_front_url,image_front_artist,image_front_artist_url,image_back_url,image_back_artist,image_back_artist_url
2025-10-18,Call your representative,Script in the link,\"Urgent, Phone\",Get the script,https://example.org/script,I called!,front1.png,Ada,https://ada.example,,,
10/19/25,Write a letter,,letters,,,,front2.png,,,back2.png,Bo,
sometime soon,Broken row,,,,,,,,,,,
10/20/2025,Internal dry run,,Testing,,,,,,,,,
";
