use async_trait::async_trait;

/// Outbound HTTP used by the feed ingestor.
#[async_trait]
pub trait HttpClientPort: Send + Sync {
    /// One GET, bypassing caches and following redirects. Non-2xx statuses
    /// are returned as `Ok`; only transport failures are `Err`.
    async fn get(&self, url: &str) -> Result<HttpGetResult, String>;
}

#[derive(Clone, Debug)]
pub struct HttpGetResult {
    pub status: u16,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl HttpGetResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
