use std::sync::Arc;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::error::SearchError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("booktrove/", env!("CARGO_PKG_VERSION"));

/// HTTP client for one site, spacing requests at least `min_interval` apart.
#[derive(Clone)]
pub struct SiteClient {
    http: reqwest::Client,
    min_interval: Duration,
    last_request: Arc<Mutex<Instant>>,
}

impl SiteClient {
    pub fn new(min_interval: Duration) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        let start = Instant::now()
            .checked_sub(min_interval)
            .unwrap_or_else(Instant::now);
        Ok(Self {
            http,
            min_interval,
            last_request: Arc::new(Mutex::new(start)),
        })
    }

    /// GET `url` with `query` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, SearchError> {
        self.rate_limit().await;
        log::debug!("GET {url}");

        let resp = self.http.get(url).query(query).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if let Some(err) = classify_status(status, &text) {
            return Err(err);
        }
        serde_json::from_str(&text).map_err(|e| {
            SearchError::Parse(format!("{e}. Response: {}", truncate(&text, 200)))
        })
    }

    /// Download a cover image. Image hosts are not throttled.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, SearchError> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(classify_status(status, &text).unwrap_or(SearchError::NotFound));
        }
        Ok(resp.bytes().await?.to_vec())
    }

    /// Wait until at least `min_interval` has passed since the last request.
    async fn rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < self.min_interval {
            tokio::time::sleep(self.min_interval - elapsed).await;
        }
        *last = Instant::now();
    }
}

/// Map an unsuccessful HTTP status to an error. `None` for success.
pub fn classify_status(status: StatusCode, body: &str) -> Option<SearchError> {
    if status.is_success() {
        return None;
    }
    let err = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SearchError::Credentials(format!("HTTP {}", status.as_u16()))
        }
        // Google answers a bad API key with 400.
        StatusCode::BAD_REQUEST if body.contains("API key not valid") => {
            SearchError::Credentials("API key not valid".into())
        }
        StatusCode::NOT_FOUND => SearchError::NotFound,
        StatusCode::TOO_MANY_REQUESTS => SearchError::RateLimit,
        s => SearchError::Server {
            status: s.as_u16(),
            message: truncate(body, 200).to_string(),
        },
    };
    Some(err)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(classify_status(StatusCode::OK, "").is_none());
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, ""),
            Some(SearchError::Credentials(_))
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_REQUEST, r#"{"message":"API key not valid. Please pass a valid API key."}"#),
            Some(SearchError::Credentials(_))
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, ""),
            Some(SearchError::NotFound)
        ));
        let rate = classify_status(StatusCode::TOO_MANY_REQUESTS, "").unwrap();
        assert!(rate.is_retryable());
        let server = classify_status(StatusCode::BAD_GATEWAY, "upstream").unwrap();
        assert!(server.is_retryable());
        let bad = classify_status(StatusCode::BAD_REQUEST, "nope").unwrap();
        assert!(!bad.is_retryable());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
