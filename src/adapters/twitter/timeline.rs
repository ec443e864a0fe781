use crate::adapters::http::build_client;
use crate::adapters::twitter::oauth::{encode_query, OAuthSigner};
use crate::config::app_config::TwitterConfig;
use crate::core::{Record, Source};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use std::collections::VecDeque;
use std::time::Duration;

/// `x-rate-limit-*` headers of one response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub remaining: Option<u64>,
    pub reset: Option<i64>,
}

impl RateLimitStatus {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let number = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<i64>().ok())
        };

        Self {
            remaining: number("x-rate-limit-remaining").and_then(|v| u64::try_from(v).ok()),
            reset: number("x-rate-limit-reset"),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}

/// How long to sleep until the window identified by `reset` (epoch seconds) opens.
pub fn wait_duration(reset: Option<i64>, now: i64, fallback: Duration, buffer: Duration) -> Duration {
    match reset {
        Some(reset) => Duration::from_secs(reset.saturating_sub(now).max(0) as u64) + buffer,
        None => fallback,
    }
}

/// Every post of one account, newest first, paged with `max_id`.
///
/// Rate limits never surface as errors: a 429, or a page reporting zero remaining
/// calls, puts the source to sleep until the window resets.
pub struct TimelineSource {
    client: Client,
    signer: OAuthSigner,
    config: TwitterConfig,
    buffer: VecDeque<Record>,
    max_id: Option<u64>,
    exhausted: bool,
    window: Option<RateLimitStatus>,
    pages: usize,
}

impl TimelineSource {
    pub fn new(config: TwitterConfig) -> Result<Self> {
        let client = build_client(config.request_timeout_seconds())?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: TwitterConfig, client: Client) -> Self {
        Self {
            client,
            signer: OAuthSigner::new(config.credentials()),
            config,
            buffer: VecDeque::new(),
            max_id: None,
            exhausted: false,
            window: None,
            pages: 0,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/statuses/user_timeline.json",
            self.config.api_base().trim_end_matches('/')
        )
    }

    fn query_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("screen_name".to_string(), self.config.screen_name.clone()),
            ("count".to_string(), self.config.page_size().to_string()),
            (
                "include_rts".to_string(),
                self.config.include_retweets().to_string(),
            ),
        ];
        if let Some(max_id) = self.max_id {
            params.push(("max_id".to_string(), max_id.to_string()));
        }
        params
    }

    async fn sleep_until_reset(&self, reset: Option<i64>) {
        let wait = wait_duration(
            reset,
            chrono::Utc::now().timestamp(),
            self.config.rate_limit_fallback(),
            self.config.rate_limit_buffer(),
        );
        tracing::warn!("⏳ Rate limit reached, pausing for {:?}", wait);
        tokio::time::sleep(wait).await;
        tracing::info!("▶️ Resuming timeline enumeration");
    }

    async fn fetch_page(&mut self) -> Result<Vec<serde_json::Value>> {
        let url = self.endpoint();
        let params = self.query_params();

        loop {
            if let Some(window) = self.window.take() {
                self.sleep_until_reset(window.reset).await;
            }

            let auth = self.signer.authorization_header("GET", &url, &params)?;
            tracing::debug!("Requesting {} (max_id: {:?})", url, self.max_id);

            let response = self
                .client
                .get(format!("{}?{}", url, encode_query(&params)))
                .header(AUTHORIZATION, auth)
                .send()
                .await?;

            let status = response.status();
            let limit = RateLimitStatus::from_headers(response.headers());
            tracing::debug!("Timeline response status: {} ({:?})", status, limit);

            if status == StatusCode::TOO_MANY_REQUESTS {
                self.sleep_until_reset(limit.reset).await;
                continue;
            }

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(EtlError::AuthenticationError {
                    endpoint: url,
                    status: status.as_u16(),
                });
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(EtlError::EnumerationError {
                    message: format!("{} returned HTTP {}: {}", url, status, body),
                });
            }

            if limit.is_exhausted() {
                self.window = Some(limit);
            }

            return match response.json::<serde_json::Value>().await? {
                serde_json::Value::Array(items) => Ok(items),
                other => Err(EtlError::EnumerationError {
                    message: format!("expected a JSON array of posts, got: {}", other),
                }),
            };
        }
    }

    fn advance_cursor(&mut self, page: &[serde_json::Value]) {
        let oldest = page
            .iter()
            .filter_map(|post| post.get("id").and_then(|id| id.as_u64()))
            .min();

        match oldest {
            Some(id) if id > 0 && self.max_id.map_or(true, |prev| id - 1 < prev) => {
                self.max_id = Some(id - 1);
            }
            _ => {
                // 沒有可用的 id 就無法繼續往下翻頁
                tracing::warn!("Timeline page without a usable id, stopping pagination");
                self.exhausted = true;
            }
        }
    }
}

#[async_trait]
impl Source for TimelineSource {
    type Item = Record;

    async fn next_item(&mut self) -> Result<Option<Record>> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Ok(Some(record));
            }
            if self.exhausted {
                return Ok(None);
            }

            let page = self.fetch_page().await?;
            self.pages += 1;

            if page.is_empty() {
                tracing::info!(
                    "📭 Timeline of @{} exhausted after {} pages",
                    self.config.screen_name,
                    self.pages
                );
                self.exhausted = true;
                continue;
            }

            tracing::debug!("Page {} returned {} posts", self.pages, page.len());
            self.advance_cursor(&page);
            self.buffer.extend(page.into_iter().map(Record::from_json));
        }
    }
}
