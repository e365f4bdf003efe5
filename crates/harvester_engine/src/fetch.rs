//! HTTP retrieval of listing pages for the static-page backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{Client, Response, Url};

use crate::{FetchError, FetchFailure, FetchMetadata, FetchOutput};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml;q=0.9,*/*;q=0.5";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    /// Ceiling for the whole request, body included.
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    /// Pages larger than this are refused, whether declared or streamed.
    pub max_bytes: u64,
    /// Media types accepted as listing markup, compared without parameters.
    pub allowed_content_types: Vec<String>,
    pub user_agent: String,
    pub accept_language: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 8 * 1024 * 1024,
            allowed_content_types: vec![
                "text/html".to_string(),
                "application/xhtml+xml".to_string(),
            ],
            user_agent: concat!(
                "Mozilla/5.0 (compatible; harvester/",
                env!("CARGO_PKG_VERSION"),
                ")"
            )
            .to_string(),
            accept_language: "en-IN,en;q=0.9".to_string(),
        }
    }
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError>;
}

/// Fetcher over `reqwest`. Each request gets its own client so the redirect
/// policy can report how many hops that request took.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn client(&self, hops: Arc<AtomicUsize>) -> Result<Client, FetchError> {
        let limit = self.settings.redirect_limit;
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            let seen = attempt.previous().len();
            hops.store(seen, Ordering::Relaxed);
            if seen <= limit {
                attempt.follow()
            } else {
                attempt.error(format!("more than {limit} redirects"))
            }
        });

        Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .user_agent(self.settings.user_agent.clone())
            .default_headers(self.default_headers())
            .redirect(policy)
            .build()
            .map_err(|err| FetchError::new(FetchFailure::Network, err.to_string()))
    }

    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        match HeaderValue::from_str(&self.settings.accept_language) {
            Ok(value) => {
                headers.insert(ACCEPT_LANGUAGE, value);
            }
            Err(_) => engine_warn!(
                "ignoring unusable Accept-Language {:?}",
                self.settings.accept_language
            ),
        }
        headers
    }

    fn check_content_type(&self, content_type: Option<&str>) -> Result<(), FetchError> {
        // Servers that omit the header get the benefit of the doubt.
        let Some(raw) = content_type else {
            return Ok(());
        };
        let essence = raw.split(';').next().unwrap_or(raw).trim();
        let allowed = self
            .settings
            .allowed_content_types
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(essence));
        if allowed {
            Ok(())
        } else {
            Err(FetchError::new(
                FetchFailure::UnsupportedContentType {
                    content_type: essence.to_string(),
                },
                format!("{raw} is not listing markup"),
            ))
        }
    }

    fn oversized(&self, actual: u64) -> FetchError {
        FetchError::new(
            FetchFailure::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }

    async fn read_capped(&self, response: Response) -> Result<Vec<u8>, FetchError> {
        let mut body = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(classify)?;
            let total = (body.len() + chunk.len()) as u64;
            if total > self.settings.max_bytes {
                return Err(self.oversized(total));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        let target =
            Url::parse(url).map_err(|err| FetchError::new(FetchFailure::InvalidUrl, err.to_string()))?;
        let hops = Arc::new(AtomicUsize::new(0));
        let response = self
            .client(hops.clone())?
            .get(target)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FetchFailure::HttpStatus(status.as_u16()),
                format!("{url} answered {status}"),
            ));
        }

        if let Some(declared) = response.content_length() {
            if declared > self.settings.max_bytes {
                return Err(self.oversized(declared));
            }
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self.check_content_type(content_type.as_deref())?;

        let bytes = self.read_capped(response).await?;
        let redirect_count = hops.load(Ordering::Relaxed);
        engine_debug!(
            "GET {url} -> {final_url}: {} bytes after {redirect_count} redirects",
            bytes.len()
        );

        Ok(FetchOutput {
            metadata: FetchMetadata {
                original_url: url.to_string(),
                final_url,
                redirect_count,
                content_type,
                byte_len: bytes.len() as u64,
            },
            bytes,
        })
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    let kind = if err.is_timeout() {
        FetchFailure::Timeout
    } else if err.is_redirect() {
        FetchFailure::RedirectLimitExceeded
    } else {
        FetchFailure::Network
    };
    FetchError::new(kind, err.to_string())
}
