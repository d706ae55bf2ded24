// Content fetcher - redirect resolution, then relay/direct fallback routes
//
// Every network call goes through the `Transport` trait so the route logic can
// run against scripted transports in tests. Failure is a normal outcome here:
// `fetch` returns a `FetchFailure` listing what each route did, and callers
// decide how to present it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_MIN_CONTENT_LENGTH: usize = 100;
const MAX_REDIRECTS: usize = 10;

/// Why a single route attempt produced no usable content
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server returned HTTP {0}")]
    Status(u16),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("response body was empty")]
    Empty,

    #[error("response too short ({len} chars, need more than {min})")]
    TooShort { len: usize, min: usize },

    #[error("relay response was not valid JSON: {0}")]
    InvalidJson(String),

    #[error("relay response had no `contents` field")]
    MissingContents,

    #[error("network access is disabled")]
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteFailure {
    pub route: String,
    pub error: FetchError,
}

/// Every route was tried and none produced content
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("all fetch routes failed for {requested_url} ({} attempts)", .attempts.len())]
pub struct FetchFailure {
    pub requested_url: String,
    pub resolved_url: String,
    pub attempts: Vec<RouteFailure>,
}

impl FetchFailure {
    /// One-line reason suitable for a warning or inline error string
    pub fn summary(&self) -> String {
        let details = self
            .attempts
            .iter()
            .map(|a| format!("{}: {}", a.route, a.error))
            .collect::<Vec<_>>()
            .join("; ");
        if details.is_empty() {
            self.to_string()
        } else {
            format!("{} [{}]", self, details)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedContent {
    pub requested_url: String,
    pub resolved_url: String,
    pub route: String,
    pub body: String,
}

/// The network boundary
#[async_trait]
pub trait Transport: Send + Sync {
    /// Follow redirects with a body-less request and report the final URL
    async fn resolve(&self, url: &str) -> Result<String, FetchError>;

    /// GET a URL and return its body as text (2xx only)
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        Self::from_builder(Self::client_builder(timeout))
    }

    fn client_builder(timeout: Duration) -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(format!("cmdpeek/{}", env!("CARGO_PKG_VERSION")))
    }

    fn from_builder(builder: reqwest::ClientBuilder) -> Result<Self, FetchError> {
        let client = builder.build().map_err(transport_error)?;
        Ok(Self { client })
    }
}

fn transport_error(e: reqwest::Error) -> FetchError {
    FetchError::Transport(e.to_string())
}

#[async_trait]
impl Transport for HttpTransport {
    async fn resolve(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.head(url).send().await.map_err(transport_error)?;
        Ok(response.url().to_string())
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await.map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }
        response.text().await.map_err(transport_error)
    }
}

/// Transport used with `--no-fetch`: every call fails immediately
pub struct OfflineTransport;

#[async_trait]
impl Transport for OfflineTransport {
    async fn resolve(&self, _url: &str) -> Result<String, FetchError> {
        Err(FetchError::Offline)
    }

    async fn get_text(&self, _url: &str) -> Result<String, FetchError> {
        Err(FetchError::Offline)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelayFormat {
    /// Body is the target's content
    Raw,
    /// Body is JSON with the target's content in `contents`
    JsonContents,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FetchRoute {
    #[serde(rename_all = "camelCase")]
    Relay {
        name: String,
        prefix: String,
        format: RelayFormat,
        #[serde(default)]
        encode_target: bool,
    },
    Direct,
}

impl FetchRoute {
    pub fn relay(name: &str, prefix: &str, format: RelayFormat, encode_target: bool) -> Self {
        FetchRoute::Relay {
            name: name.to_string(),
            prefix: prefix.to_string(),
            format,
            encode_target,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FetchRoute::Relay { name, .. } => name,
            FetchRoute::Direct => "direct",
        }
    }

    pub fn request_url(&self, target: &str) -> String {
        match self {
            FetchRoute::Relay {
                prefix,
                encode_target: true,
                ..
            } => format!("{}{}", prefix, urlencoding::encode(target)),
            FetchRoute::Relay { prefix, .. } => format!("{}{}", prefix, target),
            FetchRoute::Direct => target.to_string(),
        }
    }

    /// Pull the target's content out of a route response body
    pub fn unwrap_body(&self, body: String) -> Result<String, FetchError> {
        match self {
            FetchRoute::Relay {
                format: RelayFormat::JsonContents,
                ..
            } => {
                let value: serde_json::Value = serde_json::from_str(&body)
                    .map_err(|e| FetchError::InvalidJson(e.to_string()))?;
                value
                    .get("contents")
                    .and_then(|c| c.as_str())
                    .map(str::to_string)
                    .ok_or(FetchError::MissingContents)
            }
            _ => Ok(body),
        }
    }
}

/// Known redirector whose final URL can't be discovered generically
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectShortcut {
    /// Substring of the requested URL
    pub matches: String,
    pub final_url: String,
    pub title: String,
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FetchSettings {
    pub attempt_timeout_secs: u64,
    pub min_content_length: usize,
    pub routes: Vec<FetchRoute>,
    pub redirect_shortcuts: Vec<RedirectShortcut>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            attempt_timeout_secs: DEFAULT_ATTEMPT_TIMEOUT_SECS,
            min_content_length: DEFAULT_MIN_CONTENT_LENGTH,
            routes: vec![
                FetchRoute::relay("corsproxy", "https://corsproxy.io/?", RelayFormat::Raw, false),
                FetchRoute::relay(
                    "allorigins",
                    "https://api.allorigins.win/get?url=",
                    RelayFormat::JsonContents,
                    true,
                ),
                FetchRoute::relay(
                    "cors-anywhere",
                    "https://cors-anywhere.herokuapp.com/",
                    RelayFormat::Raw,
                    false,
                ),
                FetchRoute::Direct,
            ],
            redirect_shortcuts: vec![RedirectShortcut {
                matches: "christitus.com/win".to_string(),
                final_url:
                    "https://github.com/ChrisTitusTech/winutil/releases/latest/download/winutil.ps1"
                        .to_string(),
                title: "ChrisTitus Windows Utility Script".to_string(),
                notes: vec![
                    "This script typically contains PowerShell commands for Windows optimization"
                        .to_string(),
                    "Windows debloating tools".to_string(),
                    "System optimization settings".to_string(),
                    "Software installation utilities".to_string(),
                    "Registry modifications".to_string(),
                ],
            }],
        }
    }
}

impl FetchSettings {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    pub fn shortcut_for(&self, url: &str) -> Option<&RedirectShortcut> {
        self.redirect_shortcuts
            .iter()
            .find(|s| !s.matches.is_empty() && url.contains(&s.matches))
    }
}

pub struct ContentFetcher {
    transport: Arc<dyn Transport>,
    settings: FetchSettings,
    attempt_timeout: Duration,
}

impl ContentFetcher {
    pub fn new(transport: Arc<dyn Transport>, settings: FetchSettings) -> Self {
        let attempt_timeout = settings.attempt_timeout();
        Self {
            transport,
            settings,
            attempt_timeout,
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// Resolve redirects, then try each route in order until one yields content
    pub async fn fetch(&self, url: &str) -> Result<FetchedContent, FetchFailure> {
        let resolved_url = self.resolve_redirects(url).await;
        let mut attempts = Vec::new();

        for (i, route) in self.settings.routes.iter().enumerate() {
            let request_url = route.request_url(&resolved_url);
            debug!(
                "Fetch attempt {}/{} via {}: {}",
                i + 1,
                self.settings.routes.len(),
                route.name(),
                request_url
            );

            match self.attempt(route, &request_url).await {
                Ok(body) => {
                    info!(
                        "Fetched {} chars from {} via {}",
                        body.chars().count(),
                        resolved_url,
                        route.name()
                    );
                    return Ok(FetchedContent {
                        requested_url: url.to_string(),
                        resolved_url,
                        route: route.name().to_string(),
                        body,
                    });
                }
                Err(error) => {
                    warn!("Route {} failed for {}: {}", route.name(), resolved_url, error);
                    attempts.push(RouteFailure {
                        route: route.name().to_string(),
                        error,
                    });
                }
            }
        }

        warn!("All fetch routes failed for {}", resolved_url);
        Err(FetchFailure {
            requested_url: url.to_string(),
            resolved_url,
            attempts,
        })
    }

    async fn resolve_redirects(&self, url: &str) -> String {
        if let Some(shortcut) = self.settings.shortcut_for(url) {
            info!("Known redirect: {} -> {}", url, shortcut.final_url);
            return shortcut.final_url.clone();
        }

        match self.bounded(self.transport.resolve(url)).await {
            Ok(final_url) if final_url != url => {
                info!("Redirect detected: {} -> {}", url, final_url);
                final_url
            }
            Ok(_) => url.to_string(),
            Err(e) => {
                debug!("Redirect probe failed for {}, using original URL: {}", url, e);
                url.to_string()
            }
        }
    }

    async fn attempt(&self, route: &FetchRoute, request_url: &str) -> Result<String, FetchError> {
        let body = self.bounded(self.transport.get_text(request_url)).await?;
        let content = route.unwrap_body(body)?;

        if content.trim().is_empty() {
            return Err(FetchError::Empty);
        }
        let len = content.chars().count();
        if len <= self.settings.min_content_length {
            return Err(FetchError::TooShort {
                len,
                min: self.settings.min_content_length,
            });
        }
        Ok(content)
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, FetchError>>,
    ) -> Result<T, FetchError> {
        tokio::time::timeout(self.attempt_timeout, call)
            .await
            .map_err(|_| FetchError::Timeout(self.attempt_timeout))?
    }
}
