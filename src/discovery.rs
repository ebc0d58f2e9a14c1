//! Backend Discovery
//!
//! Finds a live backend by probing candidate base URLs. Candidates are
//! probed concurrently with a short timeout each, and the winner is the
//! first candidate *in list order* that answered, so a preferred URL beats
//! a faster LAN address.

use async_trait::async_trait;
use futures_util::future::join_all;
use std::time::Duration;
use thiserror::Error;

use crate::session::Session;

/// Port assumed for candidate hosts given without one
pub const DEFAULT_PORT: u16 = 8090;

/// Discovery errors
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("No backend answered; tried: {}", tried.join(", "))]
    NoBackend { tried: Vec<String> },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Checks whether a base URL hosts a live backend
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn is_live(&self, base_url: &str) -> bool;
}

/// Probes `GET {base}/health/live` over HTTP
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Result<Self, DiscoveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HealthProbe for HttpProbe {
    async fn is_live(&self, base_url: &str) -> bool {
        let url = format!("{}/health/live", base_url.trim_end_matches('/'));
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Probe failed");
                false
            }
        }
    }
}

/// Turn `host`, `host:port` or a full URL into a base URL
pub fn normalize_candidate(candidate: &str) -> Option<String> {
    let trimmed = candidate.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return Some(trimmed.to_string());
    }
    if trimmed.contains(':') {
        Some(format!("http://{}", trimmed))
    } else {
        Some(format!("http://{}:{}", trimmed, DEFAULT_PORT))
    }
}

/// Ordered, de-duplicated candidate list.
///
/// Order: the URL remembered from the last run, the configured URL,
/// `localhost`, `127.0.0.1`, then the extra hosts (typically LAN IPs).
pub fn candidates(
    remembered: Option<&str>,
    configured: &str,
    extra_hosts: &[String],
) -> Vec<String> {
    let port = configured
        .rsplit(':')
        .next()
        .and_then(|p| p.trim_end_matches('/').parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);

    let local = [
        format!("http://localhost:{}", port),
        format!("http://127.0.0.1:{}", port),
    ];

    let mut out: Vec<String> = Vec::new();
    let all = remembered
        .into_iter()
        .chain(std::iter::once(configured))
        .chain(local.iter().map(String::as_str))
        .chain(extra_hosts.iter().map(String::as_str));

    for candidate in all {
        if let Some(url) = normalize_candidate(candidate) {
            if !out.contains(&url) {
                out.push(url);
            }
        }
    }
    out
}

/// Probe every candidate and return the first live one in list order
pub async fn discover(
    candidates: &[String],
    probe: &dyn HealthProbe,
) -> Result<String, DiscoveryError> {
    let results = join_all(candidates.iter().map(|c| probe.is_live(c))).await;

    match candidates
        .iter()
        .zip(results)
        .find_map(|(candidate, live)| live.then(|| candidate.clone()))
    {
        Some(url) => {
            tracing::info!(url = %url, "Backend discovered");
            Ok(url)
        }
        None => {
            tracing::warn!(tried = candidates.len(), "No backend answered");
            Err(DiscoveryError::NoBackend {
                tried: candidates.to_vec(),
            })
        }
    }
}

/// Discover a backend, preferring the one remembered in `session`, and
/// remember the winner for the next run
pub async fn discover_and_remember(
    session: &Session,
    configured: &str,
    extra_hosts: &[String],
    probe: &dyn HealthProbe,
) -> Result<String, DiscoveryError> {
    let remembered = session.api_base_url().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Could not read remembered backend URL");
        None
    });

    let list = candidates(remembered.as_deref(), configured, extra_hosts);
    let url = discover(&list, probe).await?;

    if remembered.as_deref() != Some(url.as_str()) {
        if let Err(e) = session.set_api_base_url(&url) {
            tracing::warn!(error = %e, "Could not remember backend URL");
        }
    }
    Ok(url)
}
