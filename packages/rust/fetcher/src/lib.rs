//! HTTP retrieval of published blocklists.
//!
//! One contract: `fetch(url) -> text or error`. The caller treats any error
//! — DNS, timeout, non-2xx — as "this source is absent" and continues; an
//! unreachable source contributes nothing to its list. No retries, no
//! caching.

use std::time::Duration;

use reqwest::Client;
use sha2::{Digest, Sha256};
use tracing::debug;
use url::Url;

use ruleforge_shared::{Result, RuleForgeError};

/// User-Agent string for list downloads.
const USER_AGENT: &str = concat!("RuleForge/", env!("CARGO_PKG_VERSION"));

/// Downloads list text over HTTPS.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Create a fetcher with the default client: versioned UA, 30 s total
    /// timeout, bounded redirects.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RuleForgeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Fetch the UTF-8 body of `url`, requiring a 2xx response.
    pub async fn fetch(&self, url: &Url) -> Result<String> {
        debug!(%url, "downloading list");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| RuleForgeError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RuleForgeError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| RuleForgeError::Network(format!("{url}: body read failed: {e}")))?;

        debug!(
            %url,
            bytes = body.len(),
            content_hash = %content_hash(&body),
            "list downloaded"
        );

        Ok(body)
    }
}

/// SHA-256 hex digest of the fetched body, logged for feed traceability.
fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
