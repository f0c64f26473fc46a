//! Graph API client
//!
//! Minimal client that issues one authenticated GET per call and hands back
//! the decoded JSON body. Requests are never retried.

use crate::error::HarvestError;
use core::future::Future;
use reqwest::RequestBuilder;
use serde_json::Value;

const LOG_TARGET: &str = "graph";

/// Default Graph API root, including the API version.
pub const GRAPH_BASE_URL: &str = "https://graph.facebook.com/v18.0";

/// Source of raw JSON documents for named Graph API resources.
pub trait Fetch {
    /// Fetch `resource` (a path below the API root) with the given query parameters.
    ///
    /// `description` is a short human-readable label used for logging.
    fn fetch(
        &self,
        resource: &str,
        params: &[(&str, String)],
        description: &str,
    ) -> impl Future<Output = Result<Value, HarvestError>> + Send;

    /// Fetch an absolute URL previously handed out by the API, such as a `paging.next` link.
    fn fetch_url(&self, url: &str, description: &str) -> impl Future<Output = Result<Value, HarvestError>> + Send;
}

/// Graph API client bound to one access token.
#[derive(Clone)]
pub struct GraphClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl core::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GraphClient")
            .field("base_url", &self.base_url)
            .field("access_token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl GraphClient {
    /// Create a client for `base_url` that authenticates every request with `access_token`.
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> crate::Result<Self> {
        let client = reqwest::Client::builder().user_agent("graph-harvest").build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            access_token: access_token.into(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), resource.trim_start_matches('/'))
    }

    async fn send(&self, request: RequestBuilder, resource: &str) -> Result<Value, HarvestError> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                // the URL carries the access token
                let e = e.without_url();
                log::error!(target: LOG_TARGET, "API request failed: {e}");
                return Err(HarvestError::Transport {
                    resource: resource.to_string(),
                    status: None,
                    message: e.to_string(),
                    body: None,
                });
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok().filter(|b| !b.is_empty());
            log::error!(target: LOG_TARGET, "API request failed: HTTP status {status} for '{resource}'");
            if let Some(body) = &body {
                log::error!(target: LOG_TARGET, "Error response: {body}");
            }

            return Err(HarvestError::Transport {
                resource: resource.to_string(),
                status: Some(status),
                message: format!("HTTP status {}", if status.is_client_error() { "client error" } else { "server error" }),
                body,
            });
        }

        response.json::<Value>().await.map_err(|e| {
            let e = e.without_url();
            log::error!(target: LOG_TARGET, "Could not decode response for '{resource}': {e}");
            HarvestError::Transport {
                resource: resource.to_string(),
                status: Some(status),
                message: format!("decoding response body: {e}"),
                body: None,
            }
        })
    }
}

impl Fetch for GraphClient {
    async fn fetch(&self, resource: &str, params: &[(&str, String)], description: &str) -> Result<Value, HarvestError> {
        log::info!(target: LOG_TARGET, "Making API request: {description}");

        let mut query: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 1);
        query.push(("access_token", self.access_token.as_str()));
        query.extend(params.iter().map(|(k, v)| (*k, v.as_str())));

        let request = self.client.get(self.url_for(resource)).query(&query);
        self.send(request, resource).await
    }

    async fn fetch_url(&self, url: &str, description: &str) -> Result<Value, HarvestError> {
        log::info!(target: LOG_TARGET, "Making API request: {description}");

        // Only the path is safe to report; the query string holds the token.
        let resource = url.split('?').next().unwrap_or(url);
        self.send(self.client.get(url), resource).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_joins_slashes() {
        let client = GraphClient::new("https://graph.example.com/v18.0/", "token").unwrap();
        assert_eq!(client.url_for("/123/insights"), "https://graph.example.com/v18.0/123/insights");
        assert_eq!(client.url_for("123"), "https://graph.example.com/v18.0/123");
    }

    #[test]
    fn test_base_url() {
        let client = GraphClient::new(GRAPH_BASE_URL, "token").unwrap();
        assert_eq!(client.base_url(), GRAPH_BASE_URL);
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = GraphClient::new("http://localhost:1", "secret-token").unwrap();
        let debug = format!("{client:?}");
        assert!(debug.contains("localhost"));
        assert!(!debug.contains("secret-token"));
    }
}
