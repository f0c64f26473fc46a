use super::Fetch;
use crate::error::HarvestError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves canned documents keyed by resource path or URL and records every request.
///
/// A request for an unknown key fails with a 404 transport error.
#[derive(Debug, Default)]
pub struct CannedFetcher {
    documents: HashMap<String, Value>,
    requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl CannedFetcher {
    pub fn with(mut self, key: &str, value: Value) -> Self {
        let _ = self.documents.insert(key.to_string(), value);
        self
    }

    /// Keys requested so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requests.lock().unwrap().iter().map(|(key, _)| key.clone()).collect()
    }

    /// Query parameters sent with the first request for `key`.
    pub fn params_for(&self, key: &str) -> HashMap<String, String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, params)| params.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn serve(&self, key: &str, params: &[(&str, String)]) -> Result<Value, HarvestError> {
        self.requests
            .lock()
            .unwrap()
            .push((key.to_string(), params.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect()));

        self.documents.get(key).cloned().ok_or_else(|| HarvestError::Transport {
            resource: key.to_string(),
            status: Some(reqwest::StatusCode::NOT_FOUND),
            message: "HTTP status client error".to_string(),
            body: Some("{\"error\":{\"message\":\"Unsupported get request.\"}}".to_string()),
        })
    }
}

impl Fetch for CannedFetcher {
    async fn fetch(&self, resource: &str, params: &[(&str, String)], _description: &str) -> Result<Value, HarvestError> {
        self.serve(resource, params)
    }

    async fn fetch_url(&self, url: &str, _description: &str) -> Result<Value, HarvestError> {
        self.serve(url, &[])
    }
}
