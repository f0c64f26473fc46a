use reqwest::StatusCode;
use thiserror::Error;

/// Failure kinds produced while fetching, reshaping, or persisting Graph API data.
///
/// The command layer decides what each kind means for a run: `DataShape` skips
/// the affected section, everything else aborts.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// A credential, identifier, or configuration value is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The remote API answered with a non-2xx status or could not be reached.
    #[error("request for '{resource}' failed{}: {message}", status_suffix(.status.as_ref()))]
    Transport {
        resource: String,
        status: Option<StatusCode>,
        message: String,
        body: Option<String>,
    },

    /// A response lacks a key (or has the wrong type) needed for tabulation.
    #[error("unexpected data shape at '{path}': {reason}")]
    DataShape { path: String, reason: String },

    /// The same (timestamp, metric) pair occurred twice in a metric series.
    #[error("duplicate observation for metric '{metric}' at '{timestamp}'")]
    Collision { timestamp: String, metric: String },

    /// A scalar was flattened without a key to store it under.
    #[error("cannot flatten a bare {kind} without a key prefix")]
    TypeKind { kind: &'static str },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

fn status_suffix(status: Option<&StatusCode>) -> String {
    status.map(|s| format!(" with status {s}")).unwrap_or_default()
}

impl HarvestError {
    pub(crate) fn data_shape(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataShape {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error only invalidates one output section rather than the whole run.
    #[must_use]
    pub const fn is_section_local(&self) -> bool {
        matches!(self, Self::DataShape { .. })
    }
}
