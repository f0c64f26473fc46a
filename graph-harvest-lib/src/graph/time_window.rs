use chrono::{DateTime, Duration, Utc};

/// The `[since, until]` range requested for insights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl TimeWindow {
    /// The window ending at `now` and reaching `days` days back.
    #[must_use]
    pub fn days_back(now: DateTime<Utc>, days: u32) -> Self {
        Self {
            since: now - Duration::days(i64::from(days)),
            until: now,
        }
    }

    /// Query parameters in the unix-seconds form the insights endpoints expect.
    #[must_use]
    pub fn query_params(&self) -> [(&'static str, String); 2] {
        [
            ("since", self.since.timestamp().to_string()),
            ("until", self.until.timestamp().to_string()),
        ]
    }
}
