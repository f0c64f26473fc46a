use super::{Platform, PlatformKind, flatten_listing, flatten_object, skip_malformed};
use crate::config::{Config, InstagramSettings};
use crate::error::HarvestError;
use crate::graph::{Fetch, TimeWindow, fetch_listing};
use crate::reports::OutputDir;
use crate::tabular::DEFAULT_SEPARATOR;
use serde_json::{Map, Value};

const LOG_TARGET: &str = "instagram";

/// Harvests an Instagram business account: its profile, daily account insights, and recent media.
#[derive(Debug, Clone)]
pub struct Instagram {
    account_id: String,
    settings: InstagramSettings,
    period: String,
    listing_limit: u32,
    max_pages: u32,
}

impl Instagram {
    #[must_use]
    pub fn new(account_id: impl Into<String>, config: &Config) -> Self {
        let account_id = account_id.into();
        log::info!(target: LOG_TARGET, "Initialized Instagram harvest for account ID: {account_id}");

        Self {
            account_id,
            settings: config.instagram.clone(),
            period: config.insight_period.clone(),
            listing_limit: config.listing_limit,
            max_pages: config.max_pages,
        }
    }
}

impl Platform for Instagram {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Instagram
    }

    async fn get_insights<F: Fetch + Sync>(&self, fetcher: &F, window: TimeWindow) -> Result<Map<String, Value>, HarvestError> {
        let account_data = fetcher
            .fetch(&self.account_id, &[("fields", self.settings.account_fields.clone())], "fetch account details")
            .await?;

        let [since, until] = window.query_params();
        let insights_data = fetcher
            .fetch(
                &format!("{}/insights", self.account_id),
                &[
                    ("metric", self.settings.insight_metrics.join(",")),
                    ("period", self.period.clone()),
                    since,
                    until,
                ],
                "fetch account insights",
            )
            .await?;

        let media_data = fetch_listing(
            fetcher,
            &format!("{}/media", self.account_id),
            &[
                ("fields", self.settings.media_fields.clone()),
                ("limit", self.listing_limit.to_string()),
            ],
            "fetch recent media",
            self.max_pages,
        )
        .await?;

        let mut data = Map::new();
        let _ = data.insert("account_data".to_string(), account_data);
        let _ = data.insert("insights_data".to_string(), insights_data);
        let _ = data.insert("media_data".to_string(), media_data);
        Ok(data)
    }

    fn save_platform_specific_data(&self, data: &Map<String, Value>, out: &OutputDir) -> Result<(), HarvestError> {
        if let Some(account) = data.get("account_data") {
            skip_malformed("account data", flatten_object(account, "account_data", DEFAULT_SEPARATOR).and_then(|table| {
                out.save_flat_table("instagram_account_data.csv", &table).map(drop)
            }))?;
        }

        if let Some(media) = data.get("media_data") {
            skip_malformed("media data", flatten_listing(media, "media_data", DEFAULT_SEPARATOR).and_then(|table| match table {
                Some(table) => out.save_flat_table("instagram_media_data.csv", &table).map(drop),
                None => Ok(()),
            }))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::canned::CannedFetcher;
    use crate::platforms::save_data;
    use camino::Utf8PathBuf;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::fs;

    fn window() -> TimeWindow {
        TimeWindow::days_back(Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap(), 7)
    }

    fn account_fetcher() -> CannedFetcher {
        CannedFetcher::default()
            .with("17841", json!({"username": "bakery", "followers_count": 900, "media_count": 2, "id": "17841"}))
            .with(
                "17841/insights",
                json!({"data": [
                    {"name": "reach", "period": "day", "values": [
                        {"value": 50, "end_time": "2024-01-30T08:00:00+0000"},
                        {"value": 40, "end_time": "2024-01-29T08:00:00+0000"}
                    ]},
                    {"name": "profile_views", "period": "day", "values": [
                        {"value": 5, "end_time": "2024-01-30T08:00:00+0000"}
                    ]}
                ]}),
            )
            .with(
                "17841/media",
                json!({
                    "data": [{
                        "id": "m1",
                        "caption": "Croissants, fresh",
                        "media_type": "IMAGE",
                        "like_count": 11,
                        "insights": {"data": [
                            {"name": "reach", "values": [{"value": 30}]},
                            {"name": "saved", "values": [{"value": 2}]}
                        ]}
                    }],
                    "paging": {"next": "https://graph.example.com/17841/media?after=abc"}
                }),
            )
    }

    #[tokio::test]
    async fn test_get_insights_requests() {
        let fetcher = account_fetcher();
        let config = Config {
            insight_period: "week".to_string(),
            ..Config::default()
        };
        let data = Instagram::new("17841", &config).get_insights(&fetcher, window()).await.unwrap();

        assert_eq!(data.keys().collect::<Vec<_>>(), ["account_data", "insights_data", "media_data"]);
        assert_eq!(fetcher.requested(), ["17841", "17841/insights", "17841/media"]);

        let insights = fetcher.params_for("17841/insights");
        assert_eq!(
            insights["metric"],
            "impressions,reach,profile_views,website_clicks,email_contacts,get_directions_clicks,phone_call_clicks,text_message_clicks"
        );
        assert_eq!(insights["period"], "week");
        assert_eq!(fetcher.params_for("17841/media")["limit"], "100");
    }

    #[tokio::test]
    async fn test_save_writes_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let out = OutputDir::create(&root, "instagram", &Utc::now()).unwrap();

        let instagram = Instagram::new("17841", &Config::default());
        let data = instagram.get_insights(&account_fetcher(), window()).await.unwrap();
        save_data(&instagram, &data, &out).unwrap();

        let account = fs::read_to_string(out.file("instagram_account_data.csv")).unwrap();
        insta::assert_snapshot!(account, @r"
        username,followers_count,media_count,id
        bakery,900,2,17841
        ");

        let media = fs::read_to_string(out.file("instagram_media_data.csv")).unwrap();
        insta::assert_snapshot!(media, @r#"
        id,caption,media_type,like_count,insights_data
        m1,"Croissants, fresh",IMAGE,11,"[{'name': 'reach', 'values': [{'value': 30}]}, {'name': 'saved', 'values': [{'value': 2}]}]"
        "#);

        let wide = fs::read_to_string(out.file("instagram_daily_insights_pivot.csv")).unwrap();
        insta::assert_snapshot!(wide, @r"
        date,reach,profile_views
        2024-01-29 08:00:00+00:00,40,
        2024-01-30 08:00:00+00:00,50,5
        ");

        assert!(out.file("instagram_daily_insights.csv").exists());
        assert!(out.file("instagram_raw_data.json").exists());
    }
}
