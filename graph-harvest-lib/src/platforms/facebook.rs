use super::{Platform, PlatformKind, flatten_listing, flatten_object, skip_malformed};
use crate::config::{Config, FacebookSettings};
use crate::error::HarvestError;
use crate::graph::{Fetch, TimeWindow, fetch_listing};
use crate::reports::OutputDir;
use serde_json::{Map, Value};

const LOG_TARGET: &str = "facebook";

/// Page metadata is flattened the way `json_normalize` names nested columns.
const PAGE_SEPARATOR: &str = ".";
const POSTS_SEPARATOR: &str = "_";

/// Harvests a Facebook page: its details, daily page insights, and recent posts.
#[derive(Debug, Clone)]
pub struct Facebook {
    page_id: String,
    settings: FacebookSettings,
    period: String,
    listing_limit: u32,
    max_pages: u32,
}

impl Facebook {
    #[must_use]
    pub fn new(page_id: impl Into<String>, config: &Config) -> Self {
        let page_id = page_id.into();
        log::info!(target: LOG_TARGET, "Initialized Facebook harvest for page ID: {page_id}");

        Self {
            page_id,
            settings: config.facebook.clone(),
            period: config.insight_period.clone(),
            listing_limit: config.listing_limit,
            max_pages: config.max_pages,
        }
    }
}

impl Platform for Facebook {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Facebook
    }

    async fn get_insights<F: Fetch + Sync>(&self, fetcher: &F, window: TimeWindow) -> Result<Map<String, Value>, HarvestError> {
        let page_data = fetcher
            .fetch(&self.page_id, &[("fields", self.settings.page_fields.clone())], "fetch page details")
            .await?;

        let [since, until] = window.query_params();
        let insights_data = fetcher
            .fetch(
                &format!("{}/insights", self.page_id),
                &[
                    ("metric", self.settings.insight_metrics.join(",")),
                    ("period", self.period.clone()),
                    since,
                    until,
                ],
                "fetch page insights",
            )
            .await?;

        let posts_data = fetch_listing(
            fetcher,
            &format!("{}/posts", self.page_id),
            &[
                ("fields", self.settings.post_fields.clone()),
                ("limit", self.listing_limit.to_string()),
            ],
            "fetch recent posts",
            self.max_pages,
        )
        .await?;

        let mut data = Map::new();
        let _ = data.insert("page_data".to_string(), page_data);
        let _ = data.insert("insights_data".to_string(), insights_data);
        let _ = data.insert("posts_data".to_string(), posts_data);
        Ok(data)
    }

    fn save_platform_specific_data(&self, data: &Map<String, Value>, out: &OutputDir) -> Result<(), HarvestError> {
        if let Some(page) = data.get("page_data") {
            skip_malformed("page data", flatten_object(page, "page_data", PAGE_SEPARATOR).and_then(|table| {
                out.save_flat_table("facebook_page_data.csv", &table).map(drop)
            }))?;
        }

        if let Some(posts) = data.get("posts_data") {
            skip_malformed("posts data", flatten_listing(posts, "posts_data", POSTS_SEPARATOR).and_then(|table| match table {
                Some(table) => out.save_flat_table("facebook_posts_data.csv", &table).map(drop),
                None => Ok(()),
            }))?;
        }

        Ok(())
    }
}
