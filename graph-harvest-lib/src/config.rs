use crate::Result;
use crate::error::HarvestError;
use crate::graph::GRAPH_BASE_URL;
use camino::{Utf8Path, Utf8PathBuf};
use ohno::IntoAppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../default_config.toml");

/// File looked up in the working directory when no configuration path is given.
pub const DEFAULT_CONFIG_FILE: &str = "harvest.toml";

const MAX_DAYS_BACK: u32 = 365;
const MAX_LISTING_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Graph API root, including the API version
    pub base_url: String,

    /// Root directory for run output
    pub output_dir: Utf8PathBuf,

    /// Number of days of insights to request, ending now
    pub days_back: u32,

    /// Aggregation period requested for insights
    pub insight_period: String,

    /// Page size requested for post and media listings
    pub listing_limit: u32,

    /// Maximum number of listing pages fetched per run
    pub max_pages: u32,

    pub facebook: FacebookSettings,

    pub instagram: InstagramSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FacebookSettings {
    pub page_fields: String,
    pub insight_metrics: Vec<String>,
    pub post_fields: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstagramSettings {
    pub account_fields: String,
    pub insight_metrics: Vec<String>,
    pub media_fields: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: GRAPH_BASE_URL.to_string(),
            output_dir: Utf8PathBuf::from("data"),
            days_back: 30,
            insight_period: "day".to_string(),
            listing_limit: 100,
            max_pages: 1,
            facebook: FacebookSettings::default(),
            instagram: InstagramSettings::default(),
        }
    }
}

impl Default for FacebookSettings {
    fn default() -> Self {
        Self {
            page_fields: "name,fan_count,followers_count,link,about,category,engagement".to_string(),
            insight_metrics: strings(&[
                "page_impressions",
                "page_engaged_users",
                "page_post_engagements",
                "page_views_total",
                "page_actions_post_reactions_total",
                "page_fan_adds",
                "page_fan_removes",
                "page_negative_feedback",
                "page_posts_impressions",
                "page_video_views",
            ]),
            post_fields: "message,created_time,likes.summary(true),comments.summary(true),shares,reactions.summary(true),\
                          insights.metric(post_impressions,post_engaged_users,post_negative_feedback),\
                          attachments{media_type,title,description,url}"
                .to_string(),
        }
    }
}

impl Default for InstagramSettings {
    fn default() -> Self {
        Self {
            account_fields: "username,followers_count,follows_count,media_count,profile_picture_url".to_string(),
            insight_metrics: strings(&[
                "impressions",
                "reach",
                "profile_views",
                "website_clicks",
                "email_contacts",
                "get_directions_clicks",
                "phone_call_clicks",
                "text_message_clicks",
            ]),
            media_fields: "id,caption,media_type,media_url,permalink,thumbnail_url,timestamp,comments_count,like_count,\
                           insights.metric(engagement,impressions,reach,saved)"
                .to_string(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// An explicit path must exist. Without one, `harvest.toml` in `base_dir`
    /// is used when present.
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8Path>) -> Result<Self> {
        Self::load_with_source(base_dir, config_path).map(|(config, _)| config)
    }

    /// Like [`Config::load`], also returning the file that was read, if any.
    pub fn load_with_source(base_dir: &Utf8Path, config_path: Option<&Utf8Path>) -> Result<(Self, Option<Utf8PathBuf>)> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading configuration file '{path}'"))?;
            (path.to_path_buf(), text)
        } else {
            let path = base_dir.join(DEFAULT_CONFIG_FILE);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok((Self::default(), None)),
                Err(e) => return Err(e).into_app_err_with(|| format!("reading configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate().into_app_err_with(|| format!("validating configuration file '{final_path}'"))?;

        log::debug!(target: "config", "Loaded configuration from '{final_path}'");
        Ok((config, Some(final_path)))
    }

    /// Save the default configuration to a TOML file
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), HarvestError> {
        if let Err(e) = url::Url::parse(&self.base_url) {
            return Err(HarvestError::Config(format!("base_url '{}' is not a valid URL: {e}", self.base_url)));
        }

        if self.output_dir.as_str().is_empty() {
            return Err(HarvestError::Config("output_dir must not be empty".to_string()));
        }

        if !(1..=MAX_DAYS_BACK).contains(&self.days_back) {
            return Err(HarvestError::Config(format!(
                "days_back must be between 1 and {MAX_DAYS_BACK}, got {}",
                self.days_back
            )));
        }

        if self.insight_period.trim().is_empty() {
            return Err(HarvestError::Config("insight_period must not be empty".to_string()));
        }

        if !(1..=MAX_LISTING_LIMIT).contains(&self.listing_limit) {
            return Err(HarvestError::Config(format!(
                "listing_limit must be between 1 and {MAX_LISTING_LIMIT}, got {}",
                self.listing_limit
            )));
        }

        if self.max_pages == 0 {
            return Err(HarvestError::Config("max_pages must be at least 1".to_string()));
        }

        check_metrics("facebook.insight_metrics", &self.facebook.insight_metrics)?;
        check_metrics("instagram.insight_metrics", &self.instagram.insight_metrics)?;

        Ok(())
    }
}

fn check_metrics(name: &str, metrics: &[String]) -> Result<(), HarvestError> {
    if metrics.is_empty() {
        return Err(HarvestError::Config(format!("{name} must list at least one metric")));
    }

    if let Some(bad) = metrics.iter().find(|m| m.trim().is_empty() || m.contains(',')) {
        return Err(HarvestError::Config(format!("{name} contains an invalid metric name '{bad}'")));
    }

    Ok(())
}
