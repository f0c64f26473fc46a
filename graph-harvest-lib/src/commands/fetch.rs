use super::Host;
use super::common::{LoggingArgs, init_logging};
use crate::Result;
use crate::config::Config;
use crate::error::HarvestError;
use crate::graph::{Fetch, GraphClient, TimeWindow};
use crate::platforms::{Facebook, Instagram, Platform, PlatformKind, save_data};
use crate::reports::OutputDir;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{Local, Utc};
use clap::Args;
use ohno::IntoAppError;
use std::io::Write;
use strum::IntoEnumIterator;

const LOG_TARGET: &str = "harvest";

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Platforms to harvest, in order (default is all of them)
    #[arg(value_name = "PLATFORM")]
    pub platforms: Vec<PlatformKind>,

    /// Graph API access token
    #[arg(long, value_name = "TOKEN", env = "FACEBOOK_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Facebook page to harvest
    #[arg(long, value_name = "ID", env = "PAGE_ID")]
    pub page_id: Option<String>,

    /// Instagram business account to harvest
    #[arg(long, value_name = "ID", env = "INSTAGRAM_BUSINESS_ACCOUNT_ID")]
    pub instagram_account_id: Option<String>,

    /// Path to configuration file (default is `harvest.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Root directory for run output, overriding the configuration
    #[arg(long, value_name = "PATH")]
    pub output_dir: Option<Utf8PathBuf>,

    /// Number of days of insights to request, overriding the configuration
    #[arg(long, value_name = "DAYS")]
    pub days_back: Option<u32>,

    /// Maximum number of listing pages to fetch, overriding the configuration
    #[arg(long, value_name = "COUNT")]
    pub max_pages: Option<u32>,

    /// Graph API root URL, overriding the configuration
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

/// A platform paired with the identifier it harvests.
#[derive(Debug)]
enum Target {
    Facebook(String),
    Instagram(String),
}

impl Target {
    const fn kind(&self) -> PlatformKind {
        match self {
            Self::Facebook(_) => PlatformKind::Facebook,
            Self::Instagram(_) => PlatformKind::Instagram,
        }
    }
}

pub async fn process_fetch<H: Host>(host: &mut H, args: &FetchArgs) -> Result<()> {
    init_logging(&args.logging)?;

    let config = load_config(args)?;
    let platforms = requested_platforms(&args.platforms);

    // every credential is checked before the first request goes out
    let access_token = required(args.access_token.as_deref(), "FACEBOOK_ACCESS_TOKEN")?;
    let targets = platforms
        .iter()
        .map(|kind| match kind {
            PlatformKind::Facebook => required(args.page_id.as_deref(), "PAGE_ID").map(|id| Target::Facebook(id.to_string())),
            PlatformKind::Instagram => required(args.instagram_account_id.as_deref(), "INSTAGRAM_BUSINESS_ACCOUNT_ID")
                .map(|id| Target::Instagram(id.to_string())),
        })
        .collect::<Result<Vec<_>, HarvestError>>()?;

    let client = GraphClient::new(&config.base_url, access_token)?;

    for target in targets {
        let kind = target.kind();
        let result = match target {
            Target::Facebook(page_id) => harvest(&Facebook::new(page_id, &config), &client, &config).await,
            Target::Instagram(account_id) => harvest(&Instagram::new(account_id, &config), &client, &config).await,
        };

        match result {
            Ok(dir) => {
                log::debug!(target: LOG_TARGET, "{} output written to '{dir}'", kind.display_name());
                let _ = writeln!(host.output(), "{} data extraction completed successfully", kind.display_name());
            }
            Err(e) => {
                log::error!(target: LOG_TARGET, "Error in main execution: {e}");
                return Err(e).into_app_err_with(|| format!("harvesting {} data", kind.display_name()));
            }
        }
    }

    Ok(())
}

fn load_config(args: &FetchArgs) -> Result<Config> {
    apply_overrides(args).inspect_err(|e| log::error!(target: LOG_TARGET, "Invalid configuration: {e}"))
}

fn apply_overrides(args: &FetchArgs) -> Result<Config> {
    let mut config = Config::load(Utf8Path::new("."), args.config.as_deref())?;

    if let Some(dir) = &args.output_dir {
        config.output_dir.clone_from(dir);
    }

    if let Some(days) = args.days_back {
        config.days_back = days;
    }

    if let Some(pages) = args.max_pages {
        config.max_pages = pages;
    }

    if let Some(url) = &args.base_url {
        config.base_url.clone_from(url);
    }

    config.validate().into_app_err("checking command-line overrides")?;
    Ok(config)
}

fn requested_platforms(requested: &[PlatformKind]) -> Vec<PlatformKind> {
    if requested.is_empty() {
        return PlatformKind::iter().collect();
    }

    let mut platforms = Vec::with_capacity(requested.len());
    for kind in requested {
        if !platforms.contains(kind) {
            platforms.push(*kind);
        }
    }

    platforms
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, HarvestError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => {
            let e = HarvestError::Config(format!("{name} not found in the environment or on the command line"));
            log::error!(target: LOG_TARGET, "{e}");
            Err(e)
        }
    }
}

async fn harvest<P: Platform, F: Fetch + Sync>(platform: &P, fetcher: &F, config: &Config) -> Result<Utf8PathBuf, HarvestError> {
    let window = TimeWindow::days_back(Utc::now(), config.days_back);
    let data = platform.get_insights(fetcher, window).await?;

    let out = OutputDir::create(&config.output_dir, platform.kind().name(), &Local::now())?;
    save_data(platform, &data, &out)?;
    Ok(out.path().to_path_buf())
}
