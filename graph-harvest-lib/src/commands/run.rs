//! Command dispatch logic for graph-harvest

use super::{ConvertArgs, FetchArgs, InitArgs, ValidateArgs, convert_json, init_config, process_fetch, validate_config};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "graph-harvest", author, version, long_about = None)]
#[command(about = "Harvest page, insight, and media data from the Graph API into JSON and CSV files")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: HarvestSubcommand,
}

#[derive(Subcommand, Debug)]
enum HarvestSubcommand {
    /// Fetch data for one or more platforms and save it under a timestamped directory
    Fetch(Box<FetchArgs>),
    /// Convert a previously saved JSON document to CSV
    Convert(ConvertArgs),
    /// Generate a default configuration file
    Init(InitArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// This function parses the command-line arguments and executes the corresponding
/// subcommand. It's designed to be called from main.rs with the program arguments.
///
/// # Errors
///
/// Returns an error if command parsing fails or if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match &Cli::parse_from(args).command {
        HarvestSubcommand::Fetch(fetch_args) => process_fetch(host, fetch_args).await,
        HarvestSubcommand::Convert(convert_args) => convert_json(host, convert_args),
        HarvestSubcommand::Init(init_args) => init_config(host, init_args),
        HarvestSubcommand::Validate(validate_args) => validate_config(host, validate_args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch() {
        let cli = Cli::parse_from([
            "graph-harvest",
            "fetch",
            "instagram",
            "--access-token",
            "t",
            "--instagram-account-id",
            "1",
            "--days-back",
            "7",
            "--log-level",
            "debug",
        ]);

        let HarvestSubcommand::Fetch(args) = cli.command else {
            panic!("expected the fetch command");
        };
        assert_eq!(args.platforms, [crate::platforms::PlatformKind::Instagram]);
        assert_eq!(args.access_token.as_deref(), Some("t"));
        assert_eq!(args.days_back, Some(7));
    }

    #[test]
    fn test_parse_convert_defaults() {
        let cli = Cli::parse_from(["graph-harvest", "convert", "page.json"]);

        let HarvestSubcommand::Convert(args) = cli.command else {
            panic!("expected the convert command");
        };
        assert_eq!(args.kind, crate::commands::ConvertKind::Record);
        assert_eq!(args.separator, "_");
        assert_eq!(args.output_dir, "data/processed");
    }

    #[tokio::test]
    async fn test_run_init() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harvest.toml");
        let mut host = crate::commands::host::TestHost::default();

        run(&mut host, ["graph-harvest", "init", path.to_str().unwrap()]).await.unwrap();

        assert!(path.exists());
    }
}
