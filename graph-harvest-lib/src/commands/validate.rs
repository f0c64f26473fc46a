use super::Host;
use crate::Result;
use crate::config::Config;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use std::io::Write;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file (default is `harvest.toml`)
    #[arg(value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,
}

pub fn validate_config<H: Host>(host: &mut H, args: &ValidateArgs) -> Result<()> {
    validate_in(host, Utf8Path::new("."), args)
}

fn validate_in<H: Host>(host: &mut H, base_dir: &Utf8Path, args: &ValidateArgs) -> Result<()> {
    match Config::load_with_source(base_dir, args.config.as_deref()) {
        Ok((_, source)) => {
            let _ = writeln!(host.output(), "Configuration file is valid");
            if let Some(path) = source {
                let _ = writeln!(host.output(), "Config file: {path}");
            } else {
                let _ = writeln!(host.output(), "Using default configuration (no config file found)");
            }
            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Configuration validation failed: {e}");
            host.exit(1);
            Err(e)
        }
    }
}
