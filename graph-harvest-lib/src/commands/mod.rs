//! Command-line interface and orchestration for graph-harvest
//!
//! This module implements the CLI commands and ties the fetcher, the
//! tabulation core, and the writers together into end-to-end workflows.
//!
//! # Implementation Model
//!
//! ## Commands
//!
//! - **fetch**: For each requested platform, check credentials, request the
//!   platform's resources from the Graph API, and save the raw document plus
//!   its CSV tables under `<output_dir>/<platform>/<YYYYMMDD_HHMMSS>/`
//! - **convert**: Turn a previously saved JSON document into CSV, either as one
//!   flattened record or as long and pivoted metric series
//! - **init**: Generate a default configuration file
//! - **validate**: Check a configuration file's syntax and value ranges
//!
//! ## Execution Flow
//!
//! The `run` function parses command-line arguments using clap and routes
//! to the appropriate command handler. Commands that do real work install the
//! logger first (see the `common` module), then load configuration, then act.
//!
//! Credentials are only ever taken from the environment or the command line,
//! never from the configuration file.

mod common;
mod convert;
mod fetch;
mod host;
mod init;
mod run;
mod validate;

pub use common::{LogLevel, LogSinks, LoggingArgs, init_logging};
pub use convert::{ConvertArgs, ConvertKind, convert_json};
pub use fetch::{FetchArgs, process_fetch};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use run::run;
pub use validate::{ValidateArgs, validate_config};
