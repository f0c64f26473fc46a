//! Harvest page, insight, and media data from the Graph API into JSON and CSV files.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use graph_harvest_lib::{Host, run};
use std::io::Write;
use std::io::{stderr, stdout};

/// Default host that runs real OS commands.
#[derive(Debug, Clone, Default)]
pub struct RealHost;

#[cfg_attr(coverage_nightly, coverage(off))]
impl Host for RealHost {
    fn output(&mut self) -> impl Write {
        stdout()
    }

    fn error(&mut self) -> impl Write {
        stderr()
    }

    fn exit(&mut self, code: i32) {
        std::process::exit(code);
    }
}

#[tokio::main]
#[cfg_attr(coverage_nightly, coverage(off))]
async fn main() -> Result<(), ohno::AppError> {
    // credentials may live in a `.env` file next to where the tool is run
    let _ = dotenvy::dotenv();
    run(&mut RealHost, std::env::args()).await
}
