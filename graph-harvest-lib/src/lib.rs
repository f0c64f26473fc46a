#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for graph-harvest
//!
//! This library consolidates all functionality for the graph-harvest tool, which
//! polls the Graph API for page and account data and saves it as JSON and CSV.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and orchestration
//! - [`config`]: TOML configuration with embedded defaults
//! - [`error`]: Domain error kinds
//! - [`graph`]: Graph API access
//! - [`platforms`]: Facebook and Instagram harvesting logic
//! - [`reports`]: JSON and CSV writers
//! - [`tabular`]: Flattening and pivoting of nested JSON

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

pub mod config;
pub mod error;

#[cfg(any(debug_assertions, test))]
pub mod graph;
#[cfg(not(any(debug_assertions, test)))]
mod graph;

#[cfg(any(debug_assertions, test))]
pub mod platforms;
#[cfg(not(any(debug_assertions, test)))]
mod platforms;

#[cfg(any(debug_assertions, test))]
pub mod reports;
#[cfg(not(any(debug_assertions, test)))]
mod reports;

pub mod tabular;

pub use crate::commands::{Host, run};
