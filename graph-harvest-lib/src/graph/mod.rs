//! Access to the Graph API
//!
//! [`GraphClient`] performs authenticated GET requests and decodes the JSON
//! body. Callers depend on the [`Fetch`] trait so platforms can be exercised
//! against canned documents. Every request is awaited before the next one is
//! issued, and a failed request is reported as
//! [`HarvestError::Transport`](crate::error::HarvestError::Transport) without
//! being retried.

#[cfg(test)]
pub(crate) mod canned;
mod client;
mod paging;
mod time_window;

pub use client::{Fetch, GRAPH_BASE_URL, GraphClient};
pub use paging::fetch_listing;
pub use time_window::TimeWindow;
