use super::Fetch;
use crate::error::HarvestError;
use serde_json::Value;

const LOG_TARGET: &str = "graph";

/// Fetch a listing resource, following `paging.next` links up to `max_pages` pages in total.
///
/// The `data` arrays of every page are concatenated into the first page's
/// document, whose `paging` object is replaced by the last page's. With
/// `max_pages == 1` this is a single request.
pub async fn fetch_listing<F: Fetch>(
    fetcher: &F,
    resource: &str,
    params: &[(&str, String)],
    description: &str,
    max_pages: u32,
) -> Result<Value, HarvestError> {
    let mut listing = fetcher.fetch(resource, params, description).await?;
    let mut next = next_link(&listing);
    let mut pages = 1;

    while pages < max_pages
        && let Some(url) = next
    {
        pages += 1;
        let page = fetcher.fetch_url(&url, &format!("{description} (page {pages})")).await?;
        next = next_link(&page);

        let Value::Object(mut page) = page else {
            return Err(HarvestError::data_shape(resource, "paged response is not an object"));
        };

        let Some(Value::Array(items)) = page.remove("data") else {
            log::warn!(target: LOG_TARGET, "Page {pages} of '{resource}' has no data; stopping");
            break;
        };

        match listing.get_mut("data") {
            Some(Value::Array(data)) => data.extend(items),
            _ => return Err(HarvestError::data_shape(resource, "first page has no data array")),
        }

        if let (Some(paging), Some(target)) = (page.remove("paging"), listing.as_object_mut()) {
            let _ = target.insert("paging".to_string(), paging);
        }
    }

    if next.is_some() {
        log::debug!(target: LOG_TARGET, "Stopped following '{resource}' after {pages} page(s)");
    }

    Ok(listing)
}

fn next_link(page: &Value) -> Option<String> {
    page.pointer("/paging/next").and_then(Value::as_str).map(ToString::to_string)
}
