use std::collections::HashSet;

use serde_json::Value;

use crate::client::QueryPage;
use crate::error::{Error, Result};

/// Page-size ceiling enforced by the remote API.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page size to request for a caller limit: the limit itself, capped at
/// the remote ceiling, so small listings cost a single call.
pub fn requested_page_size(limit: Option<usize>) -> Option<u32> {
    limit.map(|limit| u32::try_from(limit).unwrap_or(MAX_PAGE_SIZE).min(MAX_PAGE_SIZE))
}

/// Drain a paged endpoint into one ordered, id-deduplicated sequence.
///
/// `query_fn` receives the requested page size and the cursor from the
/// previous page. The loop stops once `has_more` is false or `limit`
/// items are collected. Failure on any page, first or later, discards
/// everything accumulated so far; a partial listing is never returned.
pub fn fetch_all<F>(mut query_fn: F, limit: Option<usize>) -> Result<Vec<Value>>
where
    F: FnMut(Option<u32>, Option<&str>) -> Result<QueryPage>,
{
    if limit == Some(0) {
        return Err(Error::Validation(
            "limit must be a positive integer".to_string(),
        ));
    }

    let page_size = requested_page_size(limit);
    let mut items = Vec::new();
    let mut seen_ids = HashSet::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = query_fn(page_size, cursor.as_deref())?;
        for item in page.results {
            if let Some(id) = item.get("id").and_then(Value::as_str) {
                if !seen_ids.insert(id.to_string()) {
                    continue;
                }
            }
            items.push(item);
            if let Some(limit) = limit
                && items.len() >= limit
            {
                return Ok(items);
            }
        }

        if !page.has_more {
            break;
        }
        cursor = page.next_cursor;
        // has_more without a cursor would spin on the first page forever.
        if cursor.is_none() {
            break;
        }
    }

    Ok(items)
}
