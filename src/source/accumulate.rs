// src/source/accumulate.rs
use crate::error::FetchError;
use crate::source::{RawItem, SourceClient};

/// Items merged across the pages of one `collect` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccumulatedSet {
    pub items: Vec<RawItem>,
    /// Number of successful page fetches that contributed to `items`.
    pub pages: usize,
}

impl AccumulatedSet {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Walk the listing for `topic`, at most `max_pages` requests.
///
/// Stops when the cursor runs out or the page budget is spent. An empty page ends the walk
/// if something was already collected; on the very first page it is `FetchError::Empty`.
/// The returned set is owned by the caller; nothing is kept between calls.
pub async fn collect(
    source: &dyn SourceClient,
    topic: &str,
    max_pages: usize,
) -> Result<AccumulatedSet, FetchError> {
    let budget = max_pages.max(1);
    let mut acc = AccumulatedSet::default();
    let mut cursor: Option<String> = None;

    while acc.pages < budget {
        let page = match source.fetch_page(topic, cursor.as_deref()).await {
            Ok(page) => page,
            Err(FetchError::Empty) if !acc.is_empty() => {
                tracing::debug!(target: "pipeline", topic, pages = acc.pages, "empty page, end of data");
                break;
            }
            Err(e) => return Err(e),
        };

        acc.pages += 1;
        cursor = page.cursor().map(str::to_owned);
        acc.items.extend(page.items);

        if cursor.is_none() {
            break;
        }
    }

    if acc.is_empty() {
        return Err(FetchError::Empty);
    }

    tracing::debug!(
        target: "pipeline",
        topic,
        source = source.name(),
        pages = acc.pages,
        items = acc.len(),
        "listing collected"
    );
    Ok(acc)
}
