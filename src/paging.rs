//! Offset and cursor based result pages.

use std::sync::Arc;

use futures::{Stream, stream};
use reqwest::Method;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    action::Action,
    error::Result,
    http::{Executor, Request},
};

/// Cursor pair returned by cursor-paged endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursors {
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
}

/// One batch of a larger result set.
///
/// A missing `next` link marks the last page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub href: Option<String>,
    pub items: Vec<T>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub cursors: Option<Cursors>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    HasNext,
    Exhausted,
}

/// Walks the pages of a result set, one request per page.
pub struct Paginator<T> {
    executor: Arc<Executor>,
    envelope: Option<&'static str>,
    current: Page<T>,
    state: CursorState,
}

impl<T: DeserializeOwned + Send + 'static> Paginator<T> {
    /// Wraps an already fetched first page.
    pub fn new(executor: Arc<Executor>, envelope: Option<&'static str>, page: Page<T>) -> Self {
        let state = state_of(&page);
        Self {
            executor,
            envelope,
            current: page,
            state,
        }
    }

    /// Fetches the first page described by `request`.
    ///
    /// `envelope` names the key the page is nested under, e.g. `"artists"` for
    /// `{"artists": {...page}}`. It applies to every page fetched afterwards.
    pub async fn fetch(
        executor: Arc<Executor>,
        request: Request,
        envelope: Option<&'static str>,
    ) -> Result<Self> {
        let page = fetch_page(&executor, &request, envelope).await?;
        Ok(Self::new(executor, envelope, page))
    }

    pub fn current(&self) -> &Page<T> {
        &self.current
    }

    pub fn items(&self) -> &[T] {
        &self.current.items
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn total(&self) -> Option<u32> {
        self.current.total
    }

    /// Moves to the following page. `None` once the last page was reached.
    pub async fn next(&mut self) -> Result<Option<&Page<T>>> {
        Ok(self.advance().await?.then_some(&self.current))
    }

    /// Moves to the preceding page. `None` on the first page.
    pub async fn previous(&mut self) -> Result<Option<&Page<T>>> {
        let Some(link) = self.current.previous.clone() else {
            return Ok(None);
        };
        self.load(link).await?;
        Ok(Some(&self.current))
    }

    /// Collects the items of this and every following page, in order.
    ///
    /// Any failed page fetch fails the whole drain.
    pub async fn all_items(mut self) -> Result<Vec<T>> {
        let mut items = std::mem::take(&mut self.current.items);
        while self.advance().await? {
            items.append(&mut self.current.items);
        }
        Ok(items)
    }

    /// Lazily yields items across pages, fetching each page on demand.
    ///
    /// The stream ends after the last page or after the first error.
    pub fn into_stream(mut self) -> impl Stream<Item = Result<T>> + Send {
        let buffer = std::mem::take(&mut self.current.items).into_iter();
        stream::unfold(Some((self, buffer)), |state| async move {
            let (mut pager, mut buffer) = state?;
            loop {
                if let Some(item) = buffer.next() {
                    return Some((Ok(item), Some((pager, buffer))));
                }
                match pager.advance().await {
                    Ok(true) => buffer = std::mem::take(&mut pager.current.items).into_iter(),
                    Ok(false) => return None,
                    Err(e) => return Some((Err(e), None)),
                }
            }
        })
    }

    async fn advance(&mut self) -> Result<bool> {
        if self.state == CursorState::Exhausted {
            return Ok(false);
        }
        let Some(link) = self.current.next.clone() else {
            self.state = CursorState::Exhausted;
            return Ok(false);
        };
        self.load(link).await?;
        Ok(true)
    }

    async fn load(&mut self, link: String) -> Result<()> {
        debug!(url = %link, "fetching page");
        let request = Request::absolute(Method::GET, link);
        self.current = fetch_page(&self.executor, &request, self.envelope).await?;
        self.state = state_of(&self.current);
        Ok(())
    }
}

impl<T: DeserializeOwned + Send + 'static> Action<Paginator<T>> {
    /// Fetches the first page, then drains the rest.
    pub fn all_items(&self) -> Action<Vec<T>> {
        let first = self.clone();
        Action::new(self.runtime().clone(), move || {
            let first = first.clone();
            async move { first.run().await?.all_items().await }
        })
    }
}

fn state_of<T>(page: &Page<T>) -> CursorState {
    if page.has_next() {
        CursorState::HasNext
    } else {
        CursorState::Exhausted
    }
}

async fn fetch_page<T: DeserializeOwned>(
    executor: &Executor,
    request: &Request,
    envelope: Option<&'static str>,
) -> Result<Page<T>> {
    match envelope {
        Some(key) => executor.json_field(request, key).await,
        None => executor.json(request).await,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_page_with_optional_fields_missing() {
        let page: Page<String> = serde_json::from_value(json!({ "items": ["a", "b"] })).unwrap();

        assert_eq!(page.items, vec!["a", "b"]);
        assert!(!page.has_next());
        assert_eq!(state_of(&page), CursorState::Exhausted);
    }

    #[test]
    fn test_cursor_page() {
        let page: Page<u32> = serde_json::from_value(json!({
            "href": "https://api.spotify.com/v1/me/following?type=artist",
            "items": [1],
            "limit": 1,
            "next": "https://api.spotify.com/v1/me/following?type=artist&after=abc",
            "cursors": { "after": "abc" },
            "total": 7
        }))
        .unwrap();

        assert_eq!(state_of(&page), CursorState::HasNext);
        assert_eq!(page.cursors.unwrap().after.as_deref(), Some("abc"));
        assert_eq!(page.total, Some(7));
    }

    #[test]
    fn test_items_are_required() {
        let result = serde_json::from_value::<Page<u32>>(json!({ "next": null }));
        assert!(result.is_err());
    }
}
