//! Paginated feed over the unfiltered transaction list

use log::{debug, info};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::CoreResult;
use crate::models::Page;
use crate::source::TransactionSourceRef;
use crate::types::{FeedState, FetchOutcome};

/// Index of the first page after an invalidation
pub const FIRST_PAGE: u32 = 1;

#[derive(Debug)]
struct Cursor {
    /// Last page received since the last invalidation
    data: Option<Page>,
    /// Page to request next, `None` once the server reported the end
    next_page: Option<u32>,
    /// Bumped on invalidation; responses from an older generation are dropped
    generation: u64,
    in_flight: usize,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            data: None,
            next_page: Some(FIRST_PAGE),
            generation: 0,
            in_flight: 0,
        }
    }
}

/// Fetches successive pages of the unfiltered feed
pub struct PaginatedFeed {
    source: TransactionSourceRef,
    cursor: Mutex<Cursor>,
}

impl PaginatedFeed {
    pub fn new(source: TransactionSourceRef) -> Self {
        Self {
            source,
            cursor: Mutex::new(Cursor::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Cursor> {
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the page after the last one received.
    ///
    /// Once the server has reported the last page, this returns that page as
    /// [`FetchOutcome::Cached`] and never requests past the end.
    pub async fn fetch_all(&self) -> CoreResult<FetchOutcome<Page>> {
        self.fetch_all_with(|_| ()).await
    }

    /// Like [`fetch_all`](Self::fetch_all), running `apply` on a freshly
    /// received page while the feed is still locked, so no invalidation can
    /// land between the staleness check and `apply`.
    pub async fn fetch_all_with<F>(&self, apply: F) -> CoreResult<FetchOutcome<Page>>
    where
        F: FnOnce(&Page) + Send,
    {
        let (page_index, generation) = {
            let mut cursor = self.lock();
            let page_index = match (cursor.next_page, &cursor.data) {
                (Some(index), _) => index,
                (None, Some(page)) => {
                    debug!(target: "ledgerview::feed", "Pagination exhausted, keeping final page");
                    return Ok(FetchOutcome::Cached(page.clone()));
                }
                (None, None) => FIRST_PAGE,
            };
            cursor.in_flight += 1;
            (page_index, cursor.generation)
        };

        debug!(target: "ledgerview::feed", "Requesting page {}", page_index);
        let result = self.source.get_page(page_index).await;

        let mut cursor = self.lock();
        cursor.in_flight = cursor.in_flight.saturating_sub(1);
        if cursor.generation != generation {
            debug!(
                target: "ledgerview::feed",
                "Dropping page {} requested before the last invalidation", page_index
            );
            return Ok(FetchOutcome::Superseded);
        }

        let page = result?;
        info!(
            target: "ledgerview::feed",
            "Received page {} with {} transactions, next page: {:?}",
            page_index,
            page.data.len(),
            page.next_page
        );
        cursor.next_page = page.next_page;
        cursor.data = Some(page.clone());
        apply(&page);
        Ok(FetchOutcome::Fetched(page))
    }

    /// Reset the cursor to the first page and clear cached data.
    ///
    /// An in-flight request is not cancelled, but its response will be dropped.
    pub fn invalidate_data(&self) {
        let mut cursor = self.lock();
        cursor.data = None;
        cursor.next_page = Some(FIRST_PAGE);
        cursor.generation += 1;
    }

    pub fn has_data(&self) -> bool {
        self.lock().data.is_some()
    }

    pub fn loading(&self) -> bool {
        self.lock().in_flight > 0
    }

    /// Page index the next fetch would request, `None` when exhausted
    pub fn next_page(&self) -> Option<u32> {
        self.lock().next_page
    }

    pub fn state(&self) -> FeedState<Page> {
        let cursor = self.lock();
        FeedState {
            data: cursor.data.clone(),
            loading: cursor.in_flight > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::testing::{tx, wait_until, ScriptedSource};
    use std::sync::Arc;

    fn two_page_source() -> ScriptedSource {
        ScriptedSource::new()
            .with_page(1, vec![tx("t1", "1")], Some(2))
            .with_page(2, vec![tx("t1", "1"), tx("t2", "1")], None)
    }

    #[tokio::test]
    async fn test_fetches_successive_pages() {
        let source = Arc::new(two_page_source());
        let feed = PaginatedFeed::new(source.clone());

        let first = feed.fetch_all().await.unwrap().fresh().unwrap();
        assert_eq!(first.next_page, Some(2));
        assert_eq!(feed.next_page(), Some(2));

        let second = feed.fetch_all().await.unwrap().fresh().unwrap();
        assert_eq!(second.data.len(), 2);
        assert!(second.is_exhausted());
        assert_eq!(source.pages_requested(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_exhausted_feed_never_requests_again() {
        let source = Arc::new(two_page_source());
        let feed = PaginatedFeed::new(source.clone());

        feed.fetch_all().await.unwrap();
        let last = feed.fetch_all().await.unwrap().fresh().unwrap();

        for _ in 0..3 {
            match feed.fetch_all().await.unwrap() {
                FetchOutcome::Cached(page) => assert_eq!(page, last),
                other => panic!("expected cached final page, got {:?}", other),
            }
        }
        assert_eq!(source.pages_requested(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_invalidate_restarts_from_first_page() {
        let source = Arc::new(two_page_source());
        let feed = PaginatedFeed::new(source.clone());

        feed.fetch_all().await.unwrap();
        feed.fetch_all().await.unwrap();
        feed.invalidate_data();
        assert!(!feed.has_data());
        assert_eq!(feed.next_page(), Some(FIRST_PAGE));

        feed.fetch_all().await.unwrap();
        assert_eq!(source.pages_requested(), vec![1, 2, 1]);
    }

    #[tokio::test]
    async fn test_response_after_invalidation_is_dropped() {
        let source = Arc::new(two_page_source());
        let release = source.gate("page:1");
        let feed = Arc::new(PaginatedFeed::new(source.clone()));

        let task = {
            let feed = feed.clone();
            tokio::spawn(async move { feed.fetch_all().await })
        };
        wait_until(|| feed.loading()).await;

        feed.invalidate_data();
        release.send(()).unwrap();

        assert!(task.await.unwrap().unwrap().is_superseded());
        assert!(!feed.has_data());
        assert!(!feed.loading());
    }

    #[tokio::test]
    async fn test_failure_keeps_cursor() {
        let source = Arc::new(two_page_source());
        let feed = PaginatedFeed::new(source.clone());

        feed.fetch_all().await.unwrap();
        source.fail_transactions(true);
        let err = feed.fetch_all().await.unwrap_err();
        assert!(matches!(err, CoreError::Transport { .. }));
        assert_eq!(feed.next_page(), Some(2));
        assert_eq!(feed.state().data.map(|p| p.data.len()), Some(1));

        source.fail_transactions(false);
        let page = feed.fetch_all().await.unwrap().fresh().unwrap();
        assert!(page.is_exhausted());
    }
}
