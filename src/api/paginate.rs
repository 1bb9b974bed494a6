//! Pagination driver.
//!
//! Drives a cursor-based list endpoint to completion, emitting items in
//! provider order over a bounded channel. A second channel carries at most one
//! terminal error; clean completion closes both channels without a value.

use super::error::ApiError;
use super::types::Links;
use std::future::Future;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Page size used for every list endpoint.
pub const PER_PAGE: u32 = 200;

/// Cursor handed to a page fetcher.
#[derive(Debug, Clone, Copy)]
pub struct ListOpts {
    pub page: u32,
    pub per_page: u32,
}

impl ListOpts {
    /// Render the cursor as a query string suffix.
    pub fn query(&self) -> String {
        format!("page={}&per_page={}", self.page, self.per_page)
    }
}

impl Default for ListOpts {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: PER_PAGE,
        }
    }
}

/// Spawn a background task that exhausts a paginated endpoint.
///
/// `fetch` is called once per page and returns the page's items plus the
/// response links. Emission applies back-pressure (channel capacity 1) and
/// aborts promptly on cancellation; cancellation between pages is observed
/// before the next fetch. A fetch error is forwarded as the sole value on the
/// error channel and ends iteration.
pub fn stream<T, F, Fut>(
    cancel: CancellationToken,
    mut fetch: F,
) -> (mpsc::Receiver<T>, mpsc::Receiver<ApiError>)
where
    T: Send + 'static,
    F: FnMut(ListOpts) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(Vec<T>, Option<Links>), ApiError>> + Send,
{
    let (item_tx, item_rx) = mpsc::channel(1);
    let (err_tx, err_rx) = mpsc::channel(1);

    tokio::spawn(async move {
        let mut opts = ListOpts::default();
        loop {
            if cancel.is_cancelled() {
                return;
            }
            let (items, links) = match fetch(opts).await {
                Ok(page) => page,
                Err(err) => {
                    let _ = err_tx.send(err).await;
                    return;
                }
            };
            for item in items {
                tokio::select! {
                    sent = item_tx.send(item) => {
                        if sent.is_err() {
                            return;
                        }
                    }
                    _ = cancel.cancelled() => return,
                }
            }
            match links {
                Some(links) if !links.is_last_page() => opts.page += 1,
                _ => return,
            }
        }
    });

    (item_rx, err_rx)
}

/// Drain a stream into a vector, surfacing the terminal error if one arrives.
pub async fn collect<T>(
    mut items: mpsc::Receiver<T>,
    mut errs: mpsc::Receiver<ApiError>,
) -> Result<Vec<T>, ApiError> {
    let mut out = Vec::new();
    while let Some(item) = items.recv().await {
        out.push(item);
    }
    match errs.recv().await {
        Some(err) => Err(err),
        None => Ok(out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Pages;

    fn more_pages() -> Option<Links> {
        Some(Links {
            pages: Some(Pages {
                next: Some("next".into()),
                last: Some("last".into()),
                ..Pages::default()
            }),
            actions: Vec::new(),
        })
    }

    #[tokio::test]
    async fn yields_every_item_in_provider_order() {
        let (items, errs) = stream(CancellationToken::new(), |opts| async move {
            match opts.page {
                1 => Ok((vec![1, 2, 3], more_pages())),
                2 => Ok((vec![4, 5], None)),
                _ => panic!("fetched past the last page"),
            }
        });
        let got = collect(items, errs).await.unwrap();
        assert_eq!(got, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn first_page_cursor_is_one_of_two_hundred() {
        let (items, errs) = stream(CancellationToken::new(), |opts| async move {
            assert_eq!(opts.page, 1);
            assert_eq!(opts.per_page, PER_PAGE);
            Ok((vec![0u8; 0], None))
        });
        assert!(collect(items, errs).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_error_is_the_sole_terminal_value() {
        let (items, errs) = stream(CancellationToken::new(), |opts| async move {
            match opts.page {
                1 => Ok((vec![1], more_pages())),
                _ => Err(ApiError::Remote("throw me".into())),
            }
        });
        let err = collect(items, errs).await.unwrap_err();
        assert_eq!(err.to_string(), "throw me");
    }

    #[tokio::test]
    async fn cancellation_between_pages_stops_iteration() {
        let cancel = CancellationToken::new();
        let observer = cancel.clone();
        let (mut items, mut errs) = stream(cancel.clone(), move |opts| {
            let observer = observer.clone();
            async move {
                match opts.page {
                    1 => Ok((vec![1, 2, 3], more_pages())),
                    _ => {
                        assert!(
                            observer.is_cancelled(),
                            "page 2 fetched after cancellation"
                        );
                        Ok((vec![4], None))
                    }
                }
            }
        });

        let mut got = Vec::new();
        for _ in 0..3 {
            got.push(items.recv().await.unwrap());
        }
        cancel.cancel();
        // No page-2 item may arrive and the channels must close.
        while let Some(item) = items.recv().await {
            assert!(item <= 3, "leaked item from a cancelled page");
        }
        assert!(errs.recv().await.is_none());
        assert_eq!(got, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn dropping_the_receiver_ends_the_task() {
        let (items, mut errs) = stream(CancellationToken::new(), |_| async move {
            Ok((vec![1, 2, 3, 4], more_pages()))
        });
        drop(items);
        // The producer notices the closed channel; no error is reported.
        assert!(errs.recv().await.is_none());
    }
}
