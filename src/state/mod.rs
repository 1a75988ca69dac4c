//! Listing state shared by the dashboard screens.
//!
//! A failed fetch keeps the last good value. Every fetch takes a ticket, and
//! only the most recent ticket may write back, so a slow response from an
//! earlier page click cannot overwrite a newer page.

use parking_lot::Mutex;
use std::fmt::Display;
use std::future::Future;

/// Handed out by [`ListState::begin`]; identifies one fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated,
    /// Fetch failed; the previous value was kept
    Failed,
    /// A newer fetch was started; the result was dropped
    Stale,
}

#[derive(Debug)]
struct Inner<T> {
    value: Option<T>,
    generation: u64,
    loading: bool,
    error: Option<String>,
}

#[derive(Debug)]
pub struct ListState<T> {
    inner: Mutex<Inner<T>>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                value: None,
                generation: 0,
                loading: false,
                error: None,
            }),
        }
    }
}

impl<T: Clone> ListState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Ticket {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.loading = true;
        Ticket(inner.generation)
    }

    pub fn complete<E: Display>(&self, ticket: Ticket, result: Result<T, E>) -> Applied {
        let mut inner = self.inner.lock();
        if ticket.0 != inner.generation {
            tracing::debug!(ticket = ticket.0, current = inner.generation, "Dropping stale response");
            return Applied::Stale;
        }

        inner.loading = false;
        match result {
            Ok(value) => {
                inner.value = Some(value);
                inner.error = None;
                Applied::Updated
            }
            Err(e) => {
                tracing::warn!(error = %e, "Fetch failed, keeping previous data");
                inner.error = Some(e.to_string());
                Applied::Failed
            }
        }
    }

    /// Run `fetch` under a fresh ticket and apply its result
    pub async fn load<F, Fut, E>(&self, fetch: F) -> Applied
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let ticket = self.begin();
        let result = fetch().await;
        self.complete(ticket, result)
    }

    pub fn value(&self) -> Option<T> {
        self.inner.lock().value.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().error.clone()
    }

    /// Drop the held value, for example after logout
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.value = None;
        inner.loading = false;
        inner.error = None;
    }
}
