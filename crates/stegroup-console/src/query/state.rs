//! Pure list-query state and its transitions.
//!
//! Every transition that needs data returns a [`Ticket`]; only the response to
//! the most recently issued ticket may change the visible window.

use stegroup_client::ApiError;

/// One page of results as returned by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct Window<T> {
    /// Items in server order.
    pub items: Vec<T>,
    /// Total matching items across all pages.
    pub total: u64,
}

impl<T> Default for Window<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

impl<T> Window<T> {
    /// Window holding `items`, with `total` equal to their count.
    #[must_use]
    pub fn complete(items: Vec<T>) -> Self {
        let total = u64::try_from(items.len()).unwrap_or(u64::MAX);
        Self { items, total }
    }
}

/// Parameters of one list fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRequest<Q> {
    /// Committed query value.
    pub query: Q,
    /// 1-based page.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// `(page - 1) * limit`.
    pub offset: u64,
}

impl<Q> WindowRequest<Q> {
    /// Build a request, deriving the offset from the page.
    #[must_use]
    pub fn new(query: Q, page: u32, limit: u32) -> Self {
        let page = page.max(1);
        Self {
            query,
            page,
            limit,
            offset: u64::from(page - 1) * u64::from(limit),
        }
    }
}

/// A dispatched fetch awaiting its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<Q> {
    /// Sequence number; strictly increasing per state.
    pub seq: u64,
    /// What to fetch.
    pub request: WindowRequest<Q>,
}

/// Cloneable summary of a failed list fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    /// Operation that failed.
    pub operation: Option<&'static str>,
    /// HTTP status, if the server answered.
    pub status: Option<u16>,
    /// Diagnostic text.
    pub detail: String,
}

impl From<&ApiError> for FetchError {
    fn from(error: &ApiError) -> Self {
        Self {
            operation: error.operation(),
            status: error.status(),
            detail: error.describe(),
        }
    }
}

/// State of one list screen.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<Q, T> {
    /// Latest typed value, not yet committed.
    pub draft: Q,
    /// Value of the most recent dispatched fetch.
    pub committed: Q,
    /// 1-based page of the most recent dispatched fetch.
    pub page: u32,
    /// Fixed page size.
    pub page_size: u32,
    /// Results of the latest successful fetch.
    pub window: Window<T>,
    /// A fetch is in flight.
    pub loading: bool,
    /// A debounced edit is waiting for its quiet period.
    pub debouncing: bool,
    /// Failure of the latest fetch; the previous window stays visible.
    pub error: Option<FetchError>,
    /// Sequence number of the latest dispatched fetch.
    pub seq: u64,
    /// Number of controller commands applied.
    pub revision: u64,
}

impl<Q: Clone + PartialEq, T> QueryState<Q, T> {
    /// Fresh state on page 1 with nothing fetched yet.
    #[must_use]
    pub fn new(query: Q, page_size: u32) -> Self {
        Self {
            draft: query.clone(),
            committed: query,
            page: 1,
            page_size: page_size.max(1),
            window: Window::default(),
            loading: false,
            debouncing: false,
            error: None,
            seq: 0,
            revision: 0,
        }
    }

    /// Record a typed value; nothing is fetched until [`Self::commit`].
    pub fn edit(&mut self, query: Q) {
        self.draft = query;
        self.debouncing = true;
    }

    /// Commit the draft after the quiet period; resets to page 1.
    ///
    /// Returns `None` when the draft settled back on the committed value, in
    /// which case nothing is fetched and the page is kept.
    pub fn commit(&mut self) -> Option<Ticket<Q>> {
        self.debouncing = false;
        if self.draft == self.committed {
            return None;
        }
        self.committed = self.draft.clone();
        self.page = 1;
        Some(self.dispatch())
    }

    /// Replace the query immediately (filters bypass the debounce).
    pub fn set_filter(&mut self, query: Q) -> Ticket<Q> {
        self.draft = query.clone();
        self.committed = query;
        self.page = 1;
        self.dispatch()
    }

    /// Move to `page` with the committed query.
    pub fn set_page(&mut self, page: u32) -> Ticket<Q> {
        self.page = page.max(1);
        self.dispatch()
    }

    /// Re-issue the committed query/page pair.
    pub fn retry(&mut self) -> Ticket<Q> {
        self.dispatch()
    }

    /// Issue a new ticket for the committed query/page pair.
    pub fn dispatch(&mut self) -> Ticket<Q> {
        self.seq += 1;
        self.loading = true;
        Ticket {
            seq: self.seq,
            request: WindowRequest::new(self.committed.clone(), self.page, self.page_size),
        }
    }

    /// Apply a fetch response. Returns `false` when the response is stale and
    /// was discarded.
    pub fn resolve(&mut self, seq: u64, result: Result<Window<T>, FetchError>) -> bool {
        if seq != self.seq {
            return false;
        }
        self.loading = false;
        match result {
            Ok(window) => {
                self.window = window;
                self.error = None;
            }
            Err(error) => self.error = Some(error),
        }
        true
    }

    /// Apply a server-confirmed local edit to the held window.
    ///
    /// Outstanding tickets are invalidated so a fetch dispatched before the
    /// edit cannot overwrite it when it lands.
    pub fn apply_patch<F>(&mut self, patch: F)
    where
        F: FnOnce(&mut Window<T>),
    {
        patch(&mut self.window);
        self.seq += 1;
        self.loading = false;
        self.error = None;
    }

    /// Pagination derived from the current window.
    #[must_use]
    pub const fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            page_size: self.page_size,
            total: self.window.total,
        }
    }
}

/// Page arithmetic for rendering pagination controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current 1-based page.
    pub page: u32,
    /// Page size.
    pub page_size: u32,
    /// Total matching items.
    pub total: u64,
}

impl Pagination {
    /// Number of pages needed for `total` items (at least 1).
    #[must_use]
    pub const fn page_count(&self) -> u64 {
        let size = if self.page_size == 0 {
            1
        } else {
            self.page_size as u64
        };
        let pages = self.total.div_ceil(size);
        if pages == 0 { 1 } else { pages }
    }

    /// Pagination controls are shown only when results span several pages.
    #[must_use]
    pub const fn is_shown(&self) -> bool {
        self.total > self.page_size as u64
    }

    /// A previous page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// A next page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        (self.page as u64) < self.page_count()
    }
}
