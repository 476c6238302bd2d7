//! Task that owns a [`QueryState`] and talks to its [`WindowSource`].

use std::future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use stegroup_client::ApiResult;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

use super::WindowSource;
use super::state::{FetchError, QueryState, Ticket, Window};

/// Local edit applied to the held window by the controller task.
pub type WindowPatch<T> = Box<dyn FnOnce(&mut Window<T>) + Send + 'static>;

enum Command<Q, T> {
    Edit(Q),
    Filter(Q),
    Page(u32),
    Retry,
    Patch(WindowPatch<T>),
}

struct Envelope<Q, T> {
    revision: u64,
    command: Command<Q, T>,
}

type Snapshot<S> = QueryState<<S as WindowSource>::Query, <S as WindowSource>::Item>;
type Completion<T> = (u64, ApiResult<Window<T>>);

/// Handle to a running list query.
///
/// Dropping the handle stops the task; fetches already in flight finish and
/// their results are ignored.
pub struct QueryController<S: WindowSource> {
    commands: mpsc::UnboundedSender<Envelope<S::Query, S::Item>>,
    snapshots: watch::Receiver<Snapshot<S>>,
    sent: AtomicU64,
}

impl<S: WindowSource> QueryController<S> {
    /// Start the controller and immediately fetch page 1 of `query`.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(source: Arc<S>, query: S::Query, page_size: u32, debounce: Duration) -> Self {
        Self::spawn_at(source, query, 1, page_size, debounce)
    }

    /// Start the controller with `page` as the first fetch.
    #[must_use]
    pub fn spawn_at(
        source: Arc<S>,
        query: S::Query,
        page: u32,
        page_size: u32,
        debounce: Duration,
    ) -> Self {
        let mut state = QueryState::new(query, page_size);
        let initial = state.set_page(page);
        let (snapshot_tx, snapshots) = watch::channel(state.clone());
        let (commands, command_rx) = mpsc::unbounded_channel();
        tokio::spawn(run(source, state, initial, debounce, command_rx, snapshot_tx));
        Self {
            commands,
            snapshots,
            sent: AtomicU64::new(0),
        }
    }

    /// Record typed text; the fetch waits for the debounce quiet period.
    pub fn edit(&self, query: S::Query) {
        self.send(Command::Edit(query));
    }

    /// Replace the query and fetch page 1 immediately.
    pub fn set_filter(&self, query: S::Query) {
        self.send(Command::Filter(query));
    }

    /// Fetch `page` of the committed query immediately.
    pub fn set_page(&self, page: u32) {
        self.send(Command::Page(page));
    }

    /// Re-issue the committed query/page pair.
    pub fn retry(&self) {
        self.send(Command::Retry);
    }

    /// Apply a local edit to the held window, ordered with fetch results.
    ///
    /// Fetches still in flight are discarded when they land.
    pub fn patch<F>(&self, patch: F)
    where
        F: FnOnce(&mut Window<S::Item>) + Send + 'static,
    {
        self.send(Command::Patch(Box::new(patch)));
    }

    /// Latest published state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<S> {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<S>> {
        self.snapshots.clone()
    }

    /// Wait until every command sent so far has been applied, no fetch is in
    /// flight and no debounce is pending.
    pub async fn settled(&self) -> Snapshot<S> {
        let target = self.sent.load(Ordering::SeqCst);
        let mut receiver = self.snapshots.clone();
        if let Ok(state) = receiver
            .wait_for(|state| state.revision >= target && !state.loading && !state.debouncing)
            .await
        {
            return state.clone();
        }
        receiver.borrow().clone()
    }

    fn send(&self, command: Command<S::Query, S::Item>) {
        let revision = self.sent.fetch_add(1, Ordering::SeqCst) + 1;
        if self
            .commands
            .send(Envelope { revision, command })
            .is_err()
        {
            warn!(revision, "query controller stopped; command dropped");
        }
    }
}

async fn run<S: WindowSource>(
    source: Arc<S>,
    mut state: Snapshot<S>,
    initial: Ticket<S::Query>,
    debounce: Duration,
    mut commands: mpsc::UnboundedReceiver<Envelope<S::Query, S::Item>>,
    snapshots: watch::Sender<Snapshot<S>>,
) {
    let (completions, mut results) = mpsc::unbounded_channel::<Completion<S::Item>>();
    launch(&source, initial, &completions);
    let mut deadline: Option<Instant> = None;

    loop {
        let armed = deadline;
        let quiet = async move {
            match armed {
                Some(at) => sleep_until(at).await,
                None => future::pending::<()>().await,
            }
        };

        tokio::select! {
            envelope = commands.recv() => {
                let Some(Envelope { revision, command }) = envelope else {
                    debug!("query controller handle dropped");
                    break;
                };
                match command {
                    Command::Edit(query) => {
                        state.edit(query);
                        deadline = Some(Instant::now() + debounce);
                    }
                    Command::Filter(query) => {
                        deadline = None;
                        state.debouncing = false;
                        launch(&source, state.set_filter(query), &completions);
                    }
                    Command::Page(page) => launch(&source, state.set_page(page), &completions),
                    Command::Retry => launch(&source, state.retry(), &completions),
                    Command::Patch(patch) => state.apply_patch(patch),
                }
                state.revision = state.revision.max(revision);
            }
            Some((seq, result)) = results.recv() => {
                let result = result.map_err(|error| {
                    warn!(seq, error = %error.describe(), "list fetch failed");
                    FetchError::from(&error)
                });
                if !state.resolve(seq, result) {
                    debug!(seq, latest = state.seq, "discarded stale list response");
                }
            }
            () = quiet => {
                deadline = None;
                if let Some(ticket) = state.commit() {
                    launch(&source, ticket, &completions);
                }
            }
        }

        snapshots.send_replace(state.clone());
    }
}

fn launch<S: WindowSource>(
    source: &Arc<S>,
    ticket: Ticket<S::Query>,
    completions: &mpsc::UnboundedSender<Completion<S::Item>>,
) {
    debug!(
        seq = ticket.seq,
        page = ticket.request.page,
        offset = ticket.request.offset,
        "dispatching list fetch"
    );
    let source = Arc::clone(source);
    let completions = completions.clone();
    tokio::spawn(async move {
        let result = source.fetch(ticket.request).await;
        let _ = completions.send((ticket.seq, result));
    });
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use stegroup_client::ApiError;
    use tokio::time::sleep;

    use super::*;
    use crate::query::WindowRequest;

    /// Source answering with `"{query}#{page}"` after a per-query delay.
    #[derive(Default)]
    struct ScriptedSource {
        delays: HashMap<String, Duration>,
        failing: Mutex<bool>,
        requests: Mutex<Vec<WindowRequest<String>>>,
    }

    impl ScriptedSource {
        fn requests(&self) -> Vec<WindowRequest<String>> {
            self.requests.lock().map(|list| list.clone()).unwrap_or_default()
        }

        fn set_failing(&self, failing: bool) {
            if let Ok(mut flag) = self.failing.lock() {
                *flag = failing;
            }
        }
    }

    #[async_trait]
    impl WindowSource for ScriptedSource {
        type Query = String;
        type Item = String;

        async fn fetch(&self, request: WindowRequest<String>) -> ApiResult<Window<String>> {
            if let Ok(mut list) = self.requests.lock() {
                list.push(request.clone());
            }
            if let Some(delay) = self.delays.get(&request.query) {
                sleep(*delay).await;
            }
            if self.failing.lock().map(|flag| *flag).unwrap_or(false) {
                return Err(ApiError::Status {
                    operation: "search_items",
                    status: 503,
                    detail: None,
                });
            }
            Ok(Window {
                items: vec![format!("{}#{}", request.query, request.page)],
                total: 45,
            })
        }
    }

    const DEBOUNCE: Duration = Duration::from_millis(500);

    #[tokio::test(start_paused = true)]
    async fn rapid_edits_collapse_into_one_fetch() {
        let source = Arc::new(ScriptedSource::default());
        let controller = QueryController::spawn(Arc::clone(&source), String::new(), 20, DEBOUNCE);
        controller.settled().await;

        for text in ["o", "oz", "ozk", "ozka"] {
            controller.edit(text.to_string());
            sleep(Duration::from_millis(100)).await;
        }
        let state = controller.settled().await;

        let requests = source.requests();
        assert_eq!(requests.len(), 2, "initial load plus one debounced fetch");
        assert_eq!(requests[1].query, "ozka");
        assert_eq!(state.window.items, vec!["ozka#1".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn edit_waits_for_the_full_quiet_period() {
        let source = Arc::new(ScriptedSource::default());
        let controller = QueryController::spawn(Arc::clone(&source), String::new(), 20, DEBOUNCE);
        controller.settled().await;

        controller.edit("ozka".into());
        sleep(Duration::from_millis(499)).await;
        assert_eq!(source.requests().len(), 1);
        sleep(Duration::from_millis(2)).await;
        controller.settled().await;
        assert_eq!(source.requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn page_changes_bypass_debounce_and_keep_offset_law() {
        let source = Arc::new(ScriptedSource::default());
        let controller = QueryController::spawn(Arc::clone(&source), "ozka".into(), 20, DEBOUNCE);
        controller.settled().await;

        controller.set_page(3);
        let state = controller.settled().await;
        let last = source.requests().pop().map(|request| (request.page, request.offset));
        assert_eq!(last, Some((3, 40)));
        assert_eq!(state.page, 3);
        assert!(state.pagination().is_shown());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_stale_response_never_overwrites_newer_one() {
        let mut delays = HashMap::new();
        delays.insert("slow".to_string(), Duration::from_secs(5));
        let source = Arc::new(ScriptedSource {
            delays,
            ..ScriptedSource::default()
        });
        let controller = QueryController::spawn(Arc::clone(&source), String::new(), 20, DEBOUNCE);
        controller.settled().await;

        controller.set_filter("slow".into());
        controller.set_filter("fast".into());
        let state = controller.settled().await;
        assert_eq!(state.window.items, vec!["fast#1".to_string()]);

        sleep(Duration::from_secs(10)).await;
        let state = controller.settled().await;
        assert_eq!(state.window.items, vec!["fast#1".to_string()]);
        assert_eq!(state.committed, "fast");
    }

    #[tokio::test(start_paused = true)]
    async fn failure_keeps_window_and_retry_recovers() {
        let source = Arc::new(ScriptedSource::default());
        let controller = QueryController::spawn(Arc::clone(&source), "ozka".into(), 20, DEBOUNCE);
        controller.settled().await;

        source.set_failing(true);
        controller.set_page(2);
        let failed = controller.settled().await;
        assert_eq!(failed.window.items, vec!["ozka#1".to_string()]);
        assert_eq!(failed.error.as_ref().and_then(|error| error.status), Some(503));
        assert!(!failed.loading);

        source.set_failing(false);
        controller.retry();
        let recovered = controller.settled().await;
        assert_eq!(recovered.window.items, vec!["ozka#2".to_string()]);
        assert!(recovered.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn patches_apply_in_order_with_results() {
        let source = Arc::new(ScriptedSource::default());
        let controller = QueryController::spawn(Arc::clone(&source), "a".into(), 20, DEBOUNCE);
        controller.settled().await;

        controller.patch(|window| {
            window.items.clear();
            window.total = 0;
        });
        let state = controller.settled().await;
        assert!(state.window.items.is_empty());
        assert_eq!(source.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn patch_survives_fetch_still_in_flight() {
        let mut delays = HashMap::new();
        delays.insert("slow".to_string(), Duration::from_secs(5));
        let source = Arc::new(ScriptedSource {
            delays,
            ..ScriptedSource::default()
        });
        let controller = QueryController::spawn(Arc::clone(&source), "slow".into(), 20, DEBOUNCE);

        controller.patch(|window| *window = Window::complete(vec!["regrouped".to_string()]));
        let patched = controller.settled().await;
        assert_eq!(patched.window.items, vec!["regrouped".to_string()]);

        sleep(Duration::from_secs(10)).await;
        let state = controller.settled().await;
        assert_eq!(state.window.items, vec!["regrouped".to_string()]);
        assert_eq!(source.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn starting_page_is_the_only_initial_fetch() {
        let source = Arc::new(ScriptedSource::default());
        let controller =
            QueryController::spawn_at(Arc::clone(&source), "ozka".into(), 3, 20, DEBOUNCE);
        let state = controller.settled().await;

        let requests = source.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!((requests[0].page, requests[0].offset), (3, 40));
        assert_eq!(state.window.items, vec!["ozka#3".to_string()]);
    }
}
