//! Per-view fetch state.
//!
//! A [`DataHook`] owns one resource's `{data, loading, error}` triple and at
//! most one in-flight fetch task. Handlers mount a hook, await
//! [`DataHook::settled`] and render the resulting [`HookSnapshot`].
//!
//! Loads are last-issued-wins: starting a new load aborts the previous task
//! and bumps a generation counter, so a superseded result that still
//! arrives is discarded.

mod albums;
mod profile;
mod users;

pub use albums::AlbumsResource;
pub use profile::{MyProfileResource, UserProfileResource};
pub use users::UsersResource;

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::ApiError;

/// Something a [`DataHook`] can fetch.
pub trait Resource: Send + Sync + 'static {
    /// Value held by the hook; `Default` until the first success.
    type Output: Clone + Default + Send + Sync + 'static;

    /// Error text used when neither the server nor the transport says
    /// anything useful.
    const FALLBACK_MESSAGE: &'static str;

    /// Resource name for log events.
    const NAME: &'static str;

    fn fetch(&self) -> impl Future<Output = Result<Self::Output, ApiError>> + Send;
}

/// Observable hook state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookSnapshot<T> {
    /// Last successful output; retained across failed loads.
    pub data: T,
    pub loading: bool,
    pub error: Option<String>,
    /// Number of loads issued so far.
    pub generation: u64,
}

impl<T> HookSnapshot<T> {
    /// Collapse the snapshot into a single fetch state.
    #[must_use]
    pub fn state(&self) -> FetchState<'_, T> {
        if self.loading {
            FetchState::Loading
        } else if let Some(message) = &self.error {
            FetchState::Failed(message.as_str())
        } else {
            FetchState::Loaded(&self.data)
        }
    }
}

/// One of loading, failed or loaded.
#[derive(Debug, PartialEq, Eq)]
pub enum FetchState<'a, T> {
    Loading,
    Failed(&'a str),
    Loaded(&'a T),
}

/// Fetch state for one resource.
pub struct DataHook<R: Resource> {
    resource: Arc<R>,
    state: Arc<watch::Sender<HookSnapshot<R::Output>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<R: Resource> DataHook<R> {
    /// Create the hook and issue the initial load.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn mount(resource: R) -> Self {
        let (state, _) = watch::channel(HookSnapshot::default());
        let hook = Self {
            resource: Arc::new(resource),
            state: Arc::new(state),
            task: Mutex::new(None),
        };
        hook.load();
        hook
    }

    /// Start a load, superseding any in-flight one.
    ///
    /// `loading` is set and `error` cleared immediately; `data` is kept.
    /// The task slot stays locked from the generation bump until the new
    /// handle is stored, so concurrent callers abort in generation order.
    pub fn load(&self) {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        let mut generation = 0;
        self.state.send_modify(|s| {
            s.generation += 1;
            s.loading = true;
            s.error = None;
            generation = s.generation;
        });

        let resource = Arc::clone(&self.resource);
        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(async move {
            let result = resource.fetch().await;
            state.send_if_modified(|s| {
                if s.generation != generation {
                    tracing::debug!(
                        resource = R::NAME,
                        generation,
                        "discarding superseded load"
                    );
                    return false;
                }
                s.loading = false;
                match result {
                    Ok(data) => s.data = data,
                    Err(e) => {
                        tracing::warn!(resource = R::NAME, error = %e, "load failed");
                        s.error = Some(error_message(&e, R::FALLBACK_MESSAGE));
                    }
                }
                true
            });
        });

        if let Some(previous) = task.replace(handle) {
            previous.abort();
        }
    }

    /// Same as [`load`](Self::load).
    pub fn refetch(&self) {
        self.load();
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> HookSnapshot<R::Output> {
        self.state.borrow().clone()
    }

    /// Wait until the latest load has finished and return the state.
    pub async fn settled(&self) -> HookSnapshot<R::Output> {
        let mut rx = self.state.subscribe();
        // The sender lives as long as `self`, so the wait only ends on a
        // state change.
        match rx.wait_for(|s| !s.loading).await {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.snapshot(),
        }
    }

    /// Observe state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<HookSnapshot<R::Output>> {
        self.state.subscribe()
    }
}

impl<R: Resource> Drop for DataHook<R> {
    fn drop(&mut self) {
        let task = self
            .task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
        }
    }
}

/// Resolve the message shown for a failed load.
///
/// Order: server message field, then status or network text, then the
/// resource's fallback.
fn error_message(error: &ApiError, fallback: &str) -> String {
    error.user_message().unwrap_or_else(|| fallback.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::Duration;

    use tokio::sync::Notify;

    /// Test resource replaying scripted outcomes, optionally gated.
    struct Scripted {
        outcomes: Mutex<VecDeque<(Result<Vec<u32>, ApiError>, Option<Arc<Notify>>)>>,
    }

    impl Scripted {
        fn new(outcomes: Vec<(Result<Vec<u32>, ApiError>, Option<Arc<Notify>>)>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
            }
        }
    }

    impl Resource for Scripted {
        type Output = Vec<u32>;
        const FALLBACK_MESSAGE: &'static str = "Failed to fetch numbers";
        const NAME: &'static str = "numbers";

        fn fetch(&self) -> impl Future<Output = Result<Self::Output, ApiError>> + Send {
            let (outcome, gate) = self.outcomes.lock().unwrap().pop_front().unwrap();
            async move {
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                outcome
            }
        }
    }

    fn server_error(message: Option<&str>) -> ApiError {
        ApiError::Server {
            status: 500,
            message: message.map(str::to_owned),
            body: String::new(),
        }
    }

    #[tokio::test]
    async fn test_mount_loads_once_and_settles() {
        let hook = DataHook::mount(Scripted::new(vec![(Ok(vec![1, 2]), None)]));

        let snapshot = hook.settled().await;
        assert_eq!(snapshot.data, vec![1, 2]);
        assert!(!snapshot.loading);
        assert_eq!(snapshot.error, None);
        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.state(), FetchState::Loaded(&vec![1, 2]));
    }

    #[tokio::test]
    async fn test_error_uses_server_message() {
        let hook = DataHook::mount(Scripted::new(vec![(Err(server_error(Some("bad"))), None)]));

        let snapshot = hook.settled().await;
        assert_eq!(snapshot.error.as_deref(), Some("bad"));
        assert!(snapshot.data.is_empty());
        assert_eq!(snapshot.state(), FetchState::Failed("bad"));
    }

    #[tokio::test]
    async fn test_refetch_enters_loading_then_converges() {
        let gate = Arc::new(Notify::new());
        let hook = DataHook::mount(Scripted::new(vec![
            (Ok(vec![1]), None),
            (Ok(vec![1, 2, 3]), Some(Arc::clone(&gate))),
        ]));
        assert_eq!(hook.settled().await.data, vec![1]);

        hook.refetch();
        let pending = hook.snapshot();
        assert!(pending.loading);
        assert_eq!(pending.data, vec![1]);
        assert_eq!(pending.state(), FetchState::Loading);

        gate.notify_one();
        let snapshot = hook.settled().await;
        assert_eq!(snapshot.data, vec![1, 2, 3]);
        assert_eq!(snapshot.error, None);
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_previous_data() {
        let hook = DataHook::mount(Scripted::new(vec![
            (Ok(vec![7]), None),
            (Err(server_error(None)), None),
        ]));
        hook.settled().await;

        hook.refetch();
        let snapshot = hook.settled().await;
        assert_eq!(snapshot.data, vec![7]);
        assert_eq!(
            snapshot.error.as_deref(),
            Some("Request failed with status code 500")
        );
    }

    #[tokio::test]
    async fn test_superseded_load_is_ignored() {
        let slow = Arc::new(Notify::new());
        let hook = DataHook::mount(Scripted::new(vec![
            (Ok(vec![1]), Some(Arc::clone(&slow))),
            (Ok(vec![2]), None),
        ]));
        // Let the first load start and park on its gate.
        tokio::task::yield_now().await;

        hook.refetch();
        slow.notify_one();
        let snapshot = hook.settled().await;
        assert_eq!(snapshot.data, vec![2]);
        assert_eq!(snapshot.generation, 2);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(hook.snapshot().data, vec![2]);
    }

    #[tokio::test]
    async fn test_subscribers_see_completion() {
        let gate = Arc::new(Notify::new());
        let hook = DataHook::mount(Scripted::new(vec![(Ok(vec![5]), Some(Arc::clone(&gate)))]));
        let mut rx = hook.subscribe();
        assert!(rx.borrow_and_update().loading);

        gate.notify_one();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().data, vec![5]);
    }

    /// Counts fetches and returns the count, after a short pause.
    struct Counter(std::sync::atomic::AtomicU32);

    impl Resource for Counter {
        type Output = u32;
        const FALLBACK_MESSAGE: &'static str = "Failed to count";
        const NAME: &'static str = "counter";

        fn fetch(&self) -> impl Future<Output = Result<Self::Output, ApiError>> + Send {
            let n = self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
            async move {
                tokio::time::sleep(Duration::from_millis(1)).await;
                Ok(n)
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_refetch_from_threads_settles() {
        let hook = Arc::new(DataHook::mount(Counter(std::sync::atomic::AtomicU32::new(0))));
        hook.settled().await;

        for _ in 0..50 {
            let barrier = Arc::new(std::sync::Barrier::new(2));
            let threads: Vec<_> = (0..2)
                .map(|_| {
                    let hook = Arc::clone(&hook);
                    let barrier = Arc::clone(&barrier);
                    let runtime = tokio::runtime::Handle::current();
                    std::thread::spawn(move || {
                        let _guard = runtime.enter();
                        barrier.wait();
                        hook.refetch();
                    })
                })
                .collect();
            for thread in threads {
                thread.join().unwrap();
            }

            let snapshot = tokio::time::timeout(Duration::from_secs(2), hook.settled())
                .await
                .unwrap();
            assert!(!snapshot.loading);
            assert_eq!(snapshot.error, None);
        }
        assert_eq!(hook.snapshot().generation, 101);
    }

    #[test]
    fn test_error_message_prefers_server_message() {
        assert_eq!(
            error_message(&ApiError::InvalidUrl("http://backend.internal".into()), "Failed to fetch users"),
            "Failed to fetch users"
        );
        assert_eq!(
            error_message(&server_error(Some("nope")), "Failed to fetch users"),
            "nope"
        );
    }
}
