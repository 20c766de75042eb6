//! Single-flight loader for the live editor script.
//!
//! The first `start` spawns one attempt sequence; every later call, whatever
//! its options, shares that sequence's outcome. Failed attempts are cleaned
//! up and retried after a fixed delay until the attempt budget runs out.

use crate::injector::{HttpScriptInjector, ScriptInjector};
use crate::scheduler::{Scheduler, TokioScheduler};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Location of the live editor script.
pub const LIVE_EDITOR_SCRIPT_URL: &str =
    "https://cdn.contentstorage.app/live-editor.js?contentstorage-live-editor=true";

static GLOBAL: OnceLock<ResourceLoader> = OnceLock::new();

/// Where the loader is in its one and only attempt sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Pending { attempt: u32, max_attempts: u32 },
    Resolved(bool),
}

/// Options for the attempt sequence. Only the first caller's options count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Fixed wait between attempts
    pub retry_delay: Duration,
    /// Log every attempt
    pub debug: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            retry_delay: Duration::from_millis(3000),
            debug: false,
        }
    }
}

/// A handle on the eventual outcome. Cheap to clone.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    receiver: watch::Receiver<Option<bool>>,
}

impl LoadOutcome {
    /// The outcome if it is already known.
    pub fn peek(&self) -> Option<bool> {
        *self.receiver.borrow()
    }

    /// Wait for the attempt sequence to finish.
    pub async fn wait(mut self) -> bool {
        match self.receiver.wait_for(Option::is_some).await {
            Ok(outcome) => {
                let loaded = *outcome;
                loaded.unwrap_or(false)
            }
            Err(_) => false,
        }
    }
}

#[derive(Clone)]
pub struct ResourceLoader {
    inner: Arc<Inner>,
}

struct Inner {
    url: String,
    injector: Arc<dyn ScriptInjector>,
    scheduler: Arc<dyn Scheduler>,
    state: Mutex<LoadState>,
    outcome: watch::Sender<Option<bool>>,
}

impl ResourceLoader {
    pub fn new(injector: Arc<dyn ScriptInjector>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self::with_url(LIVE_EDITOR_SCRIPT_URL, injector, scheduler)
    }

    /// Create a loader for a different script location (tests, mirrors).
    pub fn with_url(
        url: impl Into<String>,
        injector: Arc<dyn ScriptInjector>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        let (outcome, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                url: url.into(),
                injector,
                scheduler,
                state: Mutex::new(LoadState::Idle),
                outcome,
            }),
        }
    }

    /// The process-wide loader, fetching over HTTP on the tokio timer.
    pub fn global() -> &'static ResourceLoader {
        GLOBAL.get_or_init(|| {
            ResourceLoader::new(
                Arc::new(HttpScriptInjector::new()),
                Arc::new(TokioScheduler),
            )
        })
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn injector_name(&self) -> &str {
        self.inner.injector.name()
    }

    pub fn state(&self) -> LoadState {
        *self.inner.lock_state()
    }

    /// Kick off the attempt sequence if nothing has started it yet.
    ///
    /// Never blocks and never fails; needs a tokio runtime to make progress.
    /// Without one, the outcome resolves to `false` immediately.
    pub fn start(&self, options: LoadOptions) -> LoadOutcome {
        let outcome = LoadOutcome {
            receiver: self.inner.outcome.subscribe(),
        };

        let mut state = self.inner.lock_state();
        if *state != LoadState::Idle {
            return outcome;
        }

        let max_attempts = options.max_attempts.max(1);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                *state = LoadState::Pending {
                    attempt: 1,
                    max_attempts,
                };
                handle.spawn(run_attempts(self.inner.clone(), options, max_attempts));
            }
            Err(_) => {
                warn!("No async runtime available, live editor script will not load");
                *state = LoadState::Resolved(false);
                self.inner.outcome.send_replace(Some(false));
            }
        }
        outcome
    }

    /// Start (or join) the attempt sequence and wait for its outcome.
    pub async fn load(&self, options: LoadOptions) -> bool {
        self.start(options).wait().await
    }
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, LoadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: LoadState) {
        *self.lock_state() = state;
    }

    fn resolve(&self, loaded: bool) {
        self.set_state(LoadState::Resolved(loaded));
        self.outcome.send_replace(Some(loaded));
    }
}

async fn run_attempts(inner: Arc<Inner>, options: LoadOptions, max_attempts: u32) {
    let mut attempt = 1;

    let loaded = loop {
        inner.set_state(LoadState::Pending {
            attempt,
            max_attempts,
        });
        if options.debug {
            info!(attempt, max_attempts, injector = inner.injector.name(), "Attempting to load live editor script");
        }

        match inner.injector.inject(&inner.url).await {
            Ok(()) => {
                if options.debug {
                    info!(attempt, "Live editor script loaded successfully");
                }
                break true;
            }
            Err(e) => {
                inner.injector.remove(&inner.url).await;
                if options.debug {
                    warn!(attempt, max_attempts, error = %e, "Failed to load live editor script");
                }
                if attempt >= max_attempts {
                    error!(attempts = max_attempts, url = %inner.url, "All attempts to load live editor script failed");
                    break false;
                }
                inner.scheduler.sleep(options.retry_delay).await;
                attempt += 1;
            }
        }
    };

    inner.resolve(loaded);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use livetrack_core::error::LoadError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    type EventLog = Arc<Mutex<Vec<String>>>;

    /// Fails the first `failures` attempts, then succeeds.
    struct FlakyInjector {
        failures: usize,
        attempts: AtomicUsize,
        log: EventLog,
    }

    impl FlakyInjector {
        fn new(failures: usize, log: EventLog) -> Self {
            Self {
                failures,
                attempts: AtomicUsize::new(0),
                log,
            }
        }

        fn always_failing(log: EventLog) -> Self {
            Self::new(usize::MAX, log)
        }

        fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ScriptInjector for FlakyInjector {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn inject(&self, _url: &str) -> Result<(), LoadError> {
            let n = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            self.log.lock().unwrap().push(format!("inject {n}"));
            if n <= self.failures {
                Err(LoadError::Network("connection reset".into()))
            } else {
                Ok(())
            }
        }

        async fn remove(&self, _url: &str) {
            self.log.lock().unwrap().push("remove".into());
        }
    }

    /// Records each requested delay and returns immediately.
    struct RecordingScheduler {
        log: EventLog,
    }

    #[async_trait]
    impl Scheduler for RecordingScheduler {
        async fn sleep(&self, delay: Duration) {
            self.log
                .lock()
                .unwrap()
                .push(format!("sleep {}ms", delay.as_millis()));
        }
    }

    /// Holds every attempt until released.
    struct GatedInjector {
        gate: Notify,
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl ScriptInjector for GatedInjector {
        fn name(&self) -> &str {
            "gated"
        }

        async fn inject(&self, _url: &str) -> Result<(), LoadError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            Ok(())
        }

        async fn remove(&self, _url: &str) {}
    }

    fn loader_with(failures: usize) -> (ResourceLoader, Arc<FlakyInjector>, EventLog) {
        let log: EventLog = Arc::new(Mutex::new(Vec::new()));
        let injector = Arc::new(FlakyInjector::new(failures, log.clone()));
        let scheduler = Arc::new(RecordingScheduler { log: log.clone() });
        (ResourceLoader::new(injector.clone(), scheduler), injector, log)
    }

    fn options(max_attempts: u32, delay_ms: u64) -> LoadOptions {
        LoadOptions {
            max_attempts,
            retry_delay: Duration::from_millis(delay_ms),
            debug: true,
        }
    }

    fn events(log: &EventLog) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn first_attempt_succeeds() {
        let (loader, injector, log) = loader_with(0);
        assert_eq!(loader.state(), LoadState::Idle);

        assert!(loader.load(options(2, 3000)).await);
        assert_eq!(injector.attempts(), 1);
        assert_eq!(events(&log), vec!["inject 1"]);
        assert_eq!(loader.state(), LoadState::Resolved(true));
    }

    #[tokio::test]
    async fn retries_after_failure_then_succeeds() {
        let (loader, injector, log) = loader_with(1);

        assert!(loader.load(options(3, 500)).await);
        assert_eq!(injector.attempts(), 2);
        assert_eq!(
            events(&log),
            vec!["inject 1", "remove", "sleep 500ms", "inject 2"]
        );
    }

    #[tokio::test]
    async fn exhausting_attempts_resolves_false() {
        let log: EventLog = Arc::new(Mutex::new(Vec::new()));
        let injector = Arc::new(FlakyInjector::always_failing(log.clone()));
        let scheduler = Arc::new(RecordingScheduler { log: log.clone() });
        let loader = ResourceLoader::new(injector.clone(), scheduler);

        assert!(!loader.load(options(2, 3000)).await);
        assert_eq!(injector.attempts(), 2);
        assert_eq!(
            events(&log),
            vec!["inject 1", "remove", "sleep 3000ms", "inject 2", "remove"]
        );
        assert_eq!(loader.state(), LoadState::Resolved(false));
    }

    #[tokio::test]
    async fn delay_is_fixed_between_every_attempt() {
        let (loader, _, log) = loader_with(usize::MAX);

        assert!(!loader.load(options(4, 250)).await);
        let sleeps: Vec<_> = events(&log)
            .into_iter()
            .filter(|e| e.starts_with("sleep"))
            .collect();
        assert_eq!(sleeps, vec!["sleep 250ms"; 3]);
    }

    #[tokio::test]
    async fn zero_attempts_still_tries_once() {
        let (loader, injector, _) = loader_with(usize::MAX);
        assert!(!loader.load(options(0, 10)).await);
        assert_eq!(injector.attempts(), 1);
    }

    #[tokio::test]
    async fn later_calls_share_the_first_outcome() {
        let (loader, injector, _) = loader_with(usize::MAX);

        assert!(!loader.load(options(1, 0)).await);
        // Different options after resolution start nothing new.
        assert!(!loader.load(options(5, 0)).await);
        assert_eq!(loader.start(options(9, 0)).peek(), Some(false));
        assert_eq!(injector.attempts(), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_sequence() {
        let injector = Arc::new(GatedInjector {
            gate: Notify::new(),
            attempts: AtomicUsize::new(0),
        });
        let loader = ResourceLoader::new(injector.clone(), Arc::new(TokioScheduler));

        let outcomes: Vec<LoadOutcome> = (1..=5)
            .map(|n| loader.start(options(n, 0)))
            .collect();
        assert!(outcomes.iter().all(|o| o.peek().is_none()));
        assert!(matches!(loader.state(), LoadState::Pending { max_attempts: 1, .. }));

        let joined = tokio::spawn({
            let loader = loader.clone();
            async move { loader.load(LoadOptions::default()).await }
        });

        // Let the spawned attempt reach the gate before releasing it.
        while injector.attempts.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        injector.gate.notify_one();

        for outcome in outcomes {
            assert!(outcome.wait().await);
        }
        assert!(joined.await.unwrap());
        assert_eq!(injector.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn sequence_completes_without_listeners() {
        let (loader, injector, _) = loader_with(1);
        drop(loader.start(options(2, 0)));

        while loader.state() != LoadState::Resolved(true) {
            tokio::task::yield_now().await;
        }
        assert_eq!(injector.attempts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_waits_the_full_delay() {
        let log: EventLog = Arc::new(Mutex::new(Vec::new()));
        let injector = Arc::new(FlakyInjector::new(1, log));
        let loader = ResourceLoader::new(injector, Arc::new(TokioScheduler));

        let started = tokio::time::Instant::now();
        assert!(loader.load(options(2, 3000)).await);
        assert!(started.elapsed() >= Duration::from_millis(3000));
    }

    #[test]
    fn without_runtime_resolves_false() {
        let (loader, injector, _) = loader_with(0);
        let outcome = loader.start(LoadOptions::default());
        assert_eq!(outcome.peek(), Some(false));
        assert_eq!(loader.state(), LoadState::Resolved(false));
        assert_eq!(injector.attempts(), 0);
    }

    #[test]
    fn default_options() {
        let defaults = LoadOptions::default();
        assert_eq!(defaults.max_attempts, 2);
        assert_eq!(defaults.retry_delay, Duration::from_secs(3));
        assert!(!defaults.debug);
    }

    #[test]
    fn global_loader_targets_fixed_url() {
        let loader = ResourceLoader::global();
        assert_eq!(loader.url(), LIVE_EDITOR_SCRIPT_URL);
        assert_eq!(loader.injector_name(), "http");
    }
}
