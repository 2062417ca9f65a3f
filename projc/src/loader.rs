use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::{ConfigurationGroup, VersionedValue};
use crate::project::UnconfiguredProject;

/// Capacity of the internal notification sink.
const SINK_CAPACITY: usize = 16;

/// Publishes the current set of active configuration groups as a push
/// stream. Closing the returned channel signals stream completion.
pub trait ActiveConfigurationGroupSource: Send + Sync {
    fn subscribe(&self) -> mpsc::Receiver<VersionedValue<ConfigurationGroup>>;
}

/// Host-defined checkpoints a project passes while loading.
#[async_trait]
pub trait ProjectTasksService: Send + Sync {
    /// Completes once the project's initial capabilities are established.
    async fn initial_capabilities_established(&self);
}

enum State {
    Uninitialized,
    Initialized {
        link: JoinHandle<()>,
    },
    Disposed,
}

/// Forwards active configuration group changes into a draining worker so
/// that configured project level services can be started for them.
///
/// The subscription is attached at most once and detached at most once:
/// Uninitialized -> Initialized -> Disposed. Disposal is idempotent and
/// safe before initialization, under concurrency and with a notification
/// still queued.
pub struct ActiveConfiguredProjectsLoader {
    project: Arc<UnconfiguredProject>,
    source: Arc<dyn ActiveConfigurationGroupSource>,
    tasks: Arc<dyn ProjectTasksService>,
    state: Mutex<State>,
    disposed: Arc<AtomicBool>,
    handled: Arc<AtomicU64>,
}

impl ActiveConfiguredProjectsLoader {
    #[must_use]
    pub fn new(
        project: Arc<UnconfiguredProject>,
        source: Arc<dyn ActiveConfigurationGroupSource>,
        tasks: Arc<dyn ProjectTasksService>,
    ) -> Self {
        Self {
            project,
            source,
            tasks,
            state: Mutex::new(State::Uninitialized),
            disposed: Arc::new(AtomicBool::new(false)),
            handled: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Attaches the subscription once the project has passed its
    /// readiness checkpoint. Only projects carrying a managed language
    /// service subscribe; repeated calls after initialization or disposal
    /// have no effect.
    pub async fn ensure_initialized(&self) {
        if !self.project.supports_language_service() {
            return;
        }

        self.tasks.initial_capabilities_established().await;
        self.initialize();
    }

    fn initialize(&self) {
        let mut state = self.state.lock();
        if !matches!(*state, State::Uninitialized) {
            return;
        }

        let mut upstream = self.source.subscribe();
        let (sink, mut drain) = mpsc::channel::<VersionedValue<ConfigurationGroup>>(SINK_CAPACITY);

        // Link stage: forward the upstream until it completes. Dropping
        // the sink sender afterwards propagates completion to the worker.
        let link = tokio::spawn(async move {
            while let Some(group) = upstream.recv().await {
                if sink.send(group).await.is_err() {
                    break;
                }
            }
        });

        // Worker stage: drain the sink. Receiving a notification frees
        // sink capacity, which acknowledges it to the upstream even while
        // the handler itself does nothing yet.
        let disposed = Arc::clone(&self.disposed);
        let handled = Arc::clone(&self.handled);
        let project = Arc::clone(&self.project);
        tokio::spawn(async move {
            while let Some(group) = drain.recv().await {
                if disposed.load(Ordering::SeqCst) {
                    break;
                }
                on_active_configurations_changed(&project, &group).await;
                handled.fetch_add(1, Ordering::SeqCst);
            }
        });

        tracing::debug!(project = self.project.path(), "subscribed to active configuration groups");
        *state = State::Initialized { link };
    }

    /// Detaches the subscription and completes the internal sink, in that
    /// order. Safe to call repeatedly, concurrently and before
    /// initialization; a notification already queued at this point is
    /// dropped, not delivered.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);

        let mut state = self.state.lock();
        if let State::Initialized { link } = std::mem::replace(&mut *state, State::Disposed) {
            // Aborting the link releases the upstream subscription and
            // drops the sink sender, which closes the drain and unblocks
            // the worker.
            link.abort();
            tracing::debug!(project = self.project.path(), "active configuration group subscription released");
        }
    }

    /// Number of change notifications acknowledged so far.
    #[must_use]
    pub fn notifications_handled(&self) -> u64 {
        self.handled.load(Ordering::SeqCst)
    }
}

impl Drop for ActiveConfiguredProjectsLoader {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Acknowledges one change notification. Loading the changed
/// configurations is not wired up yet.
async fn on_active_configurations_changed(
    project: &UnconfiguredProject,
    group: &VersionedValue<ConfigurationGroup>,
) {
    tracing::trace!(
        project = project.path(),
        version = group.version,
        configurations = group.value.0.len(),
        "active configuration group changed"
    );
}
