use std::collections::HashMap;
use std::sync::Arc;

use color_eyre::Result;
use parking_lot::Mutex;
use tokio::sync::OnceCell;

use crate::api::{ConfiguredProject, ProjectConfiguration};
use crate::project::ConfiguredProjectLoader;

/// Memoizes configured projects by configuration key.
///
/// Entries are created on first request and live for the lifetime of the
/// owning project. Concurrent requests for the same key share a single
/// in-flight load, so the underlying loader runs at most once per key at
/// any moment.
#[derive(Default)]
pub struct ConfiguredProjectCache {
    entries: Mutex<HashMap<ProjectConfiguration, Arc<OnceCell<Arc<ConfiguredProject>>>>>,
}

impl ConfiguredProjectCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the configured project for the key specified, loading it
    /// through `loader` if it is not cached yet.
    ///
    /// A failed load leaves the entry empty so a later caller can retry.
    pub async fn get_or_load(
        &self,
        configuration: &ProjectConfiguration,
        loader: &dyn ConfiguredProjectLoader,
    ) -> Result<Arc<ConfiguredProject>> {
        let cell = {
            let mut entries = self.entries.lock();
            Arc::clone(entries.entry(configuration.clone()).or_default())
        };

        // the map lock is released above; only the per-key cell is awaited
        let project = cell
            .get_or_try_init(|| async {
                tracing::debug!(
                    configuration = %configuration.full_name(),
                    "loading configured project"
                );
                loader.load(configuration).await
            })
            .await?;

        Ok(Arc::clone(project))
    }

    /// Returns the already loaded project for the key specified, if any.
    #[must_use]
    pub fn get(&self, configuration: &ProjectConfiguration) -> Option<Arc<ConfiguredProject>> {
        self.entries
            .lock()
            .get(configuration)
            .and_then(|cell| cell.get().cloned())
    }
}
