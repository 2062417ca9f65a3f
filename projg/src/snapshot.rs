use std::collections::HashMap;
use std::sync::Arc;

use itertools::Itertools;
use miette::Diagnostic;
use parking_lot::RwLock;
use petgraph::algo::{toposort, DfsSpace};
use petgraph::graph::{DiGraph, NodeIndex};
use projc::api::ProjectConfiguration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SnapshotError {
    /// Two dependencies of one project may not share an id, even when the
    /// ids differ only in case.
    #[error("dependency id '{id}' occurs more than once in project '{project_path}'")]
    #[diagnostic(code(projg::snapshot::duplicate_id))]
    DuplicateDependencyId { project_path: String, id: String },
}

/// A single resolved dependency of a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dependency {
    /// Stable id: either a logical identifier like `foo:1.0` or a path
    /// relative to the project root.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Path of the underlying item, if any.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub path: String,
    /// Shows whether the dependency resolved successfully.
    pub resolved: bool,
    /// Ids of the dependencies this one brings in.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub dependency_ids: Vec<String>,
}

/// Immutable, versioned view of one project's resolved dependencies.
///
/// Dependency ids compare ignoring ASCII case because they are routinely
/// derived from Windows file paths.
pub struct DependenciesSnapshot {
    project_path: String,
    configuration: ProjectConfiguration,
    dependencies: HashMap<String, Arc<Dependency>>,
    graph: DiGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl DependenciesSnapshot {
    /// Builds a snapshot from the dependencies resolved for the project
    /// and configuration specified. References to ids that are not part
    /// of the snapshot are dropped silently; graph queries routinely
    /// probe items that no longer exist.
    ///
    /// # Errors
    ///
    /// This function will return an error if two dependencies share an id.
    pub fn new(
        project_path: &str,
        configuration: ProjectConfiguration,
        dependencies: Vec<Dependency>,
    ) -> Result<Self, SnapshotError> {
        let mut map = HashMap::with_capacity(dependencies.len());
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::with_capacity(dependencies.len());

        for dependency in dependencies {
            let key = dependency.id.to_ascii_uppercase();
            let index = graph.add_node(dependency.id.clone());
            if nodes.insert(key.clone(), index).is_some() {
                return Err(SnapshotError::DuplicateDependencyId {
                    project_path: project_path.to_owned(),
                    id: dependency.id,
                });
            }
            map.insert(key, Arc::new(dependency));
        }

        let edges: Vec<(NodeIndex, NodeIndex)> = map
            .values()
            .flat_map(|dependency| {
                let from = nodes[&dependency.id.to_ascii_uppercase()];
                dependency
                    .dependency_ids
                    .iter()
                    .filter_map(|child| nodes.get(&child.to_ascii_uppercase()))
                    .map(move |to| (from, *to))
                    .collect::<Vec<_>>()
            })
            .collect();
        for (from, to) in edges {
            graph.add_edge(from, to, ());
        }

        Ok(Self {
            project_path: project_path.to_owned(),
            configuration,
            dependencies: map,
            graph,
            nodes,
        })
    }

    /// Full path of the project the snapshot belongs to.
    #[must_use]
    pub fn project_path(&self) -> &str {
        &self.project_path
    }

    /// Configuration the dependencies were resolved for.
    #[must_use]
    pub fn configuration(&self) -> &ProjectConfiguration {
        &self.configuration
    }

    /// Finds a dependency by id ignoring ASCII case.
    #[must_use]
    pub fn find_dependency(&self, dependency_id: &str) -> Option<Arc<Dependency>> {
        self.dependencies
            .get(&dependency_id.to_ascii_uppercase())
            .cloned()
    }

    /// Direct children of the dependency specified, ordered by id.
    #[must_use]
    pub fn children_of(&self, dependency_id: &str) -> Vec<Arc<Dependency>> {
        let Some(index) = self.nodes.get(&dependency_id.to_ascii_uppercase()) else {
            return Vec::new();
        };
        self.graph
            .neighbors(*index)
            .filter_map(|child| self.dependencies.get(&self.graph[child].to_ascii_uppercase()))
            .cloned()
            .sorted_by(|a, b| a.id.cmp(&b.id))
            .collect()
    }

    /// Shows whether the dependency references form a cycle.
    #[must_use]
    pub fn has_reference_cycles(&self) -> bool {
        let mut space = DfsSpace::new(&self.graph);
        toposort(&self.graph, Some(&mut space)).is_err()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

/// Supplies the latest dependencies snapshot of one project. The snapshot
/// is never pinned to a point-in-time version; every read observes the
/// newest value.
pub trait SnapshotProvider: Send + Sync {
    fn current_snapshot(&self) -> Option<Arc<DependenciesSnapshot>>;
}

/// Registry of snapshot providers keyed by project path. Paths compare
/// ignoring ASCII case the way Windows paths do.
///
/// Registration and removal belong to the snapshot subsystem; query
/// components only ever read.
#[derive(Default)]
pub struct AggregateSnapshotProvider {
    providers: RwLock<HashMap<String, Arc<dyn SnapshotProvider>>>,
}

impl AggregateSnapshotProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, project_path: &str, provider: Arc<dyn SnapshotProvider>) {
        self.providers
            .write()
            .insert(project_path.to_ascii_uppercase(), provider);
        tracing::debug!(project = project_path, "snapshot provider registered");
    }

    /// Removes the provider of the project specified. Returns `true` if
    /// one was registered.
    pub fn unregister(&self, project_path: &str) -> bool {
        let removed = self
            .providers
            .write()
            .remove(&project_path.to_ascii_uppercase())
            .is_some();
        if removed {
            tracing::debug!(project = project_path, "snapshot provider unregistered");
        }
        removed
    }

    /// Gets the provider registered for the project specified, if any.
    #[must_use]
    pub fn get_snapshot_provider(&self, project_path: &str) -> Option<Arc<dyn SnapshotProvider>> {
        self.providers
            .read()
            .get(&project_path.to_ascii_uppercase())
            .cloned()
    }
}
