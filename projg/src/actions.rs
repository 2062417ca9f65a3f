use std::sync::Arc;

use crate::node::GraphNodeId;
use crate::snapshot::{AggregateSnapshotProvider, DependenciesSnapshot, Dependency};

/// Kind of query the graph engine dispatches to handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphRequestKind {
    /// Expand the children of the input nodes.
    Children,
    /// Check whether the input nodes contain anything expandable.
    Contains,
}

/// Mutable context of one graph query: the nodes the engine asks about
/// and the nodes a handler produced in response.
#[derive(Debug, Clone)]
pub struct GraphContext {
    pub kind: GraphRequestKind,
    pub input_nodes: Vec<GraphNodeId>,
    pub output_nodes: Vec<GraphNodeId>,
}

impl GraphContext {
    #[must_use]
    pub fn new(kind: GraphRequestKind, input_nodes: Vec<GraphNodeId>) -> Self {
        Self {
            kind,
            input_nodes,
            output_nodes: Vec::new(),
        }
    }
}

/// Arguments of a dependencies snapshot change notification.
pub struct SnapshotChange {
    pub snapshot: Arc<DependenciesSnapshot>,
}

/// A graph query/change handler selected by capability, not by type.
///
/// Every method answers "cannot handle" by default; concrete handlers
/// override only the requests and changes they support.
pub trait GraphActionHandler {
    fn can_handle_request(&self, _context: &GraphContext) -> bool {
        false
    }

    fn can_handle_changes(&self) -> bool {
        false
    }

    /// Returns `true` when the handler changed the context.
    fn handle_request(&self, _context: &mut GraphContext) -> bool {
        false
    }

    /// Returns `true` when the handler changed the context.
    fn handle_changes(&self, _context: &mut GraphContext, _changes: &SnapshotChange) -> bool {
        false
    }
}

/// Resolves the dependency a graph node refers to from the owning
/// project's latest snapshot.
pub struct DependencyResolver {
    aggregate: Arc<AggregateSnapshotProvider>,
}

impl DependencyResolver {
    #[must_use]
    pub fn new(aggregate: Arc<AggregateSnapshotProvider>) -> Self {
        Self { aggregate }
    }

    /// Resolves the dependency behind the node specified together with
    /// the snapshot it came from.
    ///
    /// The project is taken from the node's assembly-scoped id part and
    /// the dependency id from the explicit id property when present,
    /// otherwise from the file-scoped id part relative to the project
    /// directory. Nodes that do not correspond to a recognizable project
    /// scoped dependency resolve to nothing; that is a routine outcome,
    /// not an error.
    #[must_use]
    pub fn resolve_node(
        &self,
        node: &GraphNodeId,
    ) -> (Option<Arc<Dependency>>, Option<Arc<DependenciesSnapshot>>) {
        let Some(project_path) = node.assembly_path().filter(|p| !p.is_empty()) else {
            return (None, None);
        };

        let project_folder = parent_of(project_path);
        let Some(id) = node_dependency_id(node, project_folder) else {
            return (None, None);
        };

        // always refresh
        self.resolve_id(project_path, &id)
    }

    /// Looks a dependency up by id in the latest snapshot of the project
    /// specified.
    #[must_use]
    pub fn resolve_id(
        &self,
        project_path: &str,
        dependency_id: &str,
    ) -> (Option<Arc<Dependency>>, Option<Arc<DependenciesSnapshot>>) {
        let Some(snapshot) = self.snapshot(project_path) else {
            return (None, None);
        };
        let dependency = snapshot.find_dependency(dependency_id);
        tracing::trace!(
            project = project_path,
            id = dependency_id,
            found = dependency.is_some(),
            "dependency looked up"
        );
        (dependency, Some(snapshot))
    }

    /// Latest snapshot of the project specified, if a provider is
    /// registered for it.
    #[must_use]
    pub fn snapshot(&self, project_path: &str) -> Option<Arc<DependenciesSnapshot>> {
        self.aggregate
            .get_snapshot_provider(project_path)?
            .current_snapshot()
    }
}

/// Expands the children of dependency nodes on behalf of the graph
/// engine. Claims only `Children` requests whose input resolves to a
/// dependency that actually has children.
pub struct CheckChildrenHandler {
    resolver: DependencyResolver,
}

impl CheckChildrenHandler {
    #[must_use]
    pub fn new(resolver: DependencyResolver) -> Self {
        Self { resolver }
    }
}

impl GraphActionHandler for CheckChildrenHandler {
    fn can_handle_request(&self, context: &GraphContext) -> bool {
        context.kind == GraphRequestKind::Children
            && context.input_nodes.iter().any(|node| {
                let (dependency, _) = self.resolver.resolve_node(node);
                dependency.is_some_and(|d| !d.dependency_ids.is_empty())
            })
    }

    fn handle_request(&self, context: &mut GraphContext) -> bool {
        let mut changed = false;
        for node in &context.input_nodes {
            let (Some(dependency), Some(snapshot)) = self.resolver.resolve_node(node) else {
                continue;
            };
            for child in snapshot.children_of(&dependency.id) {
                context
                    .output_nodes
                    .push(GraphNodeId::from_dependency(snapshot.project_path(), &child.id));
                changed = true;
            }
        }
        changed
    }
}

fn node_dependency_id(node: &GraphNodeId, project_folder: &str) -> Option<String> {
    if let Some(id) = node.dependency_id() {
        return Some(id.to_owned());
    }
    // some nodes only carry an absolute file path, not a logical id
    let file = node.file_path()?;
    Some(strip_folder_prefix(file, project_folder).to_owned())
}

/// Cuts the directory containing the path off, separator-agnostic. An
/// input without separators has no directory.
fn parent_of(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(index) => &path[..index],
        None => "",
    }
}

/// Strips the folder prefix, compared ignoring ASCII case the way
/// Windows paths do, and any leading separators left over.
fn strip_folder_prefix<'a>(path: &'a str, folder: &str) -> &'a str {
    if folder.is_empty() {
        return path;
    }
    match path.get(..folder.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(folder) => {
            path[folder.len()..].trim_start_matches(['\\', '/'])
        }
        _ => path,
    }
}
