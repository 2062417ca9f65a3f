/*!
Dependency graph query handlers for the project system: resolve which
project dependency a graph node refers to from a per-project dependencies
snapshot, and expand dependency children on demand.

## Example: resolving a dependency from a graph node

```
use std::sync::Arc;

use projc::api::ProjectConfiguration;
use projg::actions::DependencyResolver;
use projg::node::{self, GraphNodeId};
use projg::snapshot::{
    AggregateSnapshotProvider, DependenciesSnapshot, Dependency, SnapshotProvider,
};

struct Latest(Arc<DependenciesSnapshot>);

impl SnapshotProvider for Latest {
    fn current_snapshot(&self) -> Option<Arc<DependenciesSnapshot>> {
        Some(Arc::clone(&self.0))
    }
}

let configuration =
    ProjectConfiguration::from_dimensions([("Configuration", "Debug"), ("Platform", "AnyCPU")]);
let snapshot = DependenciesSnapshot::new(
    "/repo/app/app.csproj",
    configuration,
    vec![Dependency {
        id: "libs/foo.dll".into(),
        name: "foo".into(),
        resolved: true,
        ..Dependency::default()
    }],
)
.unwrap();

let aggregate = AggregateSnapshotProvider::new();
aggregate.register("/repo/app/app.csproj", Arc::new(Latest(Arc::new(snapshot))));

let resolver = DependencyResolver::new(Arc::new(aggregate));
let mut node = GraphNodeId::new();
node.set_part(node::ASSEMBLY_PART, "/repo/app/app.csproj");
node.set_part(node::FILE_PART, "/repo/app/libs/foo.dll");

let (dependency, _snapshot) = resolver.resolve_node(&node);
assert_eq!("libs/foo.dll", dependency.unwrap().id);
```
*/

#![warn(unused_extern_crates)]
#![allow(clippy::missing_errors_doc)]

pub mod actions;
pub mod node;
pub mod snapshot;
