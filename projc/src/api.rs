use std::collections::HashSet;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::msbuild;

/// Represents a single project build configuration as an ordered set of
/// dimension name/value pairs, e.g. `Configuration=Debug`, `Platform=AnyCPU`,
/// `TargetFramework=net46`.
///
/// The full dimension key defines configuration identity. Dimension names
/// compare case-insensitively, dimension values compare case-sensitively.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectConfiguration {
    dimensions: Vec<(String, String)>,
}

impl ProjectConfiguration {
    /// Creates a configuration from dimension name/value pairs keeping
    /// their order.
    pub fn from_dimensions<N, V, I>(dimensions: I) -> Self
    where
        N: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (N, V)>,
    {
        Self {
            dimensions: dimensions
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }

    /// Gets a dimension value by name. Name comparison is case-insensitive.
    #[must_use]
    pub fn dimension(&self, name: &str) -> Option<&str> {
        self.dimensions
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Iterates dimension name/value pairs in declaration order.
    pub fn dimensions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.dimensions.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Renders the configuration full name, i.e. dimension values joined
    /// by `|` like `Debug|AnyCPU|net46`.
    #[must_use]
    pub fn full_name(&self) -> String {
        self.dimensions.iter().map(|(_, v)| v.as_str()).join("|")
    }

    /// Shows whether the configuration carries a `TargetFramework`
    /// dimension, i.e. belongs to a cross-targeting project.
    #[must_use]
    pub fn is_cross_targeting(&self) -> bool {
        self.target_framework().is_some()
    }

    /// Gets the `TargetFramework` dimension value if any.
    #[must_use]
    pub fn target_framework(&self) -> Option<&str> {
        self.dimension(msbuild::TARGET_FRAMEWORK_DIMENSION)
    }
}

/// An ordered set of configuration dimension names deduplicated
/// case-insensitively. The first inserted spelling of a name wins.
#[derive(Debug, Clone, Default)]
pub struct DimensionNameSet {
    names: Vec<String>,
    index: HashSet<String>,
}

impl DimensionNameSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a dimension name unless an equal one (ignoring case) is
    /// already present. Returns `true` if the name was added.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.index.insert(name.to_ascii_uppercase()) {
            self.names.push(name.to_owned());
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains(&name.to_ascii_uppercase())
    }

    /// Iterates names in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for DimensionNameSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for name in iter {
            set.insert(name.as_ref());
        }
        set
    }
}

/// An ordered, non-empty sequence of resolved configured objects together
/// with the dimension names that were free to vary between them (e.g.
/// `TargetFramework` in a cross-targeting project).
#[derive(Debug, Clone)]
pub struct ActiveConfiguredObjects<T> {
    /// Resolved objects in stable candidate order.
    pub objects: Vec<T>,
    /// Dimension names excluded from active configuration matching.
    pub dimension_names: DimensionNameSet,
}

impl<T> ActiveConfiguredObjects<T> {
    /// Creates a new instance. The object sequence must not be empty.
    #[must_use]
    pub fn new(objects: Vec<T>, dimension_names: DimensionNameSet) -> Self {
        assert!(
            !objects.is_empty(),
            "active configured objects sequence must not be empty"
        );
        Self {
            objects,
            dimension_names,
        }
    }
}

/// The current set of active project configurations published by the
/// active configuration group service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigurationGroup(pub Vec<ProjectConfiguration>);

/// A value paired with the monotonically increasing version of the data
/// source that produced it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionedValue<T> {
    pub value: T,
    pub version: u64,
}

/// A project loaded for one particular configuration key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfiguredProject {
    configuration: ProjectConfiguration,
    project_path: String,
}

impl ConfiguredProject {
    #[must_use]
    pub fn new(configuration: ProjectConfiguration, project_path: &str) -> Self {
        Self {
            configuration,
            project_path: project_path.to_owned(),
        }
    }

    #[must_use]
    pub fn configuration(&self) -> &ProjectConfiguration {
        &self.configuration
    }

    #[must_use]
    pub fn project_path(&self) -> &str {
        &self.project_path
    }

    #[must_use]
    pub fn is_cross_targeting(&self) -> bool {
        self.configuration.is_cross_targeting()
    }
}
