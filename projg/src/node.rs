use std::collections::HashMap;

/// Name of the assembly-scoped id part holding the owning project path.
pub const ASSEMBLY_PART: &str = "Assembly";

/// Name of the file-scoped id part holding an absolute file path.
pub const FILE_PART: &str = "File";

/// Name of the node property holding an explicit dependency id.
pub const DEPENDENCY_ID_PROPERTY: &str = "DependencyId";

/// Opaque identifier of a node in the dependencies graph: a bag of id
/// parts plus a bag of node properties.
///
/// Either bag may lack any entry depending on how the graph engine
/// originally created the node, so all accessors answer softly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphNodeId {
    parts: HashMap<String, String>,
    properties: HashMap<String, String>,
}

impl GraphNodeId {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a node id referring to a dependency of the project
    /// specified by an explicit id.
    #[must_use]
    pub fn from_dependency(project_path: &str, dependency_id: &str) -> Self {
        let mut node = Self::new();
        node.set_part(ASSEMBLY_PART, project_path);
        node.set_property(DEPENDENCY_ID_PROPERTY, dependency_id);
        node
    }

    pub fn set_part(&mut self, name: &str, value: &str) {
        self.parts.insert(name.to_owned(), value.to_owned());
    }

    pub fn set_property(&mut self, name: &str, value: &str) {
        self.properties.insert(name.to_owned(), value.to_owned());
    }

    #[must_use]
    pub fn part(&self, name: &str) -> Option<&str> {
        self.parts.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Project path carried by the assembly-scoped id part, if any.
    #[must_use]
    pub fn assembly_path(&self) -> Option<&str> {
        self.part(ASSEMBLY_PART)
    }

    /// Absolute file path carried by the file-scoped id part, if any.
    #[must_use]
    pub fn file_path(&self) -> Option<&str> {
        self.part(FILE_PART)
    }

    /// Explicit dependency id property, if the node carries one.
    #[must_use]
    pub fn dependency_id(&self) -> Option<&str> {
        self.property(DEPENDENCY_ID_PROPERTY)
    }
}
