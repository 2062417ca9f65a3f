use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;

use crate::api::{ConfiguredProject, ProjectConfiguration};
use crate::cache::ConfiguredProjectCache;
use crate::msbuild;

/// Loads a configured project for one configuration key. Implemented by
/// the host; loading may suspend on project evaluation or I/O.
#[async_trait]
pub trait ConfiguredProjectLoader: Send + Sync {
    async fn load(&self, configuration: &ProjectConfiguration) -> Result<Arc<ConfiguredProject>>;
}

/// A project before any configuration is applied: the identity shared by
/// all configured projects plus the loading capability behind the
/// memoizing cache.
pub struct UnconfiguredProject {
    path: String,
    type_id: String,
    loader: Arc<dyn ConfiguredProjectLoader>,
    cache: ConfiguredProjectCache,
}

impl UnconfiguredProject {
    #[must_use]
    pub fn new(path: &str, type_id: &str, loader: Arc<dyn ConfiguredProjectLoader>) -> Self {
        Self {
            path: path.to_owned(),
            type_id: type_id.to_owned(),
            loader,
            cache: ConfiguredProjectCache::new(),
        }
    }

    /// Full path to the project file.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Project type id, a GUID in braces.
    #[must_use]
    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    /// Shows whether the project carries a managed language service.
    #[must_use]
    pub fn supports_language_service(&self) -> bool {
        msbuild::supports_dotnet_language_service(&self.type_id)
    }

    /// Loads the configured project for the key specified, or returns the
    /// instance loaded earlier. Single-flight per key.
    pub async fn load_configured_project(
        &self,
        configuration: &ProjectConfiguration,
    ) -> Result<Arc<ConfiguredProject>> {
        self.cache
            .get_or_load(configuration, self.loader.as_ref())
            .await
    }

    /// Returns the configured project for the key specified only if it
    /// has been loaded already.
    #[must_use]
    pub fn configured_project(
        &self,
        configuration: &ProjectConfiguration,
    ) -> Option<Arc<ConfiguredProject>> {
        self.cache.get(configuration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct NopLoader;

    #[async_trait]
    impl ConfiguredProjectLoader for NopLoader {
        async fn load(
            &self,
            configuration: &ProjectConfiguration,
        ) -> Result<Arc<ConfiguredProject>> {
            Ok(Arc::new(ConfiguredProject::new(
                configuration.clone(),
                "/repo/app.csproj",
            )))
        }
    }

    #[rstest]
    #[case("{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}", true)]
    #[case("{F2A71F9B-5D33-465A-A702-920D77279786}", true)]
    #[case("{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}", false)]
    #[trace]
    fn language_service_capability_tests(#[case] type_id: &str, #[case] expected: bool) {
        // Arrange
        let project = UnconfiguredProject::new("/repo/app.csproj", type_id, Arc::new(NopLoader));

        // Act
        let actual = project.supports_language_service();

        // Assert
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn loaded_project_is_visible_through_peek() {
        // Arrange
        let project = UnconfiguredProject::new(
            "/repo/app.csproj",
            "{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}",
            Arc::new(NopLoader),
        );
        let configuration =
            ProjectConfiguration::from_dimensions([("Configuration", "Debug"), ("Platform", "AnyCPU")]);

        // Act
        let loaded = project.load_configured_project(&configuration).await.unwrap();

        // Assert
        let peeked = project.configured_project(&configuration).unwrap();
        assert!(Arc::ptr_eq(&loaded, &peeked));
    }
}
