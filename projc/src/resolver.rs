use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;

use crate::api::{
    ActiveConfiguredObjects, ConfiguredProject, DimensionNameSet, ProjectConfiguration,
};
use crate::project::UnconfiguredProject;

/// Supplies the set of all configurations declared for a project.
#[async_trait]
pub trait ProjectConfigurationsService: Send + Sync {
    async fn known_configurations(&self) -> Result<BTreeSet<ProjectConfiguration>>;
}

/// Supplies the configuration currently selected at the solution level.
/// Returns `None` until solution configuration negotiation has completed.
pub trait ActiveConfigurationSource: Send + Sync {
    fn active_configuration(&self) -> Option<ProjectConfiguration>;
}

/// Contributes one dimension name to exclude from active configuration
/// matching.
pub trait DimensionProvider: Send + Sync {
    fn dimension_name(&self) -> &str;
}

/// Resolves the set of active configurations and configured projects for
/// one project.
///
/// A project configuration is active when it matches the active solution
/// configuration on every dimension except those the registered
/// [`DimensionProvider`] instances tell to ignore. Given a cross-targeting
/// project with known configurations
///
/// ```text
///   Debug|AnyCPU|net45    Debug|AnyCPU|net46
/// Release|AnyCPU|net45  Release|AnyCPU|net46
/// ```
///
/// active solution configuration `Debug|AnyCPU|net45` and
/// `TargetFramework` ignored, the active set is `Debug|AnyCPU|net45` and
/// `Debug|AnyCPU|net46`. A project that does not cross-target has exactly
/// one active configuration.
pub struct ActiveConfiguredProjectsProvider {
    configurations: Arc<dyn ProjectConfigurationsService>,
    active_source: Arc<dyn ActiveConfigurationSource>,
    dimension_providers: Vec<Arc<dyn DimensionProvider>>,
    project: Arc<UnconfiguredProject>,
}

impl ActiveConfiguredProjectsProvider {
    /// Creates a provider over explicitly injected collaborators. The
    /// dimension provider list is ordered by preference; the first
    /// spelling of a name wins when several providers contribute it.
    #[must_use]
    pub fn new(
        configurations: Arc<dyn ProjectConfigurationsService>,
        active_source: Arc<dyn ActiveConfigurationSource>,
        dimension_providers: Vec<Arc<dyn DimensionProvider>>,
        project: Arc<UnconfiguredProject>,
    ) -> Self {
        Self {
            configurations,
            active_source,
            dimension_providers,
            project,
        }
    }

    /// Resolves the active configuration set for the project.
    ///
    /// Returns `Ok(None)` while no solution configuration has been
    /// established yet; callers treat that as "not ready" and poll again
    /// on the next change notification.
    ///
    /// # Panics
    ///
    /// Panics if an active solution configuration exists but matches none
    /// of the known project configurations. That means the configuration
    /// provider and the active configuration service have diverged and
    /// the project model is no longer consistent.
    pub async fn active_project_configurations(
        &self,
    ) -> Result<Option<ActiveConfiguredObjects<ProjectConfiguration>>> {
        let Some(active) = self.active_source.active_configuration() else {
            return Ok(None);
        };

        let known = self.configurations.known_configurations().await?;
        let ignored = self.ignored_dimension_names();

        let candidates: Vec<ProjectConfiguration> = known
            .into_iter()
            .filter(|configuration| is_active_configuration_candidate(&active, configuration, &ignored))
            .collect();

        assert!(
            !candidates.is_empty(),
            "active solution configuration '{}' is not one of the known project configurations",
            active.full_name()
        );

        tracing::debug!(
            active = %active.full_name(),
            candidates = candidates.len(),
            "resolved active configurations"
        );

        Ok(Some(ActiveConfiguredObjects::new(candidates, ignored)))
    }

    /// Resolves and loads the active configured projects, preserving the
    /// candidate order of [`Self::active_project_configurations`].
    pub async fn active_configured_projects(
        &self,
    ) -> Result<Option<ActiveConfiguredObjects<Arc<ConfiguredProject>>>> {
        let Some(configurations) = self.active_project_configurations().await? else {
            return Ok(None);
        };

        let mut objects = Vec::with_capacity(configurations.objects.len());
        for configuration in &configurations.objects {
            objects.push(self.project.load_configured_project(configuration).await?);
        }

        Ok(Some(ActiveConfiguredObjects::new(
            objects,
            configurations.dimension_names,
        )))
    }

    /// Builds a map of the active configured projects.
    ///
    /// When every active project cross-targets, the map is keyed by each
    /// project's `TargetFramework` value. Otherwise it holds the single
    /// active project under the empty string key.
    ///
    /// # Panics
    ///
    /// Panics if two simultaneously active configurations claim the same
    /// `TargetFramework` value.
    pub async fn active_configured_projects_map(
        &self,
    ) -> Result<Option<HashMap<String, Arc<ConfiguredProject>>>> {
        let Some(projects) = self.active_configured_projects().await? else {
            return Ok(None);
        };

        let cross_targeting = projects.objects.iter().all(|p| p.is_cross_targeting());

        let mut map = HashMap::with_capacity(projects.objects.len());
        if cross_targeting {
            for project in projects.objects {
                let framework = project
                    .configuration()
                    .target_framework()
                    .map(str::to_owned);
                if let Some(framework) = framework {
                    let previous = map.insert(framework.clone(), project);
                    assert!(
                        previous.is_none(),
                        "two active configurations claim target framework '{framework}'"
                    );
                }
            }
        } else if let Some(first) = projects.objects.into_iter().next() {
            map.insert(String::new(), first);
        }

        Ok(Some(map))
    }

    fn ignored_dimension_names(&self) -> DimensionNameSet {
        self.dimension_providers
            .iter()
            .map(|provider| provider.dimension_name())
            .collect()
    }
}

/// Shows whether the configuration matches the active solution
/// configuration on every non-ignored dimension. Dimension values compare
/// exactly; a configuration lacking a required dimension is not a
/// candidate.
fn is_active_configuration_candidate(
    active: &ProjectConfiguration,
    configuration: &ProjectConfiguration,
    ignored_dimension_names: &DimensionNameSet,
) -> bool {
    active.dimensions().all(|(name, value)| {
        ignored_dimension_names.contains(name) || configuration.dimension(name) == Some(value)
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::msbuild;
    use crate::project::ConfiguredProjectLoader;

    struct StaticConfigurations(BTreeSet<ProjectConfiguration>);

    #[async_trait]
    impl ProjectConfigurationsService for StaticConfigurations {
        async fn known_configurations(&self) -> Result<BTreeSet<ProjectConfiguration>> {
            Ok(self.0.clone())
        }
    }

    struct StaticActive(Option<ProjectConfiguration>);

    impl ActiveConfigurationSource for StaticActive {
        fn active_configuration(&self) -> Option<ProjectConfiguration> {
            self.0.clone()
        }
    }

    struct Ignore(&'static str);

    impl DimensionProvider for Ignore {
        fn dimension_name(&self) -> &str {
            self.0
        }
    }

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

    fn cfg2(configuration: &str, platform: &str) -> ProjectConfiguration {
        ProjectConfiguration::from_dimensions([
            (msbuild::CONFIGURATION_DIMENSION, configuration),
            (msbuild::PLATFORM_DIMENSION, platform),
        ])
    }

    fn cfg3(configuration: &str, platform: &str, framework: &str) -> ProjectConfiguration {
        ProjectConfiguration::from_dimensions([
            (msbuild::CONFIGURATION_DIMENSION, configuration),
            (msbuild::PLATFORM_DIMENSION, platform),
            (msbuild::TARGET_FRAMEWORK_DIMENSION, framework),
        ])
    }

    fn provider(
        known: Vec<ProjectConfiguration>,
        active: Option<ProjectConfiguration>,
        ignored: Vec<&'static str>,
    ) -> ActiveConfiguredProjectsProvider {
        let dimension_providers = ignored
            .into_iter()
            .map(|name| Arc::new(Ignore(name)) as Arc<dyn DimensionProvider>)
            .collect();
        ActiveConfiguredProjectsProvider::new(
            Arc::new(StaticConfigurations(known.into_iter().collect())),
            Arc::new(StaticActive(active)),
            dimension_providers,
            Arc::new(UnconfiguredProject::new(
                "/repo/app.csproj",
                "{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}",
                Arc::new(NopLoader),
            )),
        )
    }

    fn cross_targeting_known() -> Vec<ProjectConfiguration> {
        vec![
            cfg3("Debug", "AnyCPU", "net45"),
            cfg3("Debug", "AnyCPU", "net46"),
            cfg3("Release", "AnyCPU", "net45"),
            cfg3("Release", "AnyCPU", "net46"),
        ]
    }

    #[tokio::test]
    async fn cross_targeting_project_activates_every_framework() {
        // Arrange
        let provider = provider(
            cross_targeting_known(),
            Some(cfg3("Debug", "AnyCPU", "net45")),
            vec![msbuild::TARGET_FRAMEWORK_DIMENSION],
        );

        // Act
        let actual = provider.active_project_configurations().await.unwrap().unwrap();

        // Assert
        assert_eq!(
            vec![cfg3("Debug", "AnyCPU", "net45"), cfg3("Debug", "AnyCPU", "net46")],
            actual.objects
        );
        assert_eq!(
            vec![msbuild::TARGET_FRAMEWORK_DIMENSION],
            actual.dimension_names.iter().collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn cross_targeting_map_is_keyed_by_target_framework() {
        // Arrange
        let provider = provider(
            cross_targeting_known(),
            Some(cfg3("Debug", "AnyCPU", "net45")),
            vec![msbuild::TARGET_FRAMEWORK_DIMENSION],
        );

        // Act
        let actual = provider.active_configured_projects_map().await.unwrap().unwrap();

        // Assert
        assert_eq!(2, actual.len());
        assert_eq!(
            &cfg3("Debug", "AnyCPU", "net45"),
            actual["net45"].configuration()
        );
        assert_eq!(
            &cfg3("Debug", "AnyCPU", "net46"),
            actual["net46"].configuration()
        );
    }

    #[tokio::test]
    async fn plain_project_activates_single_configuration() {
        // Arrange
        let provider = provider(
            vec![cfg2("Debug", "AnyCPU"), cfg2("Release", "AnyCPU")],
            Some(cfg2("Debug", "AnyCPU")),
            vec![],
        );

        // Act
        let configurations = provider.active_project_configurations().await.unwrap().unwrap();
        let map = provider.active_configured_projects_map().await.unwrap().unwrap();

        // Assert
        assert_eq!(vec![cfg2("Debug", "AnyCPU")], configurations.objects);
        assert_eq!(1, map.len());
        assert_eq!(&cfg2("Debug", "AnyCPU"), map[""].configuration());
    }

    #[tokio::test]
    async fn absent_solution_configuration_is_not_ready_rather_than_error() {
        // Arrange
        let provider = provider(cross_targeting_known(), None, vec![]);

        // Act
        let configurations = provider.active_project_configurations().await.unwrap();
        let projects = provider.active_configured_projects().await.unwrap();
        let map = provider.active_configured_projects_map().await.unwrap();

        // Assert
        assert!(configurations.is_none());
        assert!(projects.is_none());
        assert!(map.is_none());
    }

    #[tokio::test]
    #[should_panic(expected = "is not one of the known project configurations")]
    async fn unknown_active_configuration_is_a_consistency_fault() {
        let provider = provider(
            vec![cfg2("Debug", "AnyCPU"), cfg2("Release", "AnyCPU")],
            Some(cfg2("Debug", "ARM")),
            vec![],
        );

        let _ = provider.active_project_configurations().await;
    }

    #[tokio::test]
    #[should_panic(expected = "claim target framework")]
    async fn duplicate_active_target_framework_is_a_fault() {
        // Both x86 and x64 configurations become active once Platform and
        // TargetFramework are ignored, and both claim net45.
        let provider = provider(
            vec![cfg3("Debug", "x86", "net45"), cfg3("Debug", "x64", "net45")],
            Some(cfg3("Debug", "x86", "net45")),
            vec![
                msbuild::PLATFORM_DIMENSION,
                msbuild::TARGET_FRAMEWORK_DIMENSION,
            ],
        );

        let _ = provider.active_configured_projects_map().await;
    }

    #[tokio::test]
    async fn ignored_dimension_names_dedupe_case_insensitively() {
        // Arrange
        let provider = provider(
            cross_targeting_known(),
            Some(cfg3("Debug", "AnyCPU", "net45")),
            vec!["TargetFramework", "targetframework"],
        );

        // Act
        let actual = provider.active_project_configurations().await.unwrap().unwrap();

        // Assert
        assert_eq!(1, actual.dimension_names.len());
        assert_eq!(
            vec!["TargetFramework"],
            actual.dimension_names.iter().collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn configuration_missing_a_required_dimension_is_not_a_candidate() {
        // Arrange
        let incomplete = ProjectConfiguration::from_dimensions([(
            msbuild::CONFIGURATION_DIMENSION,
            "Debug",
        )]);
        let provider = provider(
            vec![incomplete, cfg2("Debug", "AnyCPU")],
            Some(cfg2("Debug", "AnyCPU")),
            vec![],
        );

        // Act
        let actual = provider.active_project_configurations().await.unwrap().unwrap();

        // Assert
        assert_eq!(vec![cfg2("Debug", "AnyCPU")], actual.objects);
    }

    #[tokio::test]
    async fn loaded_projects_preserve_candidate_order() {
        // Arrange
        let provider = provider(
            cross_targeting_known(),
            Some(cfg3("Release", "AnyCPU", "net45")),
            vec![msbuild::TARGET_FRAMEWORK_DIMENSION],
        );

        // Act
        let actual = provider.active_configured_projects().await.unwrap().unwrap();

        // Assert
        let names: Vec<String> = actual
            .objects
            .iter()
            .map(|p| p.configuration().full_name())
            .collect();
        assert_eq!(vec!["Release|AnyCPU|net45", "Release|AnyCPU|net46"], names);
    }

    fn arb_configuration() -> impl Strategy<Value = ProjectConfiguration> {
        (
            prop::sample::select(vec!["Debug", "Release"]),
            prop::sample::select(vec!["AnyCPU", "x86", "x64"]),
            prop::sample::select(vec!["net45", "net46", "net48"]),
        )
            .prop_map(|(c, p, t)| cfg3(c, p, t))
    }

    proptest! {
        #[test]
        fn candidates_are_exactly_the_matching_subset(
            known in prop::collection::btree_set(arb_configuration(), 1..8),
            active in arb_configuration(),
            ignored in prop::collection::vec(
                prop::sample::select(vec![
                    msbuild::CONFIGURATION_DIMENSION,
                    msbuild::PLATFORM_DIMENSION,
                    msbuild::TARGET_FRAMEWORK_DIMENSION,
                ]),
                0..=3,
            ),
        ) {
            let ignored: DimensionNameSet = ignored.into_iter().collect();

            let candidates: Vec<&ProjectConfiguration> = known
                .iter()
                .filter(|c| is_active_configuration_candidate(&active, c, &ignored))
                .collect();

            // the active configuration always matches itself
            if known.contains(&active) {
                prop_assert!(candidates.contains(&&active));
            }

            // every candidate agrees with the active configuration on
            // each non-ignored dimension, every non-candidate differs
            for configuration in &known {
                let matches = active.dimensions().all(|(name, value)| {
                    ignored.contains(name) || configuration.dimension(name) == Some(value)
                });
                prop_assert_eq!(matches, candidates.contains(&configuration));
            }
        }
    }
}
