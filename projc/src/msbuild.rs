/// `Configuration` dimension name, e.g. `Debug` or `Release`.
pub const CONFIGURATION_DIMENSION: &str = "Configuration";

/// `Platform` dimension name, e.g. `AnyCPU`, `Win32`, `x64`.
pub const PLATFORM_DIMENSION: &str = "Platform";

/// `TargetFramework` dimension name, e.g. `net45`, `net46`. Present only
/// in cross-targeting projects.
pub const TARGET_FRAMEWORK_DIMENSION: &str = "TargetFramework";

/// Dimension names implied by positional configuration full names like
/// `Debug|AnyCPU|net46`.
pub const IMPLICIT_DIMENSION_NAMES: [&str; 3] = [
    CONFIGURATION_DIMENSION,
    PLATFORM_DIMENSION,
    TARGET_FRAMEWORK_DIMENSION,
];

/// Shows whether the project type specified carries a managed (.NET)
/// language service.
#[must_use]
pub fn supports_dotnet_language_service(type_id: &str) -> bool {
    LANGUAGE_SERVICES.contains_key(type_id)
}

/// Gets the language service moniker for a project type id, if the
/// project type is a managed one.
#[must_use]
pub fn language_service(type_id: &str) -> Option<&'static str> {
    LANGUAGE_SERVICES.get(type_id).copied()
}

// project type ids from https://github.com/JamesW75/visual-studio-project-type-guid
static LANGUAGE_SERVICES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}" => "CSharp",
    "{9A19103F-16F7-4668-BE54-9A1E7A4F7556}" => "CSharp",
    "{F184B08F-C81C-45F6-A57F-5ABD9991F28F}" => "VisualBasic",
    "{778DAE3C-4631-46EA-AA77-85C1314464D9}" => "VisualBasic",
    "{F2A71F9B-5D33-465A-A702-920D77279786}" => "FSharp",
};
