use color_eyre::eyre::{ensure, eyre};
use color_eyre::Result;
use nom::bytes::complete::is_not;
use nom::character::complete::char;
use nom::combinator::all_consuming;
use nom::multi::separated_list1;
use nom::IResult;

use crate::api::ProjectConfiguration;
use crate::msbuild;

/// `configuration` parses an MSBuild-style configuration full name like
/// `Debug`, `Debug|AnyCPU` or `Debug|AnyCPU|net46` into a
/// [`ProjectConfiguration`]. Parts map positionally onto the implicit
/// dimension order Configuration, Platform, TargetFramework.
///
/// # Errors
///
/// This function will return an error if the name is empty, contains an
/// empty part or has more parts than there are implicit dimensions.
pub fn configuration(text: &str) -> Result<ProjectConfiguration> {
    let (_, parts) = all_consuming(dimension_values)(text)
        .map_err(|e| eyre!("Invalid configuration name '{text}': {e}"))?;

    ensure!(
        parts.len() <= msbuild::IMPLICIT_DIMENSION_NAMES.len(),
        "Configuration name '{text}' has {} parts but at most {} dimensions are defined",
        parts.len(),
        msbuild::IMPLICIT_DIMENSION_NAMES.len()
    );

    Ok(ProjectConfiguration::from_dimensions(
        msbuild::IMPLICIT_DIMENSION_NAMES.into_iter().zip(parts),
    ))
}

fn dimension_values(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(char('|'), is_not("|"))(input)
}
