//! Translation profile commands.

use std::sync::Arc;

use fg_translation::{InputTranslationProfile, TranslationProfile};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::ProfilesCommand;
use crate::config::OutputFormat;
use crate::output::{error, output, success};
use crate::{CliError, CliResult};

use super::Workspace;

/// Profile representation for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct ProfileDisplay {
    /// Profile name.
    pub name: String,
    /// Profile mode.
    pub mode: String,
    /// Number of rules.
    pub rules: usize,
    /// Directly included profiles.
    pub includes: String,
    /// Description.
    pub description: String,
}

impl From<&TranslationProfile> for ProfileDisplay {
    fn from(profile: &TranslationProfile) -> Self {
        Self {
            name: profile.name.clone(),
            mode: profile.mode.to_string(),
            rules: profile.rules.len(),
            includes: profile.included_profiles().join(", "),
            description: profile.description.clone(),
        }
    }
}

/// Result of validating one profile.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct ValidationDisplay {
    /// Profile name.
    pub name: String,
    /// Whether the profile and its inclusions compile.
    pub valid: bool,
    /// First problem found.
    pub problem: String,
}

/// Runs a profiles command.
pub fn run_profiles(
    cmd: ProfilesCommand,
    workspace: &Workspace,
    output_format: OutputFormat,
) -> CliResult<()> {
    match cmd {
        ProfilesCommand::List => list_profiles(workspace, output_format),
        ProfilesCommand::Validate => validate_profiles(workspace, output_format),
        ProfilesCommand::Show { name } => show_profile(workspace, &name),
    }
}

fn list_profiles(workspace: &Workspace, output_format: OutputFormat) -> CliResult<()> {
    let rows: Vec<ProfileDisplay> = workspace
        .repository
        .list_profiles()?
        .iter()
        .map(ProfileDisplay::from)
        .collect();
    output(&rows, output_format)
}

/// Compiles every loaded profile and the profiles it includes.
pub fn validate(workspace: &Workspace) -> CliResult<Vec<ValidationDisplay>> {
    let depth = workspace.config.gateway.translation.max_include_depth;
    Ok(workspace
        .repository
        .list_profiles()?
        .iter()
        .map(|profile| {
            let checked = InputTranslationProfile::new(
                profile,
                Arc::clone(&workspace.repository),
                Arc::clone(&workspace.registry),
            )
            .map(|compiled| compiled.with_max_include_depth(depth))
            .and_then(|compiled| compiled.validate_inclusions());
            ValidationDisplay {
                name: profile.name.clone(),
                valid: checked.is_ok(),
                problem: checked.err().map(|e| e.to_string()).unwrap_or_default(),
            }
        })
        .collect())
}

fn validate_profiles(workspace: &Workspace, output_format: OutputFormat) -> CliResult<()> {
    let report = validate(workspace)?;
    output(&report, output_format)?;

    let invalid = report.iter().filter(|r| !r.valid).count();
    if invalid == 0 {
        success(&format!("{} profile(s) valid", report.len()));
        Ok(())
    } else {
        error(&format!("{invalid} of {} profile(s) invalid", report.len()));
        Err(CliError::Validation(format!("{invalid} invalid profile(s)")))
    }
}

fn show_profile(workspace: &Workspace, name: &str) -> CliResult<()> {
    let profile = workspace
        .repository
        .get_profile(name)?
        .ok_or_else(|| CliError::InvalidArgument(format!("unknown profile '{name}'")))?;
    println!("{}", profile.to_json()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use fg_translation::{ActionRegistry, InMemoryProfileRepository};

    use super::*;
    use crate::CliConfig;

    fn workspace(profiles: Vec<TranslationProfile>) -> Workspace {
        Workspace {
            repository: InMemoryProfileRepository::with_profiles(profiles).into_shared(),
            registry: Arc::new(ActionRegistry::with_builtin_actions()),
            config: CliConfig::default(),
        }
    }

    #[test]
    fn display_lists_inclusions() {
        let profile = TranslationProfile::new("ldap")
            .with_rule("true", "includeInputProfile", &["common"])
            .with_rule("true", "mapGroup", &["'/A'"]);
        let row = ProfileDisplay::from(&profile);
        assert_eq!(row.rules, 2);
        assert_eq!(row.includes, "common");
        assert_eq!(row.mode, "UPDATE_ONLY");
    }

    #[test]
    fn validation_reports_each_profile() {
        let ws = workspace(vec![
            TranslationProfile::new("good").with_rule("true", "mapGroup", &["'/A'"]),
            TranslationProfile::new("bad-action").with_rule("true", "mapRole", &[]),
            TranslationProfile::new("dangling").with_rule("true", "includeInputProfile", &["gone"]),
        ]);

        let report = validate(&ws).unwrap();
        let verdicts: Vec<(&str, bool)> = report.iter().map(|r| (r.name.as_str(), r.valid)).collect();
        assert_eq!(verdicts, vec![("good", true), ("bad-action", false), ("dangling", false)]);
        assert!(report[2].problem.contains("'gone' does not exist"));
    }
}
