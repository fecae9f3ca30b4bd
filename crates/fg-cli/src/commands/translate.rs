//! Dry run of a translation profile against a remote input file.

use std::path::Path;
use std::sync::Arc;

use fg_model::RemotelyAuthenticatedInput;
use fg_translation::{InputTranslationProfile, MappingResult};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::TranslateArgs;
use crate::config::OutputFormat;
use crate::output::{info, output};
use crate::{CliError, CliResult};

use super::Workspace;

/// One mapped item for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct MappingRow {
    /// Identity, attribute, group or entity change.
    pub kind: &'static str,
    /// The mapped value.
    pub value: String,
    /// Effect mode.
    pub mode: String,
    /// Profile that produced the item.
    pub profile: String,
}

/// Runs the translate command.
pub fn run_translate(
    args: TranslateArgs,
    workspace: &Workspace,
    output_format: OutputFormat,
) -> CliResult<()> {
    let input = read_input(&args.input)?;
    let result = translate(workspace, &args.profile, &input)?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Table => {
            output(&rows(&result), output_format)?;
            info(&format!(
                "stale cleanup: identities={} groups={} attributes={}",
                result.clean_stale_identities, result.clean_stale_groups, result.clean_stale_attributes
            ));
        }
    }
    Ok(())
}

/// Reads a remote input document.
pub fn read_input(path: &Path) -> CliResult<RemotelyAuthenticatedInput> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| CliError::InvalidArgument(format!("{}: invalid remote input: {e}", path.display())))
}

/// Runs a profile without touching any store.
pub fn translate(
    workspace: &Workspace,
    profile: &str,
    input: &RemotelyAuthenticatedInput,
) -> CliResult<MappingResult> {
    let profile = InputTranslationProfile::load(
        profile,
        Arc::clone(&workspace.repository),
        Arc::clone(&workspace.registry),
    )?
    .with_max_include_depth(workspace.config.gateway.translation.max_include_depth);
    Ok(profile.translate(input)?)
}

/// Flattens a mapping result into display rows, in mapping order per kind.
pub fn rows(result: &MappingResult) -> Vec<MappingRow> {
    let identities = result.identities.iter().map(|mi| MappingRow {
        kind: "identity",
        value: mi.identity.tav().to_string(),
        mode: mi.mode.to_string(),
        profile: mi.identity.translation_profile.clone().unwrap_or_default(),
    });
    let attributes = result.attributes.iter().map(|ma| MappingRow {
        kind: "attribute",
        value: format!(
            "{}@{} = {}",
            ma.attribute.name,
            ma.attribute.group_path,
            ma.attribute.values.join(", ")
        ),
        mode: ma.mode.to_string(),
        profile: ma.attribute.translation_profile.clone().unwrap_or_default(),
    });
    let groups = result.groups.iter().map(|mg| MappingRow {
        kind: "group",
        value: mg.group.clone(),
        mode: mg.mode.to_string(),
        profile: mg.profile.clone().unwrap_or_default(),
    });
    let changes = result.entity_changes.iter().map(|change| MappingRow {
        kind: "entity change",
        value: match (change.scheduled_operation, change.scheduled_time) {
            (Some(op), Some(at)) => format!("{op} at {}", at.to_rfc3339()),
            (Some(op), None) => op.to_string(),
            (None, _) => "CLEAR".to_string(),
        },
        mode: String::new(),
        profile: String::new(),
    });

    identities
        .chain(attributes)
        .chain(groups)
        .chain(changes)
        .collect()
}

#[cfg(test)]
mod tests {
    use fg_translation::{ActionRegistry, InMemoryProfileRepository, TranslationProfile};

    use super::*;
    use crate::CliConfig;

    fn workspace() -> Workspace {
        let ldap = TranslationProfile::new("ldap")
            .with_rule("true", "mapIdentity", &["userName", "id", "", "MATCH"])
            .with_rule("true", "mapAttribute", &["cn", "/", "attr['cn']"])
            .with_rule("groups contains 'staff'", "mapGroup", &["'/staff'", "CREATE_GROUP_IF_MISSING"])
            .with_rule("true", "entityChange", &["CLEAR"]);
        Workspace {
            repository: InMemoryProfileRepository::with_profiles([ldap]).into_shared(),
            registry: Arc::new(ActionRegistry::with_builtin_actions()),
            config: CliConfig::default(),
        }
    }

    #[test]
    fn reads_input_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("login.json");
        std::fs::write(
            &path,
            r#"{"idp": "corp-ldap", "identities": [{"name": "joe", "type": "userName"}],
                "attributes": [{"name": "cn", "values": ["Joe"]}], "groups": ["staff"]}"#,
        )
        .unwrap();

        let input = read_input(&path).unwrap();
        assert_eq!(input.idp_name(), "corp-ldap");
    }

    #[test]
    fn rows_follow_mapping_order() {
        let input = RemotelyAuthenticatedInput::new("corp-ldap")
            .with_identity("joe", Some("userName"))
            .with_attribute("cn", ["Joe"])
            .with_group("staff");

        let result = translate(&workspace(), "ldap", &input).unwrap();
        let rows = rows(&result);

        let kinds: Vec<&str> = rows.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec!["identity", "attribute", "group", "entity change"]);
        assert_eq!(rows[0].value, "[userName] joe");
        assert_eq!(rows[0].profile, "ldap");
        assert_eq!(rows[1].value, "cn@/ = Joe");
        assert_eq!(rows[2].value, "/staff");
        assert_eq!(rows[3].value, "CLEAR");
    }

    #[test]
    fn unknown_profile_is_reported() {
        let input = RemotelyAuthenticatedInput::new("corp-ldap");
        let err = translate(&workspace(), "saml", &input).unwrap_err();
        assert!(matches!(err, CliError::Translation(_)));
    }
}
