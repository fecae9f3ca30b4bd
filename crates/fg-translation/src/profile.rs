//! Input translation profiles.
//!
//! A [`TranslationProfile`] is the serialisable definition: an ordered list of
//! rules, each a condition and an action name with positional parameters.
//! An [`InputTranslationProfile`] is the compiled form that runs the rules
//! against a remote input and produces a [`MappingResult`].
//!
//! ```json
//! {
//!   "ver": "2",
//!   "name": "ldap",
//!   "description": "LDAP users",
//!   "mode": "UPDATE_ONLY",
//!   "rules": [
//!     {
//!       "condition": { "conditionValue": "true" },
//!       "action": { "name": "mapIdentity", "parameters": ["userName", "id", "", "CREATE_OR_MATCH"] }
//!     }
//!   ]
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use fg_model::RemotelyAuthenticatedInput;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, warn};

use crate::action::{ActionContext, ActionRegistry};
use crate::condition::TranslationCondition;
use crate::context::TranslationContext;
use crate::error::{TranslationError, TranslationResult};
use crate::mapping::MappingResult;
use crate::repository::ProfileRepository;
use crate::rule::{RuleEffect, TranslationRule};

/// Default nesting limit of included profiles.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 16;

const PROFILE_VERSION: &str = "2";

// ============================================================================
// Definitions
// ============================================================================

/// How the data produced by a profile relates to data it produced earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileMode {
    /// Add and update only.
    #[default]
    UpdateOnly,
    /// Also remove identities, memberships and attributes from this IdP and
    /// profile that the current login did not map.
    UpdateAndRemoveMissing,
}

impl fmt::Display for ProfileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpdateOnly => write!(f, "UPDATE_ONLY"),
            Self::UpdateAndRemoveMissing => write!(f, "UPDATE_AND_REMOVE_MISSING"),
        }
    }
}

/// Serialised rule condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionDefinition {
    /// Condition expression.
    #[serde(rename = "conditionValue")]
    pub condition_value: String,
}

/// Serialised rule action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// Registered action name.
    pub name: String,
    /// Positional parameters.
    #[serde(default)]
    pub parameters: Vec<String>,
}

/// Serialised rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// When the rule applies.
    pub condition: ConditionDefinition,
    /// What the rule does.
    pub action: ActionDefinition,
}

/// Serialisable translation profile definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationProfile {
    /// Format version.
    #[serde(default = "default_version")]
    pub ver: String,
    /// Unique profile name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Profile mode.
    #[serde(default)]
    pub mode: ProfileMode,
    /// Rules, in evaluation order.
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

fn default_version() -> String {
    PROFILE_VERSION.to_string()
}

impl TranslationProfile {
    /// Creates an empty profile.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            ver: default_version(),
            name: name.into(),
            description: String::new(),
            mode: ProfileMode::default(),
            rules: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: ProfileMode) -> Self {
        self.mode = mode;
        self
    }

    /// Appends a rule.
    #[must_use]
    pub fn with_rule(mut self, condition: &str, action: &str, parameters: &[&str]) -> Self {
        self.rules.push(RuleDefinition {
            condition: ConditionDefinition {
                condition_value: condition.to_string(),
            },
            action: ActionDefinition {
                name: action.to_string(),
                parameters: parameters.iter().map(|p| (*p).to_string()).collect(),
            },
        });
        self
    }

    /// Parses a profile from JSON.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Configuration` if the document is malformed.
    pub fn from_json(json: &str) -> TranslationResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| TranslationError::config(format!("invalid profile: {e}")))
    }

    /// Serialises the profile to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Configuration` if serialisation fails.
    pub fn to_json(&self) -> TranslationResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TranslationError::config(format!("can not serialise profile: {e}")))
    }

    /// Names of profiles this profile includes directly.
    #[must_use]
    pub fn included_profiles(&self) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|r| r.action.name == "includeInputProfile")
            .filter_map(|r| r.action.parameters.first().map(String::as_str))
            .collect()
    }
}

// ============================================================================
// Compiled Profiles
// ============================================================================

#[derive(Debug)]
struct CompiledProfile {
    name: String,
    mode: ProfileMode,
    rules: Vec<TranslationRule>,
    includes: Vec<String>,
}

impl CompiledProfile {
    fn compile(definition: &TranslationProfile, registry: &ActionRegistry) -> TranslationResult<Self> {
        let rules = definition
            .rules
            .iter()
            .enumerate()
            .map(|(i, rule)| {
                let condition = TranslationCondition::parse(&rule.condition.condition_value)
                    .map_err(|e| rule_error(&definition.name, i, &e))?;
                let action = registry
                    .instantiate(&rule.action.name, &rule.action.parameters)
                    .map_err(|e| rule_error(&definition.name, i, &e))?;
                Ok(TranslationRule::new(condition, action))
            })
            .collect::<TranslationResult<Vec<_>>>()?;

        Ok(Self {
            name: definition.name.clone(),
            mode: definition.mode,
            rules,
            includes: definition
                .included_profiles()
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
    }
}

fn rule_error(profile: &str, index: usize, err: &TranslationError) -> TranslationError {
    TranslationError::config(format!("profile {profile}, rule {}: {err}", index + 1))
}

/// A compiled input translation profile.
pub struct InputTranslationProfile {
    root: CompiledProfile,
    repository: Arc<dyn ProfileRepository>,
    registry: Arc<ActionRegistry>,
    max_include_depth: usize,
}

impl InputTranslationProfile {
    /// Compiles a profile definition.
    ///
    /// Included profiles are resolved from the repository when they are run.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Configuration` if a rule names an unknown
    /// action, has invalid parameters or a malformed expression.
    pub fn new(
        definition: &TranslationProfile,
        repository: Arc<dyn ProfileRepository>,
        registry: Arc<ActionRegistry>,
    ) -> TranslationResult<Self> {
        Ok(Self {
            root: CompiledProfile::compile(definition, &registry)?,
            repository,
            registry,
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        })
    }

    /// Loads and compiles a profile by name.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Configuration` if the profile does not exist
    /// or does not compile.
    pub fn load(
        name: &str,
        repository: Arc<dyn ProfileRepository>,
        registry: Arc<ActionRegistry>,
    ) -> TranslationResult<Self> {
        let definition = repository
            .get_profile(name)?
            .ok_or_else(|| TranslationError::config(format!("unknown translation profile '{name}'")))?;
        Self::new(&definition, repository, registry)
    }

    /// Sets the nesting limit of included profiles, counting this profile.
    #[must_use]
    pub const fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    /// Returns the profile name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.root.name
    }

    /// Returns the profile mode.
    #[must_use]
    pub const fn mode(&self) -> ProfileMode {
        self.root.mode
    }

    /// Compiles every profile reachable through inclusions, without running any.
    ///
    /// Every `includeInputProfile` rule is followed, whatever its condition.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Configuration` for an unknown, invalid,
    /// cyclic or too deeply nested included profile.
    pub fn validate_inclusions(&self) -> TranslationResult<()> {
        let mut stack = Vec::new();
        self.check_inclusions(&self.root, &mut stack)
    }

    /// Runs the profile against a remote input.
    ///
    /// A `blindStop` ends the profile it occurs in; results of earlier rules
    /// are kept and an including profile continues with its next rule.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Configuration` for an unknown, cyclic or too
    /// deeply nested included profile, and `TranslationError::Expression` if a
    /// rule fails to evaluate.
    pub fn translate(&self, input: &RemotelyAuthenticatedInput) -> TranslationResult<MappingResult> {
        let context = TranslationContext::from_input(input);
        let mut stack = Vec::new();
        self.execute(&self.root, input, &context, &mut stack)
    }

    fn execute(
        &self,
        profile: &CompiledProfile,
        input: &RemotelyAuthenticatedInput,
        context: &TranslationContext,
        stack: &mut Vec<String>,
    ) -> TranslationResult<MappingResult> {
        self.check_nesting(&profile.name, stack)?;

        let span = info_span!("translation_profile", profile = %profile.name, idp = input.idp_name());
        let _guard = span.enter();

        stack.push(profile.name.clone());
        let ctx = ActionContext {
            input,
            context,
            profile: &profile.name,
        };

        let mut result = MappingResult::new();
        for rule in &profile.rules {
            match rule.evaluate(&ctx)? {
                RuleEffect::Skipped => {}
                RuleEffect::Mapped(fragment) => result.merge(fragment),
                RuleEffect::Include(name) => {
                    let included = self.resolve(&name)?;
                    result.merge(self.execute(&included, input, context, stack)?);
                }
                RuleEffect::Break => {
                    debug!("profile execution stopped by rule");
                    break;
                }
            }
        }
        stack.pop();

        if profile.mode == ProfileMode::UpdateAndRemoveMissing {
            result.clean_all_stale();
        }
        Ok(result)
    }

    fn check_nesting(&self, name: &str, stack: &[String]) -> TranslationResult<()> {
        if stack.iter().any(|p| p == name) {
            return Err(TranslationError::config(format!(
                "translation profile inclusion cycle: {} -> {name}",
                stack.join(" -> ")
            )));
        }
        if stack.len() >= self.max_include_depth {
            return Err(TranslationError::config(format!(
                "translation profile inclusion deeper than {} at '{name}'",
                self.max_include_depth
            )));
        }
        Ok(())
    }

    fn check_inclusions(&self, profile: &CompiledProfile, stack: &mut Vec<String>) -> TranslationResult<()> {
        self.check_nesting(&profile.name, stack)?;
        stack.push(profile.name.clone());
        for name in &profile.includes {
            let included = self.resolve(name)?;
            self.check_inclusions(&included, stack)?;
        }
        stack.pop();
        Ok(())
    }

    fn resolve(&self, name: &str) -> TranslationResult<CompiledProfile> {
        let Some(definition) = self.repository.get_profile(name)? else {
            warn!(profile = name, "included translation profile does not exist");
            return Err(TranslationError::config(format!(
                "included translation profile '{name}' does not exist"
            )));
        };
        CompiledProfile::compile(&definition, &self.registry)
    }
}

impl fmt::Debug for InputTranslationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputTranslationProfile")
            .field("name", &self.root.name)
            .field("mode", &self.root.mode)
            .field("rules", &self.root.rules.len())
            .field("max_include_depth", &self.max_include_depth)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryProfileRepository;

    fn compile(profile: &TranslationProfile, others: Vec<TranslationProfile>) -> InputTranslationProfile {
        InputTranslationProfile::new(
            profile,
            InMemoryProfileRepository::with_profiles(others).into_shared(),
            Arc::new(ActionRegistry::with_builtin_actions()),
        )
        .unwrap()
    }

    fn input() -> RemotelyAuthenticatedInput {
        RemotelyAuthenticatedInput::new("ldap")
            .with_identity("joe", Some("userName"))
            .with_attribute("cn", ["Joe"])
    }

    #[test]
    fn json_round_trip_keeps_rules() {
        let profile = TranslationProfile::new("p")
            .with_mode(ProfileMode::UpdateAndRemoveMissing)
            .with_rule("true", "mapGroup", &["'/A'"]);
        let parsed = TranslationProfile::from_json(&profile.to_json().unwrap()).unwrap();
        assert_eq!(parsed, profile);
        assert!(profile.to_json().unwrap().contains("conditionValue"));
    }

    #[test]
    fn unknown_action_fails_compilation() {
        let profile = TranslationProfile::new("p").with_rule("true", "mapRole", &[]);
        let err = InputTranslationProfile::new(
            &profile,
            InMemoryProfileRepository::new().into_shared(),
            Arc::new(ActionRegistry::with_builtin_actions()),
        )
        .unwrap_err();
        assert!(err.to_string().contains("rule 1"));
        assert!(err.is_config_error());
    }

    #[test]
    fn blind_stop_keeps_earlier_results() {
        let profile = TranslationProfile::new("p")
            .with_rule("true", "mapIdentity", &["userName", "id"])
            .with_rule("true", "blindStop", &[])
            .with_rule("true", "mapGroup", &["'/A'"]);
        let result = compile(&profile, vec![]).translate(&input()).unwrap();
        assert_eq!(result.identities.len(), 1);
        assert!(result.groups.is_empty());
    }

    #[test]
    fn stop_in_included_profile_only_ends_that_profile() {
        let base = TranslationProfile::new("base")
            .with_rule("true", "mapAttribute", &["cn", "/", "attr['cn']"])
            .with_rule("true", "blindStop", &[])
            .with_rule("true", "mapGroup", &["'/never'"]);
        let top = TranslationProfile::new("top")
            .with_rule("true", "includeInputProfile", &["base"])
            .with_rule("true", "mapGroup", &["'/A'"]);

        let result = compile(&top, vec![base]).translate(&input()).unwrap();
        assert_eq!(result.attributes.len(), 1);
        assert_eq!(result.attributes[0].attribute.translation_profile.as_deref(), Some("base"));
        let groups: Vec<&str> = result.groups.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(groups, vec!["/A"]);
    }

    #[test]
    fn unknown_included_profile_is_config_error() {
        let top = TranslationProfile::new("top").with_rule("true", "includeInputProfile", &["nope"]);
        let err = compile(&top, vec![]).translate(&input()).unwrap_err();
        assert!(matches!(err, TranslationError::Configuration(_)));
    }

    #[test]
    fn inclusion_cycle_rejected() {
        let a = TranslationProfile::new("a").with_rule("true", "includeInputProfile", &["b"]);
        let b = TranslationProfile::new("b").with_rule("true", "includeInputProfile", &["a"]);
        let err = compile(&a, vec![a.clone(), b]).translate(&input()).unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn inclusion_depth_limited() {
        let chain: Vec<TranslationProfile> = (0..4)
            .map(|i| {
                TranslationProfile::new(format!("p{i}"))
                    .with_rule("true", "includeInputProfile", &[&format!("p{}", i + 1)])
            })
            .chain(std::iter::once(TranslationProfile::new("p4")))
            .collect();
        let top = chain[0].clone();

        assert!(compile(&top, chain.clone()).translate(&input()).is_ok());
        let err = compile(&top, chain)
            .with_max_include_depth(3)
            .translate(&input())
            .unwrap_err();
        assert!(err.to_string().contains("deeper than 3"));
    }

    #[test]
    fn validation_follows_conditional_inclusions() {
        let a = TranslationProfile::new("a").with_rule("false", "includeInputProfile", &["b"]);
        let b = TranslationProfile::new("b").with_rule("true", "includeInputProfile", &["a"]);

        let profile = compile(&a, vec![a.clone(), b]);
        assert!(profile.translate(&input()).is_ok());
        let err = profile.validate_inclusions().unwrap_err();
        assert!(err.to_string().contains("a -> b -> a"));

        let broken = TranslationProfile::new("broken").with_rule("true", "mapRole", &[]);
        let top = TranslationProfile::new("top").with_rule("false", "includeInputProfile", &["broken"]);
        let err = compile(&top, vec![broken]).validate_inclusions().unwrap_err();
        assert!(err.to_string().contains("profile broken, rule 1"));
    }

    #[test]
    fn remove_missing_mode_sets_cleanup_flags() {
        let profile = TranslationProfile::new("p").with_mode(ProfileMode::UpdateAndRemoveMissing);
        let result = compile(&profile, vec![]).translate(&input()).unwrap();
        assert!(result.clean_stale_identities);
        assert!(result.clean_stale_groups);
        assert!(result.clean_stale_attributes);

        let plain = compile(&TranslationProfile::new("q"), vec![])
            .translate(&input())
            .unwrap();
        assert!(plain.is_empty());
    }

    #[test]
    fn parses_definition_defaults() {
        let profile = TranslationProfile::from_json(r#"{"name": "x"}"#).unwrap();
        assert_eq!(profile.ver, "2");
        assert_eq!(profile.mode, ProfileMode::UpdateOnly);
        assert!(profile.rules.is_empty());
    }
}
