//! Input translation actions.
//!
//! An action is what a rule does when its condition holds. Actions are
//! created from their declared name and string parameters through an
//! [`ActionRegistry`], and turn the remote input into a [`MappingResult`]
//! fragment.
//!
//! ## Built-in Actions
//!
//! | Name | Parameters |
//! |------|------------|
//! | `mapIdentity` | identity type, value expression, credential requirement, mode |
//! | `mapGroup` | group expression, mode |
//! | `mapAttribute` | attribute name, group, value expression, mode, value syntax |
//! | `entityChange` | operation (`DISABLE`, `REMOVE`, `CLEAR`), days |
//! | `includeInputProfile` | profile name |
//! | `removeStaleData` | comma-separated kinds (`identities,groups,attributes`) |
//! | `blindStop` | none |

mod attribute;
mod entity_change;
mod flow;
mod group;
mod identity;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use fg_model::RemotelyAuthenticatedInput;
use serde::{Deserialize, Serialize};

use crate::context::TranslationContext;
use crate::error::{TranslationError, TranslationResult};
use crate::expression::Expression;
use crate::mapping::MappingResult;

pub use attribute::MapAttributeActionFactory;
pub use entity_change::EntityChangeActionFactory;
pub use flow::{BlindStopActionFactory, IncludeProfileActionFactory, RemoveStaleDataActionFactory};
pub use group::MapGroupActionFactory;
pub use identity::MapIdentityActionFactory;

// ============================================================================
// Action Contract
// ============================================================================

/// What an invoked action produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// A mapping fragment to merge into the running result.
    Mapped(MappingResult),
    /// Run the named profile and merge its result.
    Include(String),
    /// Stop evaluating the remaining rules of the current profile.
    Break,
}

/// Invocation context of an action.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    /// The remote input.
    pub input: &'a RemotelyAuthenticatedInput,
    /// Expression variables built from the input.
    pub context: &'a TranslationContext,
    /// Name of the profile running the action, used as provenance tag.
    pub profile: &'a str,
}

impl ActionContext<'_> {
    /// Returns the remote IdP name, used as provenance tag.
    #[must_use]
    pub fn idp(&self) -> &str {
        self.input.idp_name()
    }
}

/// A configured action instance.
pub trait InputAction: Send + Sync + fmt::Debug {
    /// Returns the action name.
    fn name(&self) -> &'static str;

    /// Invokes the action.
    ///
    /// # Errors
    ///
    /// Returns an error if an expression fails to evaluate.
    fn invoke(&self, ctx: &ActionContext<'_>) -> TranslationResult<ActionOutcome>;
}

/// Creates configured actions of one type.
pub trait InputActionFactory: Send + Sync {
    /// Returns the action name used in profile definitions.
    fn name(&self) -> &'static str;

    /// Returns a human readable description.
    fn description(&self) -> &'static str;

    /// Returns the parameter definitions, in positional order.
    fn parameters(&self) -> Vec<ActionParameter>;

    /// Creates an action instance from positional parameters.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Configuration` for invalid parameters and
    /// `TranslationError::Expression` for malformed expressions.
    fn instantiate(&self, params: &[String]) -> TranslationResult<Box<dyn InputAction>>;
}

// ============================================================================
// Parameters
// ============================================================================

/// Kind of an action parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionParameterType {
    /// Free text.
    Text,
    /// An expression evaluated per invocation.
    Expression,
    /// One of a fixed set of values.
    Enum,
    /// A non-negative integer.
    Integer,
}

/// Definition of one positional action parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionParameter {
    /// Parameter name.
    pub name: String,
    /// Help text.
    pub description: String,
    /// Parameter kind.
    pub parameter_type: ActionParameterType,
    /// Whether the parameter must be given.
    pub mandatory: bool,
    /// Value used when the parameter is omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Allowed values for enum parameters.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub options: Vec<String>,
}

impl ActionParameter {
    fn new(name: &str, description: &str, parameter_type: ActionParameterType) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameter_type,
            mandatory: true,
            default_value: None,
            options: Vec::new(),
        }
    }

    /// Creates a mandatory text parameter.
    #[must_use]
    pub fn text(name: &str, description: &str) -> Self {
        Self::new(name, description, ActionParameterType::Text)
    }

    /// Creates a mandatory expression parameter.
    #[must_use]
    pub fn expression(name: &str, description: &str) -> Self {
        Self::new(name, description, ActionParameterType::Expression)
    }

    /// Creates a mandatory integer parameter.
    #[must_use]
    pub fn integer(name: &str, description: &str) -> Self {
        Self::new(name, description, ActionParameterType::Integer)
    }

    /// Creates a mandatory enum parameter.
    #[must_use]
    pub fn enumeration(name: &str, description: &str, options: &[&str]) -> Self {
        let mut param = Self::new(name, description, ActionParameterType::Enum);
        param.options = options.iter().map(|o| (*o).to_string()).collect();
        param
    }

    /// Makes the parameter optional.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.mandatory = false;
        self
    }

    /// Makes the parameter optional with a default value.
    #[must_use]
    pub fn with_default(mut self, default: &str) -> Self {
        self.mandatory = false;
        self.default_value = Some(default.to_string());
        self
    }
}

/// Positional parameters bound to their definitions.
#[derive(Debug)]
pub struct ActionParameters {
    action: &'static str,
    definitions: Vec<ActionParameter>,
    values: Vec<Option<String>>,
}

impl ActionParameters {
    /// Binds raw values to definitions, applying defaults.
    ///
    /// Empty strings count as omitted.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Configuration` if there are too many values,
    /// a mandatory value is missing, or an enum value is not allowed.
    pub fn bind(
        action: &'static str,
        definitions: Vec<ActionParameter>,
        raw: &[String],
    ) -> TranslationResult<Self> {
        if raw.len() > definitions.len() {
            return Err(TranslationError::config(format!(
                "action {action} takes at most {} parameters, got {}",
                definitions.len(),
                raw.len()
            )));
        }

        let mut values = Vec::with_capacity(definitions.len());
        for (i, def) in definitions.iter().enumerate() {
            let value = raw
                .get(i)
                .filter(|v| !v.trim().is_empty())
                .cloned()
                .or_else(|| def.default_value.clone());
            match &value {
                None if def.mandatory => {
                    return Err(TranslationError::config(format!(
                        "action {action} requires the parameter '{}'",
                        def.name
                    )))
                }
                Some(v)
                    if def.parameter_type == ActionParameterType::Enum
                        && !def.options.iter().any(|o| o == v) =>
                {
                    return Err(TranslationError::config(format!(
                        "invalid value '{v}' of parameter '{}' of action {action}, expected one of {:?}",
                        def.name, def.options
                    )))
                }
                _ => {}
            }
            values.push(value);
        }

        Ok(Self {
            action,
            definitions,
            values,
        })
    }

    fn definition_name(&self, index: usize) -> &str {
        self.definitions
            .get(index)
            .map_or("?", |d| d.name.as_str())
    }

    /// Returns an optional value.
    #[must_use]
    pub fn optional(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(Option::as_deref)
    }

    /// Returns a value that has a default or is mandatory.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Configuration` if the value is absent.
    pub fn required(&self, index: usize) -> TranslationResult<&str> {
        self.optional(index).ok_or_else(|| {
            TranslationError::config(format!(
                "action {} requires the parameter '{}'",
                self.action,
                self.definition_name(index)
            ))
        })
    }

    /// Parses a value.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Configuration` if the value is absent or
    /// does not parse.
    pub fn parse<T>(&self, index: usize) -> TranslationResult<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let raw = self.required(index)?;
        raw.parse().map_err(|e| {
            TranslationError::config(format!(
                "invalid value '{raw}' of parameter '{}' of action {}: {e}",
                self.definition_name(index),
                self.action
            ))
        })
    }

    /// Parses an expression value.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Expression` for a malformed expression.
    pub fn expression(&self, index: usize) -> TranslationResult<Expression> {
        Expression::parse(self.required(index)?)
    }
}

// ============================================================================
// Action Registry
// ============================================================================

/// Registry of action factories keyed by action name.
#[derive(Default)]
pub struct ActionRegistry {
    factories: HashMap<String, Arc<dyn InputActionFactory>>,
}

impl ActionRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with built-in actions registered.
    #[must_use]
    pub fn with_builtin_actions() -> Self {
        let mut registry = Self::new();

        registry.register(Arc::new(MapIdentityActionFactory));
        registry.register(Arc::new(MapGroupActionFactory));
        registry.register(Arc::new(MapAttributeActionFactory));
        registry.register(Arc::new(EntityChangeActionFactory));
        registry.register(Arc::new(IncludeProfileActionFactory));
        registry.register(Arc::new(RemoveStaleDataActionFactory));
        registry.register(Arc::new(BlindStopActionFactory));

        registry
    }

    /// Registers a factory, replacing any factory with the same name.
    pub fn register(&mut self, factory: Arc<dyn InputActionFactory>) {
        self.factories.insert(factory.name().to_string(), factory);
    }

    /// Gets a factory by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn InputActionFactory>> {
        self.factories.get(name)
    }

    /// Returns all registered action names, sorted.
    #[must_use]
    pub fn action_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Creates an action instance.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Configuration` for an unknown action name or
    /// invalid parameters.
    pub fn instantiate(&self, name: &str, params: &[String]) -> TranslationResult<Box<dyn InputAction>> {
        self.get(name)
            .ok_or_else(|| TranslationError::config(format!("unknown action '{name}'")))?
            .instantiate(params)
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.action_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn builtin_actions_registered() {
        let registry = ActionRegistry::with_builtin_actions();
        assert_eq!(
            registry.action_names(),
            vec![
                "blindStop",
                "entityChange",
                "includeInputProfile",
                "mapAttribute",
                "mapGroup",
                "mapIdentity",
                "removeStaleData",
            ]
        );
    }

    #[test]
    fn unknown_action_is_config_error() {
        let err = ActionRegistry::with_builtin_actions()
            .instantiate("mapRole", &[])
            .unwrap_err();
        assert!(matches!(err, TranslationError::Configuration(_)));
    }

    #[test]
    fn parameters_bind_defaults() {
        let defs = vec![
            ActionParameter::text("a", "first"),
            ActionParameter::enumeration("b", "second", &["X", "Y"]).with_default("X"),
            ActionParameter::text("c", "third").optional(),
        ];
        let params = ActionParameters::bind("test", defs, &strings(&["v"])).unwrap();
        assert_eq!(params.required(0).unwrap(), "v");
        assert_eq!(params.required(1).unwrap(), "X");
        assert_eq!(params.optional(2), None);
    }

    #[test]
    fn parameters_reject_invalid_input() {
        let defs = || {
            vec![
                ActionParameter::text("a", "first"),
                ActionParameter::enumeration("b", "second", &["X", "Y"]).optional(),
            ]
        };
        assert!(ActionParameters::bind("test", defs(), &[]).is_err());
        assert!(ActionParameters::bind("test", defs(), &strings(&["v", "Z"])).is_err());
        assert!(ActionParameters::bind("test", defs(), &strings(&["v", "X", "extra"])).is_err());
    }
}
