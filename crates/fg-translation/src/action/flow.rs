//! Actions that steer profile execution rather than map data.

use super::{
    ActionContext, ActionOutcome, ActionParameter, ActionParameters, InputAction,
    InputActionFactory,
};
use crate::error::{TranslationError, TranslationResult};
use crate::mapping::MappingResult;

// ============================================================================
// includeInputProfile
// ============================================================================

/// Factory of the `includeInputProfile` action.
#[derive(Debug, Default, Clone, Copy)]
pub struct IncludeProfileActionFactory;

impl InputActionFactory for IncludeProfileActionFactory {
    fn name(&self) -> &'static str {
        "includeInputProfile"
    }

    fn description(&self) -> &'static str {
        "Runs another input profile and merges its result"
    }

    fn parameters(&self) -> Vec<ActionParameter> {
        vec![ActionParameter::text("profile", "Name of the included profile")]
    }

    fn instantiate(&self, params: &[String]) -> TranslationResult<Box<dyn InputAction>> {
        let params = ActionParameters::bind(self.name(), self.parameters(), params)?;
        Ok(Box::new(IncludeProfileAction {
            profile: params.required(0)?.to_string(),
        }))
    }
}

#[derive(Debug)]
struct IncludeProfileAction {
    profile: String,
}

impl InputAction for IncludeProfileAction {
    fn name(&self) -> &'static str {
        "includeInputProfile"
    }

    fn invoke(&self, _ctx: &ActionContext<'_>) -> TranslationResult<ActionOutcome> {
        Ok(ActionOutcome::Include(self.profile.clone()))
    }
}

// ============================================================================
// removeStaleData
// ============================================================================

/// Factory of the `removeStaleData` action.
#[derive(Debug, Default, Clone, Copy)]
pub struct RemoveStaleDataActionFactory;

#[derive(Debug, Clone, Copy, Default)]
struct StaleKinds {
    identities: bool,
    groups: bool,
    attributes: bool,
}

impl StaleKinds {
    const ALL: Self = Self {
        identities: true,
        groups: true,
        attributes: true,
    };

    fn parse(list: &str) -> TranslationResult<Self> {
        let mut kinds = Self::default();
        for kind in list.split(',').map(str::trim).filter(|k| !k.is_empty()) {
            match kind {
                "identities" => kinds.identities = true,
                "groups" => kinds.groups = true,
                "attributes" => kinds.attributes = true,
                other => {
                    return Err(TranslationError::config(format!(
                        "unknown stale data kind '{other}'"
                    )))
                }
            }
        }
        if kinds.identities || kinds.groups || kinds.attributes {
            Ok(kinds)
        } else {
            Ok(Self::ALL)
        }
    }
}

impl InputActionFactory for RemoveStaleDataActionFactory {
    fn name(&self) -> &'static str {
        "removeStaleData"
    }

    fn description(&self) -> &'static str {
        "Removes data from this IdP and profile that the current login did not map"
    }

    fn parameters(&self) -> Vec<ActionParameter> {
        vec![ActionParameter::text(
            "kinds",
            "Comma separated subset of identities, groups, attributes; all when empty",
        )
        .optional()]
    }

    fn instantiate(&self, params: &[String]) -> TranslationResult<Box<dyn InputAction>> {
        let params = ActionParameters::bind(self.name(), self.parameters(), params)?;
        let kinds = match params.optional(0) {
            Some(list) => StaleKinds::parse(list)?,
            None => StaleKinds::ALL,
        };
        Ok(Box::new(RemoveStaleDataAction { kinds }))
    }
}

#[derive(Debug)]
struct RemoveStaleDataAction {
    kinds: StaleKinds,
}

impl InputAction for RemoveStaleDataAction {
    fn name(&self) -> &'static str {
        "removeStaleData"
    }

    fn invoke(&self, _ctx: &ActionContext<'_>) -> TranslationResult<ActionOutcome> {
        let mut result = MappingResult::new();
        result.clean_stale_identities = self.kinds.identities;
        result.clean_stale_groups = self.kinds.groups;
        result.clean_stale_attributes = self.kinds.attributes;
        Ok(ActionOutcome::Mapped(result))
    }
}

// ============================================================================
// blindStop
// ============================================================================

/// Factory of the `blindStop` action.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlindStopActionFactory;

impl InputActionFactory for BlindStopActionFactory {
    fn name(&self) -> &'static str {
        "blindStop"
    }

    fn description(&self) -> &'static str {
        "Stops evaluating the remaining rules of the profile"
    }

    fn parameters(&self) -> Vec<ActionParameter> {
        Vec::new()
    }

    fn instantiate(&self, params: &[String]) -> TranslationResult<Box<dyn InputAction>> {
        ActionParameters::bind(self.name(), self.parameters(), params)?;
        Ok(Box::new(BlindStopAction))
    }
}

#[derive(Debug)]
struct BlindStopAction;

impl InputAction for BlindStopAction {
    fn name(&self) -> &'static str {
        "blindStop"
    }

    fn invoke(&self, _ctx: &ActionContext<'_>) -> TranslationResult<ActionOutcome> {
        Ok(ActionOutcome::Break)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TranslationContext;
    use fg_model::RemotelyAuthenticatedInput;

    fn invoke(factory: &dyn InputActionFactory, params: &[&str]) -> ActionOutcome {
        let params: Vec<String> = params.iter().map(|s| (*s).to_string()).collect();
        let action = factory.instantiate(&params).unwrap();
        let input = RemotelyAuthenticatedInput::new("idp");
        let context = TranslationContext::from_input(&input);
        action
            .invoke(&ActionContext {
                input: &input,
                context: &context,
                profile: "p",
            })
            .unwrap()
    }

    #[test]
    fn remove_stale_data_defaults_to_all() {
        let ActionOutcome::Mapped(r) = invoke(&RemoveStaleDataActionFactory, &[]) else {
            panic!("expected a mapping");
        };
        assert!(r.clean_stale_identities && r.clean_stale_groups && r.clean_stale_attributes);
    }

    #[test]
    fn remove_stale_data_subset() {
        let ActionOutcome::Mapped(r) = invoke(&RemoveStaleDataActionFactory, &["groups, attributes"])
        else {
            panic!("expected a mapping");
        };
        assert!(!r.clean_stale_identities);
        assert!(r.clean_stale_groups);
        assert!(r.clean_stale_attributes);
        assert!(RemoveStaleDataActionFactory
            .instantiate(&["roles".to_string()])
            .is_err());
    }

    #[test]
    fn remove_stale_data_blank_list_means_all() {
        for list in [",", " , ", ""] {
            let ActionOutcome::Mapped(r) = invoke(&RemoveStaleDataActionFactory, &[list]) else {
                panic!("expected a mapping");
            };
            assert!(
                r.clean_stale_identities && r.clean_stale_groups && r.clean_stale_attributes,
                "list {list:?}"
            );
        }
    }

    #[test]
    fn include_and_stop() {
        assert_eq!(
            invoke(&IncludeProfileActionFactory, &["base"]),
            ActionOutcome::Include("base".to_string())
        );
        assert_eq!(invoke(&BlindStopActionFactory, &[]), ActionOutcome::Break);
        assert!(BlindStopActionFactory.instantiate(&["x".to_string()]).is_err());
    }
}
