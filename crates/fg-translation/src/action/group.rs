//! `mapGroup` action.

use tracing::debug;

use super::{
    ActionContext, ActionOutcome, ActionParameter, ActionParameters, InputAction,
    InputActionFactory,
};
use crate::error::TranslationResult;
use crate::expression::{to_strings, Expression};
use crate::mapping::{GroupEffectMode, MappedGroup, MappingResult};

/// Factory of the `mapGroup` action.
#[derive(Debug, Default, Clone, Copy)]
pub struct MapGroupActionFactory;

impl InputActionFactory for MapGroupActionFactory {
    fn name(&self) -> &'static str {
        "mapGroup"
    }

    fn description(&self) -> &'static str {
        "Adds the principal to local groups"
    }

    fn parameters(&self) -> Vec<ActionParameter> {
        vec![
            ActionParameter::expression(
                "expression",
                "Expression producing a group path, or a list of paths",
            ),
            ActionParameter::enumeration(
                "effect",
                "What to do when the group does not exist",
                &[
                    "CREATE_GROUP_IF_MISSING",
                    "REQUIRE_EXISTING_GROUP",
                    "IGNORE_IF_MISSING",
                ],
            )
            .with_default("REQUIRE_EXISTING_GROUP"),
        ]
    }

    fn instantiate(&self, params: &[String]) -> TranslationResult<Box<dyn InputAction>> {
        let params = ActionParameters::bind(self.name(), self.parameters(), params)?;
        Ok(Box::new(MapGroupAction {
            expression: params.expression(0)?,
            mode: params.parse(1)?,
        }))
    }
}

#[derive(Debug)]
struct MapGroupAction {
    expression: Expression,
    mode: GroupEffectMode,
}

impl InputAction for MapGroupAction {
    fn name(&self) -> &'static str {
        "mapGroup"
    }

    fn invoke(&self, ctx: &ActionContext<'_>) -> TranslationResult<ActionOutcome> {
        let value = self.expression.evaluate(ctx.context)?;
        let mut result = MappingResult::new();

        for path in to_strings(&value) {
            if !path.starts_with('/') {
                debug!(group = %path, "ignoring group value that is not an absolute path");
                continue;
            }
            result.add_group(MappedGroup::new(
                path,
                self.mode,
                Some(ctx.idp()),
                Some(ctx.profile),
            ));
        }
        Ok(ActionOutcome::Mapped(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TranslationContext;
    use fg_model::RemotelyAuthenticatedInput;

    #[test]
    fn maps_group_paths_with_provenance() {
        let input = RemotelyAuthenticatedInput::new("saml")
            .with_group("staff")
            .with_group("/A/B");
        let action = MapGroupActionFactory
            .instantiate(&["groups".to_string(), "CREATE_GROUP_IF_MISSING".to_string()])
            .unwrap();
        let context = TranslationContext::from_input(&input);
        let outcome = action
            .invoke(&ActionContext {
                input: &input,
                context: &context,
                profile: "p1",
            })
            .unwrap();

        let ActionOutcome::Mapped(result) = outcome else {
            panic!("expected a mapping");
        };
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].group, "/A/B");
        assert_eq!(result.groups[0].mode, GroupEffectMode::CreateGroupIfMissing);
        assert_eq!(result.groups[0].idp.as_deref(), Some("saml"));
        assert_eq!(result.groups[0].profile.as_deref(), Some("p1"));
    }

    #[test]
    fn default_mode_requires_existing_group() {
        let input = RemotelyAuthenticatedInput::new("saml");
        let action = MapGroupActionFactory.instantiate(&["'/A'".to_string()]).unwrap();
        let context = TranslationContext::from_input(&input);
        let Ok(ActionOutcome::Mapped(result)) = action.invoke(&ActionContext {
            input: &input,
            context: &context,
            profile: "p1",
        }) else {
            panic!("expected a mapping");
        };
        assert_eq!(result.groups[0].mode, GroupEffectMode::RequireExistingGroup);
    }
}
