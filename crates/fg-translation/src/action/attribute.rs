//! `mapAttribute` action.

use fg_model::{syntax, Attribute};
use tracing::debug;

use super::{
    ActionContext, ActionOutcome, ActionParameter, ActionParameters, InputAction,
    InputActionFactory,
};
use crate::error::TranslationResult;
use crate::expression::{to_strings, Expression};
use crate::mapping::{AttributeEffectMode, MappedAttribute, MappingResult};

/// Factory of the `mapAttribute` action.
#[derive(Debug, Default, Clone, Copy)]
pub struct MapAttributeActionFactory;

impl InputActionFactory for MapAttributeActionFactory {
    fn name(&self) -> &'static str {
        "mapAttribute"
    }

    fn description(&self) -> &'static str {
        "Maps remote data to a local attribute"
    }

    fn parameters(&self) -> Vec<ActionParameter> {
        vec![
            ActionParameter::text("attribute", "Local attribute name"),
            ActionParameter::text("group", "Group the attribute is assigned in"),
            ActionParameter::expression("expression", "Expression producing the values"),
            ActionParameter::enumeration(
                "effect",
                "How the attribute is written",
                &["CREATE_ONLY", "CREATE_OR_UPDATE", "UPDATE_ONLY"],
            )
            .with_default("CREATE_OR_UPDATE"),
            ActionParameter::enumeration(
                "syntax",
                "Value syntax",
                &[
                    syntax::STRING,
                    syntax::EMAIL,
                    syntax::INTEGER,
                    syntax::FLOATING_POINT,
                    syntax::BOOLEAN,
                ],
            )
            .with_default(syntax::STRING),
        ]
    }

    fn instantiate(&self, params: &[String]) -> TranslationResult<Box<dyn InputAction>> {
        let params = ActionParameters::bind(self.name(), self.parameters(), params)?;
        Ok(Box::new(MapAttributeAction {
            attribute: params.required(0)?.to_string(),
            group: params.required(1)?.to_string(),
            expression: params.expression(2)?,
            mode: params.parse(3)?,
            syntax: params.required(4)?.to_string(),
        }))
    }
}

#[derive(Debug)]
struct MapAttributeAction {
    attribute: String,
    group: String,
    expression: Expression,
    mode: AttributeEffectMode,
    syntax: String,
}

impl InputAction for MapAttributeAction {
    fn name(&self) -> &'static str {
        "mapAttribute"
    }

    fn invoke(&self, ctx: &ActionContext<'_>) -> TranslationResult<ActionOutcome> {
        let values = to_strings(&self.expression.evaluate(ctx.context)?);
        let mut result = MappingResult::new();
        if values.is_empty() {
            debug!(attribute = %self.attribute, "attribute expression produced no values");
            return Ok(ActionOutcome::Mapped(result));
        }

        let attribute = Attribute::new(&self.attribute, &self.group, &self.syntax, values)
            .with_provenance(ctx.idp(), ctx.profile);
        result.add_attribute(MappedAttribute::new(self.mode, attribute));
        Ok(ActionOutcome::Mapped(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TranslationContext;
    use fg_model::RemotelyAuthenticatedInput;

    fn invoke(params: &[&str], input: &RemotelyAuthenticatedInput) -> MappingResult {
        let params: Vec<String> = params.iter().map(|s| (*s).to_string()).collect();
        let action = MapAttributeActionFactory.instantiate(&params).unwrap();
        let context = TranslationContext::from_input(input);
        match action
            .invoke(&ActionContext {
                input,
                context: &context,
                profile: "p1",
            })
            .unwrap()
        {
            ActionOutcome::Mapped(r) => r,
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn maps_list_of_groups_as_values() {
        let input = RemotelyAuthenticatedInput::new("saml")
            .with_group("mimuw")
            .with_group("icm");
        let result = invoke(&["memberOf", "/", "groups", "CREATE_ONLY"], &input);

        let mapped = &result.attributes[0];
        assert_eq!(mapped.mode, AttributeEffectMode::CreateOnly);
        assert_eq!(mapped.attribute.values, vec!["mimuw", "icm"]);
        assert_eq!(mapped.attribute.group_path, "/");
        assert_eq!(mapped.attribute.value_syntax, "string");
        assert_eq!(mapped.attribute.remote_idp.as_deref(), Some("saml"));
        assert_eq!(mapped.attribute.translation_profile.as_deref(), Some("p1"));
    }

    #[test]
    fn missing_source_maps_nothing() {
        let input = RemotelyAuthenticatedInput::new("saml");
        let result = invoke(&["cn", "/", "attr['cn']"], &input);
        assert!(result.attributes.is_empty());
    }

    #[test]
    fn syntax_parameter_is_checked() {
        let params: Vec<String> = ["age", "/", "'42'", "CREATE_ONLY", "date"]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        assert!(MapAttributeActionFactory.instantiate(&params).is_err());
    }
}
