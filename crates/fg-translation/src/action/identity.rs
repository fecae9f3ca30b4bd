//! `mapIdentity` action.

use fg_model::IdentityParam;
use tracing::debug;

use super::{
    ActionContext, ActionOutcome, ActionParameter, ActionParameters, InputAction,
    InputActionFactory,
};
use crate::error::TranslationResult;
use crate::expression::{to_strings, Expression};
use crate::mapping::{IdentityEffectMode, MappedIdentity, MappingResult};

/// Factory of the `mapIdentity` action.
#[derive(Debug, Default, Clone, Copy)]
pub struct MapIdentityActionFactory;

impl InputActionFactory for MapIdentityActionFactory {
    fn name(&self) -> &'static str {
        "mapIdentity"
    }

    fn description(&self) -> &'static str {
        "Maps remote data to a local identity of the given type"
    }

    fn parameters(&self) -> Vec<ActionParameter> {
        vec![
            ActionParameter::text("identityType", "Local identity type"),
            ActionParameter::expression(
                "expression",
                "Expression producing the identity value, or a list of values",
            ),
            ActionParameter::text(
                "credentialRequirement",
                "Credential requirement of an entity created from this identity",
            )
            .optional(),
            ActionParameter::enumeration(
                "effect",
                "What to do when the identity is not present locally",
                &["REQUIRE_MATCH", "CREATE_OR_MATCH", "MATCH", "CREATE_OR_UPDATE"],
            )
            .with_default("CREATE_OR_MATCH"),
        ]
    }

    fn instantiate(&self, params: &[String]) -> TranslationResult<Box<dyn InputAction>> {
        let params = ActionParameters::bind(self.name(), self.parameters(), params)?;
        Ok(Box::new(MapIdentityAction {
            identity_type: params.required(0)?.to_string(),
            expression: params.expression(1)?,
            credential_requirement: params.optional(2).map(str::to_string),
            mode: params.parse(3)?,
        }))
    }
}

#[derive(Debug)]
struct MapIdentityAction {
    identity_type: String,
    expression: Expression,
    credential_requirement: Option<String>,
    mode: IdentityEffectMode,
}

impl InputAction for MapIdentityAction {
    fn name(&self) -> &'static str {
        "mapIdentity"
    }

    fn invoke(&self, ctx: &ActionContext<'_>) -> TranslationResult<ActionOutcome> {
        let value = self.expression.evaluate(ctx.context)?;
        let mut result = MappingResult::new();

        for v in to_strings(&value) {
            let identity =
                IdentityParam::with_provenance(&self.identity_type, v, ctx.idp(), ctx.profile);
            debug!(identity = %identity.tav(), mode = %self.mode, "mapped identity");
            result.add_identity(MappedIdentity::new(
                self.mode,
                identity,
                self.credential_requirement.clone(),
            ));
        }

        if result.identities.is_empty() {
            debug!(
                expression = self.expression.source(),
                "identity expression produced no value"
            );
        }
        Ok(ActionOutcome::Mapped(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TranslationContext;
    use fg_model::RemotelyAuthenticatedInput;

    fn run(params: &[&str], input: &RemotelyAuthenticatedInput) -> MappingResult {
        let params: Vec<String> = params.iter().map(|s| (*s).to_string()).collect();
        let action = MapIdentityActionFactory.instantiate(&params).unwrap();
        let context = TranslationContext::from_input(input);
        let ctx = ActionContext {
            input,
            context: &context,
            profile: "p1",
        };
        match action.invoke(&ctx).unwrap() {
            ActionOutcome::Mapped(r) => r,
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn maps_dn_from_attributes() {
        let input = RemotelyAuthenticatedInput::new("ldap")
            .with_identity("joe", Some("userName"))
            .with_attribute("cn", ["Joe"]);
        let result = run(
            &[
                "x500Name",
                "'CN=' + attr['cn'] + ',O=ICM,UID=' + id",
                "cr",
                "CREATE_OR_MATCH",
            ],
            &input,
        );

        assert_eq!(result.identities.len(), 1);
        let mapped = &result.identities[0];
        assert_eq!(mapped.identity.value, "CN=Joe,O=ICM,UID=joe");
        assert_eq!(mapped.identity.remote_idp.as_deref(), Some("ldap"));
        assert_eq!(mapped.identity.translation_profile.as_deref(), Some("p1"));
        assert_eq!(mapped.credential_requirement.as_deref(), Some("cr"));
        assert_eq!(mapped.mode, IdentityEffectMode::CreateOrMatch);
    }

    #[test]
    fn list_value_maps_many_identities() {
        let input = RemotelyAuthenticatedInput::new("saml")
            .with_identity("a@x.org", Some("email"))
            .with_identity("b@x.org", Some("email"));
        let result = run(&["email", "idsByType['email']", "", "MATCH"], &input);
        let values: Vec<&str> = result
            .identities
            .iter()
            .map(|i| i.identity.value.as_str())
            .collect();
        assert_eq!(values, vec!["a@x.org", "b@x.org"]);
    }

    #[test]
    fn missing_value_maps_nothing() {
        let input = RemotelyAuthenticatedInput::new("saml");
        let result = run(&["userName", "id"], &input);
        assert!(result.identities.is_empty());
    }

    #[test]
    fn invalid_mode_rejected() {
        let params = vec!["userName".to_string(), "id".to_string(), String::new(), "ALWAYS".to_string()];
        assert!(MapIdentityActionFactory.instantiate(&params).is_err());
    }
}
