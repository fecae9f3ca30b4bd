//! Expression context built from a remote input.
//!
//! Conditions and value expressions are evaluated against this context.
//!
//! | Key | Value |
//! |-----|-------|
//! | `idp` | name of the remote IdP |
//! | `id` | value of the primary identity |
//! | `idType` | type of the primary identity |
//! | `attr` | attribute name to first value (`""` when it has none) |
//! | `attrs` | attribute name to all values |
//! | `idsByType` | identity type to identity values |
//! | `groups` | remote group names |

use fg_model::RemotelyAuthenticatedInput;
use serde_json::{Map, Value};

/// Variables visible to expressions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationContext {
    vars: Map<String, Value>,
}

impl TranslationContext {
    /// Builds the context for a remote input.
    #[must_use]
    pub fn from_input(input: &RemotelyAuthenticatedInput) -> Self {
        let mut vars = Map::new();
        vars.insert("idp".into(), Value::String(input.idp_name().to_string()));

        let mut attr = Map::new();
        let mut attrs = Map::new();
        for a in input.attributes().values() {
            attr.insert(
                a.name.clone(),
                Value::String(a.first_value().unwrap_or_default().to_string()),
            );
            attrs.insert(a.name.clone(), string_list(&a.values));
        }
        vars.insert("attr".into(), Value::Object(attr));
        vars.insert("attrs".into(), Value::Object(attrs));

        if let Some(primary) = input.primary_identity() {
            vars.insert("id".into(), Value::String(primary.name.clone()));
            vars.insert(
                "idType".into(),
                primary
                    .identity_type
                    .clone()
                    .map_or(Value::Null, Value::String),
            );
        }

        let mut ids_by_type = Map::new();
        for identity in input.identities().values() {
            let Some(id_type) = &identity.identity_type else {
                continue;
            };
            if let Value::Array(values) = ids_by_type
                .entry(id_type.clone())
                .or_insert_with(|| Value::Array(Vec::new()))
            {
                values.push(Value::String(identity.name.clone()));
            }
        }
        vars.insert("idsByType".into(), Value::Object(ids_by_type));

        let groups: Vec<String> = input.groups().keys().cloned().collect();
        vars.insert("groups".into(), string_list(&groups));

        Self { vars }
    }

    /// Creates a context from raw variables.
    #[must_use]
    pub const fn from_vars(vars: Map<String, Value>) -> Self {
        Self { vars }
    }

    /// Looks up a top-level variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Returns the context as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.vars.clone())
    }
}

fn string_list(values: &[String]) -> Value {
    Value::Array(values.iter().cloned().map(Value::String).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn context_exposes_input() {
        let input = RemotelyAuthenticatedInput::new("saml")
            .with_identity("joe", Some("userName"))
            .with_identity("joe@example.com", Some("email"))
            .with_identity("untyped", None)
            .with_attribute("cn", ["Joe", "Joseph"])
            .with_attribute("empty", Vec::<String>::new())
            .with_group("staff");

        let ctx = TranslationContext::from_input(&input);
        assert_eq!(ctx.get("idp"), Some(&json!("saml")));
        assert_eq!(ctx.get("id"), Some(&json!("joe")));
        assert_eq!(ctx.get("idType"), Some(&json!("userName")));
        assert_eq!(ctx.get("attr"), Some(&json!({"cn": "Joe", "empty": ""})));
        assert_eq!(ctx.get("attrs").unwrap()["cn"], json!(["Joe", "Joseph"]));
        assert_eq!(
            ctx.get("idsByType"),
            Some(&json!({"userName": ["joe"], "email": ["joe@example.com"]}))
        );
        assert_eq!(ctx.get("groups"), Some(&json!(["staff"])));
    }

    #[test]
    fn no_identity_means_no_id() {
        let ctx = TranslationContext::from_input(&RemotelyAuthenticatedInput::new("idp"));
        assert!(ctx.get("id").is_none());
        assert_eq!(ctx.get("groups"), Some(&json!([])));
    }
}
