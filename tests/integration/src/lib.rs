//! # fg-integration-tests
//!
//! Shared fixtures for end-to-end scenarios: a translator wired to the
//! in-memory store and a set of translation profiles.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

use std::collections::BTreeSet;
use std::sync::Arc;

use fg_authn::{RemoteAuthenticationResult, RemoteAuthnTranslator, TranslationOptions};
use fg_storage::{AttributeProvider, EntityProvider, GroupProvider, InMemoryStore};
use fg_translation::{ActionRegistry, InMemoryProfileRepository, RemotelyAuthenticatedInput};
use serde_json::json;
use uuid::Uuid;

/// Profiles shared by the scenarios.
fn profiles() -> serde_json::Value {
    json!([
        {
            "name": "corp",
            "description": "Corporate directory logins",
            "rules": [
                {
                    "condition": {"conditionValue": "true"},
                    "action": {"name": "mapIdentity", "parameters": ["userName", "id", "password", "CREATE_OR_MATCH"]}
                },
                {
                    "condition": {"conditionValue": "idsByType['email'] != null"},
                    "action": {"name": "mapIdentity", "parameters": ["email", "idsByType['email']", "", "CREATE_OR_MATCH"]}
                },
                {
                    "condition": {"conditionValue": "attr['mail'] != null"},
                    "action": {"name": "mapAttribute", "parameters": ["email", "/", "attr['mail']", "CREATE_OR_UPDATE", "email"]}
                },
                {
                    "condition": {"conditionValue": "attr['ou'] != null"},
                    "action": {"name": "mapGroup", "parameters": ["'/org/' + attr['ou']", "CREATE_GROUP_IF_MISSING"]}
                }
            ]
        },
        {
            "name": "strict",
            "rules": [
                {
                    "condition": {"conditionValue": "true"},
                    "action": {"name": "mapIdentity", "parameters": ["userName", "id", "", "REQUIRE_MATCH"]}
                },
                {
                    "condition": {"conditionValue": "true"},
                    "action": {"name": "mapGroup", "parameters": ["'/strict'", "CREATE_GROUP_IF_MISSING"]}
                }
            ]
        },
        {
            "name": "teams",
            "mode": "UPDATE_AND_REMOVE_MISSING",
            "rules": [
                {
                    "condition": {"conditionValue": "true"},
                    "action": {"name": "mapIdentity", "parameters": ["userName", "id", "", "CREATE_OR_MATCH"]}
                },
                {
                    "condition": {"conditionValue": "attrs['memberOf'] != null"},
                    "action": {"name": "mapGroup", "parameters": ["attrs['memberOf']", "CREATE_GROUP_IF_MISSING"]}
                },
                {
                    "condition": {"conditionValue": "attr['title'] != null"},
                    "action": {"name": "mapAttribute", "parameters": ["title", "/", "attr['title']"]}
                }
            ]
        },
        {
            "name": "nickname",
            "rules": [
                {
                    "condition": {"conditionValue": "true"},
                    "action": {"name": "includeInputProfile", "parameters": ["match-user"]}
                },
                {
                    "condition": {"conditionValue": "attr['nick'] != null"},
                    "action": {"name": "mapAttribute", "parameters": ["nickname", "/", "attr['nick']", "CREATE_ONLY"]}
                },
                {
                    "condition": {"conditionValue": "attr['phone'] != null"},
                    "action": {"name": "mapAttribute", "parameters": ["phone", "/", "attr['phone']", "UPDATE_ONLY"]}
                }
            ]
        },
        {
            "name": "match-user",
            "rules": [
                {
                    "condition": {"conditionValue": "true"},
                    "action": {"name": "mapIdentity", "parameters": ["userName", "id", "", "MATCH"]}
                }
            ]
        },
        {
            "name": "contractors",
            "rules": [
                {
                    "condition": {"conditionValue": "true"},
                    "action": {"name": "includeInputProfile", "parameters": ["corp"]}
                },
                {
                    "condition": {"conditionValue": "true"},
                    "action": {"name": "entityChange", "parameters": ["DISABLE", "30"]}
                }
            ]
        }
    ])
}

/// Test environment wiring the translator to an in-memory store.
pub struct TestEnv {
    /// Local store.
    pub store: Arc<InMemoryStore>,
    /// Translator under test.
    pub translator: RemoteAuthnTranslator,
}

impl TestEnv {
    /// Creates a new test environment with an empty store.
    pub fn new() -> anyhow::Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("fg_translation=debug,fg_authn=debug")
            .with_test_writer()
            .try_init();

        let store = Arc::new(InMemoryStore::new());
        let repository = InMemoryProfileRepository::from_json(&profiles().to_string())?;
        let translator = RemoteAuthnTranslator::from_store(
            store.clone(),
            repository.into_shared(),
            Arc::new(ActionRegistry::with_builtin_actions()),
        );
        Ok(Self { store, translator })
    }

    /// Runs a login through the named profile.
    pub async fn login(
        &self,
        input: &RemotelyAuthenticatedInput,
        profile: &str,
    ) -> anyhow::Result<RemoteAuthenticationResult> {
        Ok(self
            .translator
            .get_translated_result(input, profile, &TranslationOptions::new())
            .await?)
    }

    /// Runs a login that must resolve to a local entity.
    pub async fn login_entity(
        &self,
        input: &RemotelyAuthenticatedInput,
        profile: &str,
    ) -> anyhow::Result<Uuid> {
        let outcome = self.login(input, profile).await?;
        outcome
            .entity()
            .map(|e| e.entity_id)
            .ok_or_else(|| anyhow::anyhow!("login was not successful: {outcome:?}"))
    }

    /// Captures the identities, memberships and attributes of an entity.
    pub async fn snapshot(&self, entity: Uuid) -> anyhow::Result<Snapshot> {
        let identities = self
            .store
            .get_entity(entity)
            .await?
            .identities
            .iter()
            .map(|i| i.tav().to_string())
            .collect();
        let groups = self.store.get_groups(entity).await?.into_keys().collect();
        let attributes = self
            .store
            .get_all_attributes(entity)
            .await?
            .into_iter()
            .map(|a| (a.attribute.group_path, a.attribute.name, a.attribute.values))
            .collect();
        Ok(Snapshot {
            identities,
            groups,
            attributes,
        })
    }
}

/// Local state of one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Identities as `[type] value`.
    pub identities: BTreeSet<String>,
    /// Group paths.
    pub groups: BTreeSet<String>,
    /// Attributes as (group, name, values).
    pub attributes: BTreeSet<(String, String, Vec<String>)>,
}

impl Snapshot {
    /// Values of an attribute, if present.
    pub fn attribute(&self, group: &str, name: &str) -> Option<&[String]> {
        self.attributes
            .iter()
            .find(|(g, n, _)| g == group && n == name)
            .map(|(_, _, values)| values.as_slice())
    }
}

/// A corporate directory login.
pub fn corp_login(user: &str) -> RemotelyAuthenticatedInput {
    RemotelyAuthenticatedInput::new("corp-ldap").with_identity(user, Some("userName"))
}
