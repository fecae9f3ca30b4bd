//! Remote authentication input.
//!
//! A protocol-agnostic view of what a remote IdP asserted about a user. Protocol
//! adapters fill it in; the translation profile reads it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An identity asserted by a remote IdP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteIdentity {
    /// Identity value.
    pub name: String,
    /// Optional identity type hint.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub identity_type: Option<String>,
}

impl RemoteIdentity {
    /// Creates a remote identity.
    #[must_use]
    pub fn new(name: impl Into<String>, identity_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            identity_type: identity_type.map(str::to_string),
        }
    }
}

/// An attribute asserted by a remote IdP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAttribute {
    /// Attribute name.
    pub name: String,
    /// Raw values, in the order received.
    #[serde(default)]
    pub values: Vec<String>,
}

impl RemoteAttribute {
    /// Creates a remote attribute.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the first value, if any.
    #[must_use]
    pub fn first_value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

/// A group membership asserted by a remote IdP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteGroupMembership {
    /// Remote group name.
    pub name: String,
}

impl RemoteGroupMembership {
    /// Creates a remote group membership.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Everything a remote IdP asserted in one authentication.
///
/// Identities keep insertion order; adding an identity under an existing name
/// replaces the value but keeps the original position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RemoteInputDocument", into = "RemoteInputDocument")]
pub struct RemotelyAuthenticatedInput {
    idp_name: String,
    identities: IndexMap<String, RemoteIdentity>,
    attributes: IndexMap<String, RemoteAttribute>,
    groups: IndexMap<String, RemoteGroupMembership>,
    primary_identity: Option<String>,
}

impl RemotelyAuthenticatedInput {
    /// Creates an empty input for the given IdP.
    #[must_use]
    pub fn new(idp_name: impl Into<String>) -> Self {
        Self {
            idp_name: idp_name.into(),
            identities: IndexMap::new(),
            attributes: IndexMap::new(),
            groups: IndexMap::new(),
            primary_identity: None,
        }
    }

    /// Adds an identity.
    pub fn add_identity(&mut self, identity: RemoteIdentity) {
        self.identities.insert(identity.name.clone(), identity);
    }

    /// Adds an attribute, replacing any previous one with the same name.
    pub fn add_attribute(&mut self, attribute: RemoteAttribute) {
        self.attributes.insert(attribute.name.clone(), attribute);
    }

    /// Adds a group membership.
    pub fn add_group(&mut self, group: RemoteGroupMembership) {
        self.groups.insert(group.name.clone(), group);
    }

    /// Explicitly selects the primary identity.
    pub fn set_primary_identity(&mut self, identity: RemoteIdentity) {
        let name = identity.name.clone();
        if !self.identities.contains_key(&name) {
            self.add_identity(identity);
        }
        self.primary_identity = Some(name);
    }

    /// Builder form of [`Self::add_identity`].
    #[must_use]
    pub fn with_identity(mut self, name: impl Into<String>, identity_type: Option<&str>) -> Self {
        self.add_identity(RemoteIdentity::new(name, identity_type));
        self
    }

    /// Builder form of [`Self::add_attribute`].
    #[must_use]
    pub fn with_attribute<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_attribute(RemoteAttribute::new(name, values));
        self
    }

    /// Builder form of [`Self::add_group`].
    #[must_use]
    pub fn with_group(mut self, name: impl Into<String>) -> Self {
        self.add_group(RemoteGroupMembership::new(name));
        self
    }

    /// Returns the name of the asserting IdP.
    #[must_use]
    pub fn idp_name(&self) -> &str {
        &self.idp_name
    }

    /// Returns identities in insertion order.
    #[must_use]
    pub const fn identities(&self) -> &IndexMap<String, RemoteIdentity> {
        &self.identities
    }

    /// Returns attributes by name.
    #[must_use]
    pub const fn attributes(&self) -> &IndexMap<String, RemoteAttribute> {
        &self.attributes
    }

    /// Returns group memberships by name.
    #[must_use]
    pub const fn groups(&self) -> &IndexMap<String, RemoteGroupMembership> {
        &self.groups
    }

    /// Returns the primary identity: the explicitly selected one, otherwise
    /// the first inserted.
    #[must_use]
    pub fn primary_identity(&self) -> Option<&RemoteIdentity> {
        self.primary_identity
            .as_ref()
            .and_then(|name| self.identities.get(name))
            .or_else(|| self.identities.values().next())
    }
}

/// Serialised form of [`RemotelyAuthenticatedInput`].
///
/// ```json
/// {
///   "idp": "saml-idp",
///   "identities": [{"name": "joe", "type": "userName"}],
///   "attributes": [{"name": "cn", "values": ["Joe"]}],
///   "groups": ["staff"],
///   "primaryIdentity": "joe"
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteInputDocument {
    /// Name of the asserting IdP.
    pub idp: String,
    /// Identities in order.
    #[serde(default)]
    pub identities: Vec<RemoteIdentity>,
    /// Attributes.
    #[serde(default)]
    pub attributes: Vec<RemoteAttribute>,
    /// Group names.
    #[serde(default)]
    pub groups: Vec<String>,
    /// Name of the primary identity, if not the first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_identity: Option<String>,
}

impl From<RemoteInputDocument> for RemotelyAuthenticatedInput {
    fn from(doc: RemoteInputDocument) -> Self {
        let mut input = Self::new(doc.idp);
        for identity in doc.identities {
            input.add_identity(identity);
        }
        for attribute in doc.attributes {
            input.add_attribute(attribute);
        }
        for group in doc.groups {
            input.add_group(RemoteGroupMembership::new(group));
        }
        input.primary_identity = doc.primary_identity;
        input
    }
}

impl From<RemotelyAuthenticatedInput> for RemoteInputDocument {
    fn from(input: RemotelyAuthenticatedInput) -> Self {
        Self {
            idp: input.idp_name,
            identities: input.identities.into_values().collect(),
            attributes: input.attributes.into_values().collect(),
            groups: input.groups.into_keys().collect(),
            primary_identity: input.primary_identity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_identity_defaults_to_first() {
        let input = RemotelyAuthenticatedInput::new("idp")
            .with_identity("joe", Some("userName"))
            .with_identity("joe@example.com", Some("email"));

        assert_eq!(input.primary_identity().unwrap().name, "joe");
    }

    #[test]
    fn explicit_primary_identity_wins() {
        let mut input = RemotelyAuthenticatedInput::new("idp").with_identity("joe", None);
        input.set_primary_identity(RemoteIdentity::new("x500", Some("x500Name")));

        assert_eq!(input.primary_identity().unwrap().name, "x500");
        assert_eq!(input.identities().len(), 2);
    }

    #[test]
    fn duplicate_identity_keeps_position_and_takes_last_value() {
        let input = RemotelyAuthenticatedInput::new("idp")
            .with_identity("a", Some("t1"))
            .with_identity("b", None)
            .with_identity("a", Some("t2"));

        let names: Vec<_> = input.identities().keys().cloned().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(input.identities()["a"].identity_type.as_deref(), Some("t2"));
    }

    #[test]
    fn parses_json_document() {
        let input: RemotelyAuthenticatedInput = serde_json::from_str(
            r#"{
                "idp": "saml",
                "identities": [{"name": "joe", "type": "userName"}],
                "attributes": [{"name": "cn", "values": ["Joe"]}],
                "groups": ["staff", "admins"]
            }"#,
        )
        .unwrap();

        assert_eq!(input.idp_name(), "saml");
        assert_eq!(input.attributes()["cn"].first_value(), Some("Joe"));
        assert_eq!(input.groups().len(), 2);
        assert_eq!(input.primary_identity().unwrap().name, "joe");
    }
}
