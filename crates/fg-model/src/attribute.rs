//! Attribute value types.
//!
//! Attributes are assigned to an entity in the scope of a group. The pair
//! (group path, attribute name) identifies an attribute on an entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::group::ROOT_GROUP;
use crate::syntax;

/// Composite key of an attribute on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttributeKey {
    /// Group in which the attribute is assigned.
    pub group_path: String,
    /// Attribute name.
    pub name: String,
}

impl AttributeKey {
    /// Creates a new attribute key.
    #[must_use]
    pub fn new(group_path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group_path: group_path.into(),
            name: name.into(),
        }
    }
}

/// An attribute with typed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Group in which the attribute is assigned.
    pub group_path: String,
    /// Value syntax identifier, governs value comparison.
    pub value_syntax: String,
    /// Raw values, in order.
    pub values: Vec<String>,
    /// Remote IdP which asserted this attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_idp: Option<String>,
    /// Translation profile which produced this attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_profile: Option<String>,
}

impl Attribute {
    /// Creates a new attribute.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        group_path: impl Into<String>,
        value_syntax: impl Into<String>,
        values: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            group_path: group_path.into(),
            value_syntax: value_syntax.into(),
            values,
            remote_idp: None,
            translation_profile: None,
        }
    }

    /// Creates a string attribute in the root group.
    #[must_use]
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, ROOT_GROUP, syntax::STRING, vec![value.into()])
    }

    /// Moves the attribute to another group.
    #[must_use]
    pub fn in_group(mut self, group_path: impl Into<String>) -> Self {
        self.group_path = group_path.into();
        self
    }

    /// Tags the attribute with the remote IdP and profile that produced it.
    #[must_use]
    pub fn with_provenance(
        mut self,
        remote_idp: impl Into<String>,
        translation_profile: impl Into<String>,
    ) -> Self {
        self.remote_idp = Some(remote_idp.into());
        self.translation_profile = Some(translation_profile.into());
        self
    }

    /// Returns the composite key of this attribute.
    #[must_use]
    pub fn key(&self) -> AttributeKey {
        AttributeKey::new(self.group_path.clone(), self.name.clone())
    }

    /// Compares values with another attribute using the value syntax.
    ///
    /// Attributes with different syntaxes or value counts are never equal.
    #[must_use]
    pub fn values_equal(&self, other: &Self) -> bool {
        self.value_syntax == other.value_syntax
            && self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| syntax::values_equal(&self.value_syntax, a, b))
    }
}

/// An attribute as stored, with metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeExt {
    /// The attribute.
    #[serde(flatten)]
    pub attribute: Attribute,
    /// Whether the attribute is directly assigned (not derived).
    pub direct: bool,
    /// When the attribute was created.
    pub created_at: DateTime<Utc>,
    /// When the attribute was last updated.
    pub updated_at: DateTime<Utc>,
}

impl AttributeExt {
    /// Wraps a freshly stored attribute.
    #[must_use]
    pub fn new(attribute: Attribute) -> Self {
        let now = Utc::now();
        Self {
            attribute,
            direct: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the composite key of this attribute.
    #[must_use]
    pub fn key(&self) -> AttributeKey {
        self.attribute.key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_combines_group_and_name() {
        let a = Attribute::string("o", "ICM").in_group("/A");
        assert_eq!(a.key(), AttributeKey::new("/A", "o"));
        // Delimiters in names do not collide
        assert_ne!(
            AttributeKey::new("/A///b", "c"),
            AttributeKey::new("/A", "b///c")
        );
    }

    #[test]
    fn values_compare_by_syntax() {
        let a = Attribute::new("mail", "/", syntax::EMAIL, vec!["joe@EXAMPLE.com".into()]);
        let b = Attribute::new("mail", "/", syntax::EMAIL, vec!["joe@example.com".into()]);
        assert!(a.values_equal(&b));

        let c = Attribute::new("mail", "/", syntax::STRING, vec!["joe@example.com".into()]);
        assert!(!b.values_equal(&c));
    }

    #[test]
    fn value_count_matters() {
        let a = Attribute::new("o", "/", syntax::STRING, vec!["x".into()]);
        let b = Attribute::new("o", "/", syntax::STRING, vec!["x".into(), "y".into()]);
        assert!(!a.values_equal(&b));
    }
}
