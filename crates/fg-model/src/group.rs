//! Group domain model.
//!
//! Groups are hierarchical and addressed by slash-separated paths. The root
//! group `/` always exists and every entity is implicitly a member of it.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Path of the root group.
pub const ROOT_GROUP: &str = "/";

/// A group in the local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Full group path.
    pub path: String,
    /// When the group was created.
    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Creates a new group.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            created_at: Utc::now(),
        }
    }

    /// Checks if this is the root group.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path == ROOT_GROUP
    }
}

/// Membership of an entity in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembership {
    /// Group path.
    pub group: String,
    /// Member entity.
    pub entity_id: Uuid,
    /// Remote IdP whose login added this membership.
    pub remote_idp: Option<String>,
    /// Translation profile which added this membership.
    pub translation_profile: Option<String>,
    /// When the membership was created.
    pub created_at: DateTime<Utc>,
}

impl GroupMembership {
    /// Creates a membership without provenance.
    #[must_use]
    pub fn new(group: impl Into<String>, entity_id: Uuid) -> Self {
        Self {
            group: group.into(),
            entity_id,
            remote_idp: None,
            translation_profile: None,
            created_at: Utc::now(),
        }
    }

    /// Tags the membership with the remote IdP and profile that produced it.
    #[must_use]
    pub fn with_provenance(mut self, remote_idp: Option<&str>, profile: Option<&str>) -> Self {
        self.remote_idp = remote_idp.map(str::to_string);
        self.translation_profile = profile.map(str::to_string);
        self
    }

    /// Checks whether the membership was added by the given IdP and profile.
    #[must_use]
    pub fn has_provenance(&self, remote_idp: Option<&str>, profile: Option<&str>) -> bool {
        self.remote_idp.as_deref() == remote_idp && self.translation_profile.as_deref() == profile
    }
}

/// Parsed group path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupPath {
    /// Path segments from root to leaf.
    pub segments: Vec<String>,
}

impl GroupPath {
    /// Parses a group path string (e.g., "/parent/child/grandchild").
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let segments: Vec<String> = path
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Self { segments }
    }

    /// Returns the path as a string.
    #[must_use]
    pub fn to_path_string(&self) -> String {
        if self.segments.is_empty() {
            ROOT_GROUP.to_string()
        } else {
            format!("/{}", self.segments.join("/"))
        }
    }

    /// Returns the parent path, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            None
        } else {
            Some(Self {
                segments: self.segments[..self.segments.len() - 1].to_vec(),
            })
        }
    }

    /// Returns the leaf (last segment).
    #[must_use]
    pub fn leaf(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Returns the depth (number of segments).
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Checks if this is the root path.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns this path and all its ancestors except the root, leaf first.
    #[must_use]
    pub fn ancestors_and_self(&self) -> Vec<String> {
        (1..=self.segments.len())
            .rev()
            .map(|n| format!("/{}", self.segments[..n].join("/")))
            .collect()
    }
}

/// Computes the groups on the way to `target` that are not in `current`.
///
/// The walk goes from `target` towards the root and stops at the first path
/// present in `current`. The result is ordered root to leaf, so creating the
/// groups in order always has the parent in place. The root is never
/// returned.
#[must_use]
pub fn missing_groups(target: &str, current: &HashSet<String>) -> Vec<String> {
    let mut missing: Vec<String> = GroupPath::parse(target)
        .ancestors_and_self()
        .into_iter()
        .take_while(|p| !current.contains(p))
        .collect();
    missing.reverse();
    missing
}
