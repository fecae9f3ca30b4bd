//! In-memory identity store.
//!
//! Implements every provider trait of this crate over a single locked state.
//! Intended for tests and for dry-run tooling; nothing is persisted.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fg_model::{
    Attribute, AttributeExt, AttributeKey, Entity, EntityInformation, EntityScheduledOperation,
    EntityState, Group, GroupMembership, GroupPath, Identity, IdentityParam, IdentityTaV,
    ROOT_GROUP,
};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::attribute::AttributeProvider;
use crate::entity::{EntityProvider, EntityScheduler, IdentityResolver};
use crate::error::{StorageError, StorageResult};
use crate::group::GroupProvider;

#[derive(Debug)]
struct State {
    entities: HashMap<Uuid, Entity>,
    identities: HashMap<IdentityTaV, Uuid>,
    groups: BTreeMap<String, Group>,
    memberships: HashMap<Uuid, BTreeMap<String, GroupMembership>>,
    attributes: HashMap<Uuid, BTreeMap<AttributeKey, AttributeExt>>,
}

impl State {
    fn new() -> Self {
        let mut groups = BTreeMap::new();
        groups.insert(ROOT_GROUP.to_string(), Group::new(ROOT_GROUP));
        Self {
            entities: HashMap::new(),
            identities: HashMap::new(),
            groups,
            memberships: HashMap::new(),
            attributes: HashMap::new(),
        }
    }

    fn entity_mut(&mut self, id: Uuid) -> StorageResult<&mut Entity> {
        self.entities
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found("Entity", id))
    }

    fn insert_identity(&mut self, param: &IdentityParam, entity: Uuid) -> StorageResult<Identity> {
        let tav = param.tav();
        if self.identities.contains_key(&tav) {
            return Err(StorageError::duplicate("Identity", tav));
        }
        let identity = Identity::from_param(entity, param);
        self.entity_mut(entity)?.identities.push(identity.clone());
        self.identities.insert(tav, entity);
        Ok(identity)
    }

    fn is_member(&self, entity: Uuid, path: &str) -> bool {
        self.memberships
            .get(&entity)
            .is_some_and(|m| m.contains_key(path))
    }

    fn put_attribute(&mut self, entity: Uuid, attribute: &Attribute, overwrite: bool) -> StorageResult<()> {
        if !self.entities.contains_key(&entity) {
            return Err(StorageError::not_found("Entity", entity));
        }
        if !self.is_member(entity, &attribute.group_path) {
            return Err(StorageError::invalid(format!(
                "entity {entity} is not a member of {}",
                attribute.group_path
            )));
        }
        let attrs = self.attributes.entry(entity).or_default();
        let key = attribute.key();
        match attrs.get_mut(&key) {
            Some(_) if !overwrite => Err(StorageError::duplicate(
                "Attribute",
                format!("{}@{}", key.name, key.group_path),
            )),
            Some(existing) => {
                existing.attribute = attribute.clone();
                existing.updated_at = Utc::now();
                Ok(())
            }
            None => {
                attrs.insert(key, AttributeExt::new(attribute.clone()));
                Ok(())
            }
        }
    }
}

/// In-memory implementation of all store providers.
///
/// The root group `/` exists from the start.
#[derive(Debug)]
pub struct InMemoryStore {
    state: RwLock<State>,
    mutations: AtomicU64,
    fail_removals: AtomicBool,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::new()),
            mutations: AtomicU64::new(0),
            fail_removals: AtomicBool::new(false),
        }
    }

    /// Creates a group and any missing ancestors.
    pub fn ensure_group(&self, path: &str) {
        let mut state = self.state.write();
        let target = GroupPath::parse(path);
        for p in target.ancestors_and_self().into_iter().rev() {
            state.groups.entry(p.clone()).or_insert_with(|| Group::new(p));
        }
    }

    /// Returns the paths of all groups.
    #[must_use]
    pub fn group_paths(&self) -> Vec<String> {
        self.state.read().groups.keys().cloned().collect()
    }

    /// Returns the number of entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.state.read().entities.len()
    }

    /// Overrides the state of an entity.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if the entity doesn't exist.
    pub fn set_entity_state(&self, entity: Uuid, state: EntityState) -> StorageResult<()> {
        self.state.write().entity_mut(entity)?.information.state = state;
        Ok(())
    }

    /// Returns the number of successful write operations so far.
    #[must_use]
    pub fn mutation_count(&self) -> u64 {
        self.mutations.load(Ordering::SeqCst)
    }

    /// Makes every remove operation fail with an internal error.
    pub fn fail_removals(&self, fail: bool) {
        self.fail_removals.store(fail, Ordering::SeqCst);
    }

    fn mutated(&self) {
        self.mutations.fetch_add(1, Ordering::SeqCst);
    }

    fn check_removals(&self) -> StorageResult<()> {
        if self.fail_removals.load(Ordering::SeqCst) {
            Err(StorageError::Internal("removal rejected".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Entities
// ============================================================================

#[async_trait]
impl EntityProvider for InMemoryStore {
    async fn get_entity_by_identity(&self, identity: &IdentityTaV) -> StorageResult<Entity> {
        let state = self.state.read();
        state
            .identities
            .get(identity)
            .and_then(|id| state.entities.get(id))
            .cloned()
            .ok_or_else(|| StorageError::not_found("Identity", identity))
    }

    async fn get_entity(&self, id: Uuid) -> StorageResult<Entity> {
        self.state
            .read()
            .entities
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("Entity", id))
    }

    async fn add_entity(
        &self,
        identity: &IdentityParam,
        credential_requirement: Option<&str>,
        state: EntityState,
        attributes: &[Attribute],
    ) -> StorageResult<Identity> {
        let mut guard = self.state.write();
        if guard.identities.contains_key(&identity.tav()) {
            return Err(StorageError::duplicate("Identity", identity.tav()));
        }

        let id = Uuid::now_v7();
        guard.entities.insert(
            id,
            Entity {
                id,
                identities: Vec::new(),
                information: EntityInformation {
                    state,
                    ..EntityInformation::default()
                },
                credential_requirement: credential_requirement.map(str::to_string),
            },
        );
        let created = guard.insert_identity(identity, id)?;
        guard.memberships.entry(id).or_default().insert(
            ROOT_GROUP.to_string(),
            GroupMembership::new(ROOT_GROUP, id),
        );
        for attribute in attributes {
            guard.put_attribute(id, attribute, true)?;
        }
        drop(guard);

        self.mutated();
        Ok(created)
    }

    async fn add_identity(&self, identity: &IdentityParam, entity: Uuid) -> StorageResult<Identity> {
        let created = self.state.write().insert_identity(identity, entity)?;
        self.mutated();
        Ok(created)
    }

    async fn remove_identity(&self, identity: &IdentityTaV) -> StorageResult<()> {
        self.check_removals()?;
        let mut state = self.state.write();
        let owner = state
            .identities
            .remove(identity)
            .ok_or_else(|| StorageError::not_found("Identity", identity))?;
        if let Some(entity) = state.entities.get_mut(&owner) {
            entity
                .identities
                .retain(|i| i.type_id != identity.type_id || i.value != identity.value);
        }
        drop(state);

        self.mutated();
        Ok(())
    }
}

#[async_trait]
impl EntityScheduler for InMemoryStore {
    async fn schedule_entity_change(
        &self,
        entity: Uuid,
        time: Option<DateTime<Utc>>,
        operation: Option<EntityScheduledOperation>,
    ) -> StorageResult<()> {
        let mut state = self.state.write();
        let info = &mut state.entity_mut(entity)?.information;
        info.scheduled_operation = operation;
        info.scheduled_time = operation.and(time);
        drop(state);

        self.mutated();
        Ok(())
    }
}

#[async_trait]
impl IdentityResolver for InMemoryStore {
    async fn resolve_identity(&self, identity: &IdentityTaV) -> StorageResult<Uuid> {
        self.state
            .read()
            .identities
            .get(identity)
            .copied()
            .ok_or_else(|| StorageError::not_found("Identity", identity))
    }

    async fn is_entity_enabled(&self, entity: Uuid) -> StorageResult<bool> {
        self.state
            .read()
            .entities
            .get(&entity)
            .map(|e| e.information.state.can_authenticate())
            .ok_or_else(|| StorageError::not_found("Entity", entity))
    }
}

// ============================================================================
// Groups
// ============================================================================

#[async_trait]
impl GroupProvider for InMemoryStore {
    async fn get_groups(&self, entity: Uuid) -> StorageResult<HashMap<String, GroupMembership>> {
        let state = self.state.read();
        if !state.entities.contains_key(&entity) {
            return Err(StorageError::not_found("Entity", entity));
        }
        Ok(state
            .memberships
            .get(&entity)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    async fn group_exists(&self, path: &str) -> StorageResult<bool> {
        Ok(self.state.read().groups.contains_key(path))
    }

    async fn create_group(&self, path: &str) -> StorageResult<()> {
        let mut state = self.state.write();
        if state.groups.contains_key(path) {
            return Err(StorageError::duplicate("Group", path));
        }
        let parent = GroupPath::parse(path)
            .parent()
            .map(|p| p.to_path_string())
            .ok_or_else(|| StorageError::invalid("the root group can not be created"))?;
        if !state.groups.contains_key(&parent) {
            return Err(StorageError::invalid(format!(
                "parent group {parent} of {path} does not exist"
            )));
        }
        state.groups.insert(path.to_string(), Group::new(path));
        drop(state);

        self.mutated();
        Ok(())
    }

    async fn add_member(
        &self,
        path: &str,
        entity: Uuid,
        attributes: &[Attribute],
        remote_idp: Option<&str>,
        translation_profile: Option<&str>,
    ) -> StorageResult<()> {
        let mut state = self.state.write();
        if !state.groups.contains_key(path) {
            return Err(StorageError::not_found("Group", path));
        }
        if !state.entities.contains_key(&entity) {
            return Err(StorageError::not_found("Entity", entity));
        }
        if state.is_member(entity, path) {
            return Err(StorageError::duplicate("GroupMembership", path));
        }
        if let Some(parent) = GroupPath::parse(path).parent() {
            let parent = parent.to_path_string();
            if !state.is_member(entity, &parent) {
                return Err(StorageError::invalid(format!(
                    "entity {entity} is not a member of the parent group {parent}"
                )));
            }
        }

        state.memberships.entry(entity).or_default().insert(
            path.to_string(),
            GroupMembership::new(path, entity).with_provenance(remote_idp, translation_profile),
        );
        for attribute in attributes {
            state.put_attribute(entity, attribute, true)?;
        }
        drop(state);

        self.mutated();
        Ok(())
    }

    async fn remove_member(&self, path: &str, entity: Uuid) -> StorageResult<()> {
        self.check_removals()?;
        if path == ROOT_GROUP {
            return Err(StorageError::invalid("can not remove a member from the root group"));
        }
        let mut state = self.state.write();
        if !state.is_member(entity, path) {
            return Err(StorageError::not_found("GroupMembership", path));
        }

        let prefix = format!("{path}/");
        let in_subtree = |group: &str| group == path || group.starts_with(&prefix);
        if let Some(memberships) = state.memberships.get_mut(&entity) {
            memberships.retain(|group, _| !in_subtree(group));
        }
        if let Some(attributes) = state.attributes.get_mut(&entity) {
            attributes.retain(|key, _| !in_subtree(&key.group_path));
        }
        drop(state);

        self.mutated();
        Ok(())
    }
}

// ============================================================================
// Attributes
// ============================================================================

#[async_trait]
impl AttributeProvider for InMemoryStore {
    async fn get_all_attributes(&self, entity: Uuid) -> StorageResult<Vec<AttributeExt>> {
        Ok(self
            .state
            .read()
            .attributes
            .get(&entity)
            .map(|a| a.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn create_attribute(&self, entity: Uuid, attribute: &Attribute) -> StorageResult<()> {
        self.state.write().put_attribute(entity, attribute, false)?;
        self.mutated();
        Ok(())
    }

    async fn set_attribute(&self, entity: Uuid, attribute: &Attribute) -> StorageResult<()> {
        self.state.write().put_attribute(entity, attribute, true)?;
        self.mutated();
        Ok(())
    }

    async fn remove_attribute(
        &self,
        entity: Uuid,
        group_path: &str,
        name: &str,
    ) -> StorageResult<()> {
        self.check_removals()?;
        self.state
            .write()
            .attributes
            .get_mut(&entity)
            .and_then(|a| a.remove(&AttributeKey::new(group_path, name)))
            .ok_or_else(|| StorageError::not_found("Attribute", format!("{name}@{group_path}")))?;
        self.mutated();
        Ok(())
    }
}
