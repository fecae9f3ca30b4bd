//! Reconciliation engine.
//!
//! Applies a [`MappingResult`] to the local identity store: resolves or
//! creates the local entity, then brings its group memberships, attributes
//! and scheduled lifecycle changes in line with what the profile mapped.
//!
//! The engine issues store calls but never opens transactions. Callers run
//! [`InputTranslationEngine::process`] inside whatever transactional boundary
//! the store offers, so that a policy violation raised midway leaves no
//! partial writes behind.

use std::collections::HashSet;
use std::sync::Arc;

use fg_core::{Event, EventBuilder, EventType};
use fg_model::{missing_groups, Attribute, AttributeExt, AttributeKey, Entity, EntityState, ROOT_GROUP};
use fg_storage::{
    AttributeProvider, EntityProvider, EntityScheduler, GroupProvider, StorageResult,
};
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

use crate::error::{PolicyViolation, TranslationError, TranslationResult};
use crate::mapping::{
    AttributeEffectMode, GroupEffectMode, IdentityEffectMode, MappedGroup, MappedIdentity,
    MappingResult,
};

// ============================================================================
// Reconciliation Report
// ============================================================================

/// Outcome of applying a mapping result.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Local entity the result was applied to, `None` when the principal has
    /// no local counterpart and none was created.
    pub entity: Option<Uuid>,
    /// Audit events, one per store call issued.
    pub events: Vec<Event>,
}

impl Reconciliation {
    /// Returns the events that record a successful store mutation.
    pub fn mutations(&self) -> impl Iterator<Item = &Event> {
        self.events
            .iter()
            .filter(|e| e.event_type.is_mutation() && e.error.is_none())
    }

    /// Returns the number of events of the given type.
    #[must_use]
    pub fn count(&self, event_type: EventType) -> usize {
        self.events.iter().filter(|e| e.event_type == event_type).count()
    }
}

/// Remote IdP and profile whose earlier output is subject to stale cleanup.
///
/// Taken from the first mapped identity. An absent tag matches nothing.
#[derive(Debug, Clone, Default)]
struct StaleScope {
    idp: Option<String>,
    profile: Option<String>,
}

impl StaleScope {
    fn of(result: &MappingResult) -> Self {
        result
            .identities
            .first()
            .map(|mi| Self {
                idp: mi.identity.remote_idp.clone(),
                profile: mi.identity.translation_profile.clone(),
            })
            .unwrap_or_default()
    }

    fn covers(&self, idp: Option<&str>, profile: Option<&str>) -> bool {
        match (&self.idp, &self.profile, idp, profile) {
            (Some(a), Some(b), Some(idp), Some(profile)) => a == idp && b == profile,
            _ => false,
        }
    }
}

/// Records the events of one reconciliation run.
#[derive(Debug)]
struct Journal {
    events: Vec<Event>,
}

impl Journal {
    const fn new() -> Self {
        Self { events: Vec::new() }
    }

    fn push(&mut self, event: EventBuilder) {
        self.events.push(event.build());
    }

    fn attributes(&mut self, entity: Uuid, event_type: EventType, attributes: &[Attribute]) {
        for a in attributes {
            self.push(
                Event::builder(event_type)
                    .entity(entity)
                    .provenance(a.remote_idp.as_deref(), a.translation_profile.as_deref())
                    .detail("group", a.group_path.clone())
                    .detail("attribute", a.name.clone()),
            );
        }
    }

    fn finish(self, entity: Option<Uuid>) -> Reconciliation {
        Reconciliation {
            entity,
            events: self.events,
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Applies mapping results to the local identity store.
#[derive(Clone)]
pub struct InputTranslationEngine {
    entities: Arc<dyn EntityProvider>,
    groups: Arc<dyn GroupProvider>,
    attributes: Arc<dyn AttributeProvider>,
    scheduler: Arc<dyn EntityScheduler>,
}

impl InputTranslationEngine {
    /// Creates an engine over separate store providers.
    #[must_use]
    pub fn new(
        entities: Arc<dyn EntityProvider>,
        groups: Arc<dyn GroupProvider>,
        attributes: Arc<dyn AttributeProvider>,
        scheduler: Arc<dyn EntityScheduler>,
    ) -> Self {
        Self {
            entities,
            groups,
            attributes,
            scheduler,
        }
    }

    /// Creates an engine over a store implementing all providers.
    #[must_use]
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: EntityProvider + GroupProvider + AttributeProvider + EntityScheduler + 'static,
    {
        Self {
            entities: store.clone(),
            groups: store.clone(),
            attributes: store.clone(),
            scheduler: store,
        }
    }

    /// Applies a mapping result.
    ///
    /// Resolves the local entity from the mapped identities, creating it or
    /// adding equivalent identities as the identity modes allow, then applies
    /// groups, attributes and entity changes. Records the entity in
    /// `result.mapped_at_existing_entity`.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::ExecutionBreak` when a required identity or
    /// group is missing, the identities match two different entities, or no
    /// identity was mapped at all. Store errors are passed through.
    pub async fn process(&self, result: &mut MappingResult) -> TranslationResult<Reconciliation> {
        let mut journal = Journal::new();
        let mut processed = HashSet::new();

        let entity = self
            .process_identities(result, &mut processed, &mut journal)
            .await?;
        result.mapped_at_existing_entity = entity;
        let Some(entity) = entity else {
            info!(
                "mapped identity does not exist locally and was not created, skipping groups and attributes"
            );
            return Ok(journal.finish(None));
        };

        self.process_groups(result, entity, &mut processed, &mut journal)
            .await?;
        self.process_attributes(result, entity, &processed, &mut journal)
            .await?;
        self.process_entity_changes(result, entity, &mut journal)
            .await?;
        Ok(journal.finish(Some(entity)))
    }

    /// Merges a mapping result into an explicitly chosen entity.
    ///
    /// Stale cleanup is turned off. Every mapped identity must be absent
    /// locally; they are all added to `entity`.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::ExecutionBreak` when a mapped identity
    /// already exists, a `REQUIRE_MATCH` identity is missing, nothing was
    /// mapped, or a required group is missing.
    pub async fn merge_with_existing(
        &self,
        result: &mut MappingResult,
        entity: Uuid,
    ) -> TranslationResult<Reconciliation> {
        result.keep_all_stale();

        let mut journal = Journal::new();
        let mut processed = HashSet::new();

        let to_create = self.identities_to_create(result).await?;
        if to_create.is_empty() {
            info!("translation profile mapped no identity, can not merge an anonymous principal");
            return Err(TranslationError::execution_break(
                PolicyViolation::NothingToMerge,
            ));
        }
        self.add_equivalents(&to_create, entity, result, &mut journal)
            .await?;
        result.mapped_at_existing_entity = Some(entity);

        self.process_groups(result, entity, &mut processed, &mut journal)
            .await?;
        self.process_attributes(result, entity, &processed, &mut journal)
            .await?;
        self.process_entity_changes(result, entity, &mut journal)
            .await?;
        Ok(journal.finish(Some(entity)))
    }

    /// Checks that no mapped identity exists locally and none requires a match.
    ///
    /// # Errors
    ///
    /// Store errors are passed through.
    pub async fn identities_not_present_in_db(&self, result: &MappingResult) -> TranslationResult<bool> {
        match self.identities_to_create(result).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_execution_break() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Returns the first mapped identity that exists locally.
    ///
    /// Lookup failures other than "not found" are logged and skipped.
    pub async fn get_existing_identity(&self, result: &MappingResult) -> Option<MappedIdentity> {
        for checked in &result.identities {
            match self.lookup(&checked.identity.tav()).await {
                Ok(Some(_)) => return Some(checked.clone()),
                Ok(None) => {}
                Err(e) => error!(identity = %checked.identity.tav(), error = %e, "can not check the entity status"),
            }
        }
        None
    }

    /// Returns the local entity owning a mapped identity.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Storage` with a not-found error if the
    /// identity does not exist locally.
    pub async fn resolve_mapped_identity(&self, identity: &MappedIdentity) -> TranslationResult<Entity> {
        Ok(self
            .entities
            .get_entity_by_identity(&identity.identity.tav())
            .await?)
    }

    // ------------------------------------------------------------------------
    // Identities
    // ------------------------------------------------------------------------

    async fn lookup(&self, tav: &fg_model::IdentityTaV) -> StorageResult<Option<Entity>> {
        match self.entities.get_entity_by_identity(tav).await {
            Ok(entity) => Ok(Some(entity)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn process_identities(
        &self,
        result: &mut MappingResult,
        processed: &mut HashSet<AttributeKey>,
        journal: &mut Journal,
    ) -> TranslationResult<Option<Uuid>> {
        let mut to_create: Vec<MappedIdentity> = Vec::new();
        let mut missing_match: Vec<MappedIdentity> = Vec::new();
        let mut missing_update: Vec<MappedIdentity> = Vec::new();
        let mut existing: Option<Entity> = None;

        for checked in &result.identities {
            let tav = checked.identity.tav();
            if let Some(found) = self.lookup(&tav).await? {
                if let Some(current) = &existing {
                    if current.id != found.id {
                        warn!(
                            first = %current.id,
                            second = %found.id,
                            "identities were mapped to two different entities"
                        );
                        return Err(TranslationError::execution_break(
                            PolicyViolation::AmbiguousPrincipal,
                        ));
                    }
                }
                existing = Some(found);
                result.authenticated_with.insert(checked.identity.value.clone());
                continue;
            }

            trace!(identity = %tav, "identity not found locally");
            match checked.mode {
                IdentityEffectMode::RequireMatch => {
                    info!(identity = %tav, "identity does not exist locally, but the profile requires so");
                    return Err(TranslationError::execution_break(
                        PolicyViolation::RequiredIdentityMissing(tav.to_string()),
                    ));
                }
                IdentityEffectMode::CreateOrMatch => to_create.push(checked.clone()),
                IdentityEffectMode::Match => missing_match.push(checked.clone()),
                IdentityEffectMode::CreateOrUpdate => missing_update.push(checked.clone()),
            }
        }

        if let Some(entity) = &existing {
            to_create.append(&mut missing_update);
            if result.clean_stale_identities {
                self.remove_stale_identities(entity, result, journal).await;
            }
        } else {
            missing_match.append(&mut missing_update);
        }

        if to_create.is_empty() && missing_match.is_empty() && existing.is_none() {
            info!("translation profile mapped no identity, can not authenticate an anonymous principal");
            return Err(TranslationError::execution_break(
                PolicyViolation::AnonymousPrincipal,
            ));
        }

        if to_create.is_empty() {
            debug!("no identity needs to be added");
            return Ok(existing.map(|e| e.id));
        }

        match existing {
            Some(entity) => {
                self.add_equivalents(&to_create, entity.id, result, journal)
                    .await?;
                Ok(Some(entity.id))
            }
            None => {
                let created = self
                    .create_entity(result, to_create, processed, journal)
                    .await?;
                Ok(Some(created))
            }
        }
    }

    async fn identities_to_create(&self, result: &MappingResult) -> TranslationResult<Vec<MappedIdentity>> {
        let mut to_create = Vec::new();
        for checked in &result.identities {
            let tav = checked.identity.tav();
            if self.lookup(&tav).await?.is_some() {
                debug!(identity = %tav, "identity was mapped to an existing identity");
                return Err(TranslationError::execution_break(
                    PolicyViolation::IdentityAlreadyPresent(tav.to_string()),
                ));
            }
            if checked.mode == IdentityEffectMode::RequireMatch {
                info!(identity = %tav, "identity does not exist locally, but the profile requires so");
                return Err(TranslationError::execution_break(
                    PolicyViolation::RequiredIdentityMissing(tav.to_string()),
                ));
            }
            to_create.push(checked.clone());
        }
        Ok(to_create)
    }

    async fn add_equivalents(
        &self,
        to_add: &[MappedIdentity],
        entity: Uuid,
        result: &mut MappingResult,
        journal: &mut Journal,
    ) -> TranslationResult<()> {
        for mi in to_add {
            self.entities.add_identity(&mi.identity, entity).await?;
            info!(identity = %mi.identity.tav(), entity = %entity, "added equivalent identity");
            journal.push(
                Event::builder(EventType::IdentityAdded)
                    .entity(entity)
                    .provenance(
                        mi.identity.remote_idp.as_deref(),
                        mi.identity.translation_profile.as_deref(),
                    )
                    .detail("identity", mi.identity.tav().to_string()),
            );
            result.authenticated_with.insert(mi.identity.value.clone());
        }
        Ok(())
    }

    async fn create_entity(
        &self,
        result: &mut MappingResult,
        mut candidates: Vec<MappedIdentity>,
        processed: &mut HashSet<AttributeKey>,
        journal: &mut Journal,
    ) -> TranslationResult<Uuid> {
        let first = candidates.remove(0);
        let attributes = result.attributes_in_group(ROOT_GROUP);

        info!(identity = %first.identity.tav(), "adding entity to the local store");
        let created = self
            .entities
            .add_entity(
                &first.identity,
                first.credential_requirement.as_deref(),
                EntityState::Valid,
                &attributes,
            )
            .await?;
        let entity = created.entity_id;
        journal.push(
            Event::builder(EventType::EntityCreated)
                .entity(entity)
                .provenance(
                    first.identity.remote_idp.as_deref(),
                    first.identity.translation_profile.as_deref(),
                )
                .detail("identity", first.identity.tav().to_string()),
        );
        journal.attributes(entity, EventType::AttributeCreated, &attributes);
        result.authenticated_with.insert(first.identity.value.clone());
        processed.extend(attributes.iter().map(Attribute::key));

        self.add_equivalents(&candidates, entity, result, journal)
            .await?;
        Ok(entity)
    }

    async fn remove_stale_identities(&self, entity: &Entity, result: &MappingResult, journal: &mut Journal) {
        let scope = StaleScope::of(result);
        for id in &entity.identities {
            if !scope.covers(id.remote_idp.as_deref(), id.translation_profile.as_deref()) {
                continue;
            }
            if result.identities.iter().any(|mi| id.matches(&mi.identity)) {
                continue;
            }

            let event = Event::builder(EventType::IdentityRemoved)
                .entity(entity.id)
                .provenance(id.remote_idp.as_deref(), id.translation_profile.as_deref())
                .detail("identity", id.tav().to_string());
            match self.entities.remove_identity(&id.tav()).await {
                Ok(()) => {
                    info!(identity = %id.tav(), "removed stale identity");
                    journal.push(event);
                }
                Err(e) => {
                    error!(identity = %id.tav(), error = %e, "can not remove stale identity");
                    journal.push(event.failure(e.to_string()));
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------------

    async fn process_groups(
        &self,
        result: &MappingResult,
        entity: Uuid,
        processed: &mut HashSet<AttributeKey>,
        journal: &mut Journal,
    ) -> TranslationResult<()> {
        let current = self.groups.get_groups(entity).await?;
        let mut current_paths: HashSet<String> = current.keys().cloned().collect();

        for mapped in &result.groups {
            if current.contains_key(&mapped.group) {
                debug!(group = %mapped.group, "entity already in the group, skipping");
                continue;
            }
            info!(group = %mapped.group, mode = %mapped.mode, "adding to group");
            self.add_to_group(result, entity, mapped, &mut current_paths, processed, journal)
                .await?;
        }

        if result.clean_stale_groups {
            let scope = StaleScope::of(result);
            for membership in current.values() {
                if membership.group == ROOT_GROUP
                    || !scope.covers(
                        membership.remote_idp.as_deref(),
                        membership.translation_profile.as_deref(),
                    )
                    || is_mapped_or_ancestor(&result.groups, &membership.group)
                {
                    continue;
                }

                let event = Event::builder(EventType::MembershipRemoved)
                    .entity(entity)
                    .provenance(
                        membership.remote_idp.as_deref(),
                        membership.translation_profile.as_deref(),
                    )
                    .detail("group", membership.group.clone());
                match self.groups.remove_member(&membership.group, entity).await {
                    Ok(()) => {
                        info!(group = %membership.group, "removed stale group membership");
                        journal.push(event);
                    }
                    Err(e) => {
                        error!(group = %membership.group, error = %e, "can not remove stale group membership");
                        journal.push(event.failure(e.to_string()));
                    }
                }
            }
        }
        Ok(())
    }

    /// Walks the missing groups from the closest present ancestor to the
    /// mapped group, adding the entity to each.
    async fn add_to_group(
        &self,
        result: &MappingResult,
        entity: Uuid,
        mapped: &MappedGroup,
        current: &mut HashSet<String>,
        processed: &mut HashSet<AttributeKey>,
        journal: &mut Journal,
    ) -> TranslationResult<()> {
        let idp = mapped.idp.as_deref();
        let profile = mapped.profile.as_deref();

        for group in missing_groups(&mapped.group, current) {
            let attributes = result.attributes_in_group(&group);

            if !self.groups.group_exists(&group).await? {
                match mapped.mode {
                    GroupEffectMode::CreateGroupIfMissing => {
                        info!(group = %group, "group does not exist, creating it to fulfil the profile rule");
                        self.groups.create_group(&group).await?;
                        journal.push(
                            Event::builder(EventType::GroupCreated)
                                .entity(entity)
                                .provenance(idp, profile)
                                .detail("group", group.clone()),
                        );
                    }
                    GroupEffectMode::RequireExistingGroup => {
                        debug!(group = %group, "entity should be added to a missing group, failing");
                        return Err(TranslationError::execution_break(
                            PolicyViolation::RequiredGroupMissing(group),
                        ));
                    }
                    GroupEffectMode::IgnoreIfMissing => {
                        debug!(group = %group, "entity should be added to a missing group, ignoring");
                        return Ok(());
                    }
                }
            }

            self.groups
                .add_member(&group, entity, &attributes, idp, profile)
                .await?;
            journal.push(
                Event::builder(EventType::MembershipAdded)
                    .entity(entity)
                    .provenance(idp, profile)
                    .detail("group", group.clone()),
            );
            journal.attributes(entity, EventType::AttributeCreated, &attributes);
            processed.extend(attributes.iter().map(Attribute::key));
            current.insert(group);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------------

    async fn process_attributes(
        &self,
        result: &MappingResult,
        entity: Uuid,
        processed: &HashSet<AttributeKey>,
        journal: &mut Journal,
    ) -> TranslationResult<()> {
        let existing_attrs = self.attributes.get_all_attributes(entity).await?;

        for mapped in &result.attributes {
            let att = &mapped.attribute;
            let key = att.key();
            if processed.contains(&key) {
                continue;
            }
            let existing = existing_attrs.iter().find(|a| a.key() == key);

            match mapped.mode {
                AttributeEffectMode::CreateOnly => {
                    if existing.is_some() {
                        debug!(attribute = %att.name, group = %att.group_path, "skipping attribute which is already present");
                        continue;
                    }
                    info!(attribute = %att.name, group = %att.group_path, "creating attribute");
                    self.attributes.create_attribute(entity, att).await?;
                    journal.attributes(entity, EventType::AttributeCreated, std::slice::from_ref(att));
                }
                AttributeEffectMode::CreateOrUpdate => {
                    self.update_attribute(entity, att, existing, journal).await?;
                }
                AttributeEffectMode::UpdateOnly => {
                    if existing.is_none() {
                        debug!(attribute = %att.name, group = %att.group_path, "skipping update of an attribute which is not defined");
                        continue;
                    }
                    self.update_attribute(entity, att, existing, journal).await?;
                }
            }
        }

        if result.clean_stale_attributes {
            let scope = StaleScope::of(result);
            for a in &existing_attrs {
                let attr = &a.attribute;
                if !scope.covers(attr.remote_idp.as_deref(), attr.translation_profile.as_deref())
                    || result.attributes.iter().any(|m| m.attribute.key() == a.key())
                {
                    continue;
                }
                match self
                    .attributes
                    .remove_attribute(entity, &attr.group_path, &attr.name)
                    .await
                {
                    Ok(()) => {
                        info!(attribute = %attr.name, group = %attr.group_path, "removed stale attribute");
                        journal.attributes(entity, EventType::AttributeRemoved, std::slice::from_ref(attr));
                    }
                    Err(e) => {
                        error!(attribute = %attr.name, group = %attr.group_path, error = %e, "can not remove stale attribute");
                        journal.push(
                            Event::builder(EventType::AttributeRemoved)
                                .entity(entity)
                                .provenance(attr.remote_idp.as_deref(), attr.translation_profile.as_deref())
                                .detail("group", attr.group_path.clone())
                                .detail("attribute", attr.name.clone())
                                .failure(e.to_string()),
                        );
                    }
                }
            }
        }
        Ok(())
    }

    async fn update_attribute(
        &self,
        entity: Uuid,
        att: &Attribute,
        existing: Option<&AttributeExt>,
        journal: &mut Journal,
    ) -> TranslationResult<()> {
        if existing.is_some_and(|e| self.attributes_equal(att, &e.attribute)) {
            debug!(attribute = %att.name, group = %att.group_path, "attribute is up to date, skipping update");
            return Ok(());
        }
        info!(attribute = %att.name, group = %att.group_path, "updating attribute");
        self.attributes.set_attribute(entity, att).await?;
        let event_type = if existing.is_some() {
            EventType::AttributeUpdated
        } else {
            EventType::AttributeCreated
        };
        journal.attributes(entity, event_type, std::slice::from_ref(att));
        Ok(())
    }

    fn attributes_equal(&self, mapped: &Attribute, stored: &Attribute) -> bool {
        mapped.value_syntax == stored.value_syntax
            && mapped.values.len() == stored.values.len()
            && mapped
                .values
                .iter()
                .zip(&stored.values)
                .all(|(a, b)| self.attributes.values_equal(&mapped.value_syntax, a, b))
    }

    // ------------------------------------------------------------------------
    // Entity changes
    // ------------------------------------------------------------------------

    async fn process_entity_changes(
        &self,
        result: &MappingResult,
        entity: Uuid,
        journal: &mut Journal,
    ) -> TranslationResult<()> {
        for change in &result.entity_changes {
            let mut event = Event::builder(EventType::EntityChangeScheduled).entity(entity);
            match (change.scheduled_operation, change.scheduled_time) {
                (Some(op), time) => {
                    info!(operation = %op, time = ?time, "changing entity scheduled operation");
                    event = event.detail("operation", op.to_string());
                    if let Some(time) = time {
                        event = event.detail("time", time.to_rfc3339());
                    }
                }
                (None, _) => info!("clearing entity scheduled operation"),
            }
            self.scheduler
                .schedule_entity_change(entity, change.scheduled_time, change.scheduled_operation)
                .await?;
            journal.push(event);
        }
        Ok(())
    }
}

/// Checks whether `group` is a mapped group or an ancestor of one.
fn is_mapped_or_ancestor(mapped: &[MappedGroup], group: &str) -> bool {
    let prefix = format!("{group}/");
    mapped
        .iter()
        .any(|g| g.group == group || g.group.starts_with(&prefix))
}

impl std::fmt::Debug for InputTranslationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputTranslationEngine").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fg_model::IdentityParam;

    fn mapped(idp: Option<&str>, profile: Option<&str>) -> MappingResult {
        let mut identity = IdentityParam::new("userName", "joe");
        identity.remote_idp = idp.map(str::to_string);
        identity.translation_profile = profile.map(str::to_string);
        let mut result = MappingResult::new();
        result.add_identity(MappedIdentity::new(IdentityEffectMode::Match, identity, None));
        result
    }

    #[test]
    fn stale_scope_requires_both_tags() {
        let scope = StaleScope::of(&mapped(Some("ldap"), Some("p1")));
        assert!(scope.covers(Some("ldap"), Some("p1")));
        assert!(!scope.covers(Some("ldap"), Some("p2")));
        assert!(!scope.covers(None, None));

        let untagged = StaleScope::of(&mapped(None, Some("p1")));
        assert!(!untagged.covers(None, Some("p1")));
        assert!(!StaleScope::of(&MappingResult::new()).covers(None, None));
    }

    #[test]
    fn ancestors_of_mapped_groups_are_kept() {
        let mapped = vec![MappedGroup::new("/teams/a", GroupEffectMode::CreateGroupIfMissing, None, None)];
        assert!(is_mapped_or_ancestor(&mapped, "/teams/a"));
        assert!(is_mapped_or_ancestor(&mapped, "/teams"));
        assert!(!is_mapped_or_ancestor(&mapped, "/teams/b"));
        assert!(!is_mapped_or_ancestor(&mapped, "/team"));
    }
}
