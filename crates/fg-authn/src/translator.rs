//! Remote authentication result translator.
//!
//! Runs the translation profile configured for a remote authenticator,
//! reconciles the result with the local store and turns it into a
//! [`RemoteAuthenticationResult`].

use std::sync::Arc;

use fg_core::{Event, EventType, TranslationConfig};
use fg_model::{EntityParam, IdentityParam, IdentityTaV, RemotelyAuthenticatedInput};
use fg_storage::{
    AttributeProvider, EntityProvider, EntityScheduler, GroupProvider, IdentityResolver,
};
use fg_translation::profile::DEFAULT_MAX_INCLUDE_DEPTH;
use fg_translation::{
    ActionRegistry, IdentityEffectMode, InputTranslationEngine, InputTranslationProfile,
    MappedIdentity, MappingResult, PolicyViolation, ProfileRepository, TranslationError,
    TranslationProfile, TranslationResult,
};
use tracing::{debug, info, trace, warn};

use crate::error::{AuthError, AuthResult};
use crate::principal::{
    AuthenticatedEntity, DenyReason, RemoteAuthenticationResult, RemotelyAuthenticatedPrincipal,
};

/// Options of a single translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationOptions {
    /// Run the profile and resolve the existing entity, but write nothing.
    pub dry_run: bool,
    /// An identity the principal must already have locally.
    pub preset_identity: Option<IdentityTaV>,
    /// Registration form offered to unknown principals.
    pub registration_form: Option<String>,
    /// Whether unknown principals may associate with an existing account.
    pub allow_association: bool,
}

impl TranslationOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables dry run.
    #[must_use]
    pub const fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Requires the given identity to exist locally.
    #[must_use]
    pub fn with_preset_identity(mut self, identity: IdentityTaV) -> Self {
        self.preset_identity = Some(identity);
        self
    }

    /// Sets the registration form for unknown principals.
    #[must_use]
    pub fn with_registration_form(mut self, form: impl Into<String>) -> Self {
        self.registration_form = Some(form.into());
        self
    }

    /// Allows unknown principals to associate with an existing account.
    #[must_use]
    pub const fn with_association(mut self, allow: bool) -> Self {
        self.allow_association = allow;
        self
    }
}

enum Resolution {
    Entity(AuthenticatedEntity),
    Unknown,
    Disabled,
}

/// Translates remote authentication results into local principals.
pub struct RemoteAuthnTranslator {
    repository: Arc<dyn ProfileRepository>,
    registry: Arc<ActionRegistry>,
    engine: InputTranslationEngine,
    entities: Arc<dyn EntityProvider>,
    resolver: Arc<dyn IdentityResolver>,
    max_include_depth: usize,
}

impl RemoteAuthnTranslator {
    /// Creates a translator.
    #[must_use]
    pub fn new(
        repository: Arc<dyn ProfileRepository>,
        registry: Arc<ActionRegistry>,
        engine: InputTranslationEngine,
        entities: Arc<dyn EntityProvider>,
        resolver: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self {
            repository,
            registry,
            engine,
            entities,
            resolver,
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }

    /// Creates a translator over a store implementing all providers.
    #[must_use]
    pub fn from_store<S>(
        store: Arc<S>,
        repository: Arc<dyn ProfileRepository>,
        registry: Arc<ActionRegistry>,
    ) -> Self
    where
        S: EntityProvider
            + GroupProvider
            + AttributeProvider
            + EntityScheduler
            + IdentityResolver
            + 'static,
    {
        Self::new(
            repository,
            registry,
            InputTranslationEngine::from_store(store.clone()),
            store.clone(),
            store,
        )
    }

    /// Applies translation settings.
    #[must_use]
    pub const fn with_config(mut self, config: &TranslationConfig) -> Self {
        self.max_include_depth = config.max_include_depth;
        self
    }

    /// Translates a remote input with the named profile.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ProfileNotFound`] for an unknown profile,
    /// [`AuthError::Configuration`] for an invalid one and
    /// [`AuthError::Store`] when the local store fails. Policy violations
    /// yield a [`RemoteAuthenticationResult::Denied`] outcome.
    pub async fn get_translated_result(
        &self,
        input: &RemotelyAuthenticatedInput,
        profile: &str,
        options: &TranslationOptions,
    ) -> AuthResult<RemoteAuthenticationResult> {
        let definition = self.repository.get_profile(profile)?.ok_or_else(|| {
            warn!(profile, "the translation profile configured for the authenticator does not exist");
            AuthError::ProfileNotFound(profile.to_string())
        })?;
        self.get_translated_result_with(input, &definition, options)
            .await
    }

    /// Translates a remote input with a given profile definition.
    ///
    /// # Errors
    ///
    /// See [`Self::get_translated_result`].
    pub async fn get_translated_result_with(
        &self,
        input: &RemotelyAuthenticatedInput,
        profile: &TranslationProfile,
        options: &TranslationOptions,
    ) -> AuthResult<RemoteAuthenticationResult> {
        let principal = match self.translate_remote_input(input, profile, options).await {
            Ok(principal) => principal,
            Err(TranslationError::ExecutionBreak(reason)) => {
                warn!(
                    idp = input.idp_name(),
                    profile = %profile.name,
                    reason = %reason,
                    "remote principal denied by translation profile"
                );
                return Ok(RemoteAuthenticationResult::Denied {
                    reason: DenyReason::PolicyViolation(reason),
                });
            }
            Err(e) => {
                warn!(error = %e, "mapping of the remotely authenticated principal to a local representation failed");
                return Err(e.into());
            }
        };

        if options.dry_run {
            self.assemble_dry_run_result(principal, options).await
        } else {
            self.assemble_authentication_result(
                principal,
                options.registration_form.clone(),
                options.allow_association,
            )
            .await
        }
    }

    /// Runs the profile and, unless dry running, reconciles the result.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::ExecutionBreak` on policy violations,
    /// configuration and store errors otherwise.
    pub async fn translate_remote_input(
        &self,
        input: &RemotelyAuthenticatedInput,
        profile: &TranslationProfile,
        options: &TranslationOptions,
    ) -> TranslationResult<RemotelyAuthenticatedPrincipal> {
        let instance = InputTranslationProfile::new(
            profile,
            Arc::clone(&self.repository),
            Arc::clone(&self.registry),
        )?
        .with_max_include_depth(self.max_include_depth);

        let mut result = instance.translate(input)?;
        info!(profile = %profile.name, "result of remote data mapping:\n{result}");

        if let Some(preset) = &options.preset_identity {
            info!(identity = %preset, "adding a preset identity as required to the mapping result");
            result.add_identity(MappedIdentity::new(
                IdentityEffectMode::RequireMatch,
                IdentityParam::new(preset.type_id.clone(), preset.value.clone()),
                None,
            ));
        }

        self.set_mapping_to_existing_entity(&mut result).await?;

        let events = if options.dry_run {
            Vec::new()
        } else {
            self.engine.process(&mut result).await?.events
        };

        let mut principal = RemotelyAuthenticatedPrincipal::new(input.clone(), &profile.name, result);
        principal.events = events;
        Ok(principal)
    }

    /// Turns a translated principal into an authentication outcome.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotMapped`] if the principal has no identities,
    /// and [`AuthError::Store`] if the local store fails.
    pub async fn assemble_authentication_result(
        &self,
        mut principal: RemotelyAuthenticatedPrincipal,
        registration_form: Option<String>,
        allow_association: bool,
    ) -> AuthResult<RemoteAuthenticationResult> {
        if principal.identities.is_empty() {
            return Err(AuthError::NotMapped);
        }
        if principal.local_mapped_principal.is_none() {
            return Ok(unknown_principal(principal, registration_form, allow_association));
        }

        match self.resolve_authenticated_entity(&principal).await? {
            Resolution::Entity(entity) => {
                info!(entity = %entity.entity_id, idp = %principal.remote_idp, "remote principal resolved");
                principal.events.push(
                    Event::builder(EventType::PrincipalResolved)
                        .entity(entity.entity_id)
                        .provenance(Some(principal.remote_idp.as_str()), Some(principal.profile.as_str()))
                        .build(),
                );
                Ok(RemoteAuthenticationResult::Successful {
                    principal: Box::new(principal),
                    entity,
                })
            }
            Resolution::Unknown => Ok(unknown_principal(principal, registration_form, allow_association)),
            Resolution::Disabled => {
                warn!(idp = %principal.remote_idp, "remote principal was mapped to a disabled account");
                Ok(RemoteAuthenticationResult::Denied {
                    reason: DenyReason::DisabledAccount,
                })
            }
        }
    }

    async fn assemble_dry_run_result(
        &self,
        principal: RemotelyAuthenticatedPrincipal,
        options: &TranslationOptions,
    ) -> AuthResult<RemoteAuthenticationResult> {
        if principal.local_mapped_principal.is_none() {
            return Ok(unknown_principal(
                principal,
                options.registration_form.clone(),
                options.allow_association,
            ));
        }

        let entity = match self.resolve_authenticated_entity(&principal).await {
            Ok(Resolution::Entity(entity)) => Some(entity),
            Ok(Resolution::Unknown | Resolution::Disabled) => None,
            Err(e) => {
                debug!(error = %e, "can not resolve remote principal");
                None
            }
        };
        Ok(RemoteAuthenticationResult::SuccessfulPartial {
            principal: Box::new(principal),
            entity,
        })
    }

    async fn resolve_authenticated_entity(
        &self,
        principal: &RemotelyAuthenticatedPrincipal,
    ) -> AuthResult<Resolution> {
        let entity_id = match &principal.local_mapped_principal {
            Some(EntityParam::Id(id)) => *id,
            Some(EntityParam::Identity(tav)) => match self.resolver.resolve_identity(tav).await {
                Ok(id) => id,
                Err(e) if e.is_not_found() => return Ok(Resolution::Unknown),
                Err(e) => return Err(e.into()),
            },
            None => return Ok(Resolution::Unknown),
        };

        if !self.resolver.is_entity_enabled(entity_id).await? {
            return Ok(Resolution::Disabled);
        }

        Ok(Resolution::Entity(AuthenticatedEntity {
            entity_id,
            authenticated_with: principal
                .mapping_result
                .authenticated_with
                .iter()
                .cloned()
                .collect(),
            remote_idp: Some(principal.remote_idp.clone()),
        }))
    }

    async fn set_mapping_to_existing_entity(&self, result: &mut MappingResult) -> TranslationResult<()> {
        let mut existing = None;
        for checked in &result.identities {
            let tav = checked.identity.tav();
            match self.entities.get_entity_by_identity(&tav).await {
                Ok(found) => {
                    if existing.is_some_and(|id| id != found.id) {
                        warn!(identity = %tav, "identities were mapped to two different entities");
                        return Err(TranslationError::execution_break(
                            PolicyViolation::AmbiguousPrincipal,
                        ));
                    }
                    existing = Some(found.id);
                    result.authenticated_with.insert(checked.identity.value.clone());
                }
                Err(e) if e.is_not_found() => trace!(identity = %tav, "identity not found locally"),
                Err(e) => return Err(e.into()),
            }
        }
        if existing.is_some() {
            result.mapped_at_existing_entity = existing;
        }
        Ok(())
    }
}

fn unknown_principal(
    mut principal: RemotelyAuthenticatedPrincipal,
    registration_form: Option<String>,
    allow_association: bool,
) -> RemoteAuthenticationResult {
    info!(idp = %principal.remote_idp, "remote principal has no local counterpart");
    principal.events.push(
        Event::builder(EventType::PrincipalUnknown)
            .provenance(Some(principal.remote_idp.as_str()), Some(principal.profile.as_str()))
            .build(),
    );
    RemoteAuthenticationResult::UnknownRemotePrincipal {
        principal: Box::new(principal),
        registration_form,
        allow_association,
    }
}

impl std::fmt::Debug for RemoteAuthnTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteAuthnTranslator")
            .field("registry", &self.registry)
            .field("max_include_depth", &self.max_include_depth)
            .finish_non_exhaustive()
    }
}
