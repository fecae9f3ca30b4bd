//! Repeated logins, stale data cleanup and account lifecycle.

use std::sync::Arc;

use chrono::{Duration, Utc};
use fg_model::{Attribute, EntityScheduledOperation, IdentityTaV};
use fg_storage::{AttributeProvider, EntityProvider};
use fg_translation::{
    ActionRegistry, InMemoryProfileRepository, InputTranslationEngine, InputTranslationProfile,
    RemotelyAuthenticatedInput, TranslationProfile,
};

use fg_integration_tests::{corp_login, TestEnv};

fn team_login(idp: &str, user: &str, teams: &[&str]) -> RemotelyAuthenticatedInput {
    RemotelyAuthenticatedInput::new(idp)
        .with_identity(user, Some("userName"))
        .with_attribute("memberOf", teams.iter().copied())
}

#[tokio::test]
async fn repeated_login_converges() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let input = corp_login("carol")
        .with_identity("carol@x.com", Some("email"))
        .with_attribute("mail", ["carol@x.com"])
        .with_attribute("ou", ["ops"]);

    let entity = env.login_entity(&input, "corp").await?;
    let first = env.snapshot(entity).await?;
    let again = env.login_entity(&input, "corp").await?;

    assert_eq!(again, entity);
    assert_eq!(env.snapshot(entity).await?, first);
    assert_eq!(first.identities.len(), 2);
    assert!(first.groups.contains("/org/ops"));
    Ok(())
}

#[tokio::test]
async fn remove_missing_mode_only_touches_own_provenance() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let entity = env
        .login_entity(
            &team_login("corp-ldap", "joe", &["/teams/a", "/teams/b"]).with_attribute("title", ["dev"]),
            "teams",
        )
        .await?;

    // Same user through another IdP with the same profile.
    env.login_entity(&team_login("partner", "joe", &["/partners"]), "teams")
        .await?;
    let snapshot = env.snapshot(entity).await?;
    assert!(snapshot.groups.contains("/teams/b"));
    assert_eq!(snapshot.attribute("/", "title"), Some(&["dev".to_string()][..]));

    // Corporate directory revokes team b and the title.
    env.login_entity(&team_login("corp-ldap", "joe", &["/teams/a"]), "teams")
        .await?;
    let snapshot = env.snapshot(entity).await?;
    assert!(!snapshot.groups.contains("/teams/b"));
    assert!(snapshot.groups.contains("/teams"), "ancestor of a mapped group is kept");
    assert!(snapshot.groups.contains("/teams/a"));
    assert!(snapshot.groups.contains("/partners"), "other IdP's membership is kept");
    assert_eq!(snapshot.attribute("/", "title"), None);
    Ok(())
}

#[tokio::test]
async fn create_only_and_update_only_attributes() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let entity = env.login_entity(&corp_login("dave"), "corp").await?;

    let input = corp_login("dave")
        .with_attribute("nick", ["dj"])
        .with_attribute("phone", ["123"]);
    env.login_entity(&input, "nickname").await?;
    let snapshot = env.snapshot(entity).await?;
    assert_eq!(snapshot.attribute("/", "nickname"), Some(&["dj".to_string()][..]));
    assert_eq!(snapshot.attribute("/", "phone"), None, "update only never creates");

    env.store
        .set_attribute(entity, &Attribute::string("phone", "000"))
        .await?;
    let renamed = corp_login("dave")
        .with_attribute("nick", ["davey"])
        .with_attribute("phone", ["123"]);
    env.login_entity(&renamed, "nickname").await?;

    let snapshot = env.snapshot(entity).await?;
    assert_eq!(snapshot.attribute("/", "nickname"), Some(&["dj".to_string()][..]), "create only never overwrites");
    assert_eq!(snapshot.attribute("/", "phone"), Some(&["123".to_string()][..]));
    Ok(())
}

#[tokio::test]
async fn contractor_accounts_are_scheduled_for_disabling() -> anyhow::Result<()> {
    let env = TestEnv::new()?;

    let entity = env.login_entity(&corp_login("erin"), "contractors").await?;

    let info = env.store.get_entity(entity).await?.information;
    assert_eq!(info.scheduled_operation, Some(EntityScheduledOperation::Disable));
    let at = info
        .scheduled_time
        .ok_or_else(|| anyhow::anyhow!("no scheduled time"))?;
    let expected = Utc::now() + Duration::days(30);
    assert!((expected - at).num_minutes().abs() < 5);
    Ok(())
}

#[tokio::test]
async fn new_remote_account_merges_into_existing_entity() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let entity = env.login_entity(&corp_login("frank"), "corp").await?;

    let repository = InMemoryProfileRepository::with_profiles([TranslationProfile::new("social")
        .with_rule("true", "mapIdentity", &["userName", "id", "", "CREATE_OR_MATCH"])
        .with_rule("true", "mapGroup", &["'/social'", "CREATE_GROUP_IF_MISSING"])]);
    let profile = InputTranslationProfile::load(
        "social",
        repository.into_shared(),
        Arc::new(ActionRegistry::with_builtin_actions()),
    )?;
    let engine = InputTranslationEngine::from_store(env.store.clone());

    let social = RemotelyAuthenticatedInput::new("social-idp").with_identity("frank-g", Some("userName"));
    let mut result = profile.translate(&social)?;
    assert!(engine.identities_not_present_in_db(&result).await?);
    engine.merge_with_existing(&mut result, entity).await?;

    let merged = env
        .store
        .get_entity_by_identity(&IdentityTaV::new("userName", "frank-g"))
        .await?;
    assert_eq!(merged.id, entity);
    assert!(env.snapshot(entity).await?.groups.contains("/social"));

    let outcome = env.login(&corp_login("frank-g"), "match-user").await?;
    assert_eq!(outcome.entity().map(|e| e.entity_id), Some(entity));
    Ok(())
}
