//! Remote login scenarios.

use fg_authn::{DenyReason, RemoteAuthenticationResult};
use fg_model::IdentityTaV;
use fg_storage::{EntityProvider, GroupProvider};
use fg_translation::PolicyViolation;

use fg_integration_tests::{corp_login, TestEnv};

#[tokio::test]
async fn first_login_creates_entity_for_new_identity() -> anyhow::Result<()> {
    let env = TestEnv::new()?;

    let outcome = env.login(&corp_login("alice"), "corp").await?;

    let RemoteAuthenticationResult::Successful { principal, entity } = outcome else {
        anyhow::bail!("expected a successful login");
    };
    let stored = env
        .store
        .get_entity_by_identity(&IdentityTaV::new("userName", "alice"))
        .await?;
    assert_eq!(stored.id, entity.entity_id);
    assert_eq!(stored.credential_requirement.as_deref(), Some("password"));
    assert_eq!(principal.primary_identity(), Some(&IdentityTaV::new("userName", "alice")));
    assert_eq!(entity.authenticated_with, vec!["alice".to_string()]);
    Ok(())
}

#[tokio::test]
async fn missing_leaf_group_is_created_under_existing_parent() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    env.store.ensure_group("/org");
    let before = env.store.group_paths();

    let input = corp_login("alice").with_attribute("ou", ["dept"]);
    let entity = env.login_entity(&input, "corp").await?;

    let after = env.store.group_paths();
    let created: Vec<&String> = after.iter().filter(|g| !before.contains(g)).collect();
    assert_eq!(created, vec!["/org/dept"]);

    let groups = env.store.get_groups(entity).await?;
    assert!(groups.contains_key("/org") && groups.contains_key("/org/dept"));
    Ok(())
}

#[tokio::test]
async fn every_missing_ancestor_is_created() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let before = env.store.group_paths();

    let input = corp_login("alice").with_attribute("ou", ["research/ai"]);
    let entity = env.login_entity(&input, "corp").await?;

    let after = env.store.group_paths();
    let created: Vec<&String> = after.iter().filter(|g| !before.contains(g)).collect();
    assert_eq!(created, vec!["/org", "/org/research", "/org/research/ai"]);

    let groups = env.store.get_groups(entity).await?;
    for group in created {
        assert!(groups.contains_key(group), "not a member of {group}");
    }
    Ok(())
}

#[tokio::test]
async fn unchanged_attribute_is_not_written_again() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let input = corp_login("alice").with_attribute("mail", ["a@x.com"]);
    let entity = env.login_entity(&input, "corp").await?;
    let writes = env.store.mutation_count();

    env.login_entity(&input, "corp").await?;
    assert_eq!(env.store.mutation_count(), writes);

    // Email domains compare case-insensitively.
    let shouting = corp_login("alice").with_attribute("mail", ["a@X.COM"]);
    env.login_entity(&shouting, "corp").await?;
    assert_eq!(env.store.mutation_count(), writes);

    let snapshot = env.snapshot(entity).await?;
    assert_eq!(snapshot.attribute("/", "email"), Some(&["a@x.com".to_string()][..]));
    Ok(())
}

#[tokio::test]
async fn required_identity_missing_denies_without_writes() -> anyhow::Result<()> {
    let env = TestEnv::new()?;

    let outcome = env.login(&corp_login("mallory"), "strict").await?;

    assert!(matches!(
        outcome,
        RemoteAuthenticationResult::Denied {
            reason: DenyReason::PolicyViolation(PolicyViolation::RequiredIdentityMissing(_))
        }
    ));
    assert_eq!(env.store.mutation_count(), 0);
    assert!(!env.store.group_paths().contains(&"/strict".to_string()));
    Ok(())
}

#[tokio::test]
async fn identities_of_two_entities_are_ambiguous() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    env.login_entity(
        &corp_login("alice").with_identity("alice@x.com", Some("email")),
        "corp",
    )
    .await?;
    env.login_entity(&corp_login("bob"), "corp").await?;
    let writes = env.store.mutation_count();

    let mixed = corp_login("bob").with_identity("alice@x.com", Some("email"));
    let outcome = env.login(&mixed, "corp").await?;

    assert!(matches!(
        outcome,
        RemoteAuthenticationResult::Denied {
            reason: DenyReason::PolicyViolation(PolicyViolation::AmbiguousPrincipal)
        }
    ));
    assert_eq!(env.store.mutation_count(), writes);
    Ok(())
}

#[tokio::test]
async fn unmatched_login_is_handed_to_registration() -> anyhow::Result<()> {
    let env = TestEnv::new()?;

    let outcome = env.login(&corp_login("newcomer"), "match-user").await?;

    assert!(outcome.is_unknown_principal());
    let principal = outcome
        .principal()
        .ok_or_else(|| anyhow::anyhow!("unknown principal without summary"))?;
    assert_eq!(principal.remote_idp, "corp-ldap");
    assert_eq!(principal.profile, "match-user");
    assert_eq!(env.store.entity_count(), 0);
    Ok(())
}
