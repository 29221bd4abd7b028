//! Functional tests for the document store.
//!
//! These drive the store the way a workbook editor does: several team members
//! loading and saving the same step, with the repository occasionally losing
//! races. They focus on:
//! - Document-level access before any field-level rule.
//! - All-or-nothing rejection of edits touching other members' fields.
//! - Ownership that survives clearing and is never writable by clients.
//! - Saves built on an outdated version being rejected, never merged.

use async_trait::async_trait;
use fieldlock_store::{
    DocumentStore, InMemoryRepository, RepositoryError, StepKey, StepRepository, StepWrite,
    StoreConfig, StoreError, StoredStep,
};
use fieldlock_test_utils::{
    path, persona_step, setup_store, setup_store_with, step, user, AUTHOR, MEMBER_A, MEMBER_B,
    OUTSIDER, PROJECT,
};
use fieldlock_ownership::UserId;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Repository that lets another writer sneak in before each of the next
/// `races` saves.
#[derive(Debug, Default)]
struct RacingRepository {
    inner: InMemoryRepository,
    races: AtomicU32,
}

impl RacingRepository {
    fn with_races(races: u32) -> Self {
        Self {
            inner: InMemoryRepository::new(),
            races: AtomicU32::new(races),
        }
    }

    fn take_race(&self) -> bool {
        self.races
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl StepRepository for RacingRepository {
    async fn load(&self, key: &StepKey) -> Result<Option<StoredStep>, RepositoryError> {
        self.inner.load(key).await
    }

    async fn save(&self, key: &StepKey, write: StepWrite) -> Result<u64, RepositoryError> {
        if self.take_race() {
            let current = self.inner.load(key).await?;
            let (document, expected_version) = match current {
                Some(step) => (step.document, Some(step.version)),
                None => (json!({"intruder": "was here"}), None),
            };
            self.inner
                .save(
                    key,
                    StepWrite {
                        document,
                        expected_version,
                        completed: false,
                    },
                )
                .await?;
        }
        self.inner.save(key, write).await
    }

    async fn delete(&self, key: &StepKey) -> Result<bool, RepositoryError> {
        self.inner.delete(key).await
    }

    async fn list_project(
        &self,
        project_id: &str,
    ) -> Result<Vec<(u32, StoredStep)>, RepositoryError> {
        self.inner.list_project(project_id).await
    }
}

/// Current version of a step as a member sees it, `None` if never saved.
async fn current_version(store: &DocumentStore, key: &StepKey, user: &UserId) -> Option<u64> {
    store
        .load_step(key, user)
        .await
        .unwrap()
        .map(|snapshot| snapshot.version)
}

/// Load the step, apply `edit` to its content, save against the loaded version.
async fn load_edit_save(
    store: &DocumentStore,
    key: &StepKey,
    user: &UserId,
    edit: impl FnOnce(&mut Value),
) -> Result<u64, StoreError> {
    let snapshot = store.load_step(key, user).await?;
    let (mut content, version) = match snapshot {
        Some(s) => (s.content, Some(s.version)),
        None => (json!({}), None),
    };
    edit(&mut content);
    Ok(store.save_step(key, user, content, version).await?.version)
}

/// Tenet: only the author and team members reach a project's steps.
///
/// The membership check runs before anything else, for reads and writes
/// alike. An unknown project is reported as such rather than as a denial.
#[tokio::test]
async fn outsiders_are_turned_away() {
    let (store, repository) = setup_store();
    let outsider = user(OUTSIDER);

    let err = store
        .save_step(&step(1), &outsider, persona_step(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::AccessDenied { .. }));
    assert!(err.is_permission_error());
    assert!(repository.is_empty());

    let err = store.load_step(&step(1), &outsider).await.unwrap_err();
    assert!(matches!(err, StoreError::AccessDenied { .. }));

    let err = store
        .progress("no-such-project", &user(AUTHOR))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::UnknownProject(_)));
}

/// Tenet: membership is checked before the content is even looked at.
#[tokio::test]
async fn outsider_with_malformed_content_is_still_denied_access() {
    let (store, _) = setup_store();
    let err = store
        .save_step(&step(1), &user(OUTSIDER), json!(["not", "a", "record"]), None)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::AccessDenied { .. }));
}

/// Tenet: a field filled by one member is locked for the others.
///
/// The rejection names the field the way a person would read it.
#[tokio::test]
async fn filled_fields_lock_for_other_members() {
    let (store, _) = setup_store();
    let grace = user(MEMBER_A);
    let linus = user(MEMBER_B);

    let outcome = store
        .save_step(&step(1), &grace, persona_step(), None)
        .await
        .unwrap();
    assert_eq!(outcome.version, 1);
    assert!(outcome.claims.get(&path("personaName")).is_some());

    let mut edit = persona_step();
    edit["personaName"] = json!("Night-shift nurse");
    let err = store
        .save_step(&step(1), &linus, edit.clone(), Some(1))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "'Persona Name' was filled in by grace and can only be changed by them"
    );

    // grace may keep editing her own field
    let outcome = store.save_step(&step(1), &grace, edit, Some(1)).await.unwrap();
    assert_eq!(outcome.version, 2);
}

/// Tenet: a rejected save writes nothing at all.
///
/// Even claims that would be allowed on their own are discarded, and every
/// denied path is reported, not only the first.
#[tokio::test]
async fn rejection_is_all_or_nothing() {
    let (store, _) = setup_store();
    let grace = user(MEMBER_A);
    let linus = user(MEMBER_B);

    store
        .save_step(
            &step(2),
            &grace,
            json!({"goal": "Grow", "tags": ["a"], "note": ""}),
            None,
        )
        .await
        .unwrap();
    let before = store.load_step(&step(2), &grace).await.unwrap().unwrap();

    let err = store
        .save_step(
            &step(2),
            &linus,
            json!({"goal": "Shrink", "tags": ["b"], "note": "mine"}),
            Some(before.version),
        )
        .await
        .unwrap_err();
    match err {
        StoreError::PermissionDenied { path: first, denied, owner, .. } => {
            assert_eq!(first, path("goal"));
            assert_eq!(denied, vec![path("goal"), path("tags[0]")]);
            assert_eq!(owner, grace);
        }
        other => panic!("expected PermissionDenied, got {other:?}"),
    }

    let after = store.load_step(&step(2), &grace).await.unwrap().unwrap();
    assert_eq!(after, before);
}

/// Tenet: clearing keeps the owner; refilling hands the field over.
#[tokio::test]
async fn clearing_keeps_owner_and_refill_transfers() {
    let (store, _) = setup_store();
    let grace = user(MEMBER_A);
    let linus = user(MEMBER_B);

    store
        .save_step(&step(3), &grace, json!({"goal": "Grow"}), None)
        .await
        .unwrap();
    store
        .save_step(&step(3), &grace, json!({"goal": ""}), Some(1))
        .await
        .unwrap();
    let owners = store.field_owners(&step(3), &grace).await.unwrap();
    assert_eq!(owners.owner_of_str("goal"), Some(&grace));

    assert!(store
        .can_edit_field(&step(3), &linus, &path("goal"))
        .await
        .unwrap());
    store
        .save_step(&step(3), &linus, json!({"goal": "Mine now"}), Some(2))
        .await
        .unwrap();

    let owners = store.field_owners(&step(3), &grace).await.unwrap();
    assert_eq!(owners.owner_of_str("goal"), Some(&linus));
    assert!(!store
        .can_edit_field(&step(3), &grace, &path("goal"))
        .await
        .unwrap());
}

/// Tenet: clients cannot write ownership.
///
/// A `_fieldEditors` key sent by the editor is dropped before detection; the
/// stored map only ever reflects observed edits.
#[tokio::test]
async fn forged_ownership_is_ignored() {
    let (store, repository) = setup_store();
    let grace = user(MEMBER_A);
    let linus = user(MEMBER_B);

    store
        .save_step(&step(4), &grace, json!({"goal": "Grow"}), None)
        .await
        .unwrap();

    let forged = json!({"goal": "Grow", "_fieldEditors": {"goal": MEMBER_B}});
    let outcome = store
        .save_step(&step(4), &linus, forged, Some(1))
        .await
        .unwrap();
    assert!(outcome.claims.is_empty());

    let stored = repository.load(&step(4)).await.unwrap().unwrap();
    assert_eq!(stored.document["_fieldEditors"], json!({"goal": MEMBER_A}));

    let snapshot = store.load_step(&step(4), &linus).await.unwrap().unwrap();
    assert_eq!(snapshot.content, json!({"goal": "Grow"}));

    let err = store
        .save_step(&step(4), &linus, json!({"goal": "Shrink"}), Some(2))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::PermissionDenied { .. }));
}

/// Tenet: an edit made on an outdated copy is rejected, not merged.
///
/// Two members load the same version. The first save wins. The second would
/// otherwise blank the field the first just filled, since that field looks
/// cleared from the second member's copy.
#[tokio::test]
async fn stale_copy_cannot_erase_a_newer_fill() {
    let (store, _) = setup_store();
    let grace = user(MEMBER_A);
    let linus = user(MEMBER_B);

    store
        .save_step(&step(5), &grace, json!({"goal": ""}), None)
        .await
        .unwrap();

    let linus_copy = store.load_step(&step(5), &linus).await.unwrap().unwrap();
    assert_eq!(linus_copy.version, 1);

    store
        .save_step(&step(5), &grace, json!({"goal": "Grow"}), Some(1))
        .await
        .unwrap();

    let mut edit = linus_copy.content.clone();
    edit["risk"] = json!("Churn");
    let err = store
        .save_step(&step(5), &linus, edit, Some(linus_copy.version))
        .await
        .unwrap_err();
    match &err {
        StoreError::VersionConflict {
            key,
            expected,
            actual,
        } => {
            assert_eq!(key, &step(5));
            assert_eq!(*expected, Some(1));
            assert_eq!(*actual, Some(2));
        }
        other => panic!("expected VersionConflict, got {other:?}"),
    }
    assert!(err.is_retryable());

    let snapshot = store.load_step(&step(5), &linus).await.unwrap().unwrap();
    assert_eq!(snapshot.content, json!({"goal": "Grow"}));
    assert_eq!(snapshot.version, 2);

    // reloading and reapplying the edit keeps both contributions
    load_edit_save(&store, &step(5), &linus, |c| c["risk"] = json!("Churn"))
        .await
        .unwrap();
    let snapshot = store.load_step(&step(5), &grace).await.unwrap().unwrap();
    assert_eq!(snapshot.content, json!({"goal": "Grow", "risk": "Churn"}));
}

/// Tenet: a first save expects no document; a step created meanwhile wins.
#[tokio::test]
async fn concurrent_first_saves_do_not_overwrite() {
    let (store, _) = setup_store();
    store
        .save_step(&step(5), &user(MEMBER_A), json!({"goal": "Grow"}), None)
        .await
        .unwrap();

    let err = store
        .save_step(&step(5), &user(MEMBER_B), json!({"risk": "Churn"}), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::VersionConflict {
            expected: None,
            actual: Some(1),
            ..
        }
    ));
}

/// Tenet: a write landing between the store's read and its write is detected.
///
/// The store does not rebase the caller's content on the newer document; the
/// caller gets a conflict and the intervening write stays intact.
#[tokio::test]
async fn write_racing_inside_a_save_is_rejected() {
    let repository = Arc::new(RacingRepository::with_races(1));
    let store = setup_store_with(repository.clone(), StoreConfig::new());

    let err = store
        .save_step(&step(6), &user(MEMBER_A), json!({"goal": "Grow"}), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::VersionConflict {
            expected: None,
            actual: Some(1),
            ..
        }
    ));

    let stored = repository.load(&step(6)).await.unwrap().unwrap();
    assert_eq!(stored.document, json!({"intruder": "was here"}));

    // with the race over, a save against the current version goes through
    let version = current_version(&store, &step(6), &user(MEMBER_A)).await;
    let outcome = store
        .save_step(
            &step(6),
            &user(MEMBER_A),
            json!({"intruder": "was here", "goal": "Grow"}),
            version,
        )
        .await
        .unwrap();
    assert_eq!(outcome.version, 2);
}

/// Tenet: concurrent members editing different fields never lose content.
///
/// Both start from the same copy; one save wins, the other is told to reload,
/// and after reapplying its edit both fields and both owners are present.
#[tokio::test]
async fn concurrent_saves_on_disjoint_fields() {
    let (store, _) = setup_store();
    let store = Arc::new(store);

    let spawn_save = |member: &'static str, field: &'static str, value: &'static str| {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            let result = store
                .save_step(&step(7), &user(member), json!({ field: value }), None)
                .await;
            (member, field, value, result)
        })
    };
    let a = spawn_save(MEMBER_A, "goal", "Grow");
    let b = spawn_save(MEMBER_B, "risk", "Churn");
    let results = [a.await.unwrap(), b.await.unwrap()];

    let losers: Vec<_> = results
        .iter()
        .filter(|(_, _, _, result)| result.is_err())
        .collect();
    assert_eq!(losers.len(), 1);

    let (member, field, value, result) = losers[0];
    assert!(matches!(result, Err(StoreError::VersionConflict { .. })));
    load_edit_save(&store, &step(7), &user(member), |c| c[*field] = json!(value))
        .await
        .unwrap();

    let snapshot = store.load_step(&step(7), &user(AUTHOR)).await.unwrap().unwrap();
    assert_eq!(snapshot.content, json!({"goal": "Grow", "risk": "Churn"}));
    assert_eq!(snapshot.ownership.owner_of_str("goal"), Some(&user(MEMBER_A)));
    assert_eq!(snapshot.ownership.owner_of_str("risk"), Some(&user(MEMBER_B)));
}

/// Tenet: deletion is the author's call and takes ownership with it.
#[tokio::test]
async fn deletion_is_author_only_and_clears_ownership() {
    let (store, _) = setup_store();
    let grace = user(MEMBER_A);
    let linus = user(MEMBER_B);

    store
        .save_step(&step(8), &grace, json!({"goal": "Grow"}), None)
        .await
        .unwrap();

    let err = store.delete_step(&step(8), &grace).await.unwrap_err();
    assert!(matches!(err, StoreError::AuthorOnly { .. }));

    assert!(store.delete_step(&step(8), &user(AUTHOR)).await.unwrap());
    assert!(!store.delete_step(&step(8), &user(AUTHOR)).await.unwrap());
    assert!(store.load_step(&step(8), &grace).await.unwrap().is_none());
    assert!(store.field_owners(&step(8), &grace).await.unwrap().is_empty());

    // the field is free again
    store
        .save_step(&step(8), &linus, json!({"goal": "Fresh start"}), None)
        .await
        .unwrap();
}

/// Tenet: submitting marks a step completed and it stays completed.
#[tokio::test]
async fn submit_marks_progress() {
    let (store, _) = setup_store();
    let grace = user(MEMBER_A);

    store
        .save_step(&step(1), &grace, json!({"goal": "Grow"}), None)
        .await
        .unwrap();
    let outcome = store
        .submit_step(&step(2), &grace, json!({"budget": 1200}), None)
        .await
        .unwrap();
    assert!(outcome.completed);

    let progress = store.progress(PROJECT, &grace).await.unwrap();
    assert_eq!(progress.saved_steps, vec![1, 2]);
    assert_eq!(progress.completed_steps, vec![2]);
    assert!(progress.is_completed(2));
    assert!(!progress.is_completed(1));

    // a later draft save does not reopen the step
    let outcome = store
        .save_step(&step(2), &grace, json!({"budget": 1500}), Some(outcome.version))
        .await
        .unwrap();
    assert!(outcome.completed);
}

/// Tenet: step content must be a record.
#[tokio::test]
async fn non_record_content_is_rejected() {
    let (store, repository) = setup_store();
    let err = store
        .save_step(&step(1), &user(AUTHOR), json!(["not", "a", "record"]), None)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidContent(_)));
    assert!(repository.is_empty());
}

/// Tenet: configured labels reach rejection messages.
#[tokio::test]
async fn configured_labels_name_rejected_fields() {
    let repository = Arc::new(InMemoryRepository::new());
    let config = StoreConfig::from_toml_str(
        r#"
        [field_labels]
        "budget.lines[].amount" = "Budget amount"
        "#,
    )
    .unwrap();
    let store = setup_store_with(repository, config);

    store
        .save_step(&step(9), &user(MEMBER_A), persona_step(), None)
        .await
        .unwrap();

    let mut edit = persona_step();
    edit["budget"]["lines"][0]["amount"] = json!(900);
    let err = store
        .save_step(&step(9), &user(MEMBER_B), edit, Some(1))
        .await
        .unwrap_err();
    match err {
        StoreError::PermissionDenied { field, .. } => {
            assert_eq!(field, "Budget amount (item 1)");
        }
        other => panic!("expected PermissionDenied, got {other:?}"),
    }
}
