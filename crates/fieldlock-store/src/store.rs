//! Document store
//!
//! Wraps a [`StepRepository`] with the ownership rules:
//! - Checks project membership before anything else
//! - Hides ownership metadata from callers
//! - Rejects a whole save if any edited field belongs to someone else
//! - Rejects a save built on a version that is no longer current

use crate::access::{AccessDirectory, ProjectMembers};
use crate::error::{RepositoryError, StoreError};
use crate::repository::StepRepository;
use crate::types::{ProjectProgress, SaveOutcome, StepKey, StepSnapshot, StepWrite, StoreConfig};
use fieldlock_document::FieldPath;
use fieldlock_ownership::{
    extract_metadata, merge_metadata, strip_reserved_keys, ChangeDetector, Denial, Extracted,
    FieldLabeler, OwnershipMap, PermissionGate, UserId,
};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Step store enforcing field ownership
#[derive(Debug, Clone)]
pub struct DocumentStore {
    /// Configuration
    config: StoreConfig,
    /// Persistence backend
    repository: Arc<dyn StepRepository>,
    /// Project membership source
    access: Arc<dyn AccessDirectory>,
    /// Field names for rejection messages
    labeler: FieldLabeler,
    detector: ChangeDetector,
    gate: PermissionGate,
}

impl DocumentStore {
    /// Create new store
    #[must_use]
    pub fn new(
        repository: Arc<dyn StepRepository>,
        access: Arc<dyn AccessDirectory>,
        config: StoreConfig,
    ) -> Self {
        Self {
            labeler: config.labeler(),
            config,
            repository,
            access,
            detector: ChangeDetector::new(),
            gate: PermissionGate::new(),
        }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Load a step for display
    ///
    /// # Returns
    /// `None` if the step was never saved; callers treat that as an empty
    /// document.
    #[tracing::instrument(skip_all, fields(key = %key, user = %user))]
    pub async fn load_step(
        &self,
        key: &StepKey,
        user: &UserId,
    ) -> Result<Option<StepSnapshot>, StoreError> {
        self.authorize(&key.project_id, user).await?;

        let Some(stored) = self.repository.load(key).await? else {
            tracing::debug!("step not saved yet");
            return Ok(None);
        };

        let Extracted { content, ownership } = extract_metadata(stored.document);
        Ok(Some(StepSnapshot {
            content,
            ownership: ownership.unwrap_or_default(),
            version: stored.version,
            completed: stored.completed,
            updated_at: stored.updated_at,
        }))
    }

    /// Save a draft of a step
    ///
    /// `expected_version` is the [`StepSnapshot::version`] the edit was made
    /// against, or `None` if the caller saw no saved step. If the step has
    /// moved on since, nothing is written and [`StoreError::VersionConflict`]
    /// is returned; the caller must reload and reapply the edit.
    ///
    /// All-or-nothing: if any changed field is owned by another user, nothing
    /// is written and [`StoreError::PermissionDenied`] names the field.
    #[tracing::instrument(skip_all, fields(key = %key, user = %user, expected = ?expected_version))]
    pub async fn save_step(
        &self,
        key: &StepKey,
        user: &UserId,
        content: Value,
        expected_version: Option<u64>,
    ) -> Result<SaveOutcome, StoreError> {
        self.write_step(key, user, content, expected_version, false)
            .await
    }

    /// Save a step and mark it completed
    #[tracing::instrument(skip_all, fields(key = %key, user = %user, expected = ?expected_version))]
    pub async fn submit_step(
        &self,
        key: &StepKey,
        user: &UserId,
        content: Value,
        expected_version: Option<u64>,
    ) -> Result<SaveOutcome, StoreError> {
        self.write_step(key, user, content, expected_version, true)
            .await
    }

    /// Whether `user` may write `path` in the current version of a step
    ///
    /// Same rule as a save; intended for locking fields in an editor.
    #[tracing::instrument(skip_all, fields(key = %key, user = %user, path = %path))]
    pub async fn can_edit_field(
        &self,
        key: &StepKey,
        user: &UserId,
        path: &FieldPath,
    ) -> Result<bool, StoreError> {
        self.authorize(&key.project_id, user).await?;

        let Some(stored) = self.repository.load(key).await? else {
            return Ok(true);
        };
        let extracted = extract_metadata(stored.document);
        Ok(self
            .gate
            .allows(path, &extracted.owners(), user, &extracted.content))
    }

    /// Current field owners of a step
    #[tracing::instrument(skip_all, fields(key = %key, user = %user))]
    pub async fn field_owners(
        &self,
        key: &StepKey,
        user: &UserId,
    ) -> Result<OwnershipMap, StoreError> {
        Ok(self
            .load_step(key, user)
            .await?
            .map(|snapshot| snapshot.ownership)
            .unwrap_or_default())
    }

    /// Delete a step together with its ownership record
    ///
    /// Only the project author may delete.
    #[tracing::instrument(skip_all, fields(key = %key, user = %user))]
    pub async fn delete_step(&self, key: &StepKey, user: &UserId) -> Result<bool, StoreError> {
        let members = self.authorize(&key.project_id, user).await?;
        if !members.is_author(user) {
            tracing::warn!("delete refused: not the project author");
            return Err(StoreError::AuthorOnly {
                user: user.clone(),
                project: key.project_id.clone(),
            });
        }

        let removed = self.repository.delete(key).await?;
        tracing::info!(removed, "step deleted");
        Ok(removed)
    }

    /// Saved and submitted steps of a project
    #[tracing::instrument(skip_all, fields(project = project_id, user = %user))]
    pub async fn progress(
        &self,
        project_id: &str,
        user: &UserId,
    ) -> Result<ProjectProgress, StoreError> {
        self.authorize(project_id, user).await?;

        let steps = self.repository.list_project(project_id).await?;
        Ok(ProjectProgress {
            project_id: project_id.to_string(),
            saved_steps: steps.iter().map(|(step, _)| *step).collect(),
            completed_steps: steps
                .iter()
                .filter(|(_, stored)| stored.completed)
                .map(|(step, _)| *step)
                .collect(),
        })
    }

    /// Membership check shared by every operation
    async fn authorize(
        &self,
        project_id: &str,
        user: &UserId,
    ) -> Result<ProjectMembers, StoreError> {
        let members = self
            .access
            .members(project_id)
            .await?
            .ok_or_else(|| StoreError::UnknownProject(project_id.to_string()))?;

        if !members.is_member(user) {
            tracing::warn!(project = project_id, user = %user, "access denied");
            return Err(StoreError::AccessDenied {
                user: user.clone(),
                project: project_id.to_string(),
            });
        }
        Ok(members)
    }

    /// One read → detect → check → merge → conditional write round
    async fn write_step(
        &self,
        key: &StepKey,
        user: &UserId,
        mut content: Value,
        expected_version: Option<u64>,
        submit: bool,
    ) -> Result<SaveOutcome, StoreError> {
        self.authorize(&key.project_id, user).await?;
        if !content.is_object() {
            return Err(StoreError::InvalidContent(
                "step content must be a JSON object".to_string(),
            ));
        }

        if self.config.strip_client_metadata {
            let removed = strip_reserved_keys(&mut content);
            if !removed.is_empty() {
                tracing::warn!(?removed, "ignoring client-supplied metadata keys");
            }
        }

        let loaded = self.repository.load(key).await?;
        let actual = loaded.as_ref().map(|step| step.version);
        if actual != expected_version {
            tracing::warn!(?actual, "stale write rejected");
            return Err(StoreError::VersionConflict {
                key: key.clone(),
                expected: expected_version,
                actual,
            });
        }

        let (stored, was_completed) = match loaded {
            Some(step) => (step.document, step.completed),
            None => (Value::Object(Map::new()), false),
        };
        let Extracted {
            content: current,
            ownership,
        } = extract_metadata(stored);
        let owners = ownership.clone().unwrap_or_default();

        let claims = self.detector.detect(&current, &content, user);
        tracing::debug!(claims = claims.len(), owned = owners.len(), "detected changes");

        let denials = self.gate.check_claims(&claims, &owners, &current);
        if !denials.is_empty() {
            return Err(self.permission_denied(&denials));
        }

        let completed = was_completed || submit;
        let document = merge_metadata(&content, ownership.as_ref(), &claims);
        let version = self
            .repository
            .save(
                key,
                StepWrite {
                    document,
                    expected_version,
                    completed,
                },
            )
            .await
            .map_err(|err| match err {
                RepositoryError::VersionConflict {
                    key,
                    expected,
                    actual,
                } => {
                    tracing::warn!(?actual, "step changed during save");
                    StoreError::VersionConflict {
                        key,
                        expected,
                        actual,
                    }
                }
                other => StoreError::Repository(other),
            })?;

        tracing::info!(version, claims = claims.len(), completed, "step saved");
        Ok(SaveOutcome {
            version,
            claims,
            completed,
        })
    }

    fn permission_denied(&self, denials: &[Denial]) -> StoreError {
        let first = &denials[0];
        let field = self.labeler.label(&first.path);
        tracing::warn!(
            field = %field,
            path = %first.path,
            owner = %first.owner,
            denied = denials.len(),
            "save rejected: fields owned by other users"
        );
        StoreError::PermissionDenied {
            field,
            path: first.path.clone(),
            owner: first.owner.clone(),
            denied: denials.iter().map(|d| d.path.clone()).collect(),
        }
    }
}
