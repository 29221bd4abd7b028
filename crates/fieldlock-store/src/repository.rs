//! Step persistence
//!
//! [`StepRepository`] is the load/save contract the store runs against.
//! [`InMemoryRepository`] keeps steps in a concurrent map and enforces the
//! version check atomically per step.

use crate::error::RepositoryError;
use crate::types::{StepKey, StepWrite, StoredStep};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Persistence contract for step documents
///
/// # Versioning
/// `save` must reject a write whose `expected_version` differs from the
/// stored version (`None` meaning "no document yet"), and otherwise store the
/// document under the next version. This turns the store's
/// read-modify-write cycle into a compare-and-swap.
#[async_trait]
pub trait StepRepository: Send + Sync + std::fmt::Debug {
    /// Last persisted step, `None` if it was never written
    async fn load(&self, key: &StepKey) -> Result<Option<StoredStep>, RepositoryError>;

    /// Insert or replace a step, returning its new version
    async fn save(&self, key: &StepKey, write: StepWrite) -> Result<u64, RepositoryError>;

    /// Remove a step; `false` if there was none
    async fn delete(&self, key: &StepKey) -> Result<bool, RepositoryError>;

    /// Every stored step of a project, ordered by step number
    async fn list_project(&self, project_id: &str)
        -> Result<Vec<(u32, StoredStep)>, RepositoryError>;
}

/// In-process repository backed by a concurrent map
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    steps: DashMap<StepKey, StoredStep>,
}

impl InMemoryRepository {
    /// Create empty repository
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored steps
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if nothing is stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[async_trait]
impl StepRepository for InMemoryRepository {
    async fn load(&self, key: &StepKey) -> Result<Option<StoredStep>, RepositoryError> {
        Ok(self.steps.get(key).map(|step| step.value().clone()))
    }

    async fn save(&self, key: &StepKey, write: StepWrite) -> Result<u64, RepositoryError> {
        let StepWrite {
            document,
            expected_version,
            completed,
        } = write;

        match self.steps.entry(key.clone()) {
            Entry::Occupied(mut slot) => {
                let actual = slot.get().version;
                if expected_version != Some(actual) {
                    return Err(RepositoryError::VersionConflict {
                        key: key.clone(),
                        expected: expected_version,
                        actual: Some(actual),
                    });
                }
                let version = actual + 1;
                *slot.get_mut() = StoredStep {
                    document,
                    version,
                    completed,
                    updated_at: Utc::now(),
                };
                Ok(version)
            }
            Entry::Vacant(slot) => {
                if expected_version.is_some() {
                    return Err(RepositoryError::VersionConflict {
                        key: key.clone(),
                        expected: expected_version,
                        actual: None,
                    });
                }
                slot.insert(StoredStep {
                    document,
                    version: 1,
                    completed,
                    updated_at: Utc::now(),
                });
                Ok(1)
            }
        }
    }

    async fn delete(&self, key: &StepKey) -> Result<bool, RepositoryError> {
        Ok(self.steps.remove(key).is_some())
    }

    async fn list_project(
        &self,
        project_id: &str,
    ) -> Result<Vec<(u32, StoredStep)>, RepositoryError> {
        let mut steps: Vec<(u32, StoredStep)> = self
            .steps
            .iter()
            .filter(|entry| entry.key().project_id == project_id)
            .map(|entry| (entry.key().step, entry.value().clone()))
            .collect();
        steps.sort_by_key(|(step, _)| *step);
        Ok(steps)
    }
}
