//! Project membership lookup
//!
//! Document-level gate evaluated before any field-level check: only the
//! project author and declared team members may touch a project's steps.

use crate::error::RepositoryError;
use async_trait::async_trait;
use dashmap::DashMap;
use fieldlock_ownership::UserId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Author and team of one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMembers {
    /// Project creator
    pub author: UserId,
    /// Declared team members
    #[serde(default)]
    pub team: BTreeSet<UserId>,
}

impl ProjectMembers {
    /// Project with only an author
    #[inline]
    #[must_use]
    pub fn new(author: impl Into<UserId>) -> Self {
        Self {
            author: author.into(),
            team: BTreeSet::new(),
        }
    }

    /// Add a team member
    #[inline]
    #[must_use]
    pub fn with_member(mut self, member: impl Into<UserId>) -> Self {
        self.team.insert(member.into());
        self
    }

    /// Author or team member
    #[inline]
    #[must_use]
    pub fn is_member(&self, user: &UserId) -> bool {
        self.is_author(user) || self.team.contains(user)
    }

    /// Project author
    #[inline]
    #[must_use]
    pub fn is_author(&self, user: &UserId) -> bool {
        &self.author == user
    }
}

/// Source of project membership
#[async_trait]
pub trait AccessDirectory: Send + Sync + std::fmt::Debug {
    /// Members of a project, `None` if the project is unknown
    async fn members(&self, project_id: &str) -> Result<Option<ProjectMembers>, RepositoryError>;
}

/// Membership table held in memory
#[derive(Debug, Default)]
pub struct StaticAccessDirectory {
    projects: DashMap<String, ProjectMembers>,
}

impl StaticAccessDirectory {
    /// Create empty directory
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a project's members
    pub fn register(&self, project_id: impl Into<String>, members: ProjectMembers) {
        self.projects.insert(project_id.into(), members);
    }

    /// Forget a project
    pub fn unregister(&self, project_id: &str) -> bool {
        self.projects.remove(project_id).is_some()
    }
}

#[async_trait]
impl AccessDirectory for StaticAccessDirectory {
    async fn members(&self, project_id: &str) -> Result<Option<ProjectMembers>, RepositoryError> {
        Ok(self.projects.get(project_id).map(|m| m.value().clone()))
    }
}
