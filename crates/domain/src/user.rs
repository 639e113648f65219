use std::collections::BTreeSet;

use assetflow_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::capability::Capability;
use crate::role::Role;

/// A user account as seen by the authorization engine.
///
/// The stored permission set is what persistence last saved for the account;
/// policy checks re-filter it on every evaluation, so stale or tampered
/// grants never widen access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    subject: NonEmptyString,
    role: Role,
    permissions: BTreeSet<Capability>,
}

impl User {
    /// Creates a user from a subject, a role, and a stored permission set.
    pub fn new(
        subject: impl Into<String>,
        role: Role,
        permissions: impl IntoIterator<Item = Capability>,
    ) -> AppResult<Self> {
        Ok(Self {
            subject: NonEmptyString::new(subject)?,
            role,
            permissions: permissions.into_iter().collect(),
        })
    }

    /// Returns the stable subject identifying the account.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the account role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the stored permission set.
    #[must_use]
    pub fn permissions(&self) -> &BTreeSet<Capability> {
        &self.permissions
    }
}
