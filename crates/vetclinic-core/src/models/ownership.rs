//! Ownership ledger entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

text_enum! {
    pub enum OwnershipRole {
        Primary => "PRIMARY",
        Secondary => "SECONDARY",
    }
}

text_enum! {
    pub enum OwnershipStatus {
        Active => "ACTIVE",
        Ended => "ENDED",
    }
}

/// One client's ownership of an animal over a period of time.
///
/// Immutable: ending an ownership produces a new value. Ended entries stay in
/// the animal's ledger as history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ownership {
    client_id: String,
    role: OwnershipRole,
    status: OwnershipStatus,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl Ownership {
    /// A new active ownership starting at `now`.
    pub fn start(client_id: impl Into<String>, role: OwnershipRole, now: DateTime<Utc>) -> Self {
        Self {
            client_id: client_id.into(),
            role,
            status: OwnershipStatus::Active,
            started_at: now,
            ended_at: None,
        }
    }

    /// Rebuild a stored entry as-is.
    pub fn restore(
        client_id: String,
        role: OwnershipRole,
        status: OwnershipStatus,
        started_at: DateTime<Utc>,
        ended_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            client_id,
            role,
            status,
            started_at,
            ended_at,
        }
    }

    /// Copy of this ownership, ended at `now`.
    pub fn ended(&self, now: DateTime<Utc>) -> Self {
        Self {
            status: OwnershipStatus::Ended,
            ended_at: Some(now),
            ..self.clone()
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn role(&self) -> OwnershipRole {
        self.role
    }

    pub fn status(&self) -> OwnershipStatus {
        self.status
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn is_active(&self) -> bool {
        self.status == OwnershipStatus::Active
    }

    pub fn is_active_primary(&self) -> bool {
        self.is_active() && self.role == OwnershipRole::Primary
    }

    pub fn is_active_secondary(&self) -> bool {
        self.is_active() && self.role == OwnershipRole::Secondary
    }

    /// Promotion order: earliest start first, ties broken by client id.
    pub fn promotion_order(a: &Ownership, b: &Ownership) -> Ordering {
        a.started_at
            .cmp(&b.started_at)
            .then_with(|| a.client_id.cmp(&b.client_id))
    }
}
