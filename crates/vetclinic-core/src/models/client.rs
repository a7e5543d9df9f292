//! Client (animal owner) records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ClientArchived, DomainEvent};

text_enum! {
    pub enum ClientStatus {
        Active => "ACTIVE",
        Archived => "ARCHIVED",
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Client {client_id} is already archived")]
    AlreadyArchived { client_id: String },
}

/// A client of one clinic. Only what ownership resolution needs is kept here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: String,
    pub clinic_id: String,
    pub first_name: String,
    pub last_name: String,
    pub status: ClientStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    recorded_events: Vec<DomainEvent>,
}

impl Client {
    /// Register a new active client.
    pub fn register(
        id: String,
        clinic_id: String,
        first_name: String,
        last_name: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            clinic_id,
            first_name,
            last_name,
            status: ClientStatus::Active,
            created_at: now,
            updated_at: now,
            recorded_events: Vec::new(),
        }
    }

    /// Rebuild from storage.
    pub fn reconstitute(
        id: String,
        clinic_id: String,
        first_name: String,
        last_name: String,
        status: ClientStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            clinic_id,
            first_name,
            last_name,
            status,
            created_at,
            updated_at,
            recorded_events: Vec::new(),
        }
    }

    pub fn is_archived(&self) -> bool {
        self.status == ClientStatus::Archived
    }

    /// Archive the client, recording `ClientArchived` for ownership resolution.
    pub fn archive(&mut self, now: DateTime<Utc>) -> Result<(), ClientError> {
        if self.is_archived() {
            return Err(ClientError::AlreadyArchived {
                client_id: self.id.clone(),
            });
        }
        self.status = ClientStatus::Archived;
        self.updated_at = now;
        self.recorded_events
            .push(DomainEvent::ClientArchived(ClientArchived {
                client_id: self.id.clone(),
                clinic_id: self.clinic_id.clone(),
            }));
        Ok(())
    }

    pub fn pull_domain_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.recorded_events)
    }

    /// Display name, "Last First".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }
}
