//! Domain events recorded by aggregates and drained by the command layer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnimalCreated {
    pub animal_id: String,
    pub clinic_id: String,
    pub name: String,
    pub primary_owner_client_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnimalArchived {
    pub animal_id: String,
    pub clinic_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientArchived {
    pub client_id: String,
    pub clinic_id: String,
}

/// Every event the core can emit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum DomainEvent {
    AnimalCreated(AnimalCreated),
    AnimalArchived(AnimalArchived),
    ClientArchived(ClientArchived),
}

impl DomainEvent {
    /// Stable event name, stored alongside the payload.
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::AnimalCreated(_) => "AnimalCreated",
            DomainEvent::AnimalArchived(_) => "AnimalArchived",
            DomainEvent::ClientArchived(_) => "ClientArchived",
        }
    }

    /// Id of the aggregate that recorded the event.
    pub fn aggregate_id(&self) -> &str {
        match self {
            DomainEvent::AnimalCreated(e) => &e.animal_id,
            DomainEvent::AnimalArchived(e) => &e.animal_id,
            DomainEvent::ClientArchived(e) => &e.client_id,
        }
    }

    pub fn clinic_id(&self) -> &str {
        match self {
            DomainEvent::AnimalCreated(e) => &e.clinic_id,
            DomainEvent::AnimalArchived(e) => &e.clinic_id,
            DomainEvent::ClientArchived(e) => &e.clinic_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_is_tagged() {
        let event = DomainEvent::AnimalArchived(AnimalArchived {
            animal_id: "animal-1".into(),
            clinic_id: "clinic-1".into(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "AnimalArchived");
        assert_eq!(json["animal_id"], "animal-1");

        let back: DomainEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.aggregate_id(), "animal-1");
    }
}
