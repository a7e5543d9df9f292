//! Animal aggregate: identity, clinical state and the ownership ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{
    AnimalArchived, AnimalCreated, AnimalError, AnimalIdentity, AuxiliaryContact, DomainEvent,
    Identification, LifeCycle, Ownership, OwnershipRole, Transfer,
};

text_enum! {
    pub enum AnimalStatus {
        Active => "ACTIVE",
        Archived => "ARCHIVED",
    }
}

/// Everything needed to register a new animal.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnimal {
    pub id: String,
    pub clinic_id: String,
    pub identity: AnimalIdentity,
    pub identification: Identification,
    pub life_cycle: LifeCycle,
    pub transfer: Transfer,
    pub auxiliary_contact: Option<AuxiliaryContact>,
    pub primary_owner_client_id: String,
    pub secondary_owner_client_ids: Vec<String>,
}

/// Stored state of an animal, used to rebuild the aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimalSnapshot {
    pub id: String,
    pub clinic_id: String,
    pub identity: AnimalIdentity,
    pub identification: Identification,
    pub life_cycle: LifeCycle,
    pub transfer: Transfer,
    pub auxiliary_contact: Option<AuxiliaryContact>,
    pub status: AnimalStatus,
    pub ownerships: Vec<Ownership>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An animal belonging to one clinic.
///
/// While active, exactly one ownership is active and primary, and no client
/// holds two active ownerships. Mutations take `now` explicitly; nothing here
/// reads a clock or touches storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Animal {
    id: String,
    clinic_id: String,
    identity: AnimalIdentity,
    identification: Identification,
    life_cycle: LifeCycle,
    transfer: Transfer,
    auxiliary_contact: Option<AuxiliaryContact>,
    status: AnimalStatus,
    ownerships: Vec<Ownership>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    recorded_events: Vec<DomainEvent>,
}

impl Animal {
    /// Register a new animal with one primary owner and any number of
    /// secondary owners, all starting at `now`.
    ///
    /// Secondary owners are not checked against the primary here.
    pub fn create(new: NewAnimal, now: DateTime<Utc>) -> Result<Self, AnimalError> {
        new.identification.ensure_consistency()?;
        new.life_cycle.ensure_consistency()?;
        new.transfer.ensure_consistency()?;

        let mut ownerships = Vec::with_capacity(1 + new.secondary_owner_client_ids.len());
        ownerships.push(Ownership::start(
            new.primary_owner_client_id.clone(),
            OwnershipRole::Primary,
            now,
        ));
        ownerships.extend(
            new.secondary_owner_client_ids
                .into_iter()
                .map(|client_id| Ownership::start(client_id, OwnershipRole::Secondary, now)),
        );

        let mut animal = Self {
            id: new.id,
            clinic_id: new.clinic_id,
            identity: new.identity,
            identification: new.identification,
            life_cycle: new.life_cycle,
            transfer: new.transfer,
            auxiliary_contact: new.auxiliary_contact,
            status: AnimalStatus::Active,
            ownerships,
            created_at: now,
            updated_at: now,
            recorded_events: Vec::new(),
        };

        animal.record(DomainEvent::AnimalCreated(AnimalCreated {
            animal_id: animal.id.clone(),
            clinic_id: animal.clinic_id.clone(),
            name: animal.identity.name.clone(),
            primary_owner_client_id: new.primary_owner_client_id,
        }));

        Ok(animal)
    }

    /// Rebuild from storage. No validation, no events.
    pub fn reconstitute(snapshot: AnimalSnapshot) -> Self {
        Self {
            id: snapshot.id,
            clinic_id: snapshot.clinic_id,
            identity: snapshot.identity,
            identification: snapshot.identification,
            life_cycle: snapshot.life_cycle,
            transfer: snapshot.transfer,
            auxiliary_contact: snapshot.auxiliary_contact,
            status: snapshot.status,
            ownerships: snapshot.ownerships,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
            recorded_events: Vec::new(),
        }
    }

    /// Current state, without the event buffer.
    pub fn snapshot(&self) -> AnimalSnapshot {
        AnimalSnapshot {
            id: self.id.clone(),
            clinic_id: self.clinic_id.clone(),
            identity: self.identity.clone(),
            identification: self.identification.clone(),
            life_cycle: self.life_cycle.clone(),
            transfer: self.transfer.clone(),
            auxiliary_contact: self.auxiliary_contact.clone(),
            status: self.status,
            ownerships: self.ownerships.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    // =========================================================================
    // Identity / clinical mutators
    // =========================================================================

    pub fn update_identity(
        &mut self,
        identity: AnimalIdentity,
        identification: Identification,
        auxiliary_contact: Option<AuxiliaryContact>,
        now: DateTime<Utc>,
    ) -> Result<(), AnimalError> {
        self.ensure_modifiable()?;
        identification.ensure_consistency()?;

        self.identity = identity;
        self.identification = identification;
        self.auxiliary_contact = auxiliary_contact;
        self.updated_at = now;
        Ok(())
    }

    pub fn update_life_cycle(
        &mut self,
        life_cycle: LifeCycle,
        now: DateTime<Utc>,
    ) -> Result<(), AnimalError> {
        self.ensure_modifiable()?;
        life_cycle.ensure_consistency()?;

        self.life_cycle = life_cycle;
        self.updated_at = now;
        Ok(())
    }

    pub fn update_transfer(
        &mut self,
        transfer: Transfer,
        now: DateTime<Utc>,
    ) -> Result<(), AnimalError> {
        self.ensure_modifiable()?;
        transfer.ensure_consistency()?;

        self.transfer = transfer;
        self.updated_at = now;
        Ok(())
    }

    // =========================================================================
    // Ownership
    // =========================================================================

    /// End every active ownership and start a new owner set at `now`.
    ///
    /// A secondary equal to the primary is rejected before anything changes.
    /// Duplicates inside `secondary_owner_client_ids` are kept as given; they
    /// surface through [`Self::ensure_invariants`].
    pub fn replace_owners<S: AsRef<str>>(
        &mut self,
        primary_owner_client_id: &str,
        secondary_owner_client_ids: &[S],
        now: DateTime<Utc>,
    ) -> Result<(), AnimalError> {
        self.ensure_modifiable()?;

        if let Some(duplicate) = secondary_owner_client_ids
            .iter()
            .map(AsRef::<str>::as_ref)
            .find(|client_id| *client_id == primary_owner_client_id)
        {
            return Err(AnimalError::DuplicateActiveOwner {
                animal_id: self.id.clone(),
                client_id: duplicate.to_string(),
            });
        }

        for ownership in self.ownerships.iter_mut().filter(|o| o.is_active()) {
            *ownership = ownership.ended(now);
        }

        self.ownerships.push(Ownership::start(
            primary_owner_client_id,
            OwnershipRole::Primary,
            now,
        ));
        self.ownerships.extend(secondary_owner_client_ids.iter().map(|client_id| {
            Ownership::start(
                AsRef::<str>::as_ref(client_id),
                OwnershipRole::Secondary,
                now,
            )
        }));

        self.updated_at = now;
        Ok(())
    }

    /// React to a client being archived elsewhere.
    ///
    /// - not an active owner: no-op (also covers redelivery)
    /// - secondary: that ownership ends
    /// - primary with secondaries left: the earliest-started secondary (ties
    ///   by client id) gets a fresh primary ownership
    /// - primary alone: the animal is archived
    pub fn resolve_ownership_for_archived_client(
        &mut self,
        archived_client_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AnimalError> {
        let Some(index) = self
            .ownerships
            .iter()
            .position(|o| o.is_active() && o.client_id() == archived_client_id)
        else {
            return Ok(());
        };
        self.ensure_modifiable()?;

        match self.ownerships[index].role() {
            OwnershipRole::Secondary => {
                self.ownerships[index] = self.ownerships[index].ended(now);
                self.updated_at = now;
            }
            OwnershipRole::Primary => {
                let successor = self
                    .ownerships
                    .iter()
                    .filter(|o| o.is_active_secondary() && o.client_id() != archived_client_id)
                    .min_by(|a, b| Ownership::promotion_order(a, b))
                    .map(|o| o.client_id().to_string());

                self.ownerships[index] = self.ownerships[index].ended(now);

                match successor {
                    None => {
                        self.status = AnimalStatus::Archived;
                        self.updated_at = now;
                        self.record_archived();
                    }
                    Some(successor_id) => {
                        if let Some(position) = self
                            .ownerships
                            .iter()
                            .position(|o| o.is_active() && o.client_id() == successor_id)
                        {
                            self.ownerships[position] = self.ownerships[position].ended(now);
                        }
                        self.ownerships.push(Ownership::start(
                            successor_id,
                            OwnershipRole::Primary,
                            now,
                        ));
                        self.updated_at = now;
                    }
                }
            }
        }

        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Archive the animal. Ownerships are left as they are.
    pub fn archive(&mut self, now: DateTime<Utc>) -> Result<(), AnimalError> {
        if self.is_archived() {
            return Err(AnimalError::AlreadyArchived {
                animal_id: self.id.clone(),
            });
        }

        self.status = AnimalStatus::Archived;
        self.updated_at = now;
        self.record_archived();
        Ok(())
    }

    /// Check every invariant without mutating anything.
    pub fn ensure_invariants(&self) -> Result<(), AnimalError> {
        self.identification.ensure_consistency()?;
        self.life_cycle.ensure_consistency()?;
        self.transfer.ensure_consistency()?;

        if self.status != AnimalStatus::Active {
            return Ok(());
        }

        let primaries = self
            .ownerships
            .iter()
            .filter(|o| o.is_active_primary())
            .count();
        if primaries != 1 {
            return Err(AnimalError::MustHavePrimaryOwner {
                animal_id: self.id.clone(),
            });
        }

        let mut seen = HashSet::new();
        for ownership in self.active_ownerships() {
            if !seen.insert(ownership.client_id()) {
                return Err(AnimalError::PrimaryOwnerConflict {
                    animal_id: self.id.clone(),
                    client_id: ownership.client_id().to_string(),
                });
            }
        }

        Ok(())
    }

    // =========================================================================
    // Domain events
    // =========================================================================

    /// Drain recorded events. A second call returns nothing.
    pub fn pull_domain_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.recorded_events)
    }

    /// Peek at recorded events without draining them.
    pub fn recorded_domain_events(&self) -> &[DomainEvent] {
        &self.recorded_events
    }

    fn record(&mut self, event: DomainEvent) {
        self.recorded_events.push(event);
    }

    fn record_archived(&mut self) {
        self.record(DomainEvent::AnimalArchived(AnimalArchived {
            animal_id: self.id.clone(),
            clinic_id: self.clinic_id.clone(),
        }));
    }

    fn ensure_modifiable(&self) -> Result<(), AnimalError> {
        if self.is_archived() {
            return Err(AnimalError::ArchivedCannotBeModified {
                animal_id: self.id.clone(),
            });
        }
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn clinic_id(&self) -> &str {
        &self.clinic_id
    }

    pub fn identity(&self) -> &AnimalIdentity {
        &self.identity
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn identification(&self) -> &Identification {
        &self.identification
    }

    pub fn life_cycle(&self) -> &LifeCycle {
        &self.life_cycle
    }

    pub fn transfer(&self) -> &Transfer {
        &self.transfer
    }

    pub fn auxiliary_contact(&self) -> Option<&AuxiliaryContact> {
        self.auxiliary_contact.as_ref()
    }

    pub fn status(&self) -> AnimalStatus {
        self.status
    }

    pub fn is_archived(&self) -> bool {
        self.status == AnimalStatus::Archived
    }

    /// Full ledger in insertion order, ended entries included.
    pub fn ownerships(&self) -> &[Ownership] {
        &self.ownerships
    }

    pub fn active_ownerships(&self) -> impl Iterator<Item = &Ownership> {
        self.ownerships.iter().filter(|o| o.is_active())
    }

    pub fn primary_owner(&self) -> Option<&Ownership> {
        self.ownerships.iter().find(|o| o.is_active_primary())
    }

    pub fn secondary_owners(&self) -> impl Iterator<Item = &Ownership> {
        self.ownerships.iter().filter(|o| o.is_active_secondary())
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
