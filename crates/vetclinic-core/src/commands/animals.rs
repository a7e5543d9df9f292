//! Animal command handlers.

use tracing::{info, warn};

use super::{ClinicCommands, CommandError, CommandResult};
use crate::clock::Clock;
use crate::models::{
    Animal, AnimalIdentity, AuxiliaryContact, Identification, LifeCycle, NewAnimal, Transfer,
};

/// Register a new animal in a clinic.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateAnimal {
    pub clinic_id: String,
    pub identity: AnimalIdentity,
    pub identification: Identification,
    pub life_cycle: LifeCycle,
    pub transfer: Transfer,
    pub auxiliary_contact: Option<AuxiliaryContact>,
    pub primary_owner_client_id: String,
    pub secondary_owner_client_ids: Vec<String>,
}

impl<'a, C: Clock> ClinicCommands<'a, C> {
    /// Create an animal owned by existing clients of the clinic.
    pub fn create_animal(&self, command: CreateAnimal) -> CommandResult<Animal> {
        if let Some(microchip) = command.identification.microchip() {
            if self.db.exists_by_microchip(&command.clinic_id, microchip, None)? {
                return Err(CommandError::MicrochipAlreadyUsed(microchip.to_string()));
            }
        }
        self.ensure_active_client(&command.clinic_id, &command.primary_owner_client_id)?;
        for client_id in &command.secondary_owner_client_ids {
            self.ensure_active_client(&command.clinic_id, client_id)?;
        }

        let mut animal = Animal::create(
            NewAnimal {
                id: uuid::Uuid::new_v4().to_string(),
                clinic_id: command.clinic_id,
                identity: command.identity,
                identification: command.identification,
                life_cycle: command.life_cycle,
                transfer: command.transfer,
                auxiliary_contact: command.auxiliary_contact,
                primary_owner_client_id: command.primary_owner_client_id,
                secondary_owner_client_ids: command.secondary_owner_client_ids,
            },
            self.clock.now(),
        )?;
        animal.ensure_invariants()?;
        self.commit_animal(&mut animal)?;

        info!(
            animal_id = %animal.id(),
            clinic_id = %animal.clinic_id(),
            "animal created"
        );
        Ok(animal)
    }

    /// Replace descriptive identity, identification numbers and auxiliary contact.
    pub fn update_identity(
        &self,
        clinic_id: &str,
        animal_id: &str,
        identity: AnimalIdentity,
        identification: Identification,
        auxiliary_contact: Option<AuxiliaryContact>,
    ) -> CommandResult<Animal> {
        if let Some(microchip) = identification.microchip() {
            if self
                .db
                .exists_by_microchip(clinic_id, microchip, Some(animal_id))?
            {
                return Err(CommandError::MicrochipAlreadyUsed(microchip.to_string()));
            }
        }

        let mut animal = self.db.get_animal(clinic_id, animal_id)?;
        animal
            .update_identity(identity, identification, auxiliary_contact, self.clock.now())
            .inspect_err(|e| warn!(animal_id, error = %e, "identity update rejected"))?;
        self.commit_animal(&mut animal)?;

        info!(animal_id, clinic_id, "animal identity updated");
        Ok(animal)
    }

    pub fn update_life_cycle(
        &self,
        clinic_id: &str,
        animal_id: &str,
        life_cycle: LifeCycle,
    ) -> CommandResult<Animal> {
        let mut animal = self.db.get_animal(clinic_id, animal_id)?;
        animal
            .update_life_cycle(life_cycle, self.clock.now())
            .inspect_err(|e| warn!(animal_id, error = %e, "life cycle update rejected"))?;
        self.commit_animal(&mut animal)?;

        info!(
            animal_id,
            clinic_id,
            life_status = %animal.life_cycle().life_status,
            "animal life cycle updated"
        );
        Ok(animal)
    }

    pub fn update_transfer(
        &self,
        clinic_id: &str,
        animal_id: &str,
        transfer: Transfer,
    ) -> CommandResult<Animal> {
        let mut animal = self.db.get_animal(clinic_id, animal_id)?;
        animal
            .update_transfer(transfer, self.clock.now())
            .inspect_err(|e| warn!(animal_id, error = %e, "transfer update rejected"))?;
        self.commit_animal(&mut animal)?;

        info!(
            animal_id,
            clinic_id,
            transfer_status = %animal.transfer().transfer_status,
            "animal transfer updated"
        );
        Ok(animal)
    }

    /// Replace the whole owner set. Nothing is saved unless every invariant
    /// holds afterwards.
    pub fn replace_owners(
        &self,
        clinic_id: &str,
        animal_id: &str,
        primary_owner_client_id: &str,
        secondary_owner_client_ids: &[String],
    ) -> CommandResult<Animal> {
        self.ensure_active_client(clinic_id, primary_owner_client_id)?;
        for client_id in secondary_owner_client_ids {
            self.ensure_active_client(clinic_id, client_id)?;
        }

        let mut animal = self.db.get_animal(clinic_id, animal_id)?;
        animal
            .replace_owners(
                primary_owner_client_id,
                secondary_owner_client_ids,
                self.clock.now(),
            )
            .and_then(|()| animal.ensure_invariants())
            .inspect_err(|e| warn!(animal_id, error = %e, "owner replacement rejected"))?;
        self.commit_animal(&mut animal)?;

        info!(
            animal_id,
            clinic_id,
            primary_owner = primary_owner_client_id,
            secondary_owners = secondary_owner_client_ids.len(),
            "animal owners replaced"
        );
        Ok(animal)
    }

    pub fn archive_animal(&self, clinic_id: &str, animal_id: &str) -> CommandResult<Animal> {
        let mut animal = self.db.get_animal(clinic_id, animal_id)?;
        animal
            .archive(self.clock.now())
            .inspect_err(|e| warn!(animal_id, error = %e, "archive rejected"))?;
        self.commit_animal(&mut animal)?;

        info!(animal_id, clinic_id, "animal archived");
        Ok(animal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::db::{Database, DbError};
    use crate::models::{
        AnimalError, Client, LifeStatus, ReproductiveStatus, Sex, Species,
    };
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    fn setup() -> (Database, FixedClock) {
        let db = Database::open_in_memory().unwrap();
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap());
        for id in ["A", "B", "C"] {
            let client = Client::register(
                id.into(),
                "clinic-1".into(),
                "First".into(),
                format!("Client {}", id),
                clock.now(),
            );
            db.insert_client(&client).unwrap();
        }
        (db, clock)
    }

    fn create_command(microchip: Option<&str>) -> CreateAnimal {
        CreateAnimal {
            clinic_id: "clinic-1".into(),
            identity: AnimalIdentity::new(
                "Mia",
                Species::Cat,
                Sex::Female,
                ReproductiveStatus::Neutered,
            ),
            identification: Identification {
                microchip_number: microchip.map(String::from),
                ..Identification::default()
            },
            life_cycle: LifeCycle::alive(),
            transfer: Transfer::none(),
            auxiliary_contact: None,
            primary_owner_client_id: "A".into(),
            secondary_owner_client_ids: vec!["B".into()],
        }
    }

    #[test]
    fn test_create_animal_persists_and_records_event() {
        let (db, clock) = setup();
        let commands = ClinicCommands::new(&db, &clock);

        let animal = commands.create_animal(create_command(None)).unwrap();

        let stored = db.get_animal("clinic-1", animal.id()).unwrap();
        assert_eq!(stored, animal);
        assert!(animal.recorded_domain_events().is_empty());

        let events = db.list_events(0).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event.event_type(), "AnimalCreated");
        assert_eq!(events[0].event.aggregate_id(), animal.id());
    }

    #[test]
    fn test_outbox_failure_stores_nothing() {
        let (db, clock) = setup();
        let commands = ClinicCommands::new(&db, &clock);
        let kept = commands.create_animal(create_command(None)).unwrap();

        db.conn()
            .execute_batch(
                "CREATE TRIGGER reject_events BEFORE INSERT ON domain_events
                 BEGIN SELECT RAISE(ABORT, 'outbox unavailable'); END;",
            )
            .unwrap();

        assert!(matches!(
            commands.create_animal(create_command(None)),
            Err(CommandError::Database(_))
        ));
        assert!(matches!(
            commands.archive_animal("clinic-1", kept.id()),
            Err(CommandError::Database(_))
        ));

        let animals = db.list_animals("clinic-1").unwrap();
        assert_eq!(animals, vec![kept]);
        assert_eq!(db.list_events(0).unwrap().len(), 1);
    }

    #[test]
    fn test_create_animal_rejects_duplicate_microchip() {
        let (db, clock) = setup();
        let commands = ClinicCommands::new(&db, &clock);

        commands.create_animal(create_command(Some("250268500000001"))).unwrap();
        let result = commands.create_animal(create_command(Some("250268500000001")));

        assert!(matches!(
            result,
            Err(CommandError::MicrochipAlreadyUsed(m)) if m == "250268500000001"
        ));
        assert_eq!(db.list_animals("clinic-1").unwrap().len(), 1);
    }

    #[test]
    fn test_create_animal_rejects_unknown_owner() {
        let (db, clock) = setup();
        let commands = ClinicCommands::new(&db, &clock);

        let mut command = create_command(None);
        command.secondary_owner_client_ids = vec!["Z".into()];

        assert!(matches!(
            commands.create_animal(command),
            Err(CommandError::UnknownClient(id)) if id == "Z"
        ));
    }

    #[test]
    fn test_create_animal_rejects_primary_listed_as_secondary() {
        let (db, clock) = setup();
        let commands = ClinicCommands::new(&db, &clock);

        let mut command = create_command(None);
        command.secondary_owner_client_ids = vec!["A".into()];

        assert!(matches!(
            commands.create_animal(command),
            Err(CommandError::Animal(AnimalError::PrimaryOwnerConflict { .. }))
        ));
        assert!(db.list_animals("clinic-1").unwrap().is_empty());
    }

    #[test]
    fn test_update_identity_allows_own_microchip() {
        let (db, clock) = setup();
        let commands = ClinicCommands::new(&db, &clock);
        let animal = commands.create_animal(create_command(Some("250268500000001"))).unwrap();

        clock.advance(Duration::hours(2));
        let mut identity = animal.identity().clone();
        identity.color = Some("Tabby".into());
        let updated = commands
            .update_identity(
                "clinic-1",
                animal.id(),
                identity,
                animal.identification().clone(),
                None,
            )
            .unwrap();

        assert_eq!(updated.identity().color.as_deref(), Some("Tabby"));
        assert_eq!(updated.updated_at(), clock.now());
    }

    #[test]
    fn test_update_identity_rejects_microchip_of_other_animal() {
        let (db, clock) = setup();
        let commands = ClinicCommands::new(&db, &clock);
        commands.create_animal(create_command(Some("111"))).unwrap();
        let other = commands.create_animal(create_command(None)).unwrap();

        let result = commands.update_identity(
            "clinic-1",
            other.id(),
            other.identity().clone(),
            Identification::with_microchip("111"),
            None,
        );
        assert!(matches!(result, Err(CommandError::MicrochipAlreadyUsed(_))));
    }

    #[test]
    fn test_update_life_cycle_and_transfer() {
        let (db, clock) = setup();
        let commands = ClinicCommands::new(&db, &clock);
        let animal = commands.create_animal(create_command(None)).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        commands
            .update_life_cycle("clinic-1", animal.id(), LifeCycle::deceased(day))
            .unwrap();
        commands
            .update_transfer("clinic-1", animal.id(), Transfer::sold(day))
            .unwrap();

        let stored = db.get_animal("clinic-1", animal.id()).unwrap();
        assert_eq!(stored.life_cycle().life_status, LifeStatus::Deceased);
        assert_eq!(stored.transfer(), &Transfer::sold(day));
    }

    #[test]
    fn test_replace_owners_with_duplicate_secondaries_is_not_saved() {
        let (db, clock) = setup();
        let commands = ClinicCommands::new(&db, &clock);
        let animal = commands.create_animal(create_command(None)).unwrap();

        clock.advance(Duration::days(1));
        let result = commands.replace_owners(
            "clinic-1",
            animal.id(),
            "A",
            &["C".to_string(), "C".to_string()],
        );

        assert!(matches!(
            result,
            Err(CommandError::Animal(AnimalError::PrimaryOwnerConflict { client_id, .. }))
                if client_id == "C"
        ));
        assert_eq!(db.get_animal("clinic-1", animal.id()).unwrap(), animal);
    }

    #[test]
    fn test_replace_owners() {
        let (db, clock) = setup();
        let commands = ClinicCommands::new(&db, &clock);
        let animal = commands.create_animal(create_command(None)).unwrap();

        clock.advance(Duration::days(1));
        let updated = commands
            .replace_owners("clinic-1", animal.id(), "C", &["A".to_string()])
            .unwrap();

        assert_eq!(updated.primary_owner().map(|o| o.client_id()), Some("C"));
        assert_eq!(updated.ownerships().len(), 4);
        assert_eq!(db.get_animal("clinic-1", animal.id()).unwrap(), updated);
    }

    #[test]
    fn test_archive_animal_twice() {
        let (db, clock) = setup();
        let commands = ClinicCommands::new(&db, &clock);
        let animal = commands.create_animal(create_command(None)).unwrap();

        commands.archive_animal("clinic-1", animal.id()).unwrap();
        assert!(matches!(
            commands.archive_animal("clinic-1", animal.id()),
            Err(CommandError::Animal(AnimalError::AlreadyArchived { .. }))
        ));
        assert!(matches!(
            commands.update_life_cycle("clinic-1", animal.id(), LifeCycle::alive()),
            Err(CommandError::Animal(AnimalError::ArchivedCannotBeModified { .. }))
        ));

        let events = db.list_events(0).unwrap();
        let types: Vec<&str> = events.iter().map(|e| e.event.event_type()).collect();
        assert_eq!(types, vec!["AnimalCreated", "AnimalArchived"]);
    }

    #[test]
    fn test_unknown_animal() {
        let (db, clock) = setup();
        let commands = ClinicCommands::new(&db, &clock);

        assert!(matches!(
            commands.archive_animal("clinic-1", "nope"),
            Err(CommandError::Database(DbError::NotFound(_)))
        ));
    }
}
