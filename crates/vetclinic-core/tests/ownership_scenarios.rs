//! Ownership lifecycle scenarios, run against the aggregate and through the
//! command layer backed by SQLite.

use chrono::{DateTime, Duration, TimeZone, Utc};
use vetclinic_core::clock::FixedClock;
use vetclinic_core::commands::{ClinicCommands, CreateAnimal};
use vetclinic_core::db::Database;
use vetclinic_core::models::{
    Animal, AnimalError, AnimalIdentity, DomainEvent, Identification, LifeCycle, NewAnimal,
    OwnershipRole, OwnershipStatus, ReproductiveStatus, Sex, Species, Transfer,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
}

fn identity() -> AnimalIdentity {
    AnimalIdentity::new("Biscuit", Species::Cat, Sex::Male, ReproductiveStatus::Neutered)
}

fn make_animal(primary: &str, secondaries: &[&str], now: DateTime<Utc>) -> Animal {
    Animal::create(
        NewAnimal {
            id: "animal-1".to_string(),
            clinic_id: "clinic-1".to_string(),
            identity: identity(),
            identification: Identification::default(),
            life_cycle: LifeCycle::alive(),
            transfer: Transfer::none(),
            auxiliary_contact: None,
            primary_owner_client_id: primary.to_string(),
            secondary_owner_client_ids: secondaries.iter().map(|s| s.to_string()).collect(),
        },
        now,
    )
    .unwrap()
}

fn active_roles(animal: &Animal) -> Vec<(String, OwnershipRole)> {
    animal
        .active_ownerships()
        .map(|o| (o.client_id().to_string(), o.role()))
        .collect()
}

#[test]
fn test_secondary_promoted_when_primary_archived() {
    let t1 = t0() + Duration::days(30);
    let mut animal = make_animal("A", &["B"], t0());

    animal.resolve_ownership_for_archived_client("A", t1).unwrap();

    assert!(!animal.is_archived());
    assert_eq!(active_roles(&animal), vec![("B".to_string(), OwnershipRole::Primary)]);

    let a = &animal.ownerships()[0];
    assert_eq!(a.client_id(), "A");
    assert_eq!(a.status(), OwnershipStatus::Ended);
    assert_eq!(a.ended_at(), Some(t1));

    let promoted = animal.primary_owner().unwrap();
    assert_eq!(promoted.started_at(), t1);
    animal.ensure_invariants().unwrap();
}

#[test]
fn test_sole_primary_archived_archives_animal() {
    let t1 = t0() + Duration::days(1);
    let mut animal = make_animal("A", &[], t0());

    animal.resolve_ownership_for_archived_client("A", t1).unwrap();

    assert!(animal.is_archived());
    assert_eq!(animal.ownerships()[0].ended_at(), Some(t1));
    assert_eq!(animal.active_ownerships().count(), 0);

    let events = animal.pull_domain_events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], DomainEvent::AnimalCreated(_)));
    assert!(matches!(events[1], DomainEvent::AnimalArchived(_)));
    animal.ensure_invariants().unwrap();
}

#[test]
fn test_tie_on_start_promotes_smaller_client_id() {
    let t1 = t0() + Duration::days(1);
    for secondaries in [["B", "C"], ["C", "B"]] {
        let mut animal = make_animal("A", &[], t0() - Duration::days(10));
        animal.replace_owners("A", &secondaries, t0()).unwrap();

        animal.resolve_ownership_for_archived_client("A", t1).unwrap();

        assert_eq!(animal.primary_owner().map(|o| o.client_id()), Some("B"));
        assert_eq!(
            animal.secondary_owners().map(|o| o.client_id()).collect::<Vec<_>>(),
            vec!["C"]
        );
    }
}

#[test]
fn test_replace_owners_rejects_primary_as_secondary() {
    let mut animal = make_animal("A", &[], t0());
    let before = animal.clone();

    let err = animal.replace_owners("X", &["X"], t0() + Duration::hours(1)).unwrap_err();
    assert_eq!(
        err,
        AnimalError::DuplicateActiveOwner {
            animal_id: "animal-1".to_string(),
            client_id: "X".to_string(),
        }
    );
    assert_eq!(animal, before);
}

#[test]
fn test_archived_animal_rejects_identity_update() {
    let mut animal = make_animal("A", &[], t0());
    animal.archive(t0() + Duration::hours(1)).unwrap();

    let err = animal
        .update_identity(identity(), Identification::default(), None, t0() + Duration::hours(2))
        .unwrap_err();
    assert!(matches!(err, AnimalError::ArchivedCannotBeModified { .. }));
    assert!(matches!(
        animal.archive(t0() + Duration::hours(3)),
        Err(AnimalError::AlreadyArchived { .. })
    ));
}

#[test]
fn test_unknown_client_resolution_is_noop() {
    let mut animal = make_animal("A", &["B"], t0());
    let before = animal.clone();

    animal
        .resolve_ownership_for_archived_client("unknown-client", t0() + Duration::days(1))
        .unwrap();

    assert_eq!(animal, before);
    assert_eq!(animal.recorded_domain_events().len(), 1);
}

#[test]
fn test_archiving_clients_through_commands() {
    let db = Database::open_in_memory().unwrap();
    let clock = FixedClock::new(t0());
    let commands = ClinicCommands::new(&db, &clock);

    let anna = commands.register_client("clinic-1", "Anna", "Moreau").unwrap();
    let ben = commands.register_client("clinic-1", "Ben", "Roux").unwrap();
    let chloe = commands.register_client("clinic-1", "Chloe", "Petit").unwrap();

    let animal = commands
        .create_animal(CreateAnimal {
            clinic_id: "clinic-1".to_string(),
            identity: identity(),
            identification: Identification::with_microchip("250268500000001"),
            life_cycle: LifeCycle::alive(),
            transfer: Transfer::none(),
            auxiliary_contact: None,
            primary_owner_client_id: anna.id.clone(),
            secondary_owner_client_ids: vec![ben.id.clone()],
        })
        .unwrap();

    clock.advance(Duration::days(2));
    commands
        .replace_owners(
            "clinic-1",
            animal.id(),
            &anna.id,
            &[ben.id.clone(), chloe.id.clone()],
        )
        .unwrap();

    clock.advance(Duration::days(2));
    commands.archive_client("clinic-1", &anna.id).unwrap();

    let stored = db.get_animal("clinic-1", animal.id()).unwrap();
    let expected_primary = std::cmp::min(ben.id.clone(), chloe.id.clone());
    assert_eq!(
        stored.primary_owner().map(|o| o.client_id().to_string()),
        Some(expected_primary)
    );
    stored.ensure_invariants().unwrap();

    clock.advance(Duration::days(1));
    commands.archive_client("clinic-1", &ben.id).unwrap();
    clock.advance(Duration::days(1));
    commands.archive_client("clinic-1", &chloe.id).unwrap();

    let stored = db.get_animal("clinic-1", animal.id()).unwrap();
    assert!(stored.is_archived());
    assert_eq!(stored.active_ownerships().count(), 0);

    let events = db.list_events(0).unwrap();
    let types: Vec<&str> = events.iter().map(|e| e.event.event_type()).collect();
    assert_eq!(
        types,
        vec![
            "AnimalCreated",
            "ClientArchived",
            "ClientArchived",
            "ClientArchived",
            "AnimalArchived",
        ]
    );
}
