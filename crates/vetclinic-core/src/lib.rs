//! Vetclinic Core Library
//!
//! Multi-tenant veterinary clinic backend: animals, their owners and the
//! rules tying them together.
//!
//! # Architecture
//!
//! ```text
//!   Command (FFI / app)
//!          │
//!          ▼
//!   ClinicCommands ── load ──► Database (SQLite)
//!          │                       ▲
//!          ▼                       │
//!   Animal aggregate ── save ──────┤
//!          │                       │
//!          └── drained events ─► domain_events outbox
//!
//!   ClientArchived ─► handle_client_archived ─► resolve ownership per animal
//! ```
//!
//! # Core Principle
//!
//! **An active animal always has exactly one active primary owner.** When a
//! primary owner is archived, the earliest secondary owner is promoted, or the
//! animal is archived when none is left.
//!
//! # Modules
//!
//! - [`models`]: Animal aggregate, ownership ledger, value objects, events
//! - [`db`]: SQLite persistence and event outbox
//! - [`commands`]: Command handlers sandwiching one aggregate operation
//! - [`clock`]: Time source handed to aggregate operations
//! - [`config`]: Environment configuration
//! - [`logging`]: Tracing subscriber setup

pub mod clock;
pub mod commands;
pub mod config;
pub mod db;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use commands::{ClinicCommands, CommandError, CreateAnimal};
pub use config::Config;
pub use db::Database;
pub use models::{
    Animal, AnimalError, AnimalIdentity, AnimalStatus, AuxiliaryContact, Client, DomainEvent,
    Identification, LifeCycle, Ownership, OwnershipRole, OwnershipStatus, Transfer,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use chrono::NaiveDate;
use std::sync::{Arc, Mutex};

use models::{
    LifeStatus, RegistryType, ReproductiveStatus, Sex, Species, TransferStatus,
};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ClinicError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Domain rule violated: {0}")]
    DomainError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<db::DbError> for ClinicError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => ClinicError::NotFound(what),
            other => ClinicError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ClinicError {
    fn from(e: serde_json::Error) -> Self {
        ClinicError::SerializationError(e.to_string())
    }
}

impl From<CommandError> for ClinicError {
    fn from(e: CommandError) -> Self {
        match e {
            CommandError::Database(e) => e.into(),
            CommandError::UnknownClient(id) => ClinicError::NotFound(format!("client {}", id)),
            CommandError::InvalidInput(msg) => ClinicError::InvalidInput(msg),
            other => ClinicError::DomainError(other.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for ClinicError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ClinicError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<ClinicCore>, ClinicError> {
    let db = Database::open(&path)?;
    Ok(ClinicCore::wrap(db))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<ClinicCore>, ClinicError> {
    let db = Database::open_in_memory()?;
    Ok(ClinicCore::wrap(db))
}

/// Open the database named by `VETCLINIC_DATABASE_PATH` and install logging
/// filtered by `VETCLINIC_LOG`.
#[uniffi::export]
pub fn open_database_from_env() -> Result<Arc<ClinicCore>, ClinicError> {
    let config = Config::from_env().map_err(|e| ClinicError::InvalidInput(format!("{:#}", e)))?;
    logging::init_logging(&config.log_filter);

    let db = match &config.database_path {
        Some(path) => Database::open(path)?,
        None => Database::open_in_memory()?,
    };
    tracing::info!(
        path = config.database_path.as_deref().unwrap_or(":memory:"),
        "clinic database opened"
    );
    Ok(ClinicCore::wrap(db))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
///
/// The mutex serializes commands, so one aggregate is never modified by two
/// commands at once.
#[derive(uniffi::Object)]
pub struct ClinicCore {
    db: Arc<Mutex<Database>>,
}

impl ClinicCore {
    fn wrap(db: Database) -> Arc<Self> {
        Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }
}

#[uniffi::export]
impl ClinicCore {
    // =========================================================================
    // Client Operations
    // =========================================================================

    /// Register a new client.
    pub fn register_client(
        &self,
        clinic_id: String,
        first_name: String,
        last_name: String,
    ) -> Result<FfiClient, ClinicError> {
        let db = self.db.lock()?;
        let commands = ClinicCommands::new(&db, SystemClock);
        let client = commands.register_client(&clinic_id, &first_name, &last_name)?;
        Ok(client.into())
    }

    /// Archive a client; returns the animals whose ownership was resolved.
    pub fn archive_client(
        &self,
        clinic_id: String,
        client_id: String,
    ) -> Result<Vec<FfiAnimal>, ClinicError> {
        let db = self.db.lock()?;
        let commands = ClinicCommands::new(&db, SystemClock);
        let animals = commands.archive_client(&clinic_id, &client_id)?;
        Ok(animals.iter().map(FfiAnimal::from).collect())
    }

    // =========================================================================
    // Animal Operations
    // =========================================================================

    /// Create a new animal.
    pub fn create_animal(&self, animal: FfiNewAnimal) -> Result<FfiAnimal, ClinicError> {
        let command = animal.into_command()?;
        let db = self.db.lock()?;
        let commands = ClinicCommands::new(&db, SystemClock);
        let created = commands.create_animal(command)?;
        Ok(FfiAnimal::from(&created))
    }

    /// Get an animal by ID.
    pub fn get_animal(
        &self,
        clinic_id: String,
        animal_id: String,
    ) -> Result<Option<FfiAnimal>, ClinicError> {
        let db = self.db.lock()?;
        let animal = db.find_animal(&clinic_id, &animal_id)?;
        Ok(animal.as_ref().map(FfiAnimal::from))
    }

    /// List animals of a clinic.
    pub fn list_animals(&self, clinic_id: String) -> Result<Vec<FfiAnimal>, ClinicError> {
        let db = self.db.lock()?;
        let animals = db.list_animals(&clinic_id)?;
        Ok(animals.iter().map(FfiAnimal::from).collect())
    }

    /// Replace the descriptive identity, identification numbers and
    /// auxiliary contact of an animal. Tattoo, passport and sire numbers and
    /// the photo are kept as stored.
    pub fn update_identity(
        &self,
        clinic_id: String,
        animal_id: String,
        identity: FfiAnimalIdentity,
    ) -> Result<FfiAnimal, ClinicError> {
        let db = self.db.lock()?;
        let current = db.get_animal(&clinic_id, &animal_id)?;
        let (mut new_identity, identification, auxiliary_contact) =
            identity.into_parts(current.identification().clone())?;
        new_identity.photo_url = current.identity().photo_url.clone();

        let commands = ClinicCommands::new(&db, SystemClock);
        let animal = commands.update_identity(
            &clinic_id,
            &animal_id,
            new_identity,
            identification,
            auxiliary_contact,
        )?;
        Ok(FfiAnimal::from(&animal))
    }

    /// Replace the owner set of an animal.
    pub fn replace_owners(
        &self,
        clinic_id: String,
        animal_id: String,
        primary_owner_client_id: String,
        secondary_owner_client_ids: Vec<String>,
    ) -> Result<FfiAnimal, ClinicError> {
        let db = self.db.lock()?;
        let commands = ClinicCommands::new(&db, SystemClock);
        let animal = commands.replace_owners(
            &clinic_id,
            &animal_id,
            &primary_owner_client_id,
            &secondary_owner_client_ids,
        )?;
        Ok(FfiAnimal::from(&animal))
    }

    /// Record a death or disappearance ("ALIVE", "DECEASED", "MISSING").
    /// `date` is `YYYY-MM-DD` and must be given unless the status is ALIVE.
    pub fn update_life_cycle(
        &self,
        clinic_id: String,
        animal_id: String,
        life_status: String,
        date: Option<String>,
    ) -> Result<FfiAnimal, ClinicError> {
        let date = parse_optional_date(date)?;
        let life_cycle = match parse_enum(&life_status, LifeStatus::parse, "life status")? {
            LifeStatus::Alive => LifeCycle::alive(),
            LifeStatus::Deceased => LifeCycle {
                life_status: LifeStatus::Deceased,
                deceased_at: date,
                missing_since: None,
            },
            LifeStatus::Missing => LifeCycle {
                life_status: LifeStatus::Missing,
                deceased_at: None,
                missing_since: date,
            },
        };

        let db = self.db.lock()?;
        let commands = ClinicCommands::new(&db, SystemClock);
        let animal = commands.update_life_cycle(&clinic_id, &animal_id, life_cycle)?;
        Ok(FfiAnimal::from(&animal))
    }

    /// Record a sale or gift ("NONE", "SOLD", "GIVEN").
    pub fn update_transfer(
        &self,
        clinic_id: String,
        animal_id: String,
        transfer_status: String,
        date: Option<String>,
    ) -> Result<FfiAnimal, ClinicError> {
        let date = parse_optional_date(date)?;
        let status = parse_enum(&transfer_status, TransferStatus::parse, "transfer status")?;
        let transfer = match status {
            TransferStatus::NotTransferred => Transfer::none(),
            TransferStatus::Sold => Transfer {
                transfer_status: TransferStatus::Sold,
                sold_at: date,
                given_at: None,
            },
            TransferStatus::Given => Transfer {
                transfer_status: TransferStatus::Given,
                sold_at: None,
                given_at: date,
            },
        };

        let db = self.db.lock()?;
        let commands = ClinicCommands::new(&db, SystemClock);
        let animal = commands.update_transfer(&clinic_id, &animal_id, transfer)?;
        Ok(FfiAnimal::from(&animal))
    }

    /// Archive an animal.
    pub fn archive_animal(
        &self,
        clinic_id: String,
        animal_id: String,
    ) -> Result<FfiAnimal, ClinicError> {
        let db = self.db.lock()?;
        let commands = ClinicCommands::new(&db, SystemClock);
        let animal = commands.archive_animal(&clinic_id, &animal_id)?;
        Ok(FfiAnimal::from(&animal))
    }

    // =========================================================================
    // Outbox Operations
    // =========================================================================

    /// Domain events recorded after sequence number `after_seq`.
    pub fn list_events(&self, after_seq: i64) -> Result<Vec<FfiDomainEvent>, ClinicError> {
        let db = self.db.lock()?;
        let events = db.list_events(after_seq)?;
        events
            .into_iter()
            .map(|stored| {
                Ok(FfiDomainEvent {
                    seq: stored.seq,
                    event_type: stored.event.event_type().to_string(),
                    aggregate_id: stored.event.aggregate_id().to_string(),
                    payload_json: serde_json::to_string(&stored.event)?,
                    recorded_at: stored.recorded_at.to_rfc3339(),
                })
            })
            .collect()
    }
}

fn parse_enum<T>(
    value: &str,
    parse: fn(&str) -> Option<T>,
    what: &str,
) -> Result<T, ClinicError> {
    parse(value.trim())
        .ok_or_else(|| ClinicError::InvalidInput(format!("Unknown {}: {}", what, value)))
}

fn parse_optional_date(value: Option<String>) -> Result<Option<NaiveDate>, ClinicError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| {
            NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d")
                .map_err(|e| ClinicError::InvalidInput(format!("Invalid date {}: {}", v, e)))
        })
        .transpose()
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe client.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiClient {
    pub id: String,
    pub clinic_id: String,
    pub first_name: String,
    pub last_name: String,
    pub status: String,
}

impl From<Client> for FfiClient {
    fn from(client: Client) -> Self {
        Self {
            status: client.status.as_str().to_string(),
            id: client.id,
            clinic_id: client.clinic_id,
            first_name: client.first_name,
            last_name: client.last_name,
        }
    }
}

/// FFI-safe descriptive identity, identification numbers and auxiliary
/// contact. Enum fields use their upper-case text form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAnimalIdentity {
    pub name: String,
    pub species: String,
    pub sex: String,
    pub reproductive_status: String,
    pub is_mixed_breed: bool,
    pub breed_name: Option<String>,
    pub birth_date: Option<String>,
    pub color: Option<String>,
    pub microchip_number: Option<String>,
    pub registry_type: Option<String>,
    pub registry_number: Option<String>,
    pub contact_first_name: Option<String>,
    pub contact_last_name: Option<String>,
    pub contact_phone_number: Option<String>,
}

impl FfiAnimalIdentity {
    /// Parse into domain values. Identification fields not carried over FFI
    /// are taken from `base`.
    fn into_parts(
        self,
        base: Identification,
    ) -> Result<(AnimalIdentity, Identification, Option<AuxiliaryContact>), ClinicError> {
        let mut identity = AnimalIdentity::new(
            self.name,
            parse_enum(&self.species, Species::parse, "species")?,
            parse_enum(&self.sex, Sex::parse, "sex")?,
            parse_enum(
                &self.reproductive_status,
                ReproductiveStatus::parse,
                "reproductive status",
            )?,
        );
        identity.is_mixed_breed = self.is_mixed_breed;
        identity.breed_name = self.breed_name;
        identity.birth_date = parse_optional_date(self.birth_date)?;
        identity.color = self.color;

        let registry_type = match self.registry_type.as_deref() {
            Some(value) => parse_enum(value, RegistryType::parse, "registry type")?,
            None => RegistryType::Unregistered,
        };
        let identification = Identification {
            microchip_number: self.microchip_number,
            registry_type,
            registry_number: self.registry_number,
            ..base
        };

        let auxiliary_contact = AuxiliaryContact::from_parts(
            self.contact_first_name,
            self.contact_last_name,
            self.contact_phone_number,
        )
        .map_err(|e| ClinicError::InvalidInput(e.to_string()))?;

        Ok((identity, identification, auxiliary_contact))
    }
}

/// FFI-safe new animal request.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewAnimal {
    pub clinic_id: String,
    pub identity: FfiAnimalIdentity,
    pub primary_owner_client_id: String,
    pub secondary_owner_client_ids: Vec<String>,
}

impl FfiNewAnimal {
    fn into_command(self) -> Result<CreateAnimal, ClinicError> {
        let (identity, identification, auxiliary_contact) =
            self.identity.into_parts(Identification::default())?;

        Ok(CreateAnimal {
            clinic_id: self.clinic_id,
            identity,
            identification,
            life_cycle: LifeCycle::alive(),
            transfer: Transfer::none(),
            auxiliary_contact,
            primary_owner_client_id: self.primary_owner_client_id,
            secondary_owner_client_ids: self.secondary_owner_client_ids,
        })
    }
}

/// FFI-safe ownership ledger entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiOwnership {
    pub client_id: String,
    pub role: String,
    pub status: String,
    pub started_at: String,
    pub ended_at: Option<String>,
}

impl From<&Ownership> for FfiOwnership {
    fn from(ownership: &Ownership) -> Self {
        Self {
            client_id: ownership.client_id().to_string(),
            role: ownership.role().as_str().to_string(),
            status: ownership.status().as_str().to_string(),
            started_at: ownership.started_at().to_rfc3339(),
            ended_at: ownership.ended_at().map(|at| at.to_rfc3339()),
        }
    }
}

/// FFI-safe animal.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAnimal {
    pub id: String,
    pub clinic_id: String,
    pub name: String,
    pub species: String,
    pub sex: String,
    pub reproductive_status: String,
    pub microchip_number: Option<String>,
    pub life_status: String,
    pub transfer_status: String,
    pub status: String,
    pub ownerships: Vec<FfiOwnership>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Animal> for FfiAnimal {
    fn from(animal: &Animal) -> Self {
        let identity = animal.identity();
        Self {
            id: animal.id().to_string(),
            clinic_id: animal.clinic_id().to_string(),
            name: identity.name.clone(),
            species: identity.species.as_str().to_string(),
            sex: identity.sex.as_str().to_string(),
            reproductive_status: identity.reproductive_status.as_str().to_string(),
            microchip_number: animal.identification().microchip().map(String::from),
            life_status: animal.life_cycle().life_status.as_str().to_string(),
            transfer_status: animal.transfer().transfer_status.as_str().to_string(),
            status: animal.status().as_str().to_string(),
            ownerships: animal.ownerships().iter().map(FfiOwnership::from).collect(),
            created_at: animal.created_at().to_rfc3339(),
            updated_at: animal.updated_at().to_rfc3339(),
        }
    }
}

/// FFI-safe outbox entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDomainEvent {
    pub seq: i64,
    pub event_type: String,
    pub aggregate_id: String,
    pub payload_json: String,
    pub recorded_at: String,
}
