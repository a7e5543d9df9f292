//! Application commands.
//!
//! Each handler loads one aggregate, applies exactly one operation, saves it
//! and moves its drained events to the outbox.
//!
//! Pipeline: Load → Aggregate operation → Invariant check → Save → Outbox

mod animals;
mod clients;

pub use animals::*;
pub use clients::*;

use thiserror::Error;

use crate::clock::Clock;
use crate::db::{Database, DbError};
use crate::models::{Animal, AnimalError, ClientError, IncompleteAuxiliaryContact};

/// Command errors.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error(transparent)]
    Animal(#[from] AnimalError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Microchip {0} is already used by another animal of this clinic")]
    MicrochipAlreadyUsed(String),

    #[error("Client {0} is not an active client of this clinic")]
    UnknownClient(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<IncompleteAuxiliaryContact> for CommandError {
    fn from(e: IncompleteAuxiliaryContact) -> Self {
        CommandError::InvalidInput(e.to_string())
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

/// Command handlers for one clinic database.
pub struct ClinicCommands<'a, C: Clock> {
    db: &'a Database,
    clock: C,
}

impl<'a, C: Clock> ClinicCommands<'a, C> {
    /// Create handlers over a database and a time source.
    pub fn new(db: &'a Database, clock: C) -> Self {
        Self { db, clock }
    }

    /// Persist the animal and its recorded events in one transaction. The
    /// buffer is drained only once they are stored.
    fn commit_animal(&self, animal: &mut Animal) -> CommandResult<()> {
        self.db.save_animal_with_events(
            animal,
            animal.recorded_domain_events(),
            self.clock.now(),
        )?;
        animal.pull_domain_events();
        Ok(())
    }

    /// Owners must be active clients of the same clinic.
    fn ensure_active_client(&self, clinic_id: &str, client_id: &str) -> CommandResult<()> {
        match self.db.get_client(clinic_id, client_id)? {
            Some(client) if !client.is_archived() => Ok(()),
            _ => Err(CommandError::UnknownClient(client_id.to_string())),
        }
    }
}
