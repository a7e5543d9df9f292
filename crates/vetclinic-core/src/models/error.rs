//! Animal aggregate errors.

use thiserror::Error;

use super::{IdentificationError, LifeCycleError, TransferError};

/// Failures raised by [`super::Animal`] operations.
///
/// A failed mutation means the caller must not persist the instance.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnimalError {
    #[error("Animal {animal_id} is already archived")]
    AlreadyArchived { animal_id: String },

    #[error("Animal {animal_id} is archived and cannot be modified")]
    ArchivedCannotBeModified { animal_id: String },

    #[error("Animal {animal_id} must have exactly one active primary owner")]
    MustHavePrimaryOwner { animal_id: String },

    #[error("Animal {animal_id} has client {client_id} as an active owner more than once")]
    PrimaryOwnerConflict { animal_id: String, client_id: String },

    #[error("Client {client_id} cannot be both primary and secondary owner of animal {animal_id}")]
    DuplicateActiveOwner { animal_id: String, client_id: String },

    #[error("Invalid identification: {0}")]
    Identification(#[from] IdentificationError),

    #[error("Invalid life cycle: {0}")]
    LifeCycle(#[from] LifeCycleError),

    #[error("Invalid transfer: {0}")]
    Transfer(#[from] TransferError),
}
