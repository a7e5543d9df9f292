//! Descriptive attributes of an animal.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

text_enum! {
    /// Species as recorded at the front desk.
    pub enum Species {
        Dog => "DOG",
        Cat => "CAT",
        Rabbit => "RABBIT",
        Rodent => "RODENT",
        Ferret => "FERRET",
        Bird => "BIRD",
        Reptile => "REPTILE",
        Horse => "HORSE",
        Other => "OTHER",
    }
}

text_enum! {
    pub enum Sex {
        Male => "MALE",
        Female => "FEMALE",
        Unknown => "UNKNOWN",
    }
}

text_enum! {
    pub enum ReproductiveStatus {
        Intact => "INTACT",
        Neutered => "NEUTERED",
        Unknown => "UNKNOWN",
    }
}

/// Descriptive identity of an animal, replaced as a whole by
/// `Animal::update_identity`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnimalIdentity {
    /// Call name
    pub name: String,
    pub species: Species,
    pub sex: Sex,
    pub reproductive_status: ReproductiveStatus,
    pub is_mixed_breed: bool,
    /// Breed name (free text, cross-breeds included)
    pub breed_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    /// Coat/plumage color
    pub color: Option<String>,
    /// Reference to the stored photo
    pub photo_url: Option<String>,
}

impl AnimalIdentity {
    /// Create an identity with the required fields only.
    pub fn new(
        name: impl Into<String>,
        species: Species,
        sex: Sex,
        reproductive_status: ReproductiveStatus,
    ) -> Self {
        Self {
            name: name.into(),
            species,
            sex,
            reproductive_status,
            is_mixed_breed: false,
            breed_name: None,
            birth_date: None,
            color: None,
            photo_url: None,
        }
    }
}
