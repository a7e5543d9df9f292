//! Identification numbers carried by an animal.

use serde::{Deserialize, Serialize};
use thiserror::Error;

text_enum! {
    /// Pedigree registry the animal is enrolled in.
    pub enum RegistryType {
        /// Not enrolled in any registry
        Unregistered => "NONE",
        /// Livre des Origines Français (dogs)
        Lof => "LOF",
        /// Livre Officiel des Origines Félines (cats)
        Loof => "LOOF",
        Other => "OTHER",
    }
}

impl Default for RegistryType {
    fn default() -> Self {
        RegistryType::Unregistered
    }
}

/// Cross-field violations of [`Identification`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentificationError {
    #[error("Registry number {0} given without a registry type")]
    RegistryNumberWithoutType(String),

    #[error("Registry type {0} given without a registry number")]
    RegistryTypeWithoutNumber(RegistryType),
}

/// Microchip, tattoo, passport and pedigree registry numbers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identification {
    pub microchip_number: Option<String>,
    pub tattoo_number: Option<String>,
    pub passport_number: Option<String>,
    pub registry_type: RegistryType,
    pub registry_number: Option<String>,
    /// Sire registry number, informational only
    pub sire_number: Option<String>,
}

impl Identification {
    /// An identification with a microchip number only.
    pub fn with_microchip(microchip_number: impl Into<String>) -> Self {
        Self {
            microchip_number: Some(microchip_number.into()),
            ..Self::default()
        }
    }

    /// Registry number, with blank values treated as absent.
    pub fn registry_number(&self) -> Option<&str> {
        non_blank(self.registry_number.as_deref())
    }

    /// Microchip number, with blank values treated as absent.
    pub fn microchip(&self) -> Option<&str> {
        non_blank(self.microchip_number.as_deref())
    }

    /// A registry number requires a registry type, and a registry type
    /// requires a registry number.
    pub fn ensure_consistency(&self) -> Result<(), IdentificationError> {
        match (self.registry_type, self.registry_number()) {
            (RegistryType::Unregistered, Some(number)) => Err(
                IdentificationError::RegistryNumberWithoutType(number.to_string()),
            ),
            (RegistryType::Unregistered, None) => Ok(()),
            (registry_type, None) => Err(IdentificationError::RegistryTypeWithoutNumber(
                registry_type,
            )),
            (_, Some(_)) => Ok(()),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
