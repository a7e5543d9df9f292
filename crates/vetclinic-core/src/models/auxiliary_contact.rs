//! Secondary person to call about an animal.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Auxiliary contact requires first name, last name and phone number together")]
pub struct IncompleteAuxiliaryContact;

/// A contact who is not an owner (neighbour, pet sitter, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuxiliaryContact {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

impl AuxiliaryContact {
    /// Build a contact from optional form fields.
    ///
    /// All three blank gives `None`; a partial set is rejected.
    pub fn from_parts(
        first_name: Option<String>,
        last_name: Option<String>,
        phone_number: Option<String>,
    ) -> Result<Option<Self>, IncompleteAuxiliaryContact> {
        let clean = |v: Option<String>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };
        match (clean(first_name), clean(last_name), clean(phone_number)) {
            (None, None, None) => Ok(None),
            (Some(first_name), Some(last_name), Some(phone_number)) => Ok(Some(Self {
                first_name,
                last_name,
                phone_number,
            })),
            _ => Err(IncompleteAuxiliaryContact),
        }
    }
}
