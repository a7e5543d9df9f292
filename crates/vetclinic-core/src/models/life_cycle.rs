//! Life status of an animal.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

text_enum! {
    pub enum LifeStatus {
        Alive => "ALIVE",
        Deceased => "DECEASED",
        Missing => "MISSING",
    }
}

/// Cross-field violations of [`LifeCycle`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifeCycleError {
    #[error("Alive animal cannot carry a death or missing date")]
    AliveWithDates,

    #[error("Deceased animal requires a date of death")]
    DeceasedWithoutDate,

    #[error("Deceased animal cannot carry a missing date")]
    DeceasedWhileMissing,

    #[error("Missing animal requires a missing-since date")]
    MissingWithoutDate,

    #[error("Missing animal cannot carry a date of death")]
    MissingWhileDeceased,
}

/// Alive / deceased / missing, with the date matching the status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LifeCycle {
    pub life_status: LifeStatus,
    pub deceased_at: Option<NaiveDate>,
    pub missing_since: Option<NaiveDate>,
}

impl Default for LifeCycle {
    fn default() -> Self {
        Self::alive()
    }
}

impl LifeCycle {
    pub fn alive() -> Self {
        Self {
            life_status: LifeStatus::Alive,
            deceased_at: None,
            missing_since: None,
        }
    }

    pub fn deceased(deceased_at: NaiveDate) -> Self {
        Self {
            life_status: LifeStatus::Deceased,
            deceased_at: Some(deceased_at),
            missing_since: None,
        }
    }

    pub fn missing(missing_since: NaiveDate) -> Self {
        Self {
            life_status: LifeStatus::Missing,
            deceased_at: None,
            missing_since: Some(missing_since),
        }
    }

    /// At most one date is set, and only the one matching the status.
    pub fn ensure_consistency(&self) -> Result<(), LifeCycleError> {
        match self.life_status {
            LifeStatus::Alive => {
                if self.deceased_at.is_some() || self.missing_since.is_some() {
                    return Err(LifeCycleError::AliveWithDates);
                }
            }
            LifeStatus::Deceased => {
                if self.deceased_at.is_none() {
                    return Err(LifeCycleError::DeceasedWithoutDate);
                }
                if self.missing_since.is_some() {
                    return Err(LifeCycleError::DeceasedWhileMissing);
                }
            }
            LifeStatus::Missing => {
                if self.missing_since.is_none() {
                    return Err(LifeCycleError::MissingWithoutDate);
                }
                if self.deceased_at.is_some() {
                    return Err(LifeCycleError::MissingWhileDeceased);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_constructors_are_consistent() {
        assert!(LifeCycle::alive().ensure_consistency().is_ok());
        assert!(LifeCycle::deceased(date(2024, 3, 1)).ensure_consistency().is_ok());
        assert!(LifeCycle::missing(date(2024, 3, 1)).ensure_consistency().is_ok());
    }

    #[test]
    fn test_alive_rejects_dates() {
        let mut life_cycle = LifeCycle::alive();
        life_cycle.missing_since = Some(date(2024, 1, 1));
        assert_eq!(life_cycle.ensure_consistency(), Err(LifeCycleError::AliveWithDates));
    }

    #[test]
    fn test_deceased_rules() {
        let life_cycle = LifeCycle {
            life_status: LifeStatus::Deceased,
            deceased_at: None,
            missing_since: None,
        };
        assert_eq!(life_cycle.ensure_consistency(), Err(LifeCycleError::DeceasedWithoutDate));

        let mut life_cycle = LifeCycle::deceased(date(2024, 2, 2));
        life_cycle.missing_since = Some(date(2024, 1, 1));
        assert_eq!(life_cycle.ensure_consistency(), Err(LifeCycleError::DeceasedWhileMissing));
    }

    #[test]
    fn test_missing_rules() {
        let life_cycle = LifeCycle {
            life_status: LifeStatus::Missing,
            deceased_at: None,
            missing_since: None,
        };
        assert_eq!(life_cycle.ensure_consistency(), Err(LifeCycleError::MissingWithoutDate));

        let mut life_cycle = LifeCycle::missing(date(2024, 2, 2));
        life_cycle.deceased_at = Some(date(2024, 3, 3));
        assert_eq!(life_cycle.ensure_consistency(), Err(LifeCycleError::MissingWhileDeceased));
    }
}
