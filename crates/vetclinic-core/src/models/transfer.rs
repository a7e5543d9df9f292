//! Transfer of an animal out of its owners' hands.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

text_enum! {
    pub enum TransferStatus {
        NotTransferred => "NONE",
        Sold => "SOLD",
        Given => "GIVEN",
    }
}

/// Cross-field violations of [`Transfer`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Untransferred animal cannot carry a sale or gift date")]
    NotTransferredWithDates,

    #[error("Sold animal requires a sale date")]
    SoldWithoutDate,

    #[error("Sold animal cannot carry a gift date")]
    SoldWhileGiven,

    #[error("Given animal requires a gift date")]
    GivenWithoutDate,

    #[error("Given animal cannot carry a sale date")]
    GivenWhileSold,
}

/// None / sold / given, with the date matching the status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transfer {
    pub transfer_status: TransferStatus,
    pub sold_at: Option<NaiveDate>,
    pub given_at: Option<NaiveDate>,
}

impl Default for Transfer {
    fn default() -> Self {
        Self::none()
    }
}

impl Transfer {
    pub fn none() -> Self {
        Self {
            transfer_status: TransferStatus::NotTransferred,
            sold_at: None,
            given_at: None,
        }
    }

    pub fn sold(sold_at: NaiveDate) -> Self {
        Self {
            transfer_status: TransferStatus::Sold,
            sold_at: Some(sold_at),
            given_at: None,
        }
    }

    pub fn given(given_at: NaiveDate) -> Self {
        Self {
            transfer_status: TransferStatus::Given,
            sold_at: None,
            given_at: Some(given_at),
        }
    }

    pub fn ensure_consistency(&self) -> Result<(), TransferError> {
        match (self.transfer_status, self.sold_at, self.given_at) {
            (TransferStatus::NotTransferred, None, None) => Ok(()),
            (TransferStatus::NotTransferred, _, _) => Err(TransferError::NotTransferredWithDates),
            (TransferStatus::Sold, None, _) => Err(TransferError::SoldWithoutDate),
            (TransferStatus::Sold, Some(_), Some(_)) => Err(TransferError::SoldWhileGiven),
            (TransferStatus::Sold, Some(_), None) => Ok(()),
            (TransferStatus::Given, _, None) => Err(TransferError::GivenWithoutDate),
            (TransferStatus::Given, Some(_), Some(_)) => Err(TransferError::GivenWhileSold),
            (TransferStatus::Given, None, Some(_)) => Ok(()),
        }
    }
}
