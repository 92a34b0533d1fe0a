use thiserror::Error;

use crate::domain::{LedgerError, ReservationError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: unknown client or wrong PIN")]
    AuthenticationFailed,

    #[error("Card locked: too many failed PIN attempts")]
    AccountLockedOut,

    #[error("Invalid menu selection: {0}")]
    InvalidSelection(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid room type: {0}")]
    InvalidRoomType(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Reservation(#[from] ReservationError),
}
