//! Payments service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::{
    orders::{OrdersServiceError, status::OrderStatus},
    payments::status::PaymentStatus,
};

#[derive(Debug, Error)]
pub enum PaymentsServiceError {
    #[error("payment already exists")]
    AlreadyExists,

    #[error("order or payment not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("order has no payment attempt")]
    NoPaymentAttempt,

    #[error("order is already paid")]
    AlreadyPaid,

    #[error("a payment attempt is already in progress")]
    AttemptInProgress,

    #[error("order cannot be paid while {0}")]
    OrderNotPayable(OrderStatus),

    #[error("maximum payment attempts reached ({attempts} of {max_attempts}), please contact support")]
    MaxRetriesExceeded { attempts: u32, max_attempts: u32 },

    #[error("payment attempt cannot move from {from} to {to}")]
    IllegalAttemptTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    #[error(transparent)]
    Order(#[from] OrdersServiceError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for PaymentsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
