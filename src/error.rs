use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

use crate::entities::Id;

pub type AppResult<T> = Result<T, AppError>;
pub type RentalResult<T> = Result<T, RentalError>;

/// Reasons the rental core refuses an operation. Nothing here is fatal; the
/// caller surfaces the reason and the store is left untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RentalError {
    #[error("No standard rate configured for city {city_id}")]
    NoStandardRate { city_id: Id },

    #[error("City {city_id} has {count} standard rates; exactly one is required")]
    AmbiguousStandardRate { city_id: Id, count: usize },

    #[error("Vehicle {0} not found")]
    VehicleNotFound(Id),

    #[error("Vehicle {0} is not available")]
    VehicleUnavailable(Id),

    #[error("Battery {0} not found")]
    BatteryNotFound(Id),

    #[error("Battery {0} is not available")]
    BatteryUnavailable(Id),

    #[error("Customer {0} not found")]
    CustomerNotFound(Id),

    #[error("Customer {phone} has a pending balance of {amount}")]
    PendingBalance { phone: String, amount: Decimal },

    #[error("Collected {collected} but {expected} is payable now")]
    PaymentMismatch { expected: Decimal, collected: Decimal },

    #[error("Booking {0} not found")]
    BookingNotFound(Id),

    #[error("Booking {0} is not active")]
    BookingNotActive(Id),

    #[error("Fine exceeds deposit by {net_diff}; collection must be confirmed")]
    SettlementNotConfirmed { net_diff: Decimal },

    #[error("Booking {0} has nothing pending")]
    NothingPending(Id),

    #[error("Refund request {0} not found")]
    RefundRequestNotFound(Id),

    #[error("Unknown checklist item: {0}")]
    UnknownChecklistItem(String),

    #[error("City {0} not found")]
    CityNotFound(Id),

    #[error("Rate {0} not found")]
    RateNotFound(Id),

    #[error("{entity} {id} does not belong to city {city_id}")]
    CityMismatch {
        entity: &'static str,
        id: Id,
        city_id: Id,
    },

    #[error("Amount out of range")]
    AmountOutOfRange,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<RentalError> for AppError {
    fn from(err: RentalError) -> Self {
        let message = err.to_string();
        match err {
            RentalError::VehicleNotFound(_)
            | RentalError::BatteryNotFound(_)
            | RentalError::CustomerNotFound(_)
            | RentalError::BookingNotFound(_)
            | RentalError::RefundRequestNotFound(_)
            | RentalError::CityNotFound(_)
            | RentalError::RateNotFound(_) => AppError::NotFound(message),

            RentalError::VehicleUnavailable(_)
            | RentalError::BatteryUnavailable(_)
            | RentalError::PendingBalance { .. }
            | RentalError::BookingNotActive(_)
            | RentalError::SettlementNotConfirmed { .. }
            | RentalError::NothingPending(_)
            | RentalError::CityMismatch { .. } => AppError::Conflict(message),

            RentalError::NoStandardRate { .. }
            | RentalError::AmbiguousStandardRate { .. }
            | RentalError::PaymentMismatch { .. }
            | RentalError::UnknownChecklistItem(_)
            | RentalError::AmountOutOfRange => AppError::BadRequest(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, code) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found", "NOT_FOUND"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Bad Request", "BAD_REQUEST"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "Conflict", "CONFLICT"),
            AppError::Validation(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation Error",
                "VALIDATION_ERROR",
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "INTERNAL_ERROR",
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = json!({
            "error": error,
            "message": self.to_string(),
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}
