pub mod admin;
pub mod operations;

use rust_decimal::Decimal;
use validator::ValidationError;

/// Money fields on request bodies may not go below zero.
pub(crate) fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("negative_amount"));
    }
    Ok(())
}
