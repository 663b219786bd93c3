use crate::entities::rate::Rate;
use crate::entities::Id;
use crate::error::{RentalError, RentalResult};

/// The walk-in rate for `city_id`: the single rate of that city without a
/// client name. Corporate rates are never picked, and no fallback is invented
/// when the city has none or more than one.
pub fn resolve_standard_rate<'a, I>(rates: I, city_id: Id) -> RentalResult<&'a Rate>
where
    I: IntoIterator<Item = &'a Rate>,
{
    let mut candidates = rates
        .into_iter()
        .filter(|r| r.city_id == city_id && r.is_standard());

    let rate = candidates
        .next()
        .ok_or(RentalError::NoStandardRate { city_id })?;

    let extra = candidates.count();
    if extra > 0 {
        return Err(RentalError::AmbiguousStandardRate {
            city_id,
            count: extra + 1,
        });
    }

    Ok(rate)
}
