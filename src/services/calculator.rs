//! Pure booking arithmetic: day counts, tiered rent and split payments.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::entities::rate::Rate;

/// Length of the monthly pricing tier in days.
pub const MONTH_DAYS: i64 = 30;

/// Number of billable days between two dates. A same-day rental counts as one
/// day, never zero.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    let span = (end - start).num_days().abs();
    if span == 0 { 1 } else { span }
}

/// Rent for `days` under `rate`.
///
/// Rentals of a month or more with a positive monthly tier are billed as whole
/// months plus the remaining days at the daily rate; everything else is billed
/// per day. `None` when the amount does not fit in a `Decimal`.
pub fn compute_total_rent(rate: &Rate, days: i64) -> Option<Decimal> {
    match rate.monthly_rent {
        Some(monthly) if is_monthly_eligible(days) && monthly > Decimal::ZERO => {
            let months = days / MONTH_DAYS;
            let extra_days = days % MONTH_DAYS;
            Decimal::from(months)
                .checked_mul(monthly)?
                .checked_add(Decimal::from(extra_days).checked_mul(rate.daily_rent)?)
        }
        _ => rate.daily_rent.checked_mul(Decimal::from(days)),
    }
}

pub fn is_monthly_eligible(days: i64) -> bool {
    days >= MONTH_DAYS
}

/// Amount that must be collected when the booking is made. Split payment (half
/// the rent plus the full deposit) only applies to monthly-eligible bookings.
pub fn amount_payable_now(
    total_rent: Decimal,
    security_deposit: Decimal,
    split_requested: bool,
    monthly_eligible: bool,
) -> Option<Decimal> {
    let rent_now = if split_requested && monthly_eligible {
        total_rent.checked_div(Decimal::TWO)?
    } else {
        total_rent
    };
    rent_now.checked_add(security_deposit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sf_rate() -> Rate {
        Rate {
            id: 1,
            city_id: 1,
            client_name: None,
            daily_rent: Decimal::from(250),
            monthly_rent: Some(Decimal::from(5000)),
            security_deposit: Decimal::from(1000),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_same_day_counts_as_one() {
        let d = date("2024-07-28");
        assert_eq!(days_between(d, d), 1);
    }

    #[test]
    fn test_days_between_is_symmetric() {
        assert_eq!(days_between(date("2024-07-28"), date("2024-07-31")), 3);
        assert_eq!(days_between(date("2024-07-31"), date("2024-07-28")), 3);
        assert_eq!(days_between(date("2024-02-01"), date("2024-03-02")), 30);
    }

    #[test]
    fn test_monthly_tier_blends_extra_days() {
        assert_eq!(compute_total_rent(&sf_rate(), 35), Some(Decimal::from(6250)));
        assert_eq!(compute_total_rent(&sf_rate(), 60), Some(Decimal::from(10000)));
        assert_eq!(compute_total_rent(&sf_rate(), 30), Some(Decimal::from(5000)));
    }

    #[test]
    fn test_short_rentals_are_daily() {
        assert_eq!(compute_total_rent(&sf_rate(), 29), Some(Decimal::from(7250)));
        assert_eq!(compute_total_rent(&sf_rate(), 3), Some(Decimal::from(750)));
    }

    #[test]
    fn test_missing_or_zero_monthly_falls_back_to_daily() {
        let mut rate = sf_rate();
        rate.monthly_rent = None;
        assert_eq!(compute_total_rent(&rate, 35), Some(Decimal::from(8750)));

        rate.monthly_rent = Some(Decimal::ZERO);
        assert_eq!(compute_total_rent(&rate, 35), Some(Decimal::from(8750)));
    }

    #[test]
    fn test_amount_payable_now() {
        let rent = Decimal::from(6250);
        let deposit = Decimal::from(1000);

        assert_eq!(amount_payable_now(rent, deposit, true, true), Some(Decimal::from(4125)));
        assert_eq!(amount_payable_now(rent, deposit, false, true), Some(Decimal::from(7250)));
        // Split is ignored when the booking is shorter than a month.
        assert_eq!(amount_payable_now(rent, deposit, true, false), Some(Decimal::from(7250)));
    }

    #[test]
    fn test_split_payment_can_be_fractional() {
        let payable = amount_payable_now(Decimal::from(5250), Decimal::from(900), true, true);
        assert_eq!(payable, Some(Decimal::new(35250, 1)));
    }

    #[test]
    fn test_rent_out_of_range_is_none() {
        let mut rate = sf_rate();
        rate.daily_rent = Decimal::MAX;
        assert_eq!(compute_total_rent(&rate, 3), None);

        rate.monthly_rent = Some(Decimal::MAX);
        assert_eq!(compute_total_rent(&rate, 65), None);

        assert_eq!(amount_payable_now(Decimal::MAX, Decimal::ONE, false, false), None);
    }
}
