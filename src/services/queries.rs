//! Derived values computed on read. None of these are ever stored on the
//! entities, so they cannot go stale.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::EntityStore;
use crate::entities::booking::{Booking, BookingStatus};
use crate::entities::vehicle::VehicleStatus;
use crate::entities::Id;
use crate::services::calculator::days_between;

/// Money still owed on a booking. Once returned, the deposit is considered
/// consumed or refunded and drops out of the payable total.
pub fn pending_amount(booking: &Booking) -> Decimal {
    let payable = match booking.status {
        BookingStatus::Returned => booking.total_rent + booking.fine(),
        BookingStatus::Active | BookingStatus::PendingPayment => {
            booking.total_rent + booking.security_deposit + booking.fine()
        }
    };
    (payable - booking.amount_collected).max(Decimal::ZERO)
}

/// Whole days since the booking started (active) or ended (otherwise).
/// Negative for dates in the future.
pub fn days_overdue(booking: &Booking, today: NaiveDate) -> i64 {
    let reference = match booking.status {
        BookingStatus::Active => booking.start_date,
        BookingStatus::Returned | BookingStatus::PendingPayment => booking.end_date,
    };
    (today - reference).num_days()
}

/// Highlight flag for unpaid bookings that are more than `threshold_days`
/// overdue. Never blocks an operation.
pub fn is_critical_overdue(booking: &Booking, today: NaiveDate, threshold_days: i64) -> bool {
    pending_amount(booking) > Decimal::ZERO && days_overdue(booking, today) > threshold_days
}

/// Part of the collected amount that covers the deposit.
pub fn security_collected(booking: &Booking) -> Decimal {
    booking.amount_collected.min(booking.security_deposit)
}

/// Part of the collected amount beyond the deposit.
pub fn rent_collected(booking: &Booking) -> Decimal {
    (booking.amount_collected - booking.security_deposit).max(Decimal::ZERO)
}

/// Outstanding rent across every booking made under `phone`. A positive value
/// blocks new bookings for that customer.
pub fn customer_pending_balance<'a, I>(bookings: I, phone: &str) -> Decimal
where
    I: IntoIterator<Item = &'a Booking>,
{
    let mut potential_rent = Decimal::ZERO;
    let mut collected = Decimal::ZERO;
    let mut security = Decimal::ZERO;

    for b in bookings.into_iter().filter(|b| b.customer_phone == phone) {
        potential_rent += b.total_rent;
        collected += b.amount_collected;
        security += security_collected(b);
    }

    (potential_rent - (collected - security)).max(Decimal::ZERO)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub pending_amount: Decimal,
    pub days_overdue: i64,
    pub critical_overdue: bool,
}

impl BookingView {
    pub fn new(booking: &Booking, today: NaiveDate, critical_threshold_days: i64) -> Self {
        Self {
            booking: booking.clone(),
            pending_amount: pending_amount(booking),
            days_overdue: days_overdue(booking, today),
            critical_overdue: is_critical_overdue(booking, today, critical_threshold_days),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityDashboard {
    pub city_id: Id,
    pub date: NaiveDate,
    pub rent_collected_today: Decimal,
    pub security_collected_today: Decimal,
    pub active_rentals: usize,
    pub available_vehicles: usize,
}

pub fn city_dashboard(store: &EntityStore, city_id: Id, today: NaiveDate) -> CityDashboard {
    let city_bookings = || store.bookings.values().filter(move |b| b.city_id == city_id);

    let (rent, security) = city_bookings()
        .filter(|b| b.start_date == today)
        .fold((Decimal::ZERO, Decimal::ZERO), |(rent, security), b| {
            (rent + rent_collected(b), security + security_collected(b))
        });

    CityDashboard {
        city_id,
        date: today,
        rent_collected_today: rent,
        security_collected_today: security,
        active_rentals: city_bookings()
            .filter(|b| b.status == BookingStatus::Active)
            .count(),
        available_vehicles: store
            .vehicles
            .values()
            .filter(|v| v.city_id == city_id && v.status == VehicleStatus::Available)
            .count(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityCustomerSummary {
    pub phone: String,
    pub name: String,
    pub booking_count: usize,
    pub total_days: i64,
    pub pending_rent: Decimal,
    pub last_booking_date: NaiveDate,
}

/// Customers who rented in `city_id`, busiest first.
pub fn city_customer_summaries(store: &EntityStore, city_id: Id) -> Vec<CityCustomerSummary> {
    let mut summaries: Vec<CityCustomerSummary> =
        group_by_phone(store.bookings.values().filter(|b| b.city_id == city_id))
            .into_iter()
            .map(|(phone, bookings)| {
                let potential: Decimal = bookings.iter().map(|b| b.total_rent).sum();
                let collected: Decimal = bookings.iter().map(|b| rent_collected(b)).sum();
                CityCustomerSummary {
                    name: bookings[0].customer_name.clone(),
                    booking_count: bookings.len(),
                    total_days: bookings.iter().map(|b| days_between(b.start_date, b.end_date)).sum(),
                    pending_rent: (potential - collected).max(Decimal::ZERO),
                    last_booking_date: last_start(&bookings),
                    phone,
                }
            })
            .collect();

    summaries.sort_by(|a, b| b.booking_count.cmp(&a.booking_count));
    summaries
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerDirectoryEntry {
    pub phone: String,
    pub name: String,
    pub booking_count: usize,
    pub total_rental_days: i64,
    pub total_rent_collected: Decimal,
    pub total_security_collected: Decimal,
    pub pending_rent: Decimal,
    pub last_booking_date: NaiveDate,
}

/// Every customer with at least one booking, most recently active first.
pub fn customer_directory(store: &EntityStore) -> Vec<CustomerDirectoryEntry> {
    let mut entries: Vec<CustomerDirectoryEntry> = group_by_phone(store.bookings.values())
        .into_iter()
        .map(|(phone, bookings)| {
            let rent: Decimal = bookings.iter().map(|b| rent_collected(b)).sum();
            let security: Decimal = bookings.iter().map(|b| security_collected(b)).sum();
            CustomerDirectoryEntry {
                name: bookings[0].customer_name.clone(),
                booking_count: bookings.len(),
                total_rental_days: bookings.iter().map(|b| days_between(b.start_date, b.end_date)).sum(),
                total_rent_collected: rent,
                total_security_collected: security,
                pending_rent: customer_pending_balance(bookings.iter().copied(), &phone),
                last_booking_date: last_start(&bookings),
                phone,
            }
        })
        .collect();

    entries.sort_by(|a, b| b.last_booking_date.cmp(&a.last_booking_date));
    entries
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total_bookings: usize,
    pub rent_collected: Decimal,
    pub security_collected: Decimal,
    pub pending_rent: Decimal,
}

/// Collections for bookings starting within `from..=to`.
pub fn report_summary(store: &EntityStore, from: NaiveDate, to: NaiveDate) -> ReportSummary {
    let in_range: Vec<&Booking> = store
        .bookings
        .values()
        .filter(|b| b.start_date >= from && b.start_date <= to)
        .collect();

    let rent: Decimal = in_range.iter().map(|b| rent_collected(b)).sum();
    let security: Decimal = in_range.iter().map(|b| security_collected(b)).sum();
    let potential: Decimal = in_range.iter().map(|b| b.total_rent).sum();

    ReportSummary {
        from,
        to,
        total_bookings: in_range.len(),
        rent_collected: rent,
        security_collected: security,
        pending_rent: (potential - rent).max(Decimal::ZERO),
    }
}

fn group_by_phone<'a, I>(bookings: I) -> BTreeMap<String, Vec<&'a Booking>>
where
    I: IntoIterator<Item = &'a Booking>,
{
    let mut groups: BTreeMap<String, Vec<&'a Booking>> = BTreeMap::new();
    for b in bookings {
        groups.entry(b.customer_phone.clone()).or_default().push(b);
    }
    groups
}

fn last_start(bookings: &[&Booking]) -> NaiveDate {
    bookings
        .iter()
        .map(|b| b.start_date)
        .max()
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::booking::PaymentMode;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn booking(id: Id, phone: &str, status: BookingStatus, rent: i64, collected: i64) -> Booking {
        Booking {
            id,
            customer_name: format!("Customer {}", phone),
            customer_phone: phone.to_string(),
            vehicle_id: 101,
            battery_id: None,
            city_id: 1,
            start_date: date("2024-07-01"),
            end_date: date("2024-07-04"),
            daily_rent: Decimal::from(250),
            total_rent: Decimal::from(rent),
            security_deposit: Decimal::from(1000),
            amount_collected: Decimal::from(collected),
            mode_of_payment: PaymentMode::Cash,
            status,
            fine_amount: None,
            post_ride_checklist: None,
            post_ride_notes: None,
        }
    }

    #[test]
    fn test_pending_includes_deposit_while_active() {
        let mut b = booking(1, "1", BookingStatus::Active, 5000, 3000);
        b.fine_amount = Some(Decimal::from(200));
        assert_eq!(pending_amount(&b), Decimal::from(3200));

        b.status = BookingStatus::PendingPayment;
        assert_eq!(pending_amount(&b), Decimal::from(3200));
    }

    #[test]
    fn test_pending_drops_deposit_once_returned() {
        let mut b = booking(1, "1", BookingStatus::Returned, 750, 1750);
        b.fine_amount = Some(Decimal::from(600));
        assert_eq!(pending_amount(&b), Decimal::ZERO);

        b.amount_collected = Decimal::from(1000);
        assert_eq!(pending_amount(&b), Decimal::from(350));
    }

    #[test]
    fn test_days_overdue_reference_date() {
        let today = date("2024-07-15");
        let active = booking(1, "1", BookingStatus::Active, 750, 0);
        assert_eq!(days_overdue(&active, today), 14);

        let returned = booking(2, "1", BookingStatus::Returned, 750, 0);
        assert_eq!(days_overdue(&returned, today), 11);
    }

    #[test]
    fn test_critical_overdue_needs_pending_and_threshold() {
        let today = date("2024-07-15");
        let unpaid = booking(1, "1", BookingStatus::Returned, 750, 0);
        assert!(is_critical_overdue(&unpaid, today, 7));
        assert!(!is_critical_overdue(&unpaid, date("2024-07-10"), 7));

        let paid = booking(2, "1", BookingStatus::Returned, 750, 750);
        assert!(!is_critical_overdue(&paid, today, 7));
    }

    #[test]
    fn test_customer_pending_balance() {
        let bookings = vec![
            booking(1, "555", BookingStatus::Active, 5000, 3500),
            booking(2, "555", BookingStatus::Returned, 750, 1750),
            booking(3, "777", BookingStatus::Active, 750, 0),
        ];
        // Rent owed 5750, rent paid 2500 + 750.
        assert_eq!(customer_pending_balance(&bookings, "555"), Decimal::from(2500));
        assert_eq!(customer_pending_balance(&bookings, "000"), Decimal::ZERO);
    }

    #[test]
    fn test_city_dashboard_splits_collections() {
        let mut store = EntityStore::new();
        let mut today_booking = booking(1, "1", BookingStatus::Active, 750, 1750);
        today_booking.start_date = date("2024-07-20");
        store.bookings.insert(1, today_booking);
        store.bookings.insert(2, booking(2, "2", BookingStatus::Returned, 750, 1750));

        let dashboard = city_dashboard(&store, 1, date("2024-07-20"));
        assert_eq!(dashboard.rent_collected_today, Decimal::from(750));
        assert_eq!(dashboard.security_collected_today, Decimal::from(1000));
        assert_eq!(dashboard.active_rentals, 1);
        assert_eq!(dashboard.available_vehicles, 0);
    }

    #[test]
    fn test_city_customer_summaries_sorted_by_count() {
        let mut store = EntityStore::new();
        store.bookings.insert(1, booking(1, "a", BookingStatus::Returned, 750, 1750));
        store.bookings.insert(2, booking(2, "b", BookingStatus::Returned, 750, 1750));
        store.bookings.insert(3, booking(3, "b", BookingStatus::Active, 750, 1000));

        let summaries = city_customer_summaries(&store, 1);
        assert_eq!(summaries[0].phone, "b");
        assert_eq!(summaries[0].booking_count, 2);
        assert_eq!(summaries[0].total_days, 6);
        assert_eq!(summaries[0].pending_rent, Decimal::from(750));
        assert_eq!(summaries[1].phone, "a");
        assert!(city_customer_summaries(&store, 2).is_empty());
    }

    #[test]
    fn test_customer_directory_sorted_by_recency() {
        let mut store = EntityStore::new();
        let mut later = booking(2, "b", BookingStatus::Active, 750, 1750);
        later.start_date = date("2024-08-01");
        store.bookings.insert(1, booking(1, "a", BookingStatus::Returned, 750, 1750));
        store.bookings.insert(2, later);

        let directory = customer_directory(&store);
        assert_eq!(directory[0].phone, "b");
        assert_eq!(directory[0].last_booking_date, date("2024-08-01"));
        assert_eq!(directory[1].total_rent_collected, Decimal::from(750));
        assert_eq!(directory[1].total_security_collected, Decimal::from(1000));
    }

    #[test]
    fn test_report_summary_range_is_inclusive() {
        let mut store = EntityStore::new();
        store.bookings.insert(1, booking(1, "a", BookingStatus::Active, 5000, 3500));
        let mut outside = booking(2, "b", BookingStatus::Active, 750, 1750);
        outside.start_date = date("2024-09-01");
        store.bookings.insert(2, outside);

        let report = report_summary(&store, date("2024-07-01"), date("2024-07-31"));
        assert_eq!(report.total_bookings, 1);
        assert_eq!(report.rent_collected, Decimal::from(2500));
        assert_eq!(report.security_collected, Decimal::from(1000));
        assert_eq!(report.pending_rent, Decimal::from(2500));
    }
}
