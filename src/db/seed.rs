//! Demo fleet loaded at startup when `SEED_DEMO_DATA` is set.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::EntityStore;
use crate::entities::battery::{Battery, BatteryStatus};
use crate::entities::booking::{Booking, BookingStatus, PaymentMode};
use crate::entities::city::City;
use crate::entities::customer::{BankDetails, Customer};
use crate::entities::rate::Rate;
use crate::entities::user::{User, UserRole};
use crate::entities::vehicle::{Vehicle, VehicleStatus};
use crate::entities::Id;
use crate::services::inventory::battery_link_violations;

pub fn demo_store() -> EntityStore {
    let mut store = EntityStore::new();

    for (id, name) in [(1, "San Francisco"), (2, "New York"), (3, "Austin")] {
        insert_city(&mut store, id, name);
    }

    for (id, city_id, client, daily, monthly, deposit) in [
        (1, 1, None, 250, 5000, 1000),
        (2, 2, None, 300, 6000, 1200),
        (3, 3, None, 220, 4500, 900),
        (4, 1, Some("Corporate A"), 200, 4000, 800),
    ] {
        store.reserve_id(id);
        store.rates.insert(
            id,
            Rate {
                id,
                city_id,
                client_name: client.map(str::to_string),
                daily_rent: Decimal::from(daily),
                monthly_rent: Some(Decimal::from(monthly)),
                security_deposit: Decimal::from(deposit),
            },
        );
    }

    for (id, serial, city_id, status, charge, vehicle) in [
        (1, "BATT-SF-001", 1, BatteryStatus::InUse, 88, Some(102)),
        (2, "BATT-SF-002", 1, BatteryStatus::Available, 100, None),
        (3, "BATT-NYC-001", 2, BatteryStatus::Charging, 45, None),
        (4, "BATT-NYC-002", 2, BatteryStatus::Available, 92, Some(103)),
        (5, "BATT-AU-001", 3, BatteryStatus::Available, 76, Some(105)),
        (6, "BATT-SF-003", 1, BatteryStatus::Maintenance, 0, None),
    ] {
        store.reserve_id(id);
        store.batteries.insert(
            id,
            Battery {
                id,
                serial_number: serial.to_string(),
                city_id,
                status,
                charge_percentage: charge,
                assigned_vehicle_id: vehicle,
            },
        );
    }

    for (id, model, city_id, status, battery) in [
        (101, "E-Bike One", 1, VehicleStatus::Available, None),
        (102, "E-Bike One", 1, VehicleStatus::Rented, Some(1)),
        (103, "E-Scooter Plus", 2, VehicleStatus::Available, Some(4)),
        (104, "E-Scooter Plus", 2, VehicleStatus::Maintenance, None),
        (105, "E-Bike Pro", 3, VehicleStatus::Available, Some(5)),
        (106, "E-Bike Pro", 1, VehicleStatus::Available, None),
    ] {
        store.reserve_id(id);
        store.vehicles.insert(
            id,
            Vehicle {
                id,
                model_name: model.to_string(),
                city_id,
                status,
                battery_id: battery,
            },
        );
    }

    for (id, name, role, city_id) in [
        (1, "Admin User", UserRole::Admin, 1),
        (2, "Operator SF", UserRole::Operator, 1),
        (3, "Operator NYC", UserRole::Operator, 2),
    ] {
        store.reserve_id(id);
        store.users.insert(
            id,
            User {
                id,
                name: name.to_string(),
                role,
                city_id,
            },
        );
    }

    store.reserve_id(1);
    store.customers.insert(
        1,
        Customer {
            id: 1,
            name: "John Doe".to_string(),
            phone: "123-456-7890".to_string(),
            address: "123 Market St, San Francisco".to_string(),
            aadhar_number: "123456789012".to_string(),
            pan_number: "ABCDE1234F".to_string(),
            bank_details: BankDetails {
                account_name: "John Doe".to_string(),
                account_number: "9876543210".to_string(),
                bank_name: "City Bank".to_string(),
                ifsc_code: "CITI0001234".to_string(),
            },
        },
    );

    store.reserve_id(1);
    store.bookings.insert(
        1,
        Booking {
            id: 1,
            customer_name: "John Doe".to_string(),
            customer_phone: "123-456-7890".to_string(),
            vehicle_id: 102,
            battery_id: Some(1),
            city_id: 1,
            start_date: ymd(2024, 7, 28),
            end_date: ymd(2024, 7, 30),
            daily_rent: Decimal::from(25),
            total_rent: Decimal::from(50),
            security_deposit: Decimal::from(100),
            amount_collected: Decimal::from(150),
            mode_of_payment: PaymentMode::Card,
            status: BookingStatus::Active,
            fine_amount: None,
            post_ride_checklist: None,
            post_ride_notes: None,
        },
    );

    for violation in battery_link_violations(&store) {
        tracing::warn!(%violation, "Inconsistent demo data");
    }

    tracing::debug!(
        vehicles = store.vehicles.len(),
        batteries = store.batteries.len(),
        "Demo store seeded"
    );
    store
}

fn insert_city(store: &mut EntityStore, id: Id, name: &str) {
    store.reserve_id(id);
    store.cities.insert(
        id,
        City {
            id,
            name: name.to_string(),
            zap_point_address: None,
        },
    );
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::rates::resolve_standard_rate;

    #[test]
    fn test_demo_store_is_consistent() {
        let store = demo_store();
        assert!(battery_link_violations(&store).is_empty());
        assert_eq!(store.cities().count(), 3);
        assert_eq!(store.vehicles().count(), 6);
        assert_eq!(store.batteries().count(), 6);
        assert_eq!(store.users().count(), 3);
    }

    #[test]
    fn test_every_city_has_one_standard_rate() {
        let store = demo_store();
        for city in store.cities() {
            assert!(resolve_standard_rate(store.rates(), city.id).is_ok());
        }
        assert_eq!(
            resolve_standard_rate(store.rates(), 1).unwrap().daily_rent,
            Decimal::from(250)
        );
    }

    #[test]
    fn test_allocator_starts_past_seed_ids() {
        let mut store = demo_store();
        assert_eq!(store.allocate_id(), 107);
    }
}
