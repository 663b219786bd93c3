//! Keeps `Vehicle::battery_id` and `Battery::assigned_vehicle_id` pointing at
//! each other.
//!
//! Every function here tolerates dangling ids: a missing vehicle or battery is
//! logged and the dependent mutation is skipped.

use crate::db::EntityStore;
use crate::entities::battery::BatteryStatus;
use crate::entities::vehicle::{Vehicle, VehicleStatus};
use crate::entities::Id;

/// Mark a vehicle as rented and fit it with the booking's battery.
///
/// When a battery is chosen it replaces whatever the vehicle carried. Without
/// one the vehicle keeps its fitted battery, which goes into use with it.
/// Returns the battery the vehicle now carries.
pub fn assign_on_booking(
    store: &mut EntityStore,
    vehicle_id: Id,
    battery_id: Option<Id>,
) -> Option<Id> {
    let Some(vehicle) = store.vehicles.get_mut(&vehicle_id) else {
        tracing::warn!(vehicle_id, "Vehicle missing while assigning booking, skipping");
        return None;
    };
    vehicle.status = VehicleStatus::Rented;
    let fitted = vehicle.battery_id;

    match battery_id {
        Some(new_id) => {
            if fitted.is_some_and(|old| old != new_id) {
                release_vehicle_battery(store, vehicle_id);
            }
            bind_battery(store, vehicle_id, new_id, BatteryStatus::InUse).then_some(new_id)
        }
        None => {
            let old_id = fitted?;
            bind_battery(store, vehicle_id, old_id, BatteryStatus::InUse).then_some(old_id)
        }
    }
}

/// Replace the battery on a rented vehicle. The old pack (if any) is freed and
/// the new one bound in the same step. Returns the released battery id.
pub fn swap_battery(store: &mut EntityStore, vehicle_id: Id, new_battery_id: Id) -> Option<Id> {
    let Some(vehicle) = store.vehicles.get(&vehicle_id) else {
        tracing::warn!(vehicle_id, "Vehicle missing during battery swap, skipping");
        return None;
    };
    let old_battery_id = vehicle.battery_id.filter(|old| *old != new_battery_id);

    if old_battery_id.is_some() {
        release_vehicle_battery(store, vehicle_id);
    }
    bind_battery(store, vehicle_id, new_battery_id, BatteryStatus::InUse);

    old_battery_id
}

/// Bring a vehicle back into the available pool and free its battery.
pub fn release_on_return(store: &mut EntityStore, vehicle_id: Id) {
    let Some(vehicle) = store.vehicles.get_mut(&vehicle_id) else {
        tracing::warn!(vehicle_id, "Vehicle missing on return, skipping inventory release");
        return;
    };
    vehicle.status = VehicleStatus::Available;

    if let Some(battery_id) = vehicle.battery_id.take() {
        release_battery(store, battery_id);
    }
}

/// Apply an administrative vehicle edit. If the battery changed, the old one
/// is freed and the new one bound; the new battery is in use only when the
/// vehicle's edited status is `Rented`.
///
/// Returns `false` when the vehicle does not exist.
pub fn apply_vehicle_edit(store: &mut EntityStore, edited: Vehicle) -> bool {
    let Some(original) = store.vehicles.get(&edited.id) else {
        tracing::warn!(vehicle_id = edited.id, "Vehicle missing on edit, skipping");
        return false;
    };
    let old_battery_id = original.battery_id;
    let new_battery_id = edited.battery_id;
    let vehicle_id = edited.id;
    let battery_status = if edited.status == VehicleStatus::Rented {
        BatteryStatus::InUse
    } else {
        BatteryStatus::Available
    };

    store.vehicles.insert(vehicle_id, edited);

    if old_battery_id != new_battery_id {
        if let Some(old_id) = old_battery_id {
            release_battery(store, old_id);
        }
        if let Some(new_id) = new_battery_id {
            if !bind_battery(store, vehicle_id, new_id, battery_status) {
                if let Some(vehicle) = store.vehicles.get_mut(&vehicle_id) {
                    vehicle.battery_id = None;
                }
            }
        }
    }

    true
}

/// Detach a vehicle's battery ahead of deleting the vehicle.
pub fn release_vehicle_battery(store: &mut EntityStore, vehicle_id: Id) {
    let battery_id = store
        .vehicles
        .get_mut(&vehicle_id)
        .and_then(|v| v.battery_id.take());
    if let Some(battery_id) = battery_id {
        release_battery(store, battery_id);
    }
}

/// Clear the back-reference of the vehicle carrying `battery_id`, ahead of
/// deleting the battery.
pub fn detach_battery(store: &mut EntityStore, battery_id: Id) {
    let vehicle_id = store
        .batteries
        .get(&battery_id)
        .and_then(|b| b.assigned_vehicle_id);
    if let Some(vehicle) = vehicle_id.and_then(|id| store.vehicles.get_mut(&id)) {
        if vehicle.battery_id == Some(battery_id) {
            vehicle.battery_id = None;
        }
    }
}

/// Every broken vehicle/battery link in the store, as human-readable
/// descriptions. Empty when the store is consistent.
pub fn battery_link_violations(store: &EntityStore) -> Vec<String> {
    let mut violations = Vec::new();

    for vehicle in store.vehicles.values() {
        if let Some(battery_id) = vehicle.battery_id {
            match store.batteries.get(&battery_id) {
                Some(b) if b.assigned_vehicle_id == Some(vehicle.id) => {}
                Some(b) => violations.push(format!(
                    "vehicle {} carries battery {} assigned to {:?}",
                    vehicle.id, battery_id, b.assigned_vehicle_id
                )),
                None => violations.push(format!(
                    "vehicle {} carries missing battery {}",
                    vehicle.id, battery_id
                )),
            }
        }
    }

    for battery in store.batteries.values() {
        if let Some(vehicle_id) = battery.assigned_vehicle_id {
            let linked = store
                .vehicles
                .get(&vehicle_id)
                .is_some_and(|v| v.battery_id == Some(battery.id));
            if !linked {
                violations.push(format!(
                    "battery {} assigned to vehicle {} which does not carry it",
                    battery.id, vehicle_id
                ));
            }
        }
    }

    violations
}

fn release_battery(store: &mut EntityStore, battery_id: Id) {
    match store.batteries.get_mut(&battery_id) {
        Some(battery) => {
            battery.status = BatteryStatus::Available;
            battery.assigned_vehicle_id = None;
        }
        None => tracing::warn!(battery_id, "Battery missing on release, skipping"),
    }
}

/// Bind `battery_id` to `vehicle_id` on both sides. A vehicle that previously
/// carried this battery loses it.
fn bind_battery(store: &mut EntityStore, vehicle_id: Id, battery_id: Id, status: BatteryStatus) -> bool {
    let Some(battery) = store.batteries.get_mut(&battery_id) else {
        tracing::warn!(battery_id, vehicle_id, "Battery missing on bind, skipping");
        return false;
    };
    let previous_vehicle = battery.assigned_vehicle_id.replace(vehicle_id);
    battery.status = status;

    if let Some(other_id) = previous_vehicle.filter(|v| *v != vehicle_id) {
        if let Some(other) = store.vehicles.get_mut(&other_id) {
            if other.battery_id == Some(battery_id) {
                tracing::warn!(battery_id, from = other_id, to = vehicle_id, "Battery moved between vehicles");
                other.battery_id = None;
            }
        }
    }

    if let Some(vehicle) = store.vehicles.get_mut(&vehicle_id) {
        vehicle.battery_id = Some(battery_id);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::battery::Battery;

    fn vehicle(id: Id, status: VehicleStatus, battery_id: Option<Id>) -> Vehicle {
        Vehicle {
            id,
            model_name: "E-Bike One".to_string(),
            city_id: 1,
            status,
            battery_id,
        }
    }

    fn battery(id: Id, status: BatteryStatus, assigned: Option<Id>) -> Battery {
        Battery {
            id,
            serial_number: format!("BATT-{}", id),
            city_id: 1,
            status,
            charge_percentage: 90,
            assigned_vehicle_id: assigned,
        }
    }

    fn store() -> EntityStore {
        let mut store = EntityStore::new();
        for v in [
            vehicle(101, VehicleStatus::Available, None),
            vehicle(102, VehicleStatus::Rented, Some(1)),
            vehicle(103, VehicleStatus::Available, Some(4)),
        ] {
            store.vehicles.insert(v.id, v);
        }
        for b in [
            battery(1, BatteryStatus::InUse, Some(102)),
            battery(2, BatteryStatus::Available, None),
            battery(3, BatteryStatus::Charging, None),
            battery(4, BatteryStatus::Available, Some(103)),
        ] {
            store.batteries.insert(b.id, b);
        }
        store
    }

    #[test]
    fn test_assign_binds_chosen_battery() {
        let mut store = store();
        assert_eq!(assign_on_booking(&mut store, 101, Some(2)), Some(2));

        assert_eq!(store.vehicle(101).unwrap().status, VehicleStatus::Rented);
        assert_eq!(store.vehicle(101).unwrap().battery_id, Some(2));
        assert_eq!(store.battery(2).unwrap().status, BatteryStatus::InUse);
        assert_eq!(store.battery(2).unwrap().assigned_vehicle_id, Some(101));
        assert!(battery_link_violations(&store).is_empty());
    }

    #[test]
    fn test_assign_without_battery_keeps_fitted_one() {
        let mut store = store();
        assert_eq!(assign_on_booking(&mut store, 103, None), Some(4));
        assert_eq!(store.battery(4).unwrap().status, BatteryStatus::InUse);
        assert!(battery_link_violations(&store).is_empty());
    }

    #[test]
    fn test_assign_replaces_fitted_battery() {
        let mut store = store();
        assign_on_booking(&mut store, 103, Some(3));

        assert_eq!(store.vehicle(103).unwrap().battery_id, Some(3));
        assert_eq!(store.battery(4).unwrap().assigned_vehicle_id, None);
        assert_eq!(store.battery(4).unwrap().status, BatteryStatus::Available);
        assert!(battery_link_violations(&store).is_empty());
    }

    #[test]
    fn test_swap_releases_old_and_binds_new() {
        let mut store = store();
        assert_eq!(swap_battery(&mut store, 102, 2), Some(1));

        assert_eq!(store.battery(1).unwrap().status, BatteryStatus::Available);
        assert_eq!(store.battery(1).unwrap().assigned_vehicle_id, None);
        assert_eq!(store.battery(2).unwrap().status, BatteryStatus::InUse);
        assert_eq!(store.battery(2).unwrap().assigned_vehicle_id, Some(102));
        assert_eq!(store.vehicle(102).unwrap().battery_id, Some(2));
        assert!(battery_link_violations(&store).is_empty());
    }

    #[test]
    fn test_release_on_return() {
        let mut store = store();
        release_on_return(&mut store, 102);

        let v = store.vehicle(102).unwrap();
        assert_eq!(v.status, VehicleStatus::Available);
        assert_eq!(v.battery_id, None);
        assert_eq!(store.battery(1).unwrap().status, BatteryStatus::Available);
        assert!(battery_link_violations(&store).is_empty());
    }

    #[test]
    fn test_dangling_references_are_skipped() {
        let mut store = store();
        let before = store.clone();

        release_on_return(&mut store, 999);
        assert_eq!(swap_battery(&mut store, 999, 2), None);
        assert_eq!(assign_on_booking(&mut store, 999, Some(2)), None);
        assert!(!apply_vehicle_edit(&mut store, vehicle(999, VehicleStatus::Rented, Some(2))));

        assert_eq!(store.batteries, before.batteries);
        assert_eq!(store.vehicles, before.vehicles);
    }

    #[test]
    fn test_swap_to_missing_battery_still_frees_old() {
        let mut store = store();
        swap_battery(&mut store, 102, 42);

        assert_eq!(store.battery(1).unwrap().assigned_vehicle_id, None);
        assert_eq!(store.vehicle(102).unwrap().battery_id, None);
        assert!(battery_link_violations(&store).is_empty());
    }

    #[test]
    fn test_edit_follows_post_edit_status() {
        let mut store = store();
        // Vehicle goes to rented and gets battery 2 in the same edit.
        apply_vehicle_edit(&mut store, vehicle(101, VehicleStatus::Rented, Some(2)));
        assert_eq!(store.battery(2).unwrap().status, BatteryStatus::InUse);
        assert_eq!(store.battery(2).unwrap().assigned_vehicle_id, Some(101));

        // Rented vehicle moved to maintenance with a different battery.
        apply_vehicle_edit(&mut store, vehicle(102, VehicleStatus::Maintenance, Some(3)));
        assert_eq!(store.battery(3).unwrap().status, BatteryStatus::Available);
        assert_eq!(store.battery(3).unwrap().assigned_vehicle_id, Some(102));
        assert_eq!(store.battery(1).unwrap().assigned_vehicle_id, None);
        assert!(battery_link_violations(&store).is_empty());
    }

    #[test]
    fn test_edit_taking_battery_from_another_vehicle() {
        let mut store = store();
        apply_vehicle_edit(&mut store, vehicle(101, VehicleStatus::Available, Some(4)));

        assert_eq!(store.vehicle(103).unwrap().battery_id, None);
        assert_eq!(store.battery(4).unwrap().assigned_vehicle_id, Some(101));
        assert!(battery_link_violations(&store).is_empty());
    }

    #[test]
    fn test_edit_without_battery_change_leaves_battery_alone() {
        let mut store = store();
        apply_vehicle_edit(&mut store, vehicle(102, VehicleStatus::Maintenance, Some(1)));
        assert_eq!(store.battery(1).unwrap().status, BatteryStatus::InUse);
        assert_eq!(store.vehicle(102).unwrap().status, VehicleStatus::Maintenance);
    }

    #[test]
    fn test_delete_helpers_keep_links() {
        let mut store = store();
        release_vehicle_battery(&mut store, 102);
        store.vehicles.remove(&102);
        assert_eq!(store.battery(1).unwrap().assigned_vehicle_id, None);

        detach_battery(&mut store, 4);
        store.batteries.remove(&4);
        assert_eq!(store.vehicle(103).unwrap().battery_id, None);
        assert!(battery_link_violations(&store).is_empty());
    }
}
