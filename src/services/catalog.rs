//! Administrative maintenance of cities, rates, fleet and customers.
//!
//! Vehicle and battery edits go through the inventory layer so the
//! vehicle/battery link stays consistent in both directions.

use crate::entities::battery::{Battery, BatteryStatus};
use crate::entities::city::City;
use crate::entities::customer::Customer;
use crate::entities::rate::Rate;
use crate::entities::vehicle::Vehicle;
use crate::entities::Id;
use crate::error::{RentalError, RentalResult};
use crate::services::inventory;
use crate::services::rental::{BatteryFields, NewCustomer, NewRate, NewVehicle, RentalService};

impl RentalService {
    pub fn add_customer(&mut self, customer: NewCustomer) -> Customer {
        let customer = Customer {
            id: self.store.allocate_id(),
            name: customer.name,
            phone: customer.phone,
            address: customer.address,
            aadhar_number: customer.aadhar_number,
            pan_number: customer.pan_number,
            bank_details: customer.bank_details,
        };
        self.store.customers.insert(customer.id, customer.clone());

        tracing::info!(customer_id = customer.id, "Customer added");
        customer
    }

    // ============ Cities ============

    pub fn add_city(&mut self, name: String, zap_point_address: Option<String>) -> City {
        let city = City {
            id: self.store.allocate_id(),
            name,
            zap_point_address,
        };
        self.store.cities.insert(city.id, city.clone());

        tracing::info!(city_id = city.id, name = %city.name, "City added");
        city
    }

    pub fn update_city(&mut self, city_id: Id, name: String, zap_point_address: Option<String>) -> RentalResult<City> {
        let city = self
            .store
            .cities
            .get_mut(&city_id)
            .ok_or(RentalError::CityNotFound(city_id))?;
        city.name = name;
        city.zap_point_address = zap_point_address;

        tracing::info!(city_id, "City updated");
        Ok(city.clone())
    }

    // ============ Rates ============

    pub fn add_rate(&mut self, rate: NewRate) -> RentalResult<Rate> {
        self.ensure_city(rate.city_id)?;
        Ok(self.insert_rate(rate))
    }

    /// Add every rate or none of them.
    pub fn bulk_import_rates(&mut self, rates: Vec<NewRate>) -> RentalResult<Vec<Rate>> {
        for rate in &rates {
            self.ensure_city(rate.city_id)?;
        }
        Ok(rates.into_iter().map(|r| self.insert_rate(r)).collect())
    }

    pub fn update_rate(&mut self, rate_id: Id, fields: NewRate) -> RentalResult<Rate> {
        self.ensure_city(fields.city_id)?;
        let rate = self
            .store
            .rates
            .get_mut(&rate_id)
            .ok_or(RentalError::RateNotFound(rate_id))?;
        rate.city_id = fields.city_id;
        rate.client_name = fields.client_name;
        rate.daily_rent = fields.daily_rent;
        rate.monthly_rent = fields.monthly_rent;
        rate.security_deposit = fields.security_deposit;
        let rate = rate.clone();

        self.warn_on_duplicate_standard_rate(&rate);
        tracing::info!(rate_id, "Rate updated");
        Ok(rate)
    }

    pub fn delete_rate(&mut self, rate_id: Id) -> RentalResult<Rate> {
        let rate = self
            .store
            .rates
            .remove(&rate_id)
            .ok_or(RentalError::RateNotFound(rate_id))?;

        tracing::info!(rate_id, city_id = rate.city_id, "Rate deleted");
        Ok(rate)
    }

    fn insert_rate(&mut self, fields: NewRate) -> Rate {
        let rate = Rate {
            id: self.store.allocate_id(),
            city_id: fields.city_id,
            client_name: fields.client_name,
            daily_rent: fields.daily_rent,
            monthly_rent: fields.monthly_rent,
            security_deposit: fields.security_deposit,
        };
        self.store.rates.insert(rate.id, rate.clone());

        self.warn_on_duplicate_standard_rate(&rate);
        tracing::info!(rate_id = rate.id, city_id = rate.city_id, "Rate added");
        rate
    }

    // Accepted as-is; bookings in that city fail until one is removed.
    fn warn_on_duplicate_standard_rate(&self, rate: &Rate) {
        if !rate.is_standard() {
            return;
        }
        let count = self
            .store
            .rates
            .values()
            .filter(|r| r.city_id == rate.city_id && r.is_standard())
            .count();
        if count > 1 {
            tracing::warn!(city_id = rate.city_id, count, "City has more than one standard rate");
        }
    }

    // ============ Vehicles ============

    pub fn add_vehicle(&mut self, vehicle: NewVehicle) -> RentalResult<Vehicle> {
        self.check_vehicle_fields(&vehicle)?;
        Ok(self.insert_vehicle(vehicle))
    }

    /// Add every vehicle or none of them.
    pub fn bulk_import_vehicles(&mut self, vehicles: Vec<NewVehicle>) -> RentalResult<Vec<Vehicle>> {
        for vehicle in &vehicles {
            self.check_vehicle_fields(vehicle)?;
        }
        Ok(vehicles.into_iter().map(|v| self.insert_vehicle(v)).collect())
    }

    /// Administrative edit. Rebinding a battery moves it off any other
    /// vehicle; its status follows the vehicle (in use when rented).
    pub fn update_vehicle(&mut self, vehicle_id: Id, fields: NewVehicle) -> RentalResult<Vehicle> {
        if self.store.vehicle(vehicle_id).is_none() {
            return Err(RentalError::VehicleNotFound(vehicle_id));
        }
        self.check_vehicle_fields(&fields)?;

        inventory::apply_vehicle_edit(
            &mut self.store,
            Vehicle {
                id: vehicle_id,
                model_name: fields.model_name,
                city_id: fields.city_id,
                status: fields.status,
                battery_id: fields.battery_id,
            },
        );

        tracing::info!(vehicle_id, battery_id = ?fields.battery_id, "Vehicle updated");
        self.store
            .vehicle(vehicle_id)
            .cloned()
            .ok_or(RentalError::VehicleNotFound(vehicle_id))
    }

    /// Remove a vehicle, freeing the battery fitted to it.
    pub fn delete_vehicle(&mut self, vehicle_id: Id) -> RentalResult<Vehicle> {
        if self.store.vehicle(vehicle_id).is_none() {
            return Err(RentalError::VehicleNotFound(vehicle_id));
        }
        inventory::release_vehicle_battery(&mut self.store, vehicle_id);
        let vehicle = self
            .store
            .vehicles
            .remove(&vehicle_id)
            .ok_or(RentalError::VehicleNotFound(vehicle_id))?;

        tracing::info!(vehicle_id, "Vehicle deleted");
        Ok(vehicle)
    }

    fn check_vehicle_fields(&self, vehicle: &NewVehicle) -> RentalResult<()> {
        self.ensure_city(vehicle.city_id)?;
        if let Some(battery_id) = vehicle.battery_id {
            self.store
                .battery(battery_id)
                .ok_or(RentalError::BatteryNotFound(battery_id))?;
        }
        Ok(())
    }

    fn insert_vehicle(&mut self, fields: NewVehicle) -> Vehicle {
        let vehicle_id = self.store.allocate_id();
        // Inserted bare, then the battery is bound through the edit path.
        let vehicle = Vehicle {
            id: vehicle_id,
            model_name: fields.model_name,
            city_id: fields.city_id,
            status: fields.status,
            battery_id: None,
        };
        self.store.vehicles.insert(vehicle_id, vehicle.clone());

        if fields.battery_id.is_some() {
            inventory::apply_vehicle_edit(
                &mut self.store,
                Vehicle {
                    battery_id: fields.battery_id,
                    ..vehicle.clone()
                },
            );
        }

        tracing::info!(vehicle_id, "Vehicle added");
        self.store.vehicle(vehicle_id).cloned().unwrap_or(vehicle)
    }

    // ============ Batteries ============

    /// New batteries start unassigned; fit them through a vehicle edit.
    pub fn add_battery(&mut self, fields: BatteryFields) -> RentalResult<Battery> {
        self.ensure_city(fields.city_id)?;
        Ok(self.insert_battery(fields))
    }

    /// Add every battery or none of them.
    pub fn bulk_import_batteries(&mut self, batteries: Vec<BatteryFields>) -> RentalResult<Vec<Battery>> {
        for battery in &batteries {
            self.ensure_city(battery.city_id)?;
        }
        Ok(batteries.into_iter().map(|b| self.insert_battery(b)).collect())
    }

    /// Edit a battery's own fields. The vehicle link is left as is, and so is
    /// `InUse`: only bookings put a pack into use or take it out.
    pub fn update_battery(&mut self, battery_id: Id, fields: BatteryFields) -> RentalResult<Battery> {
        self.ensure_city(fields.city_id)?;
        let battery = self
            .store
            .batteries
            .get_mut(&battery_id)
            .ok_or(RentalError::BatteryNotFound(battery_id))?;

        let in_use = battery.status == BatteryStatus::InUse;
        if in_use != (fields.status == BatteryStatus::InUse) {
            tracing::warn!(
                battery_id,
                current = ?battery.status,
                requested = ?fields.status,
                "In-use status is owned by bookings, keeping current status"
            );
        } else {
            battery.status = fields.status;
        }
        battery.serial_number = fields.serial_number;
        battery.city_id = fields.city_id;
        battery.charge_percentage = fields.charge_percentage;

        tracing::info!(battery_id, "Battery updated");
        Ok(battery.clone())
    }

    /// Remove a battery, clearing it from the vehicle it is fitted to.
    pub fn delete_battery(&mut self, battery_id: Id) -> RentalResult<Battery> {
        if self.store.battery(battery_id).is_none() {
            return Err(RentalError::BatteryNotFound(battery_id));
        }
        inventory::detach_battery(&mut self.store, battery_id);
        let battery = self
            .store
            .batteries
            .remove(&battery_id)
            .ok_or(RentalError::BatteryNotFound(battery_id))?;

        tracing::info!(battery_id, "Battery deleted");
        Ok(battery)
    }

    fn insert_battery(&mut self, fields: BatteryFields) -> Battery {
        let battery = Battery {
            id: self.store.allocate_id(),
            serial_number: fields.serial_number,
            city_id: fields.city_id,
            status: fields.status,
            charge_percentage: fields.charge_percentage,
            assigned_vehicle_id: None,
        };
        self.store.batteries.insert(battery.id, battery.clone());

        tracing::info!(battery_id = battery.id, "Battery added");
        battery
    }

    fn ensure_city(&self, city_id: Id) -> RentalResult<()> {
        self.store
            .city(city_id)
            .map(|_| ())
            .ok_or(RentalError::CityNotFound(city_id))
    }
}
