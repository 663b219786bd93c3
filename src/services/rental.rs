//! The rental core: one service object owning the entity store. Its methods
//! are the only way entity state changes.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::EntityStore;
use crate::entities::battery::{Battery, BatteryStatus};
use crate::entities::booking::Booking;
use crate::entities::customer::BankDetails;
use crate::entities::refund_request::RefundRequest;
use crate::entities::vehicle::VehicleStatus;
use crate::entities::Id;
use crate::error::{RentalError, RentalResult};
use crate::services::clock::Clock;
use crate::services::queries::{self, BookingView, CityCustomerSummary, CityDashboard, CustomerDirectoryEntry, ReportSummary};

pub struct RentalService {
    pub(crate) store: EntityStore,
    clock: Arc<dyn Clock>,
    critical_overdue_days: i64,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub customer_id: Id,
    pub vehicle_id: Id,
    pub battery_id: Option<Id>,
    pub city_id: Id,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cash_collected: Decimal,
    pub online_collected: Decimal,
    pub split_payment: bool,
}

/// What the operator records when a vehicle comes back.
#[derive(Debug, Clone, Default)]
pub struct ReturnChecklist {
    /// Checklist label to "damaged" flag.
    pub items: BTreeMap<String, bool>,
    pub notes: Option<String>,
    /// Operator confirms the excess of fines over the deposit was collected.
    pub settlement_confirmed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnReceipt {
    pub booking: Booking,
    pub total_fine: Decimal,
    pub net_diff: Decimal,
    pub settlement_adjustment: Decimal,
    pub refund_request: Option<RefundRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReturnOutcome {
    Returned(ReturnReceipt),
    AlreadyReturned { booking: Booking },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RefundOutcome {
    Processed {
        request: RefundRequest,
        booking: Option<Booking>,
    },
    AlreadyProcessed { request: RefundRequest },
}

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub aadhar_number: String,
    pub pan_number: String,
    pub bank_details: BankDetails,
}

#[derive(Debug, Clone)]
pub struct NewRate {
    pub city_id: Id,
    pub client_name: Option<String>,
    pub daily_rent: Decimal,
    pub monthly_rent: Option<Decimal>,
    pub security_deposit: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub model_name: String,
    pub city_id: Id,
    pub status: VehicleStatus,
    pub battery_id: Option<Id>,
}

/// Battery fields an administrator may set. The vehicle link is owned by the
/// inventory layer and cannot be written directly.
#[derive(Debug, Clone)]
pub struct BatteryFields {
    pub serial_number: String,
    pub city_id: Id,
    pub status: BatteryStatus,
    pub charge_percentage: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryPurpose {
    /// Fitting on a new booking: available or charging packs.
    Booking,
    /// Swapping into a running rental: available packs only.
    Swap,
}

impl RentalService {
    pub fn new(store: EntityStore, clock: Arc<dyn Clock>, critical_overdue_days: i64) -> Self {
        Self {
            store,
            clock,
            critical_overdue_days,
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn booking_views(&self, city_id: Option<Id>) -> Vec<BookingView> {
        let today = self.today();
        self.store
            .bookings
            .values()
            .filter(|b| city_id.is_none_or(|c| b.city_id == c))
            .map(|b| BookingView::new(b, today, self.critical_overdue_days))
            .collect()
    }

    pub fn booking_view(&self, booking_id: Id) -> RentalResult<BookingView> {
        let booking = self
            .store
            .booking(booking_id)
            .ok_or(RentalError::BookingNotFound(booking_id))?;
        Ok(BookingView::new(booking, self.today(), self.critical_overdue_days))
    }

    /// Outstanding rent that would block a new booking for this customer.
    pub fn customer_pending(&self, customer_id: Id) -> RentalResult<Decimal> {
        let customer = self
            .store
            .customer(customer_id)
            .ok_or(RentalError::CustomerNotFound(customer_id))?;
        Ok(queries::customer_pending_balance(
            self.store.bookings.values(),
            &customer.phone,
        ))
    }

    pub fn city_dashboard(&self, city_id: Id) -> RentalResult<CityDashboard> {
        self.store
            .city(city_id)
            .ok_or(RentalError::CityNotFound(city_id))?;
        Ok(queries::city_dashboard(&self.store, city_id, self.today()))
    }

    pub fn city_customers(&self, city_id: Id) -> RentalResult<Vec<CityCustomerSummary>> {
        self.store
            .city(city_id)
            .ok_or(RentalError::CityNotFound(city_id))?;
        Ok(queries::city_customer_summaries(&self.store, city_id))
    }

    pub fn customer_directory(&self) -> Vec<CustomerDirectoryEntry> {
        queries::customer_directory(&self.store)
    }

    /// Collections report; defaults to the thirty days up to today.
    pub fn report(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> ReportSummary {
        let to = to.unwrap_or_else(|| self.today());
        let from = from.unwrap_or_else(|| {
            to.checked_sub_signed(chrono::Duration::days(30))
                .unwrap_or(NaiveDate::MIN)
        });
        queries::report_summary(&self.store, from, to)
    }

    pub fn available_batteries(&self, purpose: BatteryPurpose) -> Vec<&Battery> {
        self.store
            .batteries
            .values()
            .filter(|b| match purpose {
                BatteryPurpose::Booking => b.is_bookable(),
                BatteryPurpose::Swap => b.is_swappable(),
            })
            .collect()
    }
}
