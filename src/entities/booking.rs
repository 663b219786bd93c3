use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    Active,
    Returned,
    PendingPayment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMode {
    Cash,
    #[serde(rename = "UPI")]
    Upi,
    Card,
    Other,
}

impl PaymentMode {
    /// Mode recorded for a booking paid with the given cash/online split.
    pub fn from_split(cash: Decimal, online: Decimal) -> Self {
        match (cash > Decimal::ZERO, online > Decimal::ZERO) {
            (true, true) => PaymentMode::Other,
            (true, false) => PaymentMode::Cash,
            (false, true) => PaymentMode::Upi,
            (false, false) => PaymentMode::Other,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Id,
    pub customer_name: String,
    pub customer_phone: String,
    pub vehicle_id: Id,
    pub battery_id: Option<Id>,
    pub city_id: Id,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub daily_rent: Decimal,
    /// Fixed when the booking is created; later operations never recompute it.
    pub total_rent: Decimal,
    pub security_deposit: Decimal,
    pub amount_collected: Decimal,
    pub mode_of_payment: PaymentMode,
    pub status: BookingStatus,
    pub fine_amount: Option<Decimal>,
    pub post_ride_checklist: Option<BTreeMap<String, bool>>,
    pub post_ride_notes: Option<String>,
}

impl Booking {
    pub fn fine(&self) -> Decimal {
        self.fine_amount.unwrap_or(Decimal::ZERO)
    }
}
