use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use super::non_negative;
use crate::entities::booking::Booking;
use crate::entities::customer::{BankDetails, Customer};
use crate::entities::Id;
use crate::error::AppResult;
use crate::services::checklist::{ChecklistItem, POST_RIDE_CHECKLIST_ITEMS};
use crate::services::queries::{BookingView, CityCustomerSummary, CityDashboard};
use crate::services::rental::{NewBooking, NewCustomer, ReturnChecklist, ReturnOutcome};
use crate::AppState;

// ============ Bookings ============

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub customer_id: Id,
    pub vehicle_id: Id,
    pub battery_id: Option<Id>,
    pub city_id: Id,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    pub cash_collected: Decimal,
    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    pub online_collected: Decimal,
    #[serde(default)]
    pub split_payment: bool,
}

#[derive(Debug, Deserialize)]
pub struct BookingFilter {
    pub city_id: Option<Id>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeBatteryRequest {
    pub battery_id: Id,
}

#[derive(Debug, Deserialize)]
pub struct ReturnBookingRequest {
    /// Checklist label to "damaged".
    #[serde(default)]
    pub checklist: BTreeMap<String, bool>,
    pub notes: Option<String>,
    /// Set once the fine in excess of the deposit has been collected.
    #[serde(default)]
    pub settlement_confirmed: bool,
}

/// Health check
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Damage catalog used on return
pub async fn checklist() -> Json<&'static [ChecklistItem]> {
    Json(POST_RIDE_CHECKLIST_ITEMS)
}

/// List bookings with derived values, optionally for one city
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(filter): Query<BookingFilter>,
) -> AppResult<Json<Vec<BookingView>>> {
    let rental = state.rental.read().await;
    Ok(Json(rental.booking_views(filter.city_id)))
}

pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> AppResult<Json<BookingView>> {
    let rental = state.rental.read().await;
    Ok(Json(rental.booking_view(id)?))
}

/// Create a booking; collected cash + online must equal the amount payable now
pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<Json<Booking>> {
    payload.validate()?;

    let booking = state.rental.write().await.create_booking(NewBooking {
        customer_id: payload.customer_id,
        vehicle_id: payload.vehicle_id,
        battery_id: payload.battery_id,
        city_id: payload.city_id,
        start_date: payload.start_date,
        end_date: payload.end_date,
        cash_collected: payload.cash_collected,
        online_collected: payload.online_collected,
        split_payment: payload.split_payment,
    })?;

    Ok(Json(booking))
}

/// Swap the battery on a running rental
pub async fn change_battery(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(payload): Json<ChangeBatteryRequest>,
) -> AppResult<Json<Booking>> {
    let booking = state
        .rental
        .write()
        .await
        .change_battery(id, payload.battery_id)?;
    Ok(Json(booking))
}

/// Return a vehicle with its post-ride checklist
pub async fn return_booking(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(payload): Json<ReturnBookingRequest>,
) -> AppResult<Json<ReturnOutcome>> {
    let outcome = state.rental.write().await.return_booking(
        id,
        ReturnChecklist {
            items: payload.checklist,
            notes: payload.notes,
            settlement_confirmed: payload.settlement_confirmed,
        },
    )?;
    Ok(Json(outcome))
}

/// Collect everything owed on a booking
pub async fn settle_due(State(state): State<AppState>, Path(id): Path<Id>) -> AppResult<Json<Booking>> {
    let booking = state.rental.write().await.settle_due(id)?;
    Ok(Json(booking))
}

pub async fn flag_pending_payment(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> AppResult<Json<Booking>> {
    let booking = state.rental.write().await.flag_pending_payment(id)?;
    Ok(Json(booking))
}

// ============ Customers ============

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 5, max = 20))]
    pub phone: String,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(length(equal = 12))]
    pub aadhar_number: String,
    #[validate(length(equal = 10))]
    pub pan_number: String,
    pub bank_details: BankDetails,
}

#[derive(Debug, Serialize)]
pub struct PendingBalanceResponse {
    pub customer_id: Id,
    pub pending_balance: Decimal,
}

pub async fn list_customers(State(state): State<AppState>) -> AppResult<Json<Vec<Customer>>> {
    let rental = state.rental.read().await;
    Ok(Json(rental.store().customers().cloned().collect()))
}

pub async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerRequest>,
) -> AppResult<Json<Customer>> {
    payload.validate()?;

    let customer = state.rental.write().await.add_customer(NewCustomer {
        name: payload.name,
        phone: payload.phone,
        address: payload.address,
        aadhar_number: payload.aadhar_number,
        pan_number: payload.pan_number,
        bank_details: payload.bank_details,
    });
    Ok(Json(customer))
}

/// Outstanding rent that blocks new bookings for this customer
pub async fn customer_pending(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> AppResult<Json<PendingBalanceResponse>> {
    let rental = state.rental.read().await;
    Ok(Json(PendingBalanceResponse {
        customer_id: id,
        pending_balance: rental.customer_pending(id)?,
    }))
}

// ============ City desk ============

pub async fn city_dashboard(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> AppResult<Json<CityDashboard>> {
    let rental = state.rental.read().await;
    Ok(Json(rental.city_dashboard(id)?))
}

pub async fn city_customers(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> AppResult<Json<Vec<CityCustomerSummary>>> {
    let rental = state.rental.read().await;
    Ok(Json(rental.city_customers(id)?))
}
