use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use super::non_negative;
use crate::entities::battery::{Battery, BatteryStatus};
use crate::entities::city::City;
use crate::entities::rate::Rate;
use crate::entities::refund_request::RefundRequest;
use crate::entities::user::User;
use crate::entities::vehicle::{Vehicle, VehicleStatus};
use crate::entities::Id;
use crate::error::AppResult;
use crate::services::queries::{CustomerDirectoryEntry, ReportSummary};
use crate::services::rental::{BatteryFields, BatteryPurpose, NewRate, NewVehicle, RefundOutcome};
use crate::AppState;

// ============ Cities ============

#[derive(Debug, Deserialize, Validate)]
pub struct CityRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub zap_point_address: Option<String>,
}

pub async fn list_cities(State(state): State<AppState>) -> AppResult<Json<Vec<City>>> {
    let rental = state.rental.read().await;
    Ok(Json(rental.store().cities().cloned().collect()))
}

pub async fn create_city(
    State(state): State<AppState>,
    Json(payload): Json<CityRequest>,
) -> AppResult<Json<City>> {
    payload.validate()?;
    let city = state
        .rental
        .write()
        .await
        .add_city(payload.name, payload.zap_point_address);
    Ok(Json(city))
}

pub async fn update_city(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(payload): Json<CityRequest>,
) -> AppResult<Json<City>> {
    payload.validate()?;
    let city = state
        .rental
        .write()
        .await
        .update_city(id, payload.name, payload.zap_point_address)?;
    Ok(Json(city))
}

// ============ Rates ============

#[derive(Debug, Deserialize, Validate)]
pub struct RateRequest {
    pub city_id: Id,
    /// Leave empty for the city's standard rate.
    pub client_name: Option<String>,
    #[validate(custom(function = "non_negative"))]
    pub daily_rent: Decimal,
    pub monthly_rent: Option<Decimal>,
    #[validate(custom(function = "non_negative"))]
    pub security_deposit: Decimal,
}

impl From<RateRequest> for NewRate {
    fn from(r: RateRequest) -> Self {
        NewRate {
            city_id: r.city_id,
            client_name: r.client_name.filter(|name| !name.trim().is_empty()),
            daily_rent: r.daily_rent,
            monthly_rent: r.monthly_rent,
            security_deposit: r.security_deposit,
        }
    }
}

pub async fn list_rates(State(state): State<AppState>) -> AppResult<Json<Vec<Rate>>> {
    let rental = state.rental.read().await;
    Ok(Json(rental.store().rates().cloned().collect()))
}

pub async fn create_rate(
    State(state): State<AppState>,
    Json(payload): Json<RateRequest>,
) -> AppResult<Json<Rate>> {
    payload.validate()?;
    let rate = state.rental.write().await.add_rate(payload.into())?;
    Ok(Json(rate))
}

/// Import many rates at once; nothing is added if any row is rejected
pub async fn bulk_import_rates(
    State(state): State<AppState>,
    Json(payload): Json<Vec<RateRequest>>,
) -> AppResult<Json<Vec<Rate>>> {
    for row in &payload {
        row.validate()?;
    }
    let rates = state
        .rental
        .write()
        .await
        .bulk_import_rates(payload.into_iter().map(Into::into).collect())?;
    Ok(Json(rates))
}

pub async fn update_rate(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(payload): Json<RateRequest>,
) -> AppResult<Json<Rate>> {
    payload.validate()?;
    let rate = state.rental.write().await.update_rate(id, payload.into())?;
    Ok(Json(rate))
}

pub async fn delete_rate(State(state): State<AppState>, Path(id): Path<Id>) -> AppResult<Json<Rate>> {
    let rate = state.rental.write().await.delete_rate(id)?;
    Ok(Json(rate))
}

// ============ Vehicles ============

#[derive(Debug, Deserialize, Validate)]
pub struct VehicleRequest {
    #[validate(length(min = 1, max = 100))]
    pub model_name: String,
    pub city_id: Id,
    pub status: VehicleStatus,
    pub battery_id: Option<Id>,
}

impl From<VehicleRequest> for NewVehicle {
    fn from(v: VehicleRequest) -> Self {
        NewVehicle {
            model_name: v.model_name,
            city_id: v.city_id,
            status: v.status,
            battery_id: v.battery_id,
        }
    }
}

pub async fn list_vehicles(State(state): State<AppState>) -> AppResult<Json<Vec<Vehicle>>> {
    let rental = state.rental.read().await;
    Ok(Json(rental.store().vehicles().cloned().collect()))
}

pub async fn create_vehicle(
    State(state): State<AppState>,
    Json(payload): Json<VehicleRequest>,
) -> AppResult<Json<Vehicle>> {
    payload.validate()?;
    let vehicle = state.rental.write().await.add_vehicle(payload.into())?;
    Ok(Json(vehicle))
}

pub async fn bulk_import_vehicles(
    State(state): State<AppState>,
    Json(payload): Json<Vec<VehicleRequest>>,
) -> AppResult<Json<Vec<Vehicle>>> {
    for row in &payload {
        row.validate()?;
    }
    let vehicles = state
        .rental
        .write()
        .await
        .bulk_import_vehicles(payload.into_iter().map(Into::into).collect())?;
    Ok(Json(vehicles))
}

/// Administrative edit; the battery link is kept consistent on both sides
pub async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(payload): Json<VehicleRequest>,
) -> AppResult<Json<Vehicle>> {
    payload.validate()?;
    let vehicle = state.rental.write().await.update_vehicle(id, payload.into())?;
    Ok(Json(vehicle))
}

pub async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> AppResult<Json<Vehicle>> {
    let vehicle = state.rental.write().await.delete_vehicle(id)?;
    Ok(Json(vehicle))
}

// ============ Batteries ============

#[derive(Debug, Deserialize, Validate)]
pub struct BatteryRequest {
    #[validate(length(min = 1, max = 50))]
    pub serial_number: String,
    pub city_id: Id,
    pub status: BatteryStatus,
    #[validate(range(max = 100))]
    pub charge_percentage: u8,
}

impl From<BatteryRequest> for BatteryFields {
    fn from(b: BatteryRequest) -> Self {
        BatteryFields {
            serial_number: b.serial_number,
            city_id: b.city_id,
            status: b.status,
            charge_percentage: b.charge_percentage,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AvailableBatteriesQuery {
    pub purpose: Option<BatteryPurpose>,
}

pub async fn list_batteries(State(state): State<AppState>) -> AppResult<Json<Vec<Battery>>> {
    let rental = state.rental.read().await;
    Ok(Json(rental.store().batteries().cloned().collect()))
}

/// Batteries that can be fitted on a booking (default) or swapped in
pub async fn available_batteries(
    State(state): State<AppState>,
    Query(query): Query<AvailableBatteriesQuery>,
) -> AppResult<Json<Vec<Battery>>> {
    let purpose = query.purpose.unwrap_or(BatteryPurpose::Booking);
    let rental = state.rental.read().await;
    Ok(Json(rental.available_batteries(purpose).into_iter().cloned().collect()))
}

pub async fn create_battery(
    State(state): State<AppState>,
    Json(payload): Json<BatteryRequest>,
) -> AppResult<Json<Battery>> {
    payload.validate()?;
    let battery = state.rental.write().await.add_battery(payload.into())?;
    Ok(Json(battery))
}

pub async fn bulk_import_batteries(
    State(state): State<AppState>,
    Json(payload): Json<Vec<BatteryRequest>>,
) -> AppResult<Json<Vec<Battery>>> {
    for row in &payload {
        row.validate()?;
    }
    let batteries = state
        .rental
        .write()
        .await
        .bulk_import_batteries(payload.into_iter().map(Into::into).collect())?;
    Ok(Json(batteries))
}

pub async fn update_battery(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(payload): Json<BatteryRequest>,
) -> AppResult<Json<Battery>> {
    payload.validate()?;
    let battery = state.rental.write().await.update_battery(id, payload.into())?;
    Ok(Json(battery))
}

pub async fn delete_battery(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> AppResult<Json<Battery>> {
    let battery = state.rental.write().await.delete_battery(id)?;
    Ok(Json(battery))
}

// ============ Users ============

pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let rental = state.rental.read().await;
    Ok(Json(rental.store().users().cloned().collect()))
}

// ============ Refunds & reporting ============

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

pub async fn list_refund_requests(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<RefundRequest>>> {
    let rental = state.rental.read().await;
    Ok(Json(rental.store().refund_requests().cloned().collect()))
}

/// Pay out a refund; processing the same request twice changes nothing
pub async fn process_refund_request(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> AppResult<Json<RefundOutcome>> {
    let outcome = state.rental.write().await.process_refund_request(id)?;
    Ok(Json(outcome))
}

/// Collections for bookings starting in the range (last 30 days by default)
pub async fn report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<ReportSummary>> {
    let rental = state.rental.read().await;
    Ok(Json(rental.report(query.from, query.to)))
}

pub async fn customer_directory(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CustomerDirectoryEntry>>> {
    let rental = state.rental.read().await;
    Ok(Json(rental.customer_directory()))
}
