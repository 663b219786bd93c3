use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::{admin, operations};
use crate::AppState;

/// All API routes. Rate limiting and request logging need the peer address,
/// so they are layered on in `main` where the connect info is available.
pub fn create_router(state: AppState) -> Router {
    // Front-desk operations: bookings, returns, customers
    let booking_routes = Router::new()
        .route("/", get(operations::list_bookings).post(operations::create_booking))
        .route("/{id}", get(operations::get_booking))
        .route("/{id}/battery", post(operations::change_battery))
        .route("/{id}/return", post(operations::return_booking))
        .route("/{id}/settle", post(operations::settle_due))
        .route("/{id}/pending-payment", post(operations::flag_pending_payment));

    let customer_routes = Router::new()
        .route("/", get(operations::list_customers).post(operations::create_customer))
        .route("/directory", get(admin::customer_directory))
        .route("/{id}/pending", get(operations::customer_pending));

    let city_routes = Router::new()
        .route("/", get(admin::list_cities).post(admin::create_city))
        .route("/{id}", put(admin::update_city))
        .route("/{id}/dashboard", get(operations::city_dashboard))
        .route("/{id}/customers", get(operations::city_customers));

    // Fleet and pricing administration
    let rate_routes = Router::new()
        .route("/", get(admin::list_rates).post(admin::create_rate))
        .route("/bulk", post(admin::bulk_import_rates))
        .route("/{id}", put(admin::update_rate).delete(admin::delete_rate));

    let vehicle_routes = Router::new()
        .route("/", get(admin::list_vehicles).post(admin::create_vehicle))
        .route("/bulk", post(admin::bulk_import_vehicles))
        .route("/{id}", put(admin::update_vehicle).delete(admin::delete_vehicle));

    let battery_routes = Router::new()
        .route("/", get(admin::list_batteries).post(admin::create_battery))
        .route("/bulk", post(admin::bulk_import_batteries))
        .route("/available", get(admin::available_batteries))
        .route("/{id}", put(admin::update_battery).delete(admin::delete_battery));

    let refund_routes = Router::new()
        .route("/", get(admin::list_refund_requests))
        .route("/{id}/process", post(admin::process_refund_request));

    Router::new()
        .route("/api/health", get(operations::health))
        .route("/api/checklist", get(operations::checklist))
        .route("/api/users", get(admin::list_users))
        .route("/api/reports", get(admin::report))
        .nest("/api/bookings", booking_routes)
        .nest("/api/customers", customer_routes)
        .nest("/api/cities", city_routes)
        .nest("/api/rates", rate_routes)
        .nest("/api/vehicles", vehicle_routes)
        .nest("/api/batteries", battery_routes)
        .nest("/api/refund-requests", refund_routes)
        .with_state(state)
}
