pub mod battery;
pub mod booking;
pub mod city;
pub mod customer;
pub mod rate;
pub mod refund_request;
pub mod user;
pub mod vehicle;

/// Opaque identifier shared by every entity kind. Assigned by the store,
/// never reused.
pub type Id = i64;
