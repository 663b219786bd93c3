use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleStatus {
    Available,
    Rented,
    Maintenance,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Id,
    pub model_name: String,
    pub city_id: Id,
    pub status: VehicleStatus,
    /// When set, the referenced battery's `assigned_vehicle_id` points back here.
    pub battery_id: Option<Id>,
}
