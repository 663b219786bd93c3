use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatteryStatus {
    Available,
    InUse,
    Charging,
    Maintenance,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Battery {
    pub id: Id,
    pub serial_number: String,
    pub city_id: Id,
    pub status: BatteryStatus,
    pub charge_percentage: u8,
    pub assigned_vehicle_id: Option<Id>,
}

impl Battery {
    /// Free to be fitted on a new booking. Charging packs may go out too.
    pub fn is_bookable(&self) -> bool {
        self.assigned_vehicle_id.is_none()
            && matches!(self.status, BatteryStatus::Available | BatteryStatus::Charging)
    }

    /// Free to be swapped into a running rental.
    pub fn is_swappable(&self) -> bool {
        self.assigned_vehicle_id.is_none() && self.status == BatteryStatus::Available
    }
}
