use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    pub id: Id,
    pub city_id: Id,
    /// Set for corporate/custom pricing. Rates without a client name are the
    /// walk-in "standard" rate of their city.
    pub client_name: Option<String>,
    pub daily_rent: Decimal,
    /// Absent means bookings fall back to per-day pricing regardless of length.
    pub monthly_rent: Option<Decimal>,
    pub security_deposit: Decimal,
}

impl Rate {
    pub fn is_standard(&self) -> bool {
        self.client_name.is_none()
    }
}
