use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: Id,
    pub name: String,
    /// Where batteries are swapped and vehicles are handed over.
    pub zap_point_address: Option<String>,
}
