use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BankDetails {
    pub account_name: String,
    pub account_number: String,
    pub bank_name: String,
    pub ifsc_code: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Id,
    pub name: String,
    /// Natural key bookings are grouped by.
    pub phone: String,
    pub address: String,
    pub aadhar_number: String,
    pub pan_number: String,
    pub bank_details: BankDetails,
}
