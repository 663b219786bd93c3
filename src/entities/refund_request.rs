use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefundStatus {
    Pending,
    Processed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RefundRequest {
    pub id: Id,
    pub booking_id: Id,
    pub amount: Decimal,
    pub customer_name: String,
    pub status: RefundStatus,
    pub date: NaiveDate,
}
