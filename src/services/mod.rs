pub mod calculator;
pub mod catalog;
pub mod checklist;
pub mod clock;
pub mod inventory;
pub mod lifecycle;
pub mod queries;
pub mod rates;
pub mod rental;
pub mod settlement;

pub use clock::{Clock, FixedClock, SystemClock};
pub use rental::RentalService;
