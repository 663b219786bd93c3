//! Reconciling fines against the deposit, manual due collection, and refund
//! processing.

use rust_decimal::Decimal;

use crate::entities::booking::{Booking, BookingStatus};
use crate::entities::refund_request::{RefundRequest, RefundStatus};
use crate::entities::Id;
use crate::error::{RentalError, RentalResult};
use crate::services::inventory;
use crate::services::rental::{RefundOutcome, RentalService};

/// How a return balances out once fines are set against the deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Fines exceed the deposit; the excess was collected on the spot.
    ExtraCollection(Decimal),
    /// The deposit exceeds the fines; the difference is owed back.
    Refund(Decimal),
    Balanced,
}

impl Settlement {
    /// Settle `total_fine` against `security_deposit`. An excess over the
    /// deposit is only accepted once the operator confirms it was collected.
    pub fn at_return(
        total_fine: Decimal,
        security_deposit: Decimal,
        collection_confirmed: bool,
    ) -> RentalResult<Self> {
        let net_diff = total_fine - security_deposit;

        if net_diff > Decimal::ZERO {
            if !collection_confirmed {
                return Err(RentalError::SettlementNotConfirmed { net_diff });
            }
            Ok(Settlement::ExtraCollection(net_diff))
        } else if net_diff < Decimal::ZERO {
            Ok(Settlement::Refund(net_diff.abs()))
        } else {
            Ok(Settlement::Balanced)
        }
    }

    /// Amount added to the booking's collected total at return time. Refunds
    /// are tracked separately and adjust nothing here.
    pub fn adjustment(&self) -> Decimal {
        match self {
            Settlement::ExtraCollection(amount) => *amount,
            Settlement::Refund(_) | Settlement::Balanced => Decimal::ZERO,
        }
    }
}

impl RentalService {
    pub(crate) fn raise_refund_request(&mut self, booking: &Booking, amount: Decimal) -> RefundRequest {
        let request = RefundRequest {
            id: self.store.allocate_id(),
            booking_id: booking.id,
            amount,
            customer_name: booking.customer_name.clone(),
            status: RefundStatus::Pending,
            date: self.today(),
        };
        self.store.refund_requests.insert(request.id, request.clone());

        tracing::info!(request_id = request.id, booking_id = booking.id, amount = %amount, "Refund request raised");
        request
    }

    /// Collect everything the booking could owe in one step: rent, deposit and
    /// fines. A booking awaiting payment is returned once settled.
    pub fn settle_due(&mut self, booking_id: Id) -> RentalResult<Booking> {
        let booking = self
            .store
            .bookings
            .get_mut(&booking_id)
            .ok_or(RentalError::BookingNotFound(booking_id))?;

        let previous = booking.amount_collected;
        booking.amount_collected = booking.total_rent + booking.security_deposit + booking.fine();
        let was_pending = booking.status == BookingStatus::PendingPayment;
        if was_pending {
            booking.status = BookingStatus::Returned;
        }
        let booking = booking.clone();

        if was_pending {
            inventory::release_on_return(&mut self.store, booking.vehicle_id);
        }

        tracing::info!(
            booking_id,
            collected = %(booking.amount_collected - previous),
            returned = was_pending,
            "Booking dues settled"
        );
        Ok(booking)
    }

    /// Pay out a pending refund. The linked booking's collected amount drops
    /// by the refunded amount. A processed request is never processed again.
    pub fn process_refund_request(&mut self, request_id: Id) -> RentalResult<RefundOutcome> {
        let request = self
            .store
            .refund_requests
            .get_mut(&request_id)
            .ok_or(RentalError::RefundRequestNotFound(request_id))?;

        if request.status == RefundStatus::Processed {
            tracing::warn!(request_id, "Refund request already processed, ignoring");
            return Ok(RefundOutcome::AlreadyProcessed {
                request: request.clone(),
            });
        }

        request.status = RefundStatus::Processed;
        let request = request.clone();

        let booking = match self.store.bookings.get_mut(&request.booking_id) {
            Some(booking) => {
                booking.amount_collected -= request.amount;
                Some(booking.clone())
            }
            None => {
                tracing::warn!(request_id, booking_id = request.booking_id, "Refunded booking missing, skipping adjustment");
                None
            }
        };

        tracing::info!(request_id, amount = %request.amount, "Refund processed");
        Ok(RefundOutcome::Processed { request, booking })
    }
}
