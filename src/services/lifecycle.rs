//! Booking lifecycle: creation, battery swaps, return, and the pending-payment
//! path.

use rust_decimal::Decimal;

use crate::entities::booking::{Booking, BookingStatus, PaymentMode};
use crate::entities::vehicle::VehicleStatus;
use crate::entities::Id;
use crate::error::{RentalError, RentalResult};
use crate::services::calculator::{amount_payable_now, compute_total_rent, days_between, is_monthly_eligible};
use crate::services::checklist::total_fine;
use crate::services::inventory;
use crate::services::queries::{customer_pending_balance, pending_amount};
use crate::services::rates::resolve_standard_rate;
use crate::services::rental::{NewBooking, RentalService, ReturnChecklist, ReturnOutcome, ReturnReceipt};
use crate::services::settlement::Settlement;

impl RentalService {
    /// Open a booking.
    ///
    /// Requires the city's standard rate, an available vehicle, a usable
    /// battery (if one is chosen), no outstanding balance for the customer,
    /// and a collected amount exactly equal to what is payable now.
    pub fn create_booking(&mut self, request: NewBooking) -> RentalResult<Booking> {
        let customer = self
            .store
            .customer(request.customer_id)
            .ok_or(RentalError::CustomerNotFound(request.customer_id))?;

        let rate = resolve_standard_rate(self.store.rates.values(), request.city_id)?;

        let vehicle = self
            .store
            .vehicle(request.vehicle_id)
            .ok_or(RentalError::VehicleNotFound(request.vehicle_id))?;
        if vehicle.status != VehicleStatus::Available {
            return Err(RentalError::VehicleUnavailable(vehicle.id));
        }
        if vehicle.city_id != request.city_id {
            return Err(RentalError::CityMismatch {
                entity: "Vehicle",
                id: vehicle.id,
                city_id: request.city_id,
            });
        }

        if let Some(battery_id) = request.battery_id {
            let battery = self
                .store
                .battery(battery_id)
                .filter(|b| b.is_bookable() || b.assigned_vehicle_id == Some(vehicle.id))
                .ok_or(RentalError::BatteryUnavailable(battery_id))?;
            if battery.city_id != request.city_id {
                return Err(RentalError::CityMismatch {
                    entity: "Battery",
                    id: battery_id,
                    city_id: request.city_id,
                });
            }
        }

        let pending = customer_pending_balance(self.store.bookings.values(), &customer.phone);
        if pending > Decimal::ZERO {
            return Err(RentalError::PendingBalance {
                phone: customer.phone.clone(),
                amount: pending,
            });
        }

        let days = days_between(request.start_date, request.end_date);
        let total_rent = compute_total_rent(rate, days).ok_or(RentalError::AmountOutOfRange)?;
        let payable = amount_payable_now(
            total_rent,
            rate.security_deposit,
            request.split_payment,
            is_monthly_eligible(days),
        )
        .ok_or(RentalError::AmountOutOfRange)?;
        let collected = request
            .cash_collected
            .checked_add(request.online_collected)
            .ok_or(RentalError::AmountOutOfRange)?;
        if collected != payable {
            return Err(RentalError::PaymentMismatch {
                expected: payable,
                collected,
            });
        }

        let customer_name = customer.name.clone();
        let customer_phone = customer.phone.clone();
        let daily_rent = rate.daily_rent;
        let security_deposit = rate.security_deposit;

        let booking_id = self.store.allocate_id();
        let battery_id = inventory::assign_on_booking(&mut self.store, request.vehicle_id, request.battery_id);

        let booking = Booking {
            id: booking_id,
            customer_name,
            customer_phone,
            vehicle_id: request.vehicle_id,
            battery_id,
            city_id: request.city_id,
            start_date: request.start_date,
            end_date: request.end_date,
            daily_rent,
            total_rent,
            security_deposit,
            amount_collected: collected,
            mode_of_payment: PaymentMode::from_split(request.cash_collected, request.online_collected),
            status: BookingStatus::Active,
            fine_amount: None,
            post_ride_checklist: None,
            post_ride_notes: None,
        };
        self.store.bookings.insert(booking_id, booking.clone());

        tracing::info!(
            booking_id,
            vehicle_id = booking.vehicle_id,
            battery_id = ?booking.battery_id,
            days,
            total_rent = %total_rent,
            collected = %collected,
            "Booking created"
        );
        Ok(booking)
    }

    /// Swap the battery on a running rental. The vehicle's old pack is freed
    /// and the new one bound, and the booking records the new pack.
    pub fn change_battery(&mut self, booking_id: Id, new_battery_id: Id) -> RentalResult<Booking> {
        let booking = self
            .store
            .booking(booking_id)
            .ok_or(RentalError::BookingNotFound(booking_id))?;
        if booking.status == BookingStatus::Returned {
            return Err(RentalError::BookingNotActive(booking_id));
        }
        let vehicle_id = booking.vehicle_id;
        let city_id = booking.city_id;
        if self.store.vehicle(vehicle_id).is_none() {
            return Err(RentalError::VehicleNotFound(vehicle_id));
        }

        let battery = self
            .store
            .battery(new_battery_id)
            .ok_or(RentalError::BatteryNotFound(new_battery_id))?;
        if !battery.is_swappable() {
            return Err(RentalError::BatteryUnavailable(new_battery_id));
        }
        if battery.city_id != city_id {
            return Err(RentalError::CityMismatch {
                entity: "Battery",
                id: new_battery_id,
                city_id,
            });
        }

        let released = inventory::swap_battery(&mut self.store, vehicle_id, new_battery_id);
        let booking = self
            .store
            .bookings
            .get_mut(&booking_id)
            .ok_or(RentalError::BookingNotFound(booking_id))?;
        booking.battery_id = Some(new_battery_id);

        tracing::info!(booking_id, vehicle_id, released = ?released, new_battery_id, "Battery swapped");
        Ok(booking.clone())
    }

    /// Check a vehicle back in with its post-ride checklist.
    ///
    /// Fines are reconciled against the deposit (see [`Settlement`]); the
    /// vehicle and its battery go back to the available pool. Returning an
    /// already returned booking changes nothing.
    pub fn return_booking(&mut self, booking_id: Id, checklist: ReturnChecklist) -> RentalResult<ReturnOutcome> {
        let booking = self
            .store
            .booking(booking_id)
            .ok_or(RentalError::BookingNotFound(booking_id))?;
        if booking.status == BookingStatus::Returned {
            tracing::warn!(booking_id, "Booking already returned, ignoring");
            return Ok(ReturnOutcome::AlreadyReturned {
                booking: booking.clone(),
            });
        }

        let fine = total_fine(&checklist.items)?;
        let settlement = Settlement::at_return(fine, booking.security_deposit, checklist.settlement_confirmed)?;
        let net_diff = fine - booking.security_deposit;
        let adjustment = settlement.adjustment();
        let vehicle_id = booking.vehicle_id;

        let booking = self
            .store
            .bookings
            .get_mut(&booking_id)
            .ok_or(RentalError::BookingNotFound(booking_id))?;
        booking.status = BookingStatus::Returned;
        booking.fine_amount = Some(booking.fine() + fine);
        booking.post_ride_checklist = Some(checklist.items);
        booking.post_ride_notes = checklist.notes;
        booking.amount_collected += adjustment;
        let booking = booking.clone();

        let refund_request = match settlement {
            Settlement::Refund(amount) => Some(self.raise_refund_request(&booking, amount)),
            Settlement::ExtraCollection(_) | Settlement::Balanced => None,
        };

        inventory::release_on_return(&mut self.store, vehicle_id);

        tracing::info!(
            booking_id,
            fine = %fine,
            net_diff = %net_diff,
            adjustment = %adjustment,
            refund = refund_request.is_some(),
            "Booking returned"
        );
        Ok(ReturnOutcome::Returned(ReturnReceipt {
            booking,
            total_fine: fine,
            net_diff,
            settlement_adjustment: adjustment,
            refund_request,
        }))
    }

    /// Mark an active booking that still owes money as awaiting payment.
    pub fn flag_pending_payment(&mut self, booking_id: Id) -> RentalResult<Booking> {
        let booking = self
            .store
            .bookings
            .get_mut(&booking_id)
            .ok_or(RentalError::BookingNotFound(booking_id))?;
        if booking.status != BookingStatus::Active {
            return Err(RentalError::BookingNotActive(booking_id));
        }
        if pending_amount(booking) <= Decimal::ZERO {
            return Err(RentalError::NothingPending(booking_id));
        }

        booking.status = BookingStatus::PendingPayment;
        tracing::info!(booking_id, "Booking flagged as pending payment");
        Ok(booking.clone())
    }
}
