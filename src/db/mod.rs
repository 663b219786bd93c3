//! In-memory entity store. Pure data addressed by numeric ids; all behaviour
//! lives in `services`.

pub mod seed;

use std::collections::BTreeMap;

use crate::entities::battery::Battery;
use crate::entities::booking::Booking;
use crate::entities::city::City;
use crate::entities::customer::Customer;
use crate::entities::rate::Rate;
use crate::entities::refund_request::RefundRequest;
use crate::entities::user::User;
use crate::entities::vehicle::Vehicle;
use crate::entities::Id;

/// Typed collections for every entity kind.
///
/// Fields are crate-visible so the service layer can mutate them; outside the
/// crate only the read accessors are available.
#[derive(Clone, Debug)]
pub struct EntityStore {
    pub(crate) cities: BTreeMap<Id, City>,
    pub(crate) rates: BTreeMap<Id, Rate>,
    pub(crate) vehicles: BTreeMap<Id, Vehicle>,
    pub(crate) batteries: BTreeMap<Id, Battery>,
    pub(crate) customers: BTreeMap<Id, Customer>,
    pub(crate) bookings: BTreeMap<Id, Booking>,
    pub(crate) refund_requests: BTreeMap<Id, RefundRequest>,
    pub(crate) users: BTreeMap<Id, User>,
    next_id: Id,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! read_accessors {
    ($($field:ident, $single:ident: $ty:ty;)*) => {
        $(
            pub fn $field(&self) -> impl Iterator<Item = &$ty> {
                self.$field.values()
            }

            pub fn $single(&self, id: Id) -> Option<&$ty> {
                self.$field.get(&id)
            }
        )*
    };
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            cities: BTreeMap::new(),
            rates: BTreeMap::new(),
            vehicles: BTreeMap::new(),
            batteries: BTreeMap::new(),
            customers: BTreeMap::new(),
            bookings: BTreeMap::new(),
            refund_requests: BTreeMap::new(),
            users: BTreeMap::new(),
            next_id: 1,
        }
    }

    read_accessors! {
        cities, city: City;
        rates, rate: Rate;
        vehicles, vehicle: Vehicle;
        batteries, battery: Battery;
        customers, customer: Customer;
        bookings, booking: Booking;
        refund_requests, refund_request: RefundRequest;
        users, user: User;
    }

    /// Hand out a fresh id. Ids are shared across entity kinds and never reused,
    /// even after deletes.
    pub(crate) fn allocate_id(&mut self) -> Id {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Keep the allocator ahead of ids that were assigned externally (seed data).
    pub(crate) fn reserve_id(&mut self, id: Id) {
        if id >= self.next_id {
            self.next_id = id + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_never_reused() {
        let mut store = EntityStore::new();
        let first = store.allocate_id();
        let second = store.allocate_id();
        assert_ne!(first, second);

        store.reserve_id(500);
        assert_eq!(store.allocate_id(), 501);

        // Reserving a lower id must not move the allocator backwards.
        store.reserve_id(3);
        assert_eq!(store.allocate_id(), 502);
    }
}
