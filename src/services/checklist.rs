//! Post-ride damage checklist and the fines attached to each item.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{RentalError, RentalResult};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChecklistItem {
    pub label: &'static str,
    pub fine: i64,
}

pub const POST_RIDE_CHECKLIST_ITEMS: &[ChecklistItem] = &[
    ChecklistItem { label: "Nuts & Bolts", fine: 50 },
    ChecklistItem { label: "Headlight", fine: 200 },
    ChecklistItem { label: "Backlight", fine: 200 },
    ChecklistItem { label: "Tires & Rims", fine: 500 },
    ChecklistItem { label: "Fan", fine: 150 },
    ChecklistItem { label: "Number plates", fine: 100 },
    ChecklistItem { label: "Phone Stand", fine: 100 },
    ChecklistItem { label: "Foot rest", fine: 150 },
    ChecklistItem { label: "Side stand", fine: 150 },
    ChecklistItem { label: "Brake levers", fine: 250 },
    ChecklistItem { label: "Brake shoes", fine: 250 },
    ChecklistItem { label: "Motor", fine: 1000 },
    ChecklistItem { label: "Scratches", fine: 300 },
    ChecklistItem { label: "Paint loss", fine: 400 },
    ChecklistItem { label: "Control Panel", fine: 600 },
    ChecklistItem { label: "Seat", fine: 200 },
];

/// Sum of fines for every item marked damaged. Labels outside the catalog are
/// rejected rather than silently priced at zero.
pub fn total_fine(items: &BTreeMap<String, bool>) -> RentalResult<Decimal> {
    let mut total = Decimal::ZERO;
    for (label, damaged) in items {
        let item = POST_RIDE_CHECKLIST_ITEMS
            .iter()
            .find(|i| i.label == label.as_str())
            .ok_or_else(|| RentalError::UnknownChecklistItem(label.clone()))?;
        if *damaged {
            total += Decimal::from(item.fine);
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(entries: &[(&str, bool)]) -> BTreeMap<String, bool> {
        entries.iter().map(|(l, d)| (l.to_string(), *d)).collect()
    }

    #[test]
    fn test_only_checked_items_are_fined() {
        let selected = items(&[("Motor", true), ("Headlight", true), ("Seat", false)]);
        assert_eq!(total_fine(&selected).unwrap(), Decimal::from(1200));
    }

    #[test]
    fn test_empty_checklist_has_no_fine() {
        assert_eq!(total_fine(&BTreeMap::new()).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let selected = items(&[("Windshield", true)]);
        assert_eq!(
            total_fine(&selected),
            Err(RentalError::UnknownChecklistItem("Windshield".to_string()))
        );
    }
}
