use std::collections::BTreeMap;

use crate::models::bookings::SlotDetail;
use crate::models::product::{catalog_price, Product};
use crate::models::tour::Tour;

pub struct PricingService;

impl PricingService {
    /// Round to the cent boundary, half-up, to keep floating-point
    /// drift out of displayed and charged amounts.
    pub fn round2(amount: f64) -> f64 {
        (amount * 100.0).round() / 100.0
    }

    /// Calculate the pre-discount subtotal for the current selection.
    ///
    /// Tours with custom slot types sum the per-slot price snapshots;
    /// flat-rate tours charge `rate * number_of_people`. Selected
    /// products add `catalog_price * quantity` each.
    pub fn subtotal(
        tour: &Tour,
        slot_details: &[SlotDetail],
        number_of_people: u32,
        products: &BTreeMap<String, u32>,
        catalog: &[Product],
    ) -> f64 {
        let seats = if tour.has_custom_slot_types() {
            slot_details.iter().map(|s| s.price).sum::<f64>()
        } else {
            tour.rate * number_of_people as f64
        };

        let add_ons = products
            .iter()
            .filter_map(|(id, qty)| {
                catalog_price(catalog, id).map(|price| price * (*qty).max(1) as f64)
            })
            .sum::<f64>();

        Self::round2(seats + add_ons)
    }

    /// Display total: subtotal minus a discount, floored at zero.
    /// Prior to server confirmation this is advisory only; the charged
    /// total always comes from the promo validator's response.
    pub fn total(subtotal: f64, discount: f64) -> f64 {
        Self::round2((subtotal - discount).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tour::SlotType;

    fn flat_tour(rate: f64) -> Tour {
        Tour {
            id: "tour_1".to_string(),
            name: "Harbor Kayak".to_string(),
            rate,
            max_group: 12,
            active_weekdays: vec![0, 1, 2, 3, 4, 5, 6],
            time_slots: vec!["09:00".to_string()],
            slot_types: Vec::new(),
            slot_fields: Vec::new(),
        }
    }

    fn tiered_tour() -> Tour {
        let mut tour = flat_tour(0.0);
        tour.slot_types = vec![
            SlotType { name: "adult".to_string(), price: 40.0 },
            SlotType { name: "child".to_string(), price: 20.0 },
        ];
        tour
    }

    #[test]
    fn flat_rate_times_party_size() {
        // tour rate $50, party of 3, no products, no promo
        let subtotal = PricingService::subtotal(
            &flat_tour(50.0),
            &[],
            3,
            &BTreeMap::new(),
            &[],
        );
        assert_eq!(subtotal, 150.0);
        assert_eq!(PricingService::total(subtotal, 0.0), 150.0);
    }

    #[test]
    fn custom_slot_types_use_snapshotted_prices() {
        // 2 adults + 1 child
        let slots = vec![
            SlotDetail::of_type("adult", 40.0),
            SlotDetail::of_type("adult", 40.0),
            SlotDetail::of_type("child", 20.0),
        ];
        let subtotal =
            PricingService::subtotal(&tiered_tour(), &slots, 3, &BTreeMap::new(), &[]);
        assert_eq!(subtotal, 100.0);
    }

    #[test]
    fn products_add_catalog_price_times_quantity() {
        let catalog = vec![Product {
            id: "photos".to_string(),
            name: "Photo package".to_string(),
            price: 15.0,
        }];
        let mut products = BTreeMap::new();
        products.insert("photos".to_string(), 2);

        let subtotal = PricingService::subtotal(&flat_tour(50.0), &[], 3, &products, &catalog);
        assert_eq!(subtotal, 180.0);
    }

    #[test]
    fn unknown_product_ids_are_not_charged() {
        let mut products = BTreeMap::new();
        products.insert("ghost".to_string(), 3);

        let subtotal = PricingService::subtotal(&flat_tour(50.0), &[], 1, &products, &[]);
        assert_eq!(subtotal, 50.0);
    }

    #[test]
    fn rounds_half_up_on_the_cent_boundary() {
        // 3 x 0.1 is not representable exactly; the cent rounding must hide that
        let slots = vec![
            SlotDetail::of_type("adult", 0.1),
            SlotDetail::of_type("adult", 0.1),
            SlotDetail::of_type("adult", 0.1),
        ];
        let subtotal =
            PricingService::subtotal(&tiered_tour(), &slots, 3, &BTreeMap::new(), &[]);
        assert_eq!(subtotal, 0.3);

        assert_eq!(PricingService::round2(0.1 + 0.2), 0.3);
        assert_eq!(PricingService::round2(19.999), 20.0);
    }

    #[test]
    fn total_never_goes_negative() {
        assert_eq!(PricingService::total(100.0, 130.0), 0.0);
        assert_eq!(PricingService::total(180.0, 30.0), 150.0);
    }
}
