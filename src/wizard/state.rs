use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::bookings::SlotDetail;
use crate::models::customer::CustomerInformation;
use crate::models::product::Product;
use crate::models::promo::PromoState;
use crate::models::schedule::ScheduleSelection;
use crate::models::tour::Tour;
use crate::services::pricing_service::PricingService;
use crate::wizard::step::{WizardMode, WizardStep};

/// Everything a step needs to render. Owned exclusively by the
/// controller; handlers and tests only ever see it through
/// `WizardController::snapshot()`.
#[derive(Debug, Serialize, Clone)]
pub struct WizardState {
    pub step: WizardStep,
    #[serde(flatten)]
    pub mode: WizardMode,
    pub tour: Option<Tour>,
    pub schedule: ScheduleSelection,
    /// Last advisory capacity fetched for the live (tour, date, time).
    pub remaining_slots: Option<u32>,
    /// Standalone party counter for flat-rate tours; custom-slot-type
    /// tours derive the party size from `slot_details` instead.
    pub number_of_people: u32,
    pub slot_details: Vec<SlotDetail>,
    /// product id -> quantity (>= 1); absent id means not selected.
    pub products: BTreeMap<String, u32>,
    pub product_catalog: Vec<Product>,
    pub customer: CustomerInformation,
    pub payment_method: Option<String>,
    pub promo: PromoState,
}

impl WizardState {
    pub fn party_size(&self) -> u32 {
        match &self.tour {
            Some(tour) if tour.has_custom_slot_types() => self.slot_details.len() as u32,
            _ => self.number_of_people,
        }
    }

    /// Minimal party size after a reset: custom-slot-type tours start
    /// empty, flat-rate tours start at one person.
    pub fn minimal_party_size(tour: &Tour) -> u32 {
        if tour.has_custom_slot_types() {
            0
        } else {
            1
        }
    }

    pub fn subtotal(&self) -> f64 {
        match &self.tour {
            Some(tour) => PricingService::subtotal(
                tour,
                &self.slot_details,
                self.number_of_people,
                &self.products,
                &self.product_catalog,
            ),
            None => 0.0,
        }
    }

    /// What the review step shows. Falls back to the local estimate
    /// while a validation is pending; the charged amount only ever uses
    /// the applied (server-confirmed) discount.
    pub fn display_total(&self) -> f64 {
        let discount = self
            .promo
            .applied
            .as_ref()
            .map(|p| p.discount_amount)
            .or(self.promo.estimate)
            .unwrap_or(0.0);
        PricingService::total(self.subtotal(), discount)
    }

    /// The total that gates payment: authoritative discount only.
    pub fn chargeable_total(&self) -> f64 {
        PricingService::total(self.subtotal(), self.promo.authoritative_discount())
    }
}
