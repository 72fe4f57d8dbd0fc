use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::bookings::{BookingDraft, ProductLine, SlotDetail};
use crate::models::customer::CustomerInformation;
use crate::models::product::{catalog_price, Product};
use crate::models::promo::PromoOutcome;
use crate::models::schedule::ScheduleSelection;
use crate::models::tour::Tour;
use crate::wizard::state::WizardState;
use crate::wizard::step::{RetreatOutcome, WizardMode, WizardStep};

/// Selections known before the wizard opens (editing an existing
/// booking, or adding services to one). Determines the entry step.
#[derive(Debug, Default, Clone)]
pub struct WizardPrefill {
    pub tour: Option<Tour>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
}

/// Owns all wizard state and the only mutators for it. Steps render
/// from `snapshot()` and dispatch typed commands; no two callers ever
/// mutate the same field independently.
pub struct WizardController {
    state: WizardState,
    entry_step: WizardStep,
    /// True once any step beyond the entry step has been reached.
    progressed: bool,
    availability_generation: u64,
    promo_generation: u64,
    submitting: bool,
    existing_booking_id: Option<String>,
    created_by: Option<String>,
}

impl WizardController {
    pub fn new(mode: WizardMode, prefill: WizardPrefill, created_by: Option<String>) -> Self {
        let short_circuit = Self::short_circuit_step(&prefill);
        let entry_step = match mode {
            WizardMode::AdditionalBooking { .. } => WizardStep::AdditionalServices,
            WizardMode::NewBooking => short_circuit,
        };

        let number_of_people = prefill
            .tour
            .as_ref()
            .map(WizardState::minimal_party_size)
            .unwrap_or(0);

        WizardController {
            state: WizardState {
                step: entry_step,
                mode,
                tour: prefill.tour,
                schedule: ScheduleSelection {
                    date: prefill.date,
                    time: prefill.time,
                },
                remaining_slots: None,
                number_of_people,
                slot_details: Vec::new(),
                products: BTreeMap::new(),
                product_catalog: Vec::new(),
                customer: CustomerInformation::default(),
                payment_method: None,
                promo: Default::default(),
            },
            entry_step,
            progressed: false,
            availability_generation: 0,
            promo_generation: 0,
            submitting: false,
            existing_booking_id: None,
            created_by,
        }
    }

    /// Where a guided flow can skip to, given what is already known.
    fn short_circuit_step(prefill: &WizardPrefill) -> WizardStep {
        match (&prefill.tour, &prefill.date, &prefill.time) {
            (Some(_), Some(_), Some(_)) => WizardStep::ReviewAndPay,
            (Some(_), _, _) => WizardStep::SelectDateTime,
            _ => WizardStep::SelectTour,
        }
    }

    pub fn snapshot(&self) -> &WizardState {
        &self.state
    }

    pub fn availability_generation(&self) -> u64 {
        self.availability_generation
    }

    // --- step transitions ---

    /// Move forward if the current step's requirements are met.
    /// A no-op otherwise; never an error.
    pub fn advance(&mut self) {
        let next = match self.state.step {
            WizardStep::AdditionalServices => {
                // Skip whatever the existing reservation already pins down.
                let prefill = WizardPrefill {
                    tour: self.state.tour.clone(),
                    date: self.state.schedule.date,
                    time: self.state.schedule.time.clone(),
                };
                Some(Self::short_circuit_step(&prefill))
            }
            WizardStep::SelectTour if self.state.tour.is_some() => Some(WizardStep::SelectDateTime),
            WizardStep::SelectDateTime if self.state.schedule.is_complete() => {
                Some(WizardStep::ReviewAndPay)
            }
            // ReviewAndPay only advances through a successful submit.
            _ => None,
        };

        if let Some(next) = next {
            self.state.step = next;
            if next > self.entry_step {
                self.progressed = true;
            }
        }
    }

    /// Move back one step; at the session's first step this requests a
    /// close instead, confirmed when later progress would be lost.
    pub fn retreat(&mut self) -> RetreatOutcome {
        if self.state.step == WizardStep::Complete {
            return RetreatOutcome::CloseRequested { needs_confirmation: false };
        }

        if self.state.step == self.entry_step {
            return RetreatOutcome::CloseRequested { needs_confirmation: self.progressed };
        }

        let previous = match self.state.step {
            WizardStep::SelectTour => match self.state.mode {
                WizardMode::AdditionalBooking { .. } => WizardStep::AdditionalServices,
                WizardMode::NewBooking => {
                    return RetreatOutcome::CloseRequested { needs_confirmation: self.progressed }
                }
            },
            WizardStep::SelectDateTime => WizardStep::SelectTour,
            WizardStep::ReviewAndPay => WizardStep::SelectDateTime,
            WizardStep::AdditionalServices | WizardStep::Complete => unreachable!(),
        };

        // An entry step later than the computed previous one means the
        // prefill skipped that step; close instead of walking into it.
        if previous < self.entry_step {
            return RetreatOutcome::CloseRequested { needs_confirmation: self.progressed };
        }

        self.state.step = previous;
        RetreatOutcome::MovedBack
    }

    pub fn mark_complete(&mut self) {
        self.state.step = WizardStep::Complete;
    }

    // --- selection commands ---

    /// Replace the tour and reset everything downstream of it.
    pub fn change_tour(&mut self, tour: Tour) {
        self.state.number_of_people = WizardState::minimal_party_size(&tour);
        self.state.tour = Some(tour);
        self.state.schedule = ScheduleSelection::default();
        self.state.remaining_slots = None;
        self.state.slot_details.clear();
        self.state.products.clear();
        self.availability_generation += 1;
        self.invalidate_promo();

        if self.state.step > WizardStep::SelectDateTime {
            self.state.step = WizardStep::SelectDateTime;
        }
    }

    /// Pick a date: clears the time and every occupancy-dependent
    /// field, and returns the generation an availability refetch must
    /// carry to be applied.
    pub fn change_date(&mut self, date: NaiveDate) -> u64 {
        self.state.schedule.date = Some(date);
        self.state.schedule.time = None;
        self.state.remaining_slots = None;
        if let Some(tour) = &self.state.tour {
            self.state.number_of_people = WizardState::minimal_party_size(tour);
        }
        self.state.slot_details.clear();
        self.state.products.clear();
        self.availability_generation += 1;
        self.invalidate_promo();
        self.availability_generation
    }

    /// Pick a time of day. Only times from the tour's weekly
    /// availability are accepted; returns the refetch generation.
    pub fn select_time(&mut self, time: &str) -> Option<u64> {
        let tour = self.state.tour.as_ref()?;
        self.state.schedule.date?;
        if !tour.time_slots.iter().any(|t| t == time) {
            return None;
        }

        self.state.schedule.time = Some(time.to_string());
        self.state.remaining_slots = None;
        self.availability_generation += 1;
        Some(self.availability_generation)
    }

    /// Apply a fetched capacity count — last write wins by selection
    /// identity. A response for a superseded generation or a no longer
    /// current (date, time) is dropped on arrival.
    pub fn apply_remaining_slots(
        &mut self,
        generation: u64,
        date: NaiveDate,
        time: &str,
        count: u32,
    ) -> bool {
        if generation != self.availability_generation || !self.state.schedule.matches(date, time) {
            return false;
        }

        self.state.remaining_slots = Some(count);

        // Re-clamp occupancy against the fresh number.
        let mut changed = false;
        if self.tour_has_custom_types() {
            if self.state.slot_details.len() as u32 > count {
                self.state.slot_details.truncate(count as usize);
                changed = true;
            }
        } else if self.state.number_of_people > count {
            self.state.number_of_people = count;
            changed = true;
        }

        if changed {
            self.invalidate_promo();
        }
        true
    }

    fn tour_has_custom_types(&self) -> bool {
        self.state
            .tour
            .as_ref()
            .map(|t| t.has_custom_slot_types())
            .unwrap_or(false)
    }

    fn capacity_limit(&self) -> u32 {
        let group_limit = self
            .state
            .tour
            .as_ref()
            .map(|t| t.max_group)
            .unwrap_or(u32::MAX);
        self.state
            .remaining_slots
            .map(|r| r.min(group_limit))
            .unwrap_or(group_limit)
    }

    // --- occupancy commands (flat-rate tours) ---

    /// No-op when the schedule instance is fully booked or at capacity.
    pub fn increase_party_size(&mut self) {
        if self.tour_has_custom_types() {
            return;
        }
        if self.state.number_of_people + 1 > self.capacity_limit() {
            return;
        }
        self.state.number_of_people += 1;
        self.invalidate_promo();
    }

    pub fn set_party_size(&mut self, size: u32) {
        if self.tour_has_custom_types() {
            return;
        }
        let clamped = size.min(self.capacity_limit());
        if clamped != self.state.number_of_people {
            self.state.number_of_people = clamped;
            self.invalidate_promo();
        }
    }

    // --- occupancy commands (custom slot types) ---

    /// Add a seat of the given type, snapshotting its current price.
    /// No-op at capacity or for an unknown type name.
    pub fn add_slot(&mut self, type_name: &str) -> bool {
        let Some(tour) = &self.state.tour else {
            return false;
        };
        let Some(slot_type) = tour.slot_type(type_name) else {
            return false;
        };
        if self.state.slot_details.len() as u32 + 1 > self.capacity_limit() {
            return false;
        }

        let detail = SlotDetail::of_type(&slot_type.name, slot_type.price);
        self.state.slot_details.push(detail);
        self.invalidate_promo();
        true
    }

    pub fn remove_slot(&mut self, index: usize) -> bool {
        if index >= self.state.slot_details.len() {
            return false;
        }
        self.state.slot_details.remove(index);
        self.invalidate_promo();
        true
    }

    pub fn set_slot_field(&mut self, index: usize, field: &str, value: &str) -> bool {
        match self.state.slot_details.get_mut(index) {
            Some(detail) => {
                detail.fields.insert(field.to_string(), value.to_string());
                true
            }
            None => false,
        }
    }

    // --- products / customer / payment method ---

    pub fn set_product_catalog(&mut self, catalog: Vec<Product>) {
        self.state.product_catalog = catalog;
    }

    /// Quantity zero removes the selection entirely, so no orphaned
    /// quantity entry can outlive its product.
    pub fn set_product_quantity(&mut self, product_id: &str, quantity: u32) {
        if quantity == 0 {
            self.state.products.remove(product_id);
        } else {
            self.state.products.insert(product_id.to_string(), quantity);
        }
        self.invalidate_promo();
    }

    pub fn set_customer(&mut self, customer: CustomerInformation) {
        self.state.customer = customer;
    }

    pub fn set_payment_method(&mut self, method: &str) {
        self.state.payment_method = Some(method.to_string());
    }

    // --- promo reconciliation ---

    /// A subtotal-affecting edit drops the applied discount; it must be
    /// re-confirmed against the new subtotal before it can gate payment.
    /// Bumping the generation also retires any in-flight validation.
    fn invalidate_promo(&mut self) {
        self.state.promo.applied = None;
        self.state.promo.estimate = None;
        self.promo_generation += 1;
    }

    /// Start a validation round trip; only an outcome carrying the
    /// returned generation (and no later one) will be applied.
    pub fn begin_promo_validation(&mut self, code: &str) -> (u64, f64) {
        self.state.promo.code = Some(code.to_string());
        self.promo_generation += 1;
        (self.promo_generation, self.state.subtotal())
    }

    /// The last completed validation for the current subtotal wins;
    /// stale outcomes are discarded. A failure clears the applied promo
    /// without triggering another validation.
    pub fn apply_promo_outcome(&mut self, generation: u64, outcome: &PromoOutcome) -> bool {
        if generation != self.promo_generation {
            return false;
        }

        match outcome {
            PromoOutcome::Applied { promo, .. } => {
                self.state.promo.estimate = Some(promo.discount_amount);
                self.state.promo.applied = Some(promo.clone());
            }
            PromoOutcome::Cleared { .. } => {
                self.state.promo.applied = None;
                self.state.promo.estimate = None;
            }
        }
        true
    }

    pub fn clear_promo(&mut self) {
        self.state.promo = Default::default();
        self.promo_generation += 1;
    }

    // --- submission bookkeeping ---

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Returns false when a submit is already running for this session.
    pub fn begin_submit(&mut self) -> bool {
        if self.submitting {
            return false;
        }
        self.submitting = true;
        true
    }

    pub fn end_submit(&mut self) {
        self.submitting = false;
    }

    /// Remember the booking id from a partially failed attempt, so a
    /// retry reuses it instead of creating a duplicate.
    pub fn note_booking_created(&mut self, booking_id: String) {
        self.existing_booking_id = Some(booking_id);
    }

    pub fn existing_booking_id(&self) -> Option<String> {
        self.existing_booking_id.clone()
    }

    /// Assemble the request payload with subtotal/total computed now.
    /// Returns None when tour or schedule are structurally missing;
    /// field-level problems are `validate()`'s job.
    pub fn build_draft(&self, payment_intent_id: Option<String>) -> Option<BookingDraft> {
        let tour = self.state.tour.as_ref()?;
        let date = self.state.schedule.date?;
        let time = self.state.schedule.time.clone()?;

        let products = self
            .state
            .products
            .iter()
            .filter_map(|(id, qty)| {
                catalog_price(&self.state.product_catalog, id).map(|price| ProductLine {
                    product_id: id.clone(),
                    quantity: *qty,
                    unit_price: price,
                })
            })
            .collect();

        let applied = self.state.promo.applied.as_ref();
        let additional_to = match &self.state.mode {
            WizardMode::AdditionalBooking { reference_number } => Some(reference_number.clone()),
            WizardMode::NewBooking => None,
        };

        Some(BookingDraft {
            customer: self.state.customer.clone(),
            tour_id: tour.id.clone(),
            tour_name: tour.name.clone(),
            date,
            time,
            number_of_people: self.state.party_size(),
            slot_details: self.state.slot_details.clone(),
            products,
            subtotal: self.state.subtotal(),
            total: self.state.chargeable_total(),
            payment_method: self.state.payment_method.clone().unwrap_or_default(),
            payment_intent_id,
            promo_code: applied.map(|p| p.code.clone()),
            promo_id: applied.and_then(|p| p.promo_id.clone()),
            discount_amount: self.state.promo.authoritative_discount(),
            additional_to,
            created_by: self.created_by.clone(),
        })
    }
}
