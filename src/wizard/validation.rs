use regex::Regex;
use serde::Serialize;

use crate::models::tour::{FieldKind, SlotField};
use crate::wizard::state::WizardState;

/// Pre-payment validation failures, partitioned the way the review
/// step renders them. Collected, never thrown; a failing check does not
/// discard the others.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct BookingValidationErrors {
    pub personal_info: Vec<String>,
    pub slots: Vec<String>,
    pub payment: Vec<String>,
}

impl BookingValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.personal_info.is_empty() && self.slots.is_empty() && self.payment.is_empty()
    }
}

/// Run every check and return the full grouped set. Submission is
/// blocked on any error, with no side effects and no network calls.
pub fn validate(state: &WizardState) -> Result<(), BookingValidationErrors> {
    let mut errors = BookingValidationErrors::default();

    check_personal_info(state, &mut errors.personal_info);
    check_occupancy(state, &mut errors.slots);
    check_slot_details(state, &mut errors.slots);

    if state.payment_method.is_none() {
        errors.payment.push("Select a payment method".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_personal_info(state: &WizardState, errors: &mut Vec<String>) {
    let customer = &state.customer;

    if customer.first_name.trim().is_empty() {
        errors.push("First name is required".to_string());
    }
    if customer.last_name.trim().is_empty() {
        errors.push("Last name is required".to_string());
    }

    let email_pattern = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    if customer.email.trim().is_empty() {
        errors.push("Email is required".to_string());
    } else if !email_pattern.is_match(customer.email.trim()) {
        errors.push("Enter a valid email address".to_string());
    }

    let phone_pattern = Regex::new(r"^[0-9+\-()\s.]+$").unwrap();
    let digits = customer.phone.chars().filter(|c| c.is_ascii_digit()).count();
    if customer.phone.trim().is_empty() {
        errors.push("Phone number is required".to_string());
    } else if !phone_pattern.is_match(customer.phone.trim()) || digits < 7 {
        errors.push("Enter a valid phone number".to_string());
    }
}

fn check_occupancy(state: &WizardState, errors: &mut Vec<String>) {
    let party_size = state.party_size();

    if party_size == 0 && state.products.is_empty() {
        errors.push("Select at least one spot or add-on".to_string());
    }

    if party_size > 0 {
        if let Some(remaining) = state.remaining_slots {
            if party_size > remaining {
                errors.push(format!(
                    "Only {} spot(s) remain for this time; please reduce your party size",
                    remaining
                ));
            }
        }
    }
}

fn check_slot_details(state: &WizardState, errors: &mut Vec<String>) {
    let Some(tour) = &state.tour else {
        return;
    };
    if !tour.has_custom_slot_types() {
        return;
    }

    for (index, detail) in state.slot_details.iter().enumerate() {
        if tour.slot_type(&detail.type_name).is_none() {
            errors.push(format!(
                "Spot {}: unknown ticket type \"{}\"",
                index + 1,
                detail.type_name
            ));
        }

        for field in &tour.slot_fields {
            let value = detail.fields.get(&field.name).map(String::as_str).unwrap_or("");
            check_slot_field(index, field, value, errors);
        }
    }
}

fn check_slot_field(index: usize, field: &SlotField, value: &str, errors: &mut Vec<String>) {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        if field.required {
            errors.push(format!("Spot {}: \"{}\" is required", index + 1, field.name));
        }
        return;
    }

    match &field.kind {
        FieldKind::Text { min_len, max_len } => {
            let len = trimmed.chars().count();
            if min_len.map(|min| len < min).unwrap_or(false)
                || max_len.map(|max| len > max).unwrap_or(false)
            {
                errors.push(format!(
                    "Spot {}: \"{}\" has an invalid length",
                    index + 1,
                    field.name
                ));
            }
        }
        FieldKind::Number { min, max } => match trimmed.parse::<f64>() {
            Ok(n) => {
                if min.map(|m| n < m).unwrap_or(false) || max.map(|m| n > m).unwrap_or(false) {
                    errors.push(format!(
                        "Spot {}: \"{}\" is out of range",
                        index + 1,
                        field.name
                    ));
                }
            }
            Err(_) => errors.push(format!(
                "Spot {}: \"{}\" must be a number",
                index + 1,
                field.name
            )),
        },
        FieldKind::Select { options } => {
            if !options.iter().any(|o| o == trimmed) {
                errors.push(format!(
                    "Spot {}: \"{}\" must be one of the listed options",
                    index + 1,
                    field.name
                ));
            }
        }
        FieldKind::Checkbox => {
            if field.required && trimmed != "true" {
                errors.push(format!(
                    "Spot {}: \"{}\" must be accepted",
                    index + 1,
                    field.name
                ));
            }
        }
    }
}
