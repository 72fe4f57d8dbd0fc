use serde::{Deserialize, Serialize};

/// Wizard steps, in order. `AdditionalServices` is only reachable as
/// the entry step of an additional-booking session.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    AdditionalServices,
    SelectTour,
    SelectDateTime,
    ReviewAndPay,
    Complete,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WizardMode {
    NewBooking,
    /// Adding slots/products onto an existing confirmed booking; the
    /// new purchase shares its reference number.
    AdditionalBooking { reference_number: String },
}

/// What `retreat()` did. At the first step it asks the caller to close
/// instead of moving, with a confirmation prompt once the customer has
/// progressed far enough to lose data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetreatOutcome {
    MovedBack,
    CloseRequested { needs_confirmation: bool },
}
