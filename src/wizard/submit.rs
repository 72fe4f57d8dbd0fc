use crate::models::bookings::{BookingDraft, CreatedBooking};
use crate::services::booking_service::BookingApi;
use crate::services::email_service::ConfirmationMailer;
use crate::services::payment::interface::PaymentOperations;

pub struct SubmitDeps<'a> {
    pub bookings: &'a dyn BookingApi,
    pub payments: &'a dyn PaymentOperations,
    pub mailer: Option<&'a dyn ConfirmationMailer>,
}

#[derive(Debug)]
pub enum SubmitError {
    /// Booking creation failed; payment was never attempted. The same
    /// entered data can be resubmitted.
    BookingCreation(String),
    /// The booking exists but the charge failed. It stays pending for
    /// manual reconciliation; no automatic retry.
    Payment { booking_id: String, message: String },
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitError::BookingCreation(msg) => write!(f, "Failed to create booking: {}", msg),
            SubmitError::Payment { message, .. } => write!(f, "Payment failed: {}", message),
        }
    }
}

impl std::error::Error for SubmitError {}

#[derive(Debug)]
pub struct SubmitSuccess {
    pub booking_id: String,
    pub reference_number: Option<String>,
    pub payment_id: Option<String>,
    pub email_sent: bool,
}

/// The submission sequence. The order is load-bearing: the provider's
/// webhook/metadata path links back to the booking id, so the charge
/// must never run before the booking record exists.
pub async fn submit_booking(
    draft: &BookingDraft,
    existing_booking_id: Option<String>,
    deps: SubmitDeps<'_>,
) -> Result<SubmitSuccess, SubmitError> {
    // 1. Create the booking, or reuse the one from a previous attempt
    // whose payment failed (no duplicate records on resubmit).
    let created = match existing_booking_id {
        Some(booking_id) => CreatedBooking {
            booking_id,
            reference_number: None,
            email: None,
        },
        None => deps
            .bookings
            .create_booking(draft)
            .await
            .map_err(|e| SubmitError::BookingCreation(e.to_string()))?,
    };

    // 2. Only now confirm the already-initialized payment intent.
    // Admin pay-later submissions carry no intent and skip this.
    let payment_id = match &draft.payment_intent_id {
        Some(intent_id) => {
            let confirmed = deps
                .payments
                .confirm_payment_intent(intent_id)
                .await
                .map_err(|e| SubmitError::Payment {
                    booking_id: created.booking_id.clone(),
                    message: e.to_string(),
                })?;
            Some(confirmed.payment_id)
        }
        None => None,
    };

    // 3. Confirmation email. Failure is a secondary notice; the
    // booking and payment already succeeded.
    let email_sent = match (deps.mailer, &created.email) {
        (Some(mailer), Some(echo)) => match mailer.send_confirmation(echo).await {
            Ok(()) => true,
            Err(err) => {
                eprintln!("Failed to send confirmation email: {}", err);
                false
            }
        },
        _ => false,
    };

    Ok(SubmitSuccess {
        booking_id: created.booking_id,
        reference_number: created.reference_number,
        payment_id,
        email_sent,
    })
}
