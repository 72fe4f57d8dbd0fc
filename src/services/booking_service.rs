use async_trait::async_trait;

use crate::config::BackendConfig;
use crate::models::bookings::{BookingCreatedResponse, BookingDraft, CreatedBooking};

#[derive(Debug)]
pub enum BookingApiError {
    RequestError(String),
    ApiError(String),
    /// The backend rejected the booking (e.g. the last slot was taken
    /// between the advisory check and submission).
    Rejected(String),
    /// A "success" response without a booking id; treated as a hard
    /// failure because payment and email both link back to that id.
    MissingBookingId,
}

impl std::fmt::Display for BookingApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingApiError::RequestError(err) => write!(f, "Request error: {}", err),
            BookingApiError::ApiError(err) => write!(f, "API error: {}", err),
            BookingApiError::Rejected(msg) => write!(f, "Booking rejected: {}", msg),
            BookingApiError::MissingBookingId => {
                write!(f, "Booking response did not include a booking id")
            }
        }
    }
}

impl std::error::Error for BookingApiError {}

/// Creates the booking record on the hosted backend. The backend owns
/// the transactional slot decrement; this client only assembles the
/// payload and enforces the response contract.
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn create_booking(&self, draft: &BookingDraft) -> Result<CreatedBooking, BookingApiError>;
}

pub struct HttpBookingApi {
    config: BackendConfig,
    client: reqwest::Client,
}

impl HttpBookingApi {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl BookingApi for HttpBookingApi {
    async fn create_booking(&self, draft: &BookingDraft) -> Result<CreatedBooking, BookingApiError> {
        let response = self
            .client
            .post(self.config.endpoint("rpc/create-booking"))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(draft)
            .send()
            .await
            .map_err(|e| BookingApiError::RequestError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BookingApiError::ApiError(format!(
                "Status: {}, Body: {}",
                status, body
            )));
        }

        let parsed = response
            .json::<BookingCreatedResponse>()
            .await
            .map_err(|e| BookingApiError::ApiError(e.to_string()))?;

        if !parsed.success {
            return Err(BookingApiError::Rejected(
                parsed
                    .message
                    .unwrap_or_else(|| "The booking could not be created".to_string()),
            ));
        }

        let booking_id = parsed.booking_id.ok_or(BookingApiError::MissingBookingId)?;

        Ok(CreatedBooking {
            booking_id,
            reference_number: parsed.reference_number,
            email: parsed.email,
        })
    }
}
