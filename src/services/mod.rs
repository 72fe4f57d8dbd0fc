use std::sync::Arc;

pub mod availability_service;
pub mod booking_service;
pub mod catalog_service;
pub mod email_service;
pub mod payment;
pub mod pricing_service;
pub mod promo_service;

use crate::config::{BackendConfig, EmailConfig, StripeConfig};
use availability_service::{AvailabilityClient, HttpAvailabilityClient};
use booking_service::{BookingApi, HttpBookingApi};
use catalog_service::{CatalogClient, HttpCatalogClient};
use email_service::{ConfirmationMailer, EmailService};
use payment::interface::PaymentOperations;
use payment::stripe_provider::StripeProvider;
use promo_service::{HttpPromoClient, PromoClient};

/// Every remote collaborator the wizard talks to, as trait objects so
/// the whole flow is constructible without a live backend in tests.
pub struct AppClients {
    pub catalog: Arc<dyn CatalogClient>,
    pub availability: Arc<dyn AvailabilityClient>,
    pub promo: Arc<dyn PromoClient>,
    pub bookings: Arc<dyn BookingApi>,
    pub payments: Arc<dyn PaymentOperations>,
    pub mailer: Option<Arc<dyn ConfirmationMailer>>,
}

impl AppClients {
    pub fn http(backend: BackendConfig, stripe: StripeConfig, email: Option<EmailConfig>) -> Self {
        Self {
            catalog: Arc::new(HttpCatalogClient::new(backend.clone())),
            availability: Arc::new(HttpAvailabilityClient::new(backend.clone())),
            promo: Arc::new(HttpPromoClient::new(backend.clone())),
            bookings: Arc::new(HttpBookingApi::new(backend)),
            payments: Arc::new(StripeProvider::new(stripe)),
            mailer: email.map(|config| {
                Arc::new(EmailService::new(config)) as Arc<dyn ConfirmationMailer>
            }),
        }
    }
}
