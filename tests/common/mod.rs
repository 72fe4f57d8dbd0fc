use std::collections::HashSet;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use actix_web::{web, App};
use async_trait::async_trait;
use chrono::NaiveDate;

use tourbook_api::models::bookings::{BookingDraft, BookingEmailEcho, CreatedBooking};
use tourbook_api::models::customer::CustomerInformation;
use tourbook_api::models::product::Product;
use tourbook_api::models::promo::{AppliedPromo, PromoOutcome};
use tourbook_api::models::tour::{SlotType, Tour};
use tourbook_api::routes;
use tourbook_api::services::availability_service::{AvailabilityClient, AvailabilityError};
use tourbook_api::services::booking_service::{BookingApi, BookingApiError};
use tourbook_api::services::catalog_service::{CatalogClient, CatalogError};
use tourbook_api::services::email_service::{ConfirmationMailer, EmailError};
use tourbook_api::services::payment::interface::{
    ConfirmedPayment, PaymentError, PaymentIntentHandle, PaymentOperations,
};
use tourbook_api::services::promo_service::PromoClient;
use tourbook_api::services::AppClients;
use tourbook_api::sessions::WizardSessions;

pub fn flat_tour() -> Tour {
    Tour {
        id: "tour_flat".to_string(),
        name: "Harbor Kayak".to_string(),
        rate: 50.0,
        max_group: 10,
        // Monday / Wednesday / Friday
        active_weekdays: vec![1, 3, 5],
        time_slots: vec!["09:00".to_string(), "14:00".to_string()],
        slot_types: Vec::new(),
        slot_fields: Vec::new(),
    }
}

pub fn tiered_tour() -> Tour {
    let mut tour = flat_tour();
    tour.id = "tour_tiered".to_string();
    tour.name = "Canyon Hike".to_string();
    tour.slot_types = vec![
        SlotType { name: "adult".to_string(), price: 40.0 },
        SlotType { name: "child".to_string(), price: 20.0 },
    ];
    tour
}

pub struct TestCatalog;

#[async_trait]
impl CatalogClient for TestCatalog {
    async fn fetch_tours(&self) -> Result<Vec<Tour>, CatalogError> {
        Ok(vec![flat_tour(), tiered_tour()])
    }

    async fn fetch_tour(&self, tour_id: &str) -> Result<Option<Tour>, CatalogError> {
        Ok([flat_tour(), tiered_tour()]
            .into_iter()
            .find(|t| t.id == tour_id))
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(vec![Product {
            id: "photos".to_string(),
            name: "Photo package".to_string(),
            price: 15.0,
        }])
    }
}

pub struct TestAvailability {
    pub remaining: u32,
    pub booked_dates: Vec<NaiveDate>,
}

#[async_trait]
impl AvailabilityClient for TestAvailability {
    async fn remaining_slots(
        &self,
        _tour_id: &str,
        _date: NaiveDate,
        _time: &str,
    ) -> Result<u32, AvailabilityError> {
        Ok(self.remaining)
    }

    async fn fully_booked_dates(
        &self,
        _tour_id: &str,
        dates: &[NaiveDate],
    ) -> Result<HashSet<NaiveDate>, AvailabilityError> {
        Ok(dates
            .iter()
            .copied()
            .filter(|d| self.booked_dates.contains(d))
            .collect())
    }
}

/// "SUMMER" is worth $30 off; everything else is rejected.
pub struct TestPromo;

#[async_trait]
impl PromoClient for TestPromo {
    async fn reconcile(&self, code: &str, subtotal: f64) -> PromoOutcome {
        if code == "SUMMER" {
            PromoOutcome::Applied {
                promo: AppliedPromo {
                    code: code.to_string(),
                    promo_id: Some("promo_summer".to_string()),
                    discount_amount: 30.0,
                },
                subtotal,
                total: subtotal - 30.0,
            }
        } else {
            PromoOutcome::Cleared {
                subtotal,
                message: "This promo code is not valid".to_string(),
            }
        }
    }
}

pub struct TestBookings {
    pub calls: AtomicUsize,
}

impl TestBookings {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0) })
    }
}

#[async_trait]
impl BookingApi for TestBookings {
    async fn create_booking(&self, draft: &BookingDraft) -> Result<CreatedBooking, BookingApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CreatedBooking {
            booking_id: "bk_1".to_string(),
            reference_number: Some("TB-1001".to_string()),
            email: Some(BookingEmailEcho {
                reference_number: "TB-1001".to_string(),
                customer_name: draft.customer.full_name(),
                customer_email: draft.customer.email.clone(),
                tour_name: draft.tour_name.clone(),
                date: draft.date,
                time: draft.time.clone(),
                number_of_people: draft.number_of_people,
                subtotal: draft.subtotal,
                total: draft.total,
            }),
        })
    }
}

/// Intent ids containing "fail" are declined; everything else succeeds.
pub struct TestPayments;

#[async_trait]
impl PaymentOperations for TestPayments {
    async fn create_payment_intent(
        &self,
        _amount_minor: i64,
        _customer: &CustomerInformation,
        _metadata: Vec<(String, String)>,
    ) -> Result<PaymentIntentHandle, PaymentError> {
        Ok(PaymentIntentHandle {
            id: "pi_test".to_string(),
            client_secret: Some("pi_test_secret".to_string()),
        })
    }

    async fn confirm_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<ConfirmedPayment, PaymentError> {
        if payment_intent_id.contains("fail") {
            return Err(PaymentError::Provider("Your card was declined".to_string()));
        }
        Ok(ConfirmedPayment {
            payment_id: payment_intent_id.to_string(),
            status: "succeeded".to_string(),
        })
    }
}

pub struct TestMailer;

#[async_trait]
impl ConfirmationMailer for TestMailer {
    async fn send_confirmation(&self, _echo: &BookingEmailEcho) -> Result<(), EmailError> {
        Ok(())
    }
}

pub fn test_clients(remaining: u32, bookings: Arc<TestBookings>) -> AppClients {
    AppClients {
        catalog: Arc::new(TestCatalog),
        availability: Arc::new(TestAvailability { remaining, booked_dates: Vec::new() }),
        promo: Arc::new(TestPromo),
        bookings,
        payments: Arc::new(TestPayments),
        mailer: Some(Arc::new(TestMailer)),
    }
}

/// The real route table wired against mock clients; no external
/// services are reachable from the test run.
pub fn create_app(
    clients: AppClients,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(clients))
        .app_data(web::Data::new(WizardSessions::new()))
        .route("/health", web::get().to(|| async { "OK" }))
        .service(
            web::scope("/api")
                .route("/tours", web::get().to(routes::tours::get_tours))
                .route("/tours/{id}", web::get().to(routes::tours::get_tour_by_id))
                .route("/products", web::get().to(routes::tours::get_products))
                .service(
                    web::scope("/availability")
                        .route(
                            "/remaining",
                            web::post().to(routes::availability::remaining_slots),
                        )
                        .route(
                            "/fully-booked",
                            web::post().to(routes::availability::fully_booked_dates),
                        ),
                )
                .route("/promo/validate", web::post().to(routes::promo::validate_promo))
                .route(
                    "/payment/intent",
                    web::post().to(routes::payment::create_payment_intent),
                )
                .service(
                    web::scope("/wizard")
                        .route("", web::post().to(routes::wizard::create_wizard))
                        .route("/{id}", web::get().to(routes::wizard::get_wizard))
                        .route("/{id}", web::delete().to(routes::wizard::close_wizard))
                        .route("/{id}/advance", web::post().to(routes::wizard::advance))
                        .route("/{id}/retreat", web::post().to(routes::wizard::retreat))
                        .route("/{id}/tour", web::post().to(routes::wizard::change_tour))
                        .route("/{id}/date", web::post().to(routes::wizard::change_date))
                        .route("/{id}/time", web::post().to(routes::wizard::select_time))
                        .route(
                            "/{id}/party-size",
                            web::post().to(routes::wizard::set_party_size),
                        )
                        .route(
                            "/{id}/party-size/increase",
                            web::post().to(routes::wizard::increase_party_size),
                        )
                        .route("/{id}/slots", web::post().to(routes::wizard::add_slot))
                        .route(
                            "/{id}/slots/remove",
                            web::post().to(routes::wizard::remove_slot),
                        )
                        .route(
                            "/{id}/slots/field",
                            web::post().to(routes::wizard::set_slot_field),
                        )
                        .route(
                            "/{id}/products",
                            web::post().to(routes::wizard::set_product_quantity),
                        )
                        .route("/{id}/customer", web::post().to(routes::wizard::set_customer))
                        .route(
                            "/{id}/payment-method",
                            web::post().to(routes::wizard::set_payment_method),
                        )
                        .route("/{id}/promo", web::post().to(routes::wizard::apply_promo))
                        .route("/{id}/submit", web::post().to(routes::wizard::submit)),
                )
                .service(
                    web::scope("/admin")
                        .wrap(tourbook_api::middleware::auth::AuthMiddleware)
                        .route(
                            "/wizard",
                            web::post().to(routes::wizard::admin_create_wizard),
                        ),
                ),
        )
}
