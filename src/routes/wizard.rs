use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::middleware::auth::Claims;
use crate::models::customer::CustomerInformation;
use crate::routes::ErrorResponse;
use crate::services::AppClients;
use crate::sessions::WizardSessions;
use crate::wizard::controller::{WizardController, WizardPrefill};
use crate::wizard::step::{RetreatOutcome, WizardMode};
use crate::wizard::submit::{submit_booking, SubmitDeps, SubmitError};
use crate::wizard::validation::{validate, BookingValidationErrors};

#[derive(Debug, Deserialize)]
pub struct CreateWizardInput {
    pub tour_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    /// Reference number of an existing confirmed booking to attach
    /// additional services to.
    pub additional_booking_reference: Option<String>,
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new("not_found", "Wizard session not found"))
}

fn state_response(sessions: &WizardSessions, session_id: Uuid) -> HttpResponse {
    match sessions.with(session_id, |c| c.snapshot().clone()) {
        Some(state) => HttpResponse::Ok().json(json!({ "state": state })),
        None => not_found(),
    }
}

/// Re-run promo reconciliation after a subtotal-affecting edit, when a
/// code is on file. Each round trip carries a fresh generation, so of
/// several racing recomputes only the last one started can apply.
async fn revalidate_promo(sessions: &WizardSessions, clients: &AppClients, session_id: Uuid) {
    let pending = sessions
        .with_mut(session_id, |c| {
            let code = c.snapshot().promo.code.clone()?;
            let (generation, subtotal) = c.begin_promo_validation(&code);
            Some((code, generation, subtotal))
        })
        .flatten();

    if let Some((code, generation, subtotal)) = pending {
        let outcome = clients.promo.reconcile(&code, subtotal).await;
        sessions.with_mut(session_id, |c| c.apply_promo_outcome(generation, &outcome));
    }
}

async fn create_session(
    clients: &AppClients,
    sessions: &WizardSessions,
    input: CreateWizardInput,
    created_by: Option<String>,
) -> HttpResponse {
    let mode = match input.additional_booking_reference {
        Some(reference_number) => WizardMode::AdditionalBooking { reference_number },
        None => WizardMode::NewBooking,
    };

    let tour = match &input.tour_id {
        Some(tour_id) => match clients.catalog.fetch_tour(tour_id).await {
            Ok(Some(tour)) => Some(tour),
            Ok(None) => {
                return HttpResponse::NotFound()
                    .json(ErrorResponse::new("not_found", "Tour not found"));
            }
            Err(err) => {
                eprintln!("Error fetching tour for wizard: {:?}", err);
                return HttpResponse::BadGateway()
                    .json(ErrorResponse::new("catalog_unavailable", "Failed to fetch tour"));
            }
        },
        None => None,
    };

    // A missing product catalog degrades to an empty add-on list; it
    // never blocks opening the wizard.
    let catalog = match clients.catalog.fetch_products().await {
        Ok(products) => products,
        Err(err) => {
            eprintln!("Error fetching products for wizard: {:?}", err);
            Vec::new()
        }
    };

    let prefilled = tour
        .as_ref()
        .map(|t| t.id.clone())
        .zip(input.date)
        .zip(input.time.clone());

    let mut controller = WizardController::new(
        mode,
        WizardPrefill {
            tour,
            date: input.date,
            time: input.time,
        },
        created_by,
    );
    controller.set_product_catalog(catalog);
    let generation = controller.availability_generation();

    let session_id = sessions.insert(controller);

    // Prefilled schedule: fetch the advisory capacity up front so the
    // review step can validate against it.
    if let Some(((tour_id, date), time)) = prefilled {
        match clients.availability.remaining_slots(&tour_id, date, &time).await {
            Ok(count) => {
                sessions.with_mut(session_id, |c| {
                    c.apply_remaining_slots(generation, date, &time, count)
                });
            }
            Err(err) => {
                eprintln!("Error prefetching remaining slots: {:?}", err);
            }
        }
    }

    match sessions.with(session_id, |c| c.snapshot().clone()) {
        Some(state) => {
            HttpResponse::Ok().json(json!({ "session_id": session_id, "state": state }))
        }
        None => not_found(),
    }
}

pub async fn create_wizard(
    clients: web::Data<AppClients>,
    sessions: web::Data<WizardSessions>,
    input: web::Json<CreateWizardInput>,
) -> impl Responder {
    create_session(&clients, &sessions, input.into_inner(), None).await
}

/// Admin-entered flows (editing a reservation, adding services, taking
/// a booking over the phone). The staff identity only attributes the
/// resulting booking.
pub async fn admin_create_wizard(
    clients: web::Data<AppClients>,
    sessions: web::Data<WizardSessions>,
    input: web::Json<CreateWizardInput>,
    claims: Claims,
) -> impl Responder {
    create_session(&clients, &sessions, input.into_inner(), Some(claims.user_id)).await
}

pub async fn get_wizard(
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
) -> impl Responder {
    state_response(&sessions, path.into_inner())
}

pub async fn close_wizard(
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match sessions.remove(path.into_inner()) {
        Some(_) => HttpResponse::Ok().json(json!({ "closed": true })),
        None => not_found(),
    }
}

pub async fn advance(
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let session_id = path.into_inner();
    match sessions.with_mut(session_id, |c| {
        c.advance();
        c.snapshot().clone()
    }) {
        Some(state) => HttpResponse::Ok().json(json!({ "state": state })),
        None => not_found(),
    }
}

pub async fn retreat(
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let session_id = path.into_inner();
    match sessions.with_mut(session_id, |c| (c.retreat(), c.snapshot().clone())) {
        Some((outcome, state)) => {
            let (close_requested, needs_confirmation) = match outcome {
                RetreatOutcome::MovedBack => (false, false),
                RetreatOutcome::CloseRequested { needs_confirmation } => {
                    (true, needs_confirmation)
                }
            };
            HttpResponse::Ok().json(json!({
                "close_requested": close_requested,
                "needs_confirmation": needs_confirmation,
                "state": state,
            }))
        }
        None => not_found(),
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeTourInput {
    pub tour_id: String,
}

pub async fn change_tour(
    clients: web::Data<AppClients>,
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
    input: web::Json<ChangeTourInput>,
) -> impl Responder {
    let session_id = path.into_inner();

    let tour = match clients.catalog.fetch_tour(&input.tour_id).await {
        Ok(Some(tour)) => tour,
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(ErrorResponse::new("not_found", "Tour not found"));
        }
        Err(err) => {
            eprintln!("Error fetching tour: {:?}", err);
            return HttpResponse::BadGateway()
                .json(ErrorResponse::new("catalog_unavailable", "Failed to fetch tour"));
        }
    };

    match sessions.with_mut(session_id, |c| {
        c.change_tour(tour);
        c.snapshot().clone()
    }) {
        Some(state) => HttpResponse::Ok().json(json!({ "state": state })),
        None => not_found(),
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeDateInput {
    pub date: NaiveDate,
}

pub async fn change_date(
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
    input: web::Json<ChangeDateInput>,
) -> impl Responder {
    let session_id = path.into_inner();
    match sessions.with_mut(session_id, |c| {
        c.change_date(input.date);
        c.snapshot().clone()
    }) {
        Some(state) => HttpResponse::Ok().json(json!({ "state": state })),
        None => not_found(),
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectTimeInput {
    pub time: String,
}

/// Selecting a time kicks off the availability refetch. The response
/// carries the refreshed state; if the advisory check is down, the
/// selection stands and a warning rides along instead.
pub async fn select_time(
    clients: web::Data<AppClients>,
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
    input: web::Json<SelectTimeInput>,
) -> impl Responder {
    let session_id = path.into_inner();
    let input = input.into_inner();

    let prep = sessions.with_mut(session_id, |c| {
        let generation = c.select_time(&input.time)?;
        let state = c.snapshot();
        let tour_id = state.tour.as_ref()?.id.clone();
        let date = state.schedule.date?;
        Some((generation, tour_id, date))
    });

    let Some(prep) = prep else {
        return not_found();
    };
    let Some((generation, tour_id, date)) = prep else {
        return HttpResponse::UnprocessableEntity().json(ErrorResponse::new(
            "time_unavailable",
            "That time is not offered for this tour",
        ));
    };

    match clients
        .availability
        .remaining_slots(&tour_id, date, &input.time)
        .await
    {
        Ok(count) => {
            sessions.with_mut(session_id, |c| {
                c.apply_remaining_slots(generation, date, &input.time, count)
            });
            state_response(&sessions, session_id)
        }
        Err(err) => {
            eprintln!("Error fetching remaining slots: {:?}", err);
            match sessions.with(session_id, |c| c.snapshot().clone()) {
                Some(state) => HttpResponse::Ok().json(json!({
                    "state": state,
                    "warning": "Availability could not be checked right now",
                })),
                None => not_found(),
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PartySizeInput {
    pub size: u32,
}

pub async fn set_party_size(
    clients: web::Data<AppClients>,
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
    input: web::Json<PartySizeInput>,
) -> impl Responder {
    let session_id = path.into_inner();
    if sessions
        .with_mut(session_id, |c| c.set_party_size(input.size))
        .is_none()
    {
        return not_found();
    }
    revalidate_promo(&sessions, &clients, session_id).await;
    state_response(&sessions, session_id)
}

pub async fn increase_party_size(
    clients: web::Data<AppClients>,
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let session_id = path.into_inner();
    if sessions
        .with_mut(session_id, |c| c.increase_party_size())
        .is_none()
    {
        return not_found();
    }
    revalidate_promo(&sessions, &clients, session_id).await;
    state_response(&sessions, session_id)
}

#[derive(Debug, Deserialize)]
pub struct AddSlotInput {
    pub slot_type: String,
}

pub async fn add_slot(
    clients: web::Data<AppClients>,
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
    input: web::Json<AddSlotInput>,
) -> impl Responder {
    let session_id = path.into_inner();
    if sessions
        .with_mut(session_id, |c| c.add_slot(&input.slot_type))
        .is_none()
    {
        return not_found();
    }
    revalidate_promo(&sessions, &clients, session_id).await;
    state_response(&sessions, session_id)
}

#[derive(Debug, Deserialize)]
pub struct RemoveSlotInput {
    pub index: usize,
}

pub async fn remove_slot(
    clients: web::Data<AppClients>,
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
    input: web::Json<RemoveSlotInput>,
) -> impl Responder {
    let session_id = path.into_inner();
    if sessions
        .with_mut(session_id, |c| c.remove_slot(input.index))
        .is_none()
    {
        return not_found();
    }
    revalidate_promo(&sessions, &clients, session_id).await;
    state_response(&sessions, session_id)
}

#[derive(Debug, Deserialize)]
pub struct SlotFieldInput {
    pub index: usize,
    pub name: String,
    pub value: String,
}

pub async fn set_slot_field(
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
    input: web::Json<SlotFieldInput>,
) -> impl Responder {
    let session_id = path.into_inner();
    match sessions.with_mut(session_id, |c| {
        c.set_slot_field(input.index, &input.name, &input.value);
        c.snapshot().clone()
    }) {
        Some(state) => HttpResponse::Ok().json(json!({ "state": state })),
        None => not_found(),
    }
}

#[derive(Debug, Deserialize)]
pub struct ProductQuantityInput {
    pub product_id: String,
    pub quantity: u32,
}

pub async fn set_product_quantity(
    clients: web::Data<AppClients>,
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
    input: web::Json<ProductQuantityInput>,
) -> impl Responder {
    let session_id = path.into_inner();
    if sessions
        .with_mut(session_id, |c| {
            c.set_product_quantity(&input.product_id, input.quantity)
        })
        .is_none()
    {
        return not_found();
    }
    revalidate_promo(&sessions, &clients, session_id).await;
    state_response(&sessions, session_id)
}

pub async fn set_customer(
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
    input: web::Json<CustomerInformation>,
) -> impl Responder {
    let session_id = path.into_inner();
    match sessions.with_mut(session_id, |c| {
        c.set_customer(input.into_inner());
        c.snapshot().clone()
    }) {
        Some(state) => HttpResponse::Ok().json(json!({ "state": state })),
        None => not_found(),
    }
}

#[derive(Debug, Deserialize)]
pub struct PaymentMethodInput {
    pub method: String,
}

pub async fn set_payment_method(
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
    input: web::Json<PaymentMethodInput>,
) -> impl Responder {
    let session_id = path.into_inner();
    match sessions.with_mut(session_id, |c| {
        c.set_payment_method(&input.method);
        c.snapshot().clone()
    }) {
        Some(state) => HttpResponse::Ok().json(json!({ "state": state })),
        None => not_found(),
    }
}

#[derive(Debug, Deserialize)]
pub struct ApplyPromoInput {
    pub code: String,
}

pub async fn apply_promo(
    clients: web::Data<AppClients>,
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
    input: web::Json<ApplyPromoInput>,
) -> impl Responder {
    let session_id = path.into_inner();
    let code = input.into_inner().code;

    if code.trim().is_empty() {
        return match sessions.with_mut(session_id, |c| {
            c.clear_promo();
            c.snapshot().clone()
        }) {
            Some(state) => HttpResponse::Ok().json(json!({ "success": true, "state": state })),
            None => not_found(),
        };
    }

    let Some((generation, subtotal)) =
        sessions.with_mut(session_id, |c| c.begin_promo_validation(&code))
    else {
        return not_found();
    };

    let outcome = clients.promo.reconcile(&code, subtotal).await;
    if sessions
        .with_mut(session_id, |c| c.apply_promo_outcome(generation, &outcome))
        .is_none()
    {
        return not_found();
    }

    let state = match sessions.with(session_id, |c| c.snapshot().clone()) {
        Some(state) => state,
        None => return not_found(),
    };

    match outcome {
        crate::models::promo::PromoOutcome::Applied { total, .. } => {
            HttpResponse::Ok().json(json!({ "success": true, "total": total, "state": state }))
        }
        crate::models::promo::PromoOutcome::Cleared { subtotal, message } => {
            HttpResponse::Ok().json(json!({
                "success": false,
                "message": message,
                "total": subtotal,
                "state": state,
            }))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitInput {
    pub payment_intent_id: Option<String>,
}

enum SubmitPrepError {
    AlreadySubmitting,
    Incomplete,
    Validation(BookingValidationErrors),
}

pub async fn submit(
    clients: web::Data<AppClients>,
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
    input: web::Json<SubmitInput>,
) -> impl Responder {
    let session_id = path.into_inner();
    let input = input.into_inner();

    // 1. Validate and assemble the draft under the session lock. No
    // network call happens before validation passes.
    let prep = sessions.with_mut(session_id, |c| {
        if !c.begin_submit() {
            return Err(SubmitPrepError::AlreadySubmitting);
        }
        if let Err(errors) = validate(c.snapshot()) {
            c.end_submit();
            return Err(SubmitPrepError::Validation(errors));
        }
        match c.build_draft(input.payment_intent_id.clone()) {
            Some(draft) => Ok((draft, c.existing_booking_id())),
            None => {
                c.end_submit();
                Err(SubmitPrepError::Incomplete)
            }
        }
    });

    let (draft, existing_booking_id) = match prep {
        None => return not_found(),
        Some(Err(SubmitPrepError::AlreadySubmitting)) => {
            return HttpResponse::Conflict().json(ErrorResponse::new(
                "submit_in_progress",
                "This booking is already being submitted",
            ));
        }
        Some(Err(SubmitPrepError::Validation(errors))) => {
            return HttpResponse::UnprocessableEntity().json(json!({
                "error": "validation_failed",
                "validation": errors,
            }));
        }
        Some(Err(SubmitPrepError::Incomplete)) => {
            return HttpResponse::UnprocessableEntity().json(ErrorResponse::new(
                "incomplete_booking",
                "Tour, date and time must be selected before submitting",
            ));
        }
        Some(Ok(prep)) => prep,
    };

    // 2. Run the create-then-charge sequence outside the lock.
    let result = submit_booking(
        &draft,
        existing_booking_id,
        SubmitDeps {
            bookings: clients.bookings.as_ref(),
            payments: clients.payments.as_ref(),
            mailer: clients.mailer.as_deref(),
        },
    )
    .await;

    // 3. Record the outcome. A failed charge keeps the created booking
    // id around so a retry reuses it instead of double-booking.
    sessions.with_mut(session_id, |c| {
        c.end_submit();
        match &result {
            Ok(success) => {
                c.note_booking_created(success.booking_id.clone());
                c.mark_complete();
            }
            Err(SubmitError::Payment { booking_id, .. }) => {
                c.note_booking_created(booking_id.clone());
            }
            Err(SubmitError::BookingCreation(_)) => {}
        }
    });

    match result {
        Ok(success) => {
            let state = sessions.with(session_id, |c| c.snapshot().clone());
            HttpResponse::Ok().json(json!({
                "success": true,
                "booking_id": success.booking_id,
                "reference_number": success.reference_number,
                "payment_id": success.payment_id,
                "email_sent": success.email_sent,
                "state": state,
            }))
        }
        Err(SubmitError::BookingCreation(message)) => {
            HttpResponse::BadGateway().json(ErrorResponse::new("booking_creation_failed", message))
        }
        Err(SubmitError::Payment { booking_id, message }) => {
            HttpResponse::BadGateway().json(json!({
                "error": "payment_failed",
                "booking_id": booking_id,
                "message": message,
            }))
        }
    }
}
