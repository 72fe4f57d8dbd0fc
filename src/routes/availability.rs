use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use crate::models::schedule::filter_to_active_weekdays;
use crate::routes::ErrorResponse;
use crate::services::AppClients;

#[derive(Debug, Deserialize)]
pub struct RemainingSlotsInput {
    pub tour_id: String,
    pub date: NaiveDate,
    pub time: String,
}

pub async fn remaining_slots(
    clients: web::Data<AppClients>,
    input: web::Json<RemainingSlotsInput>,
) -> impl Responder {
    let input = input.into_inner();

    match clients
        .availability
        .remaining_slots(&input.tour_id, input.date, &input.time)
        .await
    {
        Ok(count) => HttpResponse::Ok().json(json!({ "remaining_slots": count })),
        Err(err) => {
            eprintln!("Error fetching remaining slots: {:?}", err);
            HttpResponse::BadGateway().json(ErrorResponse::new(
                "availability_unavailable",
                "Failed to check remaining slots",
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FullyBookedInput {
    pub tour_id: String,
    pub dates: Vec<NaiveDate>,
}

/// Batch fully-booked check used to grey out calendar cells. Candidate
/// dates are narrowed to the tour's active weekdays first, so the
/// backend is never asked about days the tour does not run.
pub async fn fully_booked_dates(
    clients: web::Data<AppClients>,
    input: web::Json<FullyBookedInput>,
) -> impl Responder {
    let input = input.into_inner();

    let tour = match clients.catalog.fetch_tour(&input.tour_id).await {
        Ok(Some(tour)) => tour,
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(ErrorResponse::new("not_found", "Tour not found"));
        }
        Err(err) => {
            eprintln!("Error fetching tour for availability: {:?}", err);
            return HttpResponse::BadGateway()
                .json(ErrorResponse::new("catalog_unavailable", "Failed to fetch tour"));
        }
    };

    let candidates = filter_to_active_weekdays(&tour, &input.dates);

    match clients
        .availability
        .fully_booked_dates(&tour.id, &candidates)
        .await
    {
        Ok(booked) => {
            let mut dates: Vec<NaiveDate> = booked.into_iter().collect();
            dates.sort();
            HttpResponse::Ok().json(json!({ "fully_booked": dates }))
        }
        Err(err) => {
            eprintln!("Error fetching fully booked dates: {:?}", err);
            HttpResponse::BadGateway().json(ErrorResponse::new(
                "availability_unavailable",
                "Failed to check fully booked dates",
            ))
        }
    }
}
