use actix_web::{web, HttpResponse, Responder};

use crate::routes::ErrorResponse;
use crate::services::catalog_service::CatalogError;
use crate::services::AppClients;

pub async fn get_tours(clients: web::Data<AppClients>) -> impl Responder {
    match clients.catalog.fetch_tours().await {
        Ok(tours) => HttpResponse::Ok().json(tours),
        Err(CatalogError::BadTourConfig(msg)) => {
            eprintln!("Tour catalog carries bad config: {}", msg);
            HttpResponse::BadGateway().json(ErrorResponse::new("bad_tour_config", msg))
        }
        Err(err) => {
            eprintln!("Error fetching tours: {:?}", err);
            HttpResponse::BadGateway()
                .json(ErrorResponse::new("catalog_unavailable", "Failed to fetch tours"))
        }
    }
}

pub async fn get_tour_by_id(
    clients: web::Data<AppClients>,
    path: web::Path<String>,
) -> impl Responder {
    let tour_id = path.into_inner();

    match clients.catalog.fetch_tour(&tour_id).await {
        Ok(Some(tour)) => HttpResponse::Ok().json(tour),
        Ok(None) => {
            HttpResponse::NotFound().json(ErrorResponse::new("not_found", "Tour not found"))
        }
        Err(CatalogError::BadTourConfig(msg)) => {
            eprintln!("Tour {} carries bad config: {}", tour_id, msg);
            HttpResponse::BadGateway().json(ErrorResponse::new("bad_tour_config", msg))
        }
        Err(err) => {
            eprintln!("Error fetching tour {}: {:?}", tour_id, err);
            HttpResponse::BadGateway()
                .json(ErrorResponse::new("catalog_unavailable", "Failed to fetch tour"))
        }
    }
}

pub async fn get_products(clients: web::Data<AppClients>) -> impl Responder {
    match clients.catalog.fetch_products().await {
        Ok(products) => HttpResponse::Ok().json(products),
        Err(err) => {
            eprintln!("Error fetching products: {:?}", err);
            HttpResponse::BadGateway()
                .json(ErrorResponse::new("catalog_unavailable", "Failed to fetch products"))
        }
    }
}
