use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use tourbook_api::config::{BackendConfig, EmailConfig, StripeConfig};
use tourbook_api::middleware;
use tourbook_api::routes;
use tourbook_api::services::AppClients;
use tourbook_api::sessions::WizardSessions;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);
    println!("Attempting to bind to {}:{}", host, port);

    let backend = BackendConfig::from_env();
    let stripe = StripeConfig::from_env();
    let email = EmailConfig::from_env();
    if email.is_none() {
        println!("Email config missing; confirmation emails are disabled");
    }

    let clients = web::Data::new(AppClients::http(backend, stripe, email));
    let sessions = web::Data::new(WizardSessions::new());

    println!("Starting HTTP server...");

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .route("/health", web::get().to(|| async { "OK" }))
            .app_data(clients.clone())
            .app_data(sessions.clone())
            .service(
                web::scope("/api")
                    // Public catalog and advisory reads
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
                    .route(
                        "/promo/validate",
                        web::post().to(routes::promo::validate_promo),
                    )
                    .route(
                        "/payment/intent",
                        web::post().to(routes::payment::create_payment_intent),
                    )
                    // Booking wizard sessions
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
                    // Staff-only flows
                    .service(
                        web::scope("/admin")
                            .wrap(middleware::auth::AuthMiddleware)
                            .route(
                                "/wizard",
                                web::post().to(routes::wizard::admin_create_wizard),
                            ),
                    ),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
