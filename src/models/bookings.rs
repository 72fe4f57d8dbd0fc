use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::customer::CustomerInformation;

/// One purchased seat. `price` is a point-in-time snapshot taken when
/// the slot was selected, not recomputed later.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SlotDetail {
    /// Matches a custom slot type name; empty for flat-rate tours.
    #[serde(default)]
    pub type_name: String,
    pub price: f64,
    /// Values for the tour's custom per-slot fields, keyed by field name.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl SlotDetail {
    pub fn of_type(type_name: &str, price: f64) -> Self {
        Self {
            type_name: type_name.to_string(),
            price,
            fields: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProductLine {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price: f64,
}

/// The assembled booking request, built at submission time. This is the
/// exact payload posted to the hosted backend's create-booking RPC; the
/// booking does not exist remotely until that call returns an id.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BookingDraft {
    pub customer: CustomerInformation,
    pub tour_id: String,
    pub tour_name: String,
    pub date: NaiveDate,
    /// "HH:mm"
    pub time: String,
    pub number_of_people: u32,
    pub slot_details: Vec<SlotDetail>,
    pub products: Vec<ProductLine>,
    pub subtotal: f64,
    pub total: f64,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_id: Option<String>,
    pub discount_amount: f64,
    /// Reference number of the confirmed booking this purchase extends.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_to: Option<String>,
    /// Admin user id for bookings entered on a customer's behalf.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// Raw create-booking response. A `success` without a `booking_id` is
/// treated as a hard failure by the client layer.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BookingCreatedResponse {
    pub success: bool,
    #[serde(default)]
    pub booking_id: Option<String>,
    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub email: Option<BookingEmailEcho>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A created booking with its id guaranteed present.
#[derive(Debug, Clone)]
pub struct CreatedBooking {
    pub booking_id: String,
    pub reference_number: Option<String>,
    pub email: Option<BookingEmailEcho>,
}

/// Echo of the customer/tour/pricing fields the backend returns with a
/// created booking, used to drive the confirmation email.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BookingEmailEcho {
    pub reference_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub tour_name: String,
    pub date: NaiveDate,
    pub time: String,
    pub number_of_people: u32,
    pub subtotal: f64,
    pub total: f64,
}
