use serde::{Deserialize, Serialize};

/// Catalog add-on (photo package, equipment rental, ...).
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
}

pub fn catalog_price(catalog: &[Product], product_id: &str) -> Option<f64> {
    catalog.iter().find(|p| p.id == product_id).map(|p| p.price)
}
