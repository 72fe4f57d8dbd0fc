pub mod bookings;
pub mod customer;
pub mod product;
pub mod promo;
pub mod schedule;
pub mod tour;
