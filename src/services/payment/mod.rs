pub mod interface;
pub mod stripe_provider;
