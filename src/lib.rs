pub mod checkout;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod payments;
pub mod state;
pub mod storefront;
pub mod util;
