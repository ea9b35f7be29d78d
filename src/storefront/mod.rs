//! Storefront side of the checkout: an in-memory cart and a typed client
//! that drives the gateway through one of the three checkout flows.

mod cart;
mod client;
mod flow;

pub use cart::*;
pub use client::*;
pub use flow::*;
