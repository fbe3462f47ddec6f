//! cafe-hex: hexagonal storefront core (application + inbound HTTP + outbound adapters)

pub mod config;
pub mod errors;

pub mod application;

pub use cafe_types::{domain, ports};

pub mod inbound; // HTTP adapter (server + handlers)
pub mod outbound; // completion service + cloud document store
