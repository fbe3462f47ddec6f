//! cafe-types: storefront domain model and the ports its adapters implement.

pub mod domain;
pub mod ports;
