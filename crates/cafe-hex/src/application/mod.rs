pub mod catalog;
pub mod chat;
pub mod gateway;
pub mod recommendation;
pub mod storefront;
