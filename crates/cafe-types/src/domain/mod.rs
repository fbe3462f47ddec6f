pub mod cart;
pub mod chat;
pub mod menu;
pub mod order;
pub mod recommendation;
