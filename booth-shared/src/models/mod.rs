pub mod events;
pub mod food;
pub mod order;
pub mod requests;
pub mod table;
