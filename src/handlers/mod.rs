pub mod clients;
pub mod events;
