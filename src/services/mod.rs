pub mod client;
pub mod event;

pub use client::ClientService;
pub use event::EventService;
