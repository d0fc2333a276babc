pub mod client;
pub mod event;

pub use client::{Client, ClientPatch, ClientRecord, NewClient};
pub use event::{Event, EventPatch, NewEvent, DEFAULT_IMAGE_URL};
