use async_trait::async_trait;

use crate::models::{Client, ClientRecord, Event};
use crate::utils::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Data access for clients. Constraint violations (duplicate username or email,
/// unknown event) come back as `AppError::BadRequest` carrying the store's message.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// All clients in storage order.
    async fn find_all(&self) -> AppResult<Vec<Client>>;

    async fn find_by_id(&self, client_id: i32) -> AppResult<Option<Client>>;

    /// Inserts a new row; the store assigns the id.
    async fn insert(&self, record: ClientRecord) -> AppResult<Client>;

    /// Overwrites email, username and password of `client.client_id`.
    /// `None` when no such client exists.
    async fn update(&self, client: Client) -> AppResult<Option<Client>>;

    /// Removes the client and its attendance, returning what was deleted.
    async fn delete(&self, client_id: i32) -> AppResult<Option<Client>>;

    /// Records that the client attends the event. Recording it twice is a no-op.
    async fn add_attended_event(&self, client_id: i32, event_id: i32) -> AppResult<Option<Client>>;
}

/// Data access for events.
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn find_all(&self) -> AppResult<Vec<Event>>;

    async fn find_by_id(&self, event_id: i32) -> AppResult<Option<Event>>;

    /// Inserts `event` under a store-assigned id; `event.event_id` is ignored.
    async fn insert(&self, event: Event) -> AppResult<Event>;

    async fn update(&self, event: Event) -> AppResult<Option<Event>>;

    async fn delete(&self, event_id: i32) -> AppResult<Option<Event>>;
}
