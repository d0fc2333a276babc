use std::sync::Arc;

use crate::config::{Config, UpdateResponse};
use crate::repository::{ClientRepository, EventRepository};
use crate::services::{ClientService, EventService};
use crate::utils::{LinkBuilder, PasswordEncoder};

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub clients: ClientService,
    pub events: EventService,
    pub links: LinkBuilder,
    pub update_response: UpdateResponse,
}

impl AppState {
    /// Wires both services to one store holding clients and events.
    pub fn new<S>(store: S, config: &Config) -> Self
    where
        S: ClientRepository + EventRepository + 'static,
    {
        let store = Arc::new(store);
        let client_repository: Arc<dyn ClientRepository> = store.clone();
        let event_repository: Arc<dyn EventRepository> = store;

        Self {
            clients: ClientService::new(
                client_repository,
                event_repository.clone(),
                PasswordEncoder,
            ),
            events: EventService::new(event_repository),
            links: LinkBuilder::new(config.public_base_url.clone()),
            update_response: config.update_response,
        }
    }
}
