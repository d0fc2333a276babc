use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{ClientRepository, EventRepository};
use crate::models::{Client, ClientRecord, Event};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone)]
struct ClientRow {
    email: String,
    username: String,
    password: String,
}

#[derive(Debug, Default)]
struct Tables {
    clients: BTreeMap<i32, ClientRow>,
    events: BTreeMap<i32, Event>,
    /// (client_id, event_id)
    attendees: BTreeSet<(i32, i32)>,
    next_client_id: i32,
    next_event_id: i32,
}

impl Tables {
    fn client(&self, client_id: i32) -> Option<Client> {
        let row = self.clients.get(&client_id)?;
        let attended_events = self
            .attendees
            .range((client_id, i32::MIN)..=(client_id, i32::MAX))
            .filter_map(|(_, event_id)| self.events.get(event_id).cloned())
            .collect();

        Some(Client {
            client_id,
            email: row.email.clone(),
            username: row.username.clone(),
            password: row.password.clone(),
            attended_events,
        })
    }

    /// Mirrors the UNIQUE constraints on `clients.email` and `clients.username`.
    fn check_unique(&self, client_id: Option<i32>, email: &str, username: &str) -> AppResult<()> {
        for (id, row) in &self.clients {
            if Some(*id) == client_id {
                continue;
            }
            if row.username == username {
                return Err(unique_violation("clients_username_key"));
            }
            if row.email == email {
                return Err(unique_violation("clients_email_key"));
            }
        }
        Ok(())
    }
}

fn unique_violation(constraint: &str) -> AppError {
    AppError::BadRequest(format!(
        "duplicate key value violates unique constraint \"{constraint}\""
    ))
}

/// In-process store with the same constraints as the Postgres schema. Used by the
/// test suite and by `STORAGE=memory`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientRepository for MemoryStore {
    async fn find_all(&self) -> AppResult<Vec<Client>> {
        let tables = self.tables.read().await;
        Ok(tables
            .clients
            .keys()
            .filter_map(|id| tables.client(*id))
            .collect())
    }

    async fn find_by_id(&self, client_id: i32) -> AppResult<Option<Client>> {
        Ok(self.tables.read().await.client(client_id))
    }

    async fn insert(&self, record: ClientRecord) -> AppResult<Client> {
        let mut tables = self.tables.write().await;
        tables.check_unique(None, &record.email, &record.username)?;

        tables.next_client_id += 1;
        let client_id = tables.next_client_id;
        tables.clients.insert(
            client_id,
            ClientRow {
                email: record.email,
                username: record.username,
                password: record.password,
            },
        );

        tables
            .client(client_id)
            .ok_or_else(|| AppError::Internal(format!("client {client_id} vanished after insert")))
    }

    async fn update(&self, client: Client) -> AppResult<Option<Client>> {
        let mut tables = self.tables.write().await;
        if !tables.clients.contains_key(&client.client_id) {
            return Ok(None);
        }
        tables.check_unique(Some(client.client_id), &client.email, &client.username)?;

        tables.clients.insert(
            client.client_id,
            ClientRow {
                email: client.email,
                username: client.username,
                password: client.password,
            },
        );
        Ok(tables.client(client.client_id))
    }

    async fn delete(&self, client_id: i32) -> AppResult<Option<Client>> {
        let mut tables = self.tables.write().await;
        let Some(client) = tables.client(client_id) else {
            return Ok(None);
        };

        tables.clients.remove(&client_id);
        tables.attendees.retain(|(c, _)| *c != client_id);
        Ok(Some(client))
    }

    async fn add_attended_event(&self, client_id: i32, event_id: i32) -> AppResult<Option<Client>> {
        let mut tables = self.tables.write().await;
        if !tables.clients.contains_key(&client_id) {
            return Ok(None);
        }
        if !tables.events.contains_key(&event_id) {
            return Err(AppError::BadRequest(format!(
                "insert or update on table \"attendees\" violates foreign key constraint \"attendees_event_id_fkey\": event {event_id} does not exist"
            )));
        }

        tables.attendees.insert((client_id, event_id));
        Ok(tables.client(client_id))
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn find_all(&self) -> AppResult<Vec<Event>> {
        Ok(self.tables.read().await.events.values().cloned().collect())
    }

    async fn find_by_id(&self, event_id: i32) -> AppResult<Option<Event>> {
        Ok(self.tables.read().await.events.get(&event_id).cloned())
    }

    async fn insert(&self, mut event: Event) -> AppResult<Event> {
        let mut tables = self.tables.write().await;
        tables.next_event_id += 1;
        event.event_id = tables.next_event_id;
        tables.events.insert(event.event_id, event.clone());
        Ok(event)
    }

    async fn update(&self, event: Event) -> AppResult<Option<Event>> {
        let mut tables = self.tables.write().await;
        match tables.events.get_mut(&event.event_id) {
            Some(stored) => {
                *stored = event.clone();
                Ok(Some(event))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, event_id: i32) -> AppResult<Option<Event>> {
        let mut tables = self.tables.write().await;
        let removed = tables.events.remove(&event_id);
        if removed.is_some() {
            tables.attendees.retain(|(_, e)| *e != event_id);
        }
        Ok(removed)
    }
}
