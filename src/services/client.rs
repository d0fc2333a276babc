use std::sync::Arc;
use validator::ValidateEmail;

use crate::models::{Client, ClientPatch, ClientRecord, NewClient};
use crate::repository::{ClientRepository, EventRepository};
use crate::utils::{AppError, AppResult, PasswordEncoder};

fn client_not_found(client_id: i32) -> AppError {
    AppError::NotFound(format!("clientId:{client_id}"))
}

/// Business rules for clients: password hashing, identity protection and
/// partial-update merging.
#[derive(Clone)]
pub struct ClientService {
    clients: Arc<dyn ClientRepository>,
    events: Arc<dyn EventRepository>,
    encoder: PasswordEncoder,
}

impl ClientService {
    pub fn new(
        clients: Arc<dyn ClientRepository>,
        events: Arc<dyn EventRepository>,
        encoder: PasswordEncoder,
    ) -> Self {
        Self {
            clients,
            events,
            encoder,
        }
    }

    pub async fn find_all(&self) -> AppResult<Vec<Client>> {
        self.clients.find_all().await
    }

    pub async fn find_by_id(&self, client_id: i32) -> AppResult<Client> {
        self.clients
            .find_by_id(client_id)
            .await?
            .ok_or_else(|| client_not_found(client_id))
    }

    /// Signs up a client. Any caller-supplied id is ignored.
    pub async fn add_client(&self, input: NewClient) -> AppResult<Client> {
        if let Some(client_id) = input.client_id {
            tracing::debug!(client_id, "Ignoring clientId supplied on create");
        }

        let record = ClientRecord {
            email: input.email,
            username: input.username,
            password: self.encoder.encode(&input.password)?,
        };

        let client = self.clients.insert(record).await.map_err(AppError::on_write)?;
        tracing::info!(client_id = client.client_id, "Created client");
        Ok(client)
    }

    /// Replaces every field of an existing client. A `clientId` in the body must
    /// match the path.
    pub async fn update_client(&self, client_id: i32, input: NewClient) -> AppResult<Client> {
        if matches!(input.client_id, Some(body_id) if body_id != client_id) {
            return Err(AppError::BadRequest(
                "resource uri and clientId do not match".to_string(),
            ));
        }

        let existing = self.find_by_id(client_id).await?;
        let replacement = Client {
            client_id,
            email: input.email,
            username: input.username,
            password: self.encoder.encode(&input.password)?,
            attended_events: existing.attended_events,
        };

        let client = self
            .clients
            .update(replacement)
            .await
            .map_err(AppError::on_write)?
            .ok_or_else(|| client_not_found(client_id))?;

        tracing::info!(client_id, "Replaced client");
        Ok(client)
    }

    /// Applies the non-empty fields of `patch`. A password is re-hashed only when it
    /// differs from the stored one. With nothing to change the stored client is
    /// returned as is and nothing is written.
    pub async fn partially_update_client(&self, client_id: i32, patch: ClientPatch) -> AppResult<Client> {
        let mut client = self.find_by_id(client_id).await?;

        if let Some(email) = patch.email.as_deref().filter(|e| !e.is_empty()) {
            if !email.validate_email() {
                return Err(AppError::BadRequest(format!("'{email}' is not a valid email")));
            }
        }

        let mut changed = client.apply_profile_patch(&patch);

        if let Some(password) = patch.password.as_deref().filter(|p| !p.is_empty()) {
            if !self.encoder.matches(password, &client.password) {
                client.password = self.encoder.encode(password)?;
                changed = true;
            }
        }

        if !changed {
            tracing::debug!(client_id, "Partial update changed nothing");
            return Ok(client);
        }

        let client = self
            .clients
            .update(client)
            .await
            .map_err(AppError::on_write)?
            .ok_or_else(|| client_not_found(client_id))?;

        tracing::info!(client_id, "Partially updated client");
        Ok(client)
    }

    /// Deletes a client, returning the deleted snapshot.
    pub async fn delete_by_id(&self, client_id: i32) -> AppResult<Client> {
        let client = self
            .clients
            .delete(client_id)
            .await
            .map_err(AppError::on_write)?
            .ok_or_else(|| client_not_found(client_id))?;

        tracing::info!(client_id, "Deleted client");
        Ok(client)
    }

    /// Registers the client as attending an event. Registering twice is harmless.
    pub async fn attend_event(&self, client_id: i32, event_id: i32) -> AppResult<Client> {
        self.find_by_id(client_id).await?;
        if self.events.find_by_id(event_id).await?.is_none() {
            return Err(AppError::NotFound(format!("eventId:{event_id}")));
        }

        let client = self
            .clients
            .add_attended_event(client_id, event_id)
            .await
            .map_err(AppError::on_write)?
            .ok_or_else(|| client_not_found(client_id))?;

        tracing::info!(client_id, event_id, "Client attends event");
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Event, DEFAULT_IMAGE_URL};
    use crate::repository::MemoryStore;

    fn service() -> (ClientService, MemoryStore) {
        let store = MemoryStore::new();
        let service = ClientService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            PasswordEncoder,
        );
        (service, store)
    }

    fn new_client(username: &str, email: &str, password: &str) -> NewClient {
        NewClient {
            client_id: None,
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_then_find_returns_same_client() {
        let (service, _) = service();

        let created = service.add_client(new_client("a", "a@x.com", "p")).await.unwrap();
        let found = service.find_by_id(created.client_id).await.unwrap();

        assert_eq!(found, created);
        assert_eq!(found.username, "a");
        assert_eq!(found.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_add_hashes_password_and_ignores_supplied_id() {
        let (service, _) = service();
        let mut input = new_client("a", "a@x.com", "p");
        input.client_id = Some(99);

        let created = service.add_client(input).await.unwrap();

        assert_eq!(created.client_id, 1);
        assert_ne!(created.password, "p");
        assert!(PasswordEncoder.matches("p", &created.password));
    }

    #[tokio::test]
    async fn test_find_missing_client_is_not_found() {
        let (service, _) = service();

        let err = service.find_by_id(0).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(msg) if msg == "clientId:0"));
    }

    #[tokio::test]
    async fn test_duplicate_username_is_bad_request_and_not_stored() {
        let (service, _) = service();
        service.add_client(new_client("a", "a@x.com", "p")).await.unwrap();

        let err = service
            .add_client(new_client("a", "other@x.com", "p"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(service.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_with_mismatched_id_is_rejected_without_writing() {
        let (service, _) = service();
        let created = service.add_client(new_client("a", "a@x.com", "p")).await.unwrap();
        let mut input = new_client("b", "b@x.com", "q");
        input.client_id = Some(created.client_id + 1);

        let err = service.update_client(created.client_id, input).await.unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        let stored = service.find_by_id(created.client_id).await.unwrap();
        assert_eq!(stored.username, "a");
        assert_eq!(stored.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_update_replaces_fields_and_keeps_id() {
        let (service, _) = service();
        let created = service.add_client(new_client("a", "a@x.com", "p")).await.unwrap();
        let mut input = new_client("b", "b@x.com", "q");
        input.client_id = Some(created.client_id);

        let updated = service.update_client(created.client_id, input).await.unwrap();

        assert_eq!(updated.client_id, created.client_id);
        assert_eq!(updated.username, "b");
        assert_eq!(updated.email, "b@x.com");
        assert!(PasswordEncoder.matches("q", &updated.password));
    }

    #[tokio::test]
    async fn test_update_missing_client_is_not_found() {
        let (service, _) = service();

        let err = service
            .update_client(5, new_client("b", "b@x.com", "q"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_partial_update_username_only() {
        let (service, _) = service();
        let created = service.add_client(new_client("a", "a@x.com", "p")).await.unwrap();

        let updated = service
            .partially_update_client(
                created.client_id,
                ClientPatch {
                    username: Some("new username".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.username, "new username");
        assert_eq!(updated.email, "a@x.com");
        assert_eq!(updated.password, created.password);
    }

    #[tokio::test]
    async fn test_partial_update_email_only() {
        let (service, _) = service();
        let created = service.add_client(new_client("a", "a@x.com", "p")).await.unwrap();

        let updated = service
            .partially_update_client(
                created.client_id,
                ClientPatch {
                    email: Some("b@x.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.email, "b@x.com");
        assert_eq!(updated.username, "a");
        assert_eq!(updated.password, created.password);
    }

    #[tokio::test]
    async fn test_partial_update_rehashes_new_password() {
        let (service, _) = service();
        let created = service.add_client(new_client("a", "a@x.com", "p")).await.unwrap();

        let updated = service
            .partially_update_client(
                created.client_id,
                ClientPatch {
                    password: Some("new".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(PasswordEncoder.matches("new", &updated.password));
        assert_eq!(updated.username, "a");
    }

    #[tokio::test]
    async fn test_partial_update_same_password_keeps_hash() {
        let (service, _) = service();
        let created = service.add_client(new_client("a", "a@x.com", "p")).await.unwrap();

        let unchanged = service
            .partially_update_client(
                created.client_id,
                ClientPatch {
                    password: Some("p".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(unchanged.password, created.password);
    }

    #[tokio::test]
    async fn test_partial_update_without_changes_returns_stored_client() {
        let (service, _) = service();
        let created = service.add_client(new_client("a", "a@x.com", "p")).await.unwrap();

        let unchanged = service
            .partially_update_client(created.client_id, ClientPatch::default())
            .await
            .unwrap();

        assert_eq!(unchanged.username, "a");
        assert_eq!(unchanged.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_partial_update_missing_client_is_not_found() {
        let (service, _) = service();

        let err = service
            .partially_update_client(
                42,
                ClientPatch {
                    username: Some("b".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(msg) if msg == "clientId:42"));
    }

    #[tokio::test]
    async fn test_partial_update_treats_case_change_as_change() {
        let (service, _) = service();
        let created = service.add_client(new_client("a", "a@x.com", "p")).await.unwrap();

        let updated = service
            .partially_update_client(
                created.client_id,
                ClientPatch {
                    username: Some("A".to_string()),
                    email: Some("A@x.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.username, "A");
        assert_eq!(updated.email, "A@x.com");
        assert_eq!(service.find_by_id(created.client_id).await.unwrap().username, "A");
    }

    #[tokio::test]
    async fn test_partial_update_to_taken_username_is_bad_request() {
        let (service, _) = service();
        service.add_client(new_client("a", "a@x.com", "p")).await.unwrap();
        let other = service.add_client(new_client("b", "b@x.com", "p")).await.unwrap();

        let err = service
            .partially_update_client(
                other.client_id,
                ClientPatch {
                    username: Some("a".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(service.find_by_id(other.client_id).await.unwrap().username, "b");
    }

    #[tokio::test]
    async fn test_partial_update_rejects_invalid_email() {
        let (service, _) = service();
        let created = service.add_client(new_client("a", "a@x.com", "p")).await.unwrap();

        let err = service
            .partially_update_client(
                created.client_id,
                ClientPatch {
                    email: Some("nope".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_delete_then_find_is_not_found() {
        let (service, _) = service();
        let created = service.add_client(new_client("a", "a@x.com", "p")).await.unwrap();

        let deleted = service.delete_by_id(created.client_id).await.unwrap();
        assert_eq!(deleted.username, "a");

        assert!(matches!(
            service.find_by_id(created.client_id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_by_id(created.client_id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_attend_event() {
        let (service, store) = service();
        let created = service.add_client(new_client("a", "a@x.com", "p")).await.unwrap();
        let party = EventRepository::insert(
            &store,
            Event {
                event_id: 0,
                title: "Party".to_string(),
                description: String::new(),
                date: None,
                image_url: DEFAULT_IMAGE_URL.to_string(),
                price: None,
            },
        )
        .await
        .unwrap();

        let client = service.attend_event(created.client_id, party.event_id).await.unwrap();
        assert_eq!(client.attended_events.len(), 1);

        let again = service.attend_event(created.client_id, party.event_id).await.unwrap();
        assert_eq!(again.attended_events.len(), 1);

        assert!(matches!(
            service.attend_event(created.client_id, 404).await,
            Err(AppError::NotFound(msg)) if msg == "eventId:404"
        ));
        assert!(matches!(
            service.attend_event(404, party.event_id).await,
            Err(AppError::NotFound(msg)) if msg == "clientId:404"
        ));
    }
}
