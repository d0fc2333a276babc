use std::sync::Arc;

use crate::models::{Event, EventPatch, NewEvent};
use crate::repository::EventRepository;
use crate::utils::{AppError, AppResult};

fn event_not_found(event_id: i32) -> AppError {
    AppError::NotFound(format!("eventId:{event_id}"))
}

#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventRepository>,
}

impl EventService {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    pub async fn find_all(&self) -> AppResult<Vec<Event>> {
        self.events.find_all().await
    }

    pub async fn find_by_id(&self, event_id: i32) -> AppResult<Event> {
        self.events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| event_not_found(event_id))
    }

    /// Creates an event under a fresh id.
    pub async fn add_event(&self, input: NewEvent) -> AppResult<Event> {
        let event = self
            .events
            .insert(input.into_event(0))
            .await
            .map_err(AppError::on_write)?;

        tracing::info!(event_id = event.event_id, "Created event");
        Ok(event)
    }

    /// Replaces an existing event. The path id always wins over an `eventId` in
    /// the body.
    pub async fn update_event(&self, event_id: i32, input: NewEvent) -> AppResult<Event> {
        if matches!(input.event_id, Some(body_id) if body_id != event_id) {
            tracing::debug!(event_id, body_id = ?input.event_id, "Ignoring eventId in body");
        }
        self.find_by_id(event_id).await?;

        let event = self
            .events
            .update(input.into_event(event_id))
            .await
            .map_err(AppError::on_write)?
            .ok_or_else(|| event_not_found(event_id))?;

        tracing::info!(event_id, "Replaced event");
        Ok(event)
    }

    /// Copies the non-null, non-empty fields of `patch` onto the stored event.
    pub async fn partially_update_event(&self, event_id: i32, patch: EventPatch) -> AppResult<Event> {
        let mut event = self.find_by_id(event_id).await?;

        if !event.apply_patch(patch) {
            tracing::debug!(event_id, "Partial update changed nothing");
            return Ok(event);
        }

        let event = self
            .events
            .update(event)
            .await
            .map_err(AppError::on_write)?
            .ok_or_else(|| event_not_found(event_id))?;

        tracing::info!(event_id, "Partially updated event");
        Ok(event)
    }

    pub async fn delete_by_id(&self, event_id: i32) -> AppResult<Event> {
        let event = self
            .events
            .delete(event_id)
            .await
            .map_err(AppError::on_write)?
            .ok_or_else(|| event_not_found(event_id))?;

        tracing::info!(event_id, "Deleted event");
        Ok(event)
    }
}
