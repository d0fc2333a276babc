use axum::extract::State;
use axum::response::Response;
use axum::Json;

use crate::models::{Event, EventPatch, NewEvent};
use crate::state::AppState;
use crate::utils::extract::{IdPath, ValidatedJson};
use crate::utils::links::{EVENTS_PATH, REL_ALL_EVENTS, REL_SELF};
use crate::utils::response::{created, ok_at, replaced};
use crate::utils::{AppResult, LinkBuilder, Resource};

fn event_resource(links: &LinkBuilder, event: Event) -> Resource<Event> {
    let self_href = links.event(event.event_id);
    Resource::new(event)
        .with_link(REL_SELF, self_href)
        .with_link(REL_ALL_EVENTS, links.events())
}

pub async fn list_events(State(state): State<AppState>) -> AppResult<Json<Vec<Resource<Event>>>> {
    tracing::debug!("Received GET request at endpoint {}", EVENTS_PATH);

    let events = state.events.find_all().await?;
    Ok(Json(
        events
            .into_iter()
            .map(|event| event_resource(&state.links, event))
            .collect(),
    ))
}

pub async fn get_event(
    State(state): State<AppState>,
    IdPath(event_id): IdPath<i32>,
) -> AppResult<Json<Resource<Event>>> {
    tracing::debug!("Received GET request at endpoint {}/{}", EVENTS_PATH, event_id);

    let event = state.events.find_by_id(event_id).await?;
    Ok(Json(event_resource(&state.links, event)))
}

pub async fn create_event(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<NewEvent>,
) -> AppResult<Response> {
    tracing::debug!("Received POST request at endpoint {}", EVENTS_PATH);

    let event = state.events.add_event(input).await?;
    let location = state.links.event(event.event_id);
    Ok(created(&location, event_resource(&state.links, event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    IdPath(event_id): IdPath<i32>,
    ValidatedJson(input): ValidatedJson<NewEvent>,
) -> AppResult<Response> {
    tracing::debug!("Received PUT request at endpoint {}/{}", EVENTS_PATH, event_id);

    let event = state.events.update_event(event_id, input).await?;
    let location = state.links.event(event_id);
    Ok(replaced(
        state.update_response,
        &location,
        event_resource(&state.links, event),
    ))
}

pub async fn partially_update_event(
    State(state): State<AppState>,
    IdPath(event_id): IdPath<i32>,
    ValidatedJson(patch): ValidatedJson<EventPatch>,
) -> AppResult<Response> {
    tracing::debug!("Received PATCH request at endpoint {}/{}", EVENTS_PATH, event_id);

    let event = state.events.partially_update_event(event_id, patch).await?;
    let location = state.links.event(event_id);
    Ok(ok_at(&location, event_resource(&state.links, event)))
}

pub async fn delete_event(
    State(state): State<AppState>,
    IdPath(event_id): IdPath<i32>,
) -> AppResult<Json<Resource<Event>>> {
    tracing::debug!("Received DELETE request at endpoint {}/{}", EVENTS_PATH, event_id);

    let event = state.events.delete_by_id(event_id).await?;
    Ok(Json(
        Resource::new(event).with_link(REL_ALL_EVENTS, state.links.events()),
    ))
}
