use axum::extract::State;
use axum::response::Response;
use axum::Json;

use crate::models::{Client, ClientPatch, NewClient};
use crate::state::AppState;
use crate::utils::extract::{IdPath, ValidatedJson};
use crate::utils::links::{CLIENTS_PATH, REL_ALL_CLIENTS, REL_SELF};
use crate::utils::response::{created, ok_at, replaced};
use crate::utils::{AppResult, LinkBuilder, Resource};

fn client_resource(links: &LinkBuilder, client: Client) -> Resource<Client> {
    let self_href = links.client(client.client_id);
    Resource::new(client)
        .with_link(REL_SELF, self_href)
        .with_link(REL_ALL_CLIENTS, links.clients())
}

pub async fn list_clients(State(state): State<AppState>) -> AppResult<Json<Vec<Resource<Client>>>> {
    tracing::debug!("Received GET request at endpoint {}", CLIENTS_PATH);

    let clients = state.clients.find_all().await?;
    Ok(Json(
        clients
            .into_iter()
            .map(|client| client_resource(&state.links, client))
            .collect(),
    ))
}

pub async fn get_client(
    State(state): State<AppState>,
    IdPath(client_id): IdPath<i32>,
) -> AppResult<Json<Resource<Client>>> {
    tracing::debug!("Received GET request at endpoint {}/{}", CLIENTS_PATH, client_id);

    let client = state.clients.find_by_id(client_id).await?;
    Ok(Json(client_resource(&state.links, client)))
}

pub async fn create_client(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<NewClient>,
) -> AppResult<Response> {
    tracing::debug!("Received POST request at endpoint {}", CLIENTS_PATH);

    let client = state.clients.add_client(input).await?;
    let location = state.links.client(client.client_id);
    Ok(created(&location, client_resource(&state.links, client)))
}

pub async fn update_client(
    State(state): State<AppState>,
    IdPath(client_id): IdPath<i32>,
    ValidatedJson(input): ValidatedJson<NewClient>,
) -> AppResult<Response> {
    tracing::debug!("Received PUT request at endpoint {}/{}", CLIENTS_PATH, client_id);

    let client = state.clients.update_client(client_id, input).await?;
    let location = state.links.client(client_id);
    Ok(replaced(
        state.update_response,
        &location,
        client_resource(&state.links, client),
    ))
}

pub async fn partially_update_client(
    State(state): State<AppState>,
    IdPath(client_id): IdPath<i32>,
    ValidatedJson(patch): ValidatedJson<ClientPatch>,
) -> AppResult<Response> {
    tracing::debug!("Received PATCH request at endpoint {}/{}", CLIENTS_PATH, client_id);

    let client = state.clients.partially_update_client(client_id, patch).await?;
    let location = state.links.client(client_id);
    Ok(ok_at(&location, client_resource(&state.links, client)))
}

/// The deleted client no longer has a `self` link, only the collection.
pub async fn delete_client(
    State(state): State<AppState>,
    IdPath(client_id): IdPath<i32>,
) -> AppResult<Json<Resource<Client>>> {
    tracing::debug!("Received DELETE request at endpoint {}/{}", CLIENTS_PATH, client_id);

    let client = state.clients.delete_by_id(client_id).await?;
    Ok(Json(
        Resource::new(client).with_link(REL_ALL_CLIENTS, state.links.clients()),
    ))
}

pub async fn attend_event(
    State(state): State<AppState>,
    IdPath((client_id, event_id)): IdPath<(i32, i32)>,
) -> AppResult<Json<Resource<Client>>> {
    tracing::debug!(
        "Received PUT request at endpoint {}/{}/events/{}",
        CLIENTS_PATH,
        client_id,
        event_id
    );

    let client = state.clients.attend_event(client_id, event_id).await?;
    Ok(Json(client_resource(&state.links, client)))
}
