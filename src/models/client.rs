use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use validator::Validate;

use super::event::{non_empty, Event};

/// A registered client. `password` holds the argon2 hash and is never serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub client_id: i32,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub attended_events: Vec<Event>,
}

impl Client {
    /// Copies a non-empty `username`/`email` from `patch`. The password is left to
    /// the caller since it needs the encoder. Returns whether anything changed.
    pub fn apply_profile_patch(&mut self, patch: &ClientPatch) -> bool {
        let mut changed = false;

        if let Some(email) = non_empty(patch.email.clone()) {
            changed |= self.email != email;
            self.email = email;
        }
        if let Some(username) = non_empty(patch.username.clone()) {
            changed |= self.username != username;
            self.username = username;
        }

        changed
    }
}

impl PartialEq for Client {
    fn eq(&self, other: &Self) -> bool {
        self.client_id == other.client_id
    }
}

impl Eq for Client {}

impl Hash for Client {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.client_id.hash(state);
    }
}

/// Column values for a client row, password already hashed.
#[derive(Debug, Clone)]
pub struct ClientRecord {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Body of `POST /v1/clients` and `PUT /v1/clients/{id}`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    #[serde(default)]
    pub client_id: Option<i32>,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Body of `PATCH /v1/clients/{id}`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClientPatch {
    #[validate(length(max = 255))]
    pub email: Option<String>,
    #[validate(length(max = 100))]
    pub username: Option<String>,
    pub password: Option<String>,
}
