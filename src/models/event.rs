use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Image shown for events created without one.
pub const DEFAULT_IMAGE_URL: &str = "https://picsum.photos/id/1000/300";

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_id: i32,
    pub title: String,
    pub description: String,
    pub date: Option<NaiveDateTime>,
    pub image_url: String,
    pub price: Option<Decimal>,
}

impl Event {
    /// Copies every field present in `patch` onto this event. Empty strings and
    /// nulls count as absent. Returns whether anything changed.
    pub fn apply_patch(&mut self, patch: EventPatch) -> bool {
        let mut changed = false;

        if let Some(date) = patch.date {
            changed |= self.date != Some(date);
            self.date = Some(date);
        }
        if let Some(description) = non_empty(patch.description) {
            changed |= self.description != description;
            self.description = description;
        }
        if let Some(image_url) = non_empty(patch.image_url) {
            changed |= self.image_url != image_url;
            self.image_url = image_url;
        }
        if let Some(price) = patch.price {
            changed |= self.price != Some(price);
            self.price = Some(price);
        }
        if let Some(title) = non_empty(patch.title) {
            changed |= self.title != title;
            self.title = title;
        }

        changed
    }
}

/// Body of `POST /v1/events` and `PUT /v1/events/{id}`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    #[serde(default)]
    pub event_id: Option<i32>,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: Option<NaiveDateTime>,
    #[validate(length(max = 500))]
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
}

impl NewEvent {
    /// Builds the stored form under `event_id`, falling back to the placeholder image.
    pub fn into_event(self, event_id: i32) -> Event {
        Event {
            event_id,
            title: self.title,
            description: self.description,
            date: self.date,
            image_url: non_empty(self.image_url).unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string()),
            price: self.price,
        }
    }
}

/// Body of `PATCH /v1/events/{id}`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    #[validate(length(max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDateTime>,
    #[validate(length(max = 500))]
    pub image_url: Option<String>,
    pub price: Option<Decimal>,
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
