//! Hypermedia links attached to response bodies.
//!
//! Entities stay plain values; handlers wrap them in a [`Resource`] right before
//! serializing, which renders as the entity's own fields plus a `_links` object:
//!
//! ```json
//! { "clientId": 1, "username": "a", "_links": { "self": { "href": "/v1/clients/1" } } }
//! ```

use serde::Serialize;
use std::collections::BTreeMap;

pub const CLIENTS_PATH: &str = "/v1/clients";
pub const EVENTS_PATH: &str = "/v1/events";

pub const REL_SELF: &str = "self";
pub const REL_ALL_CLIENTS: &str = "all-clients";
pub const REL_ALL_EVENTS: &str = "all-events";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub href: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Resource<T> {
    #[serde(flatten)]
    pub content: T,
    #[serde(rename = "_links")]
    pub links: BTreeMap<&'static str, Link>,
}

impl<T> Resource<T> {
    pub fn new(content: T) -> Self {
        Self {
            content,
            links: BTreeMap::new(),
        }
    }

    pub fn with_link(mut self, rel: &'static str, href: String) -> Self {
        self.links.insert(rel, Link { href });
        self
    }
}

/// Builds absolute or relative hrefs under the configured public base URL.
#[derive(Debug, Clone, Default)]
pub struct LinkBuilder {
    base_url: String,
}

impl LinkBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn clients(&self) -> String {
        format!("{}{}", self.base_url, CLIENTS_PATH)
    }

    pub fn client(&self, client_id: i32) -> String {
        format!("{}/{}", self.clients(), client_id)
    }

    pub fn events(&self) -> String {
        format!("{}{}", self.base_url, EVENTS_PATH)
    }

    pub fn event(&self, event_id: i32) -> String {
        format!("{}/{}", self.events(), event_id)
    }
}
