use std::env;
use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

pub mod auth;
pub mod cors;
pub mod security;

pub use auth::{require_basic_auth, BasicAuth, Credentials};
pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/dogginer";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
const DEFAULT_AUTH_REALM: &str = "dogginer";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

/// Where clients and events are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Postgres,
    Memory,
}

impl FromStr for Storage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" => Ok(Storage::Postgres),
            "memory" => Ok(Storage::Memory),
            _ => Err(format!("unknown storage '{s}'")),
        }
    }
}

/// How a successful `PUT` answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateResponse {
    /// 200 with the stored entity.
    #[default]
    Body,
    /// 204 with an empty body.
    NoContent,
}

impl FromStr for UpdateResponse {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "body" => Ok(UpdateResponse::Body),
            "no-content" | "no_content" => Ok(UpdateResponse::NoContent),
            _ => Err(format!("unknown update response '{s}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub storage: Storage,
    pub bind_addr: SocketAddr,
    pub public_base_url: String,
    pub update_response: UpdateResponse,
    pub admin_username: String,
    pub admin_password: String,
    pub auth_realm: String,
    pub cors_allowed_origins: Vec<String>,
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source. Unparseable values fall
    /// back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = parse_or(&lookup, "HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT);

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS),
            storage: parse_or(&lookup, "STORAGE", Storage::Postgres),
            bind_addr: SocketAddr::new(host, port),
            public_base_url: lookup("PUBLIC_BASE_URL").unwrap_or_default(),
            update_response: parse_or(&lookup, "UPDATE_RESPONSE", UpdateResponse::Body),
            admin_username: lookup("ADMIN_USERNAME")
                .unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_string()),
            admin_password: lookup("ADMIN_PASSWORD")
                .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string()),
            auth_realm: lookup("AUTH_REALM").unwrap_or_else(|| DEFAULT_AUTH_REALM.to_string()),
            cors_allowed_origins,
            production: lookup("RUST_ENV")
                .map(|v| v.to_lowercase() == "production")
                .unwrap_or(false),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            tracing::warn!(key, value = %raw, error = %e, "Invalid configuration value, using default");
            default
        }),
    }
}
