//! HTTP Basic authentication against a single, read-only credential set.
//!
//! The admin password is hashed once at startup; every request must present
//! matching `Authorization: Basic ...` credentials. No CSRF check.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;
use std::sync::Arc;

use crate::utils::{AppError, AppResult, PasswordEncoder};

/// The one account allowed to use the API.
pub struct Credentials {
    username: String,
    password_hash: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: &str, encoder: &PasswordEncoder) -> AppResult<Self> {
        Ok(Self {
            username: username.into(),
            password_hash: encoder.encode(password)?,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

#[derive(Clone)]
pub struct BasicAuth {
    credentials: Arc<Credentials>,
    encoder: PasswordEncoder,
    challenge: HeaderValue,
}

impl BasicAuth {
    pub fn new(credentials: Credentials, realm: &str) -> Self {
        let challenge = HeaderValue::from_str(&format!("Basic realm=\"{realm}\""))
            .unwrap_or_else(|_| HeaderValue::from_static("Basic"));

        Self {
            credentials: Arc::new(credentials),
            encoder: PasswordEncoder,
            challenge,
        }
    }

    fn authenticate(&self, headers: &HeaderMap) -> AppResult<()> {
        let (username, password) = basic_credentials(headers)
            .ok_or_else(|| AppError::Unauthorized("Full authentication is required".to_string()))?;

        // The hash is verified even for an unknown username so both failures cost the same.
        let password_ok = self.encoder.matches(&password, &self.credentials.password_hash);
        let username_ok = username == self.credentials.username;
        if !(username_ok && password_ok) {
            tracing::debug!(username = %username, "Rejected credentials");
            return Err(AppError::Unauthorized("Bad credentials".to_string()));
        }

        Ok(())
    }
}

/// Rejects the request with `401` and a `WWW-Authenticate` challenge unless it
/// carries the configured credentials.
pub async fn require_basic_auth(State(auth): State<BasicAuth>, request: Request, next: Next) -> Response {
    match auth.authenticate(request.headers()) {
        Ok(()) => next.run(request).await,
        Err(err) => {
            let mut response = err.into_response();
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, auth.challenge.clone());
            response
        }
    }
}

fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}
