//! REST backend for clients and the events they attend.
//!
//! Requests flow handler → service → repository. Services hold the business rules
//! (password hashing, identity protection, partial-update merging); repositories
//! are async traits with a Postgres and an in-memory implementation.

pub mod config;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
