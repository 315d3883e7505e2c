//! URL shortener keyed by base-62 encoded sequential identifiers
//!
//! [`codec`] maps store-assigned identifiers to short keys and back;
//! [`service`] holds the link rules; the remaining modules are the HTTP
//! surface and its plumbing.

pub mod codec;
pub mod config;
pub mod database;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod model;
pub mod route;
pub mod service;
