//! Registry module for Docker registry interactions
//!
//! This module provides the tag existence client for the Docker Registry HTTP API v2,
//! the bearer token cascade it relies on, and the manifest HEAD check.

pub mod auth;
pub mod client;
pub mod manifest;

pub use auth::Auth;
pub use client::{AnonymousOutcome, RegistryClient, RegistryClientBuilder};
pub use manifest::ManifestStatus;
