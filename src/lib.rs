//! BookFinal API Library
//!
//! Startup composition for the book service API: configuration resolution,
//! logging, OpenAPI documentation, persistence, the identity subsystem,
//! injected services and the HTTP request pipeline.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod services;
pub mod startup;
pub mod state;
pub mod telemetry;
