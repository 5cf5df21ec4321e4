// API layer module (adapters for controllers)
// Follows Hexagonal Architecture - API is an adapter

pub mod docs;
pub mod errors;
pub mod handlers;
pub mod middleware;
