// Infrastructure layer module
// Contains database adapters and startup seeding
// Follows Hexagonal Architecture

pub mod database;
pub mod repositories;
pub mod seed;
