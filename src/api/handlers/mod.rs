// Controllers: thin adapters from HTTP to the identity subsystem and services

pub mod account;
pub mod health;
pub mod media;
pub mod roles;
