// Domain layer module exports
// Identity records and the repository ports the infrastructure implements

pub mod repositories;
pub mod role;
pub mod user;
