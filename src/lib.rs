pub mod auth;
pub mod backend;
pub mod config;
pub mod engine;
pub mod limits;
pub mod model;
pub mod notify;
pub mod observability;
pub mod refresh;
pub mod wire;

#[cfg(test)]
pub(crate) mod testing;
