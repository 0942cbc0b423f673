#[cfg(feature = "audit-log")]
pub mod audit;
pub mod auth;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod generator;
pub mod store;
pub mod vault;
