// Library entry so integration tests can reference internal modules.
// Re-export the same modules used by the binary (`main.rs`).
pub mod commands;
pub mod config;
pub mod constants;
pub mod deck;
pub mod error;
pub mod handler;
pub mod interactions;
pub mod model;
pub mod services;

pub use model::{AppState, ShardManagerContainer};
