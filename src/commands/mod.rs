// src/commands/mod.rs
// Slash commands: each module exposes `register()` and `run_slash()`.

pub mod cards;
pub mod deck;
pub mod draw;
pub mod end;
pub mod hand;
pub mod ping;
