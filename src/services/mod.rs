//! Platform-facing services the deck engine is wired to at start-up.
pub mod messenger;

pub use messenger::DiscordMessenger;
