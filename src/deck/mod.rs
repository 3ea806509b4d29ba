//! Pikcards deck sessions: pure state, persistence, image lookup and the engine tying them together.

pub mod catalog;
pub mod engine;
pub mod render;
pub mod session;
pub mod store;

pub use catalog::CardCatalog;
pub use engine::{DeckEngine, StartedGame};
pub use render::{CardRender, Messenger, RenderButton};
pub use session::{CardId, ChannelInfo, HandCard, Session, SessionKey};
pub use store::{RemoveReport, SessionStore};
