// Central constants for deck sizes, limits and lookup tuning.
pub const DECK_SIZE: usize = 40;
pub const STARTING_HAND_SIZE: usize = 4;
pub const MAX_HAND_SIZE: usize = 10;
// Redrawn cards go back at least this many cards below the top of the deck.
pub const REDRAW_EXCLUSION: usize = 10;

// Minimum similarity (0.0..=1.0) for a fuzzy card image match to count.
pub const CARD_MATCH_FLOOR: f64 = 0.8;
pub const CARD_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];

// Discord hard limits.
pub const BUTTON_LABEL_MAX: usize = 80;
pub const SELECT_MENU_MAX_OPTIONS: usize = 25;

pub const DEFAULT_DECKS_DIR: &str = "data/games";
pub const DEFAULT_CARD_IMAGES_DIR: &str = "assets/card_images";

// Red embed used for refused interactions.
pub const ERROR_COLOR: u32 = 0xFF0000;

/// Starter list used by `/deck` when no card list is given.
pub const DEFAULT_DECK: &str = "Red Pikmin, Red Pikmin, Red Pikmin, Red Pikmin, Red Onion, Red Onion, \
Yellow Pikmin, Yellow Pikmin, Yellow Pikmin, Yellow Pikmin, Yellow Onion, Yellow Onion, \
Doodlebug, Doodlebug, Doodlebug, Doodlebug, Bulborb Larva, Bulborb Larva, Bulborb Larva, Bulborb Larva, \
Burrowing Snagret, Burrowing Snagret, Burrowing Snagret, Burrowing Snagret, \
Sovereign Bulblax, Sovereign Bulblax, Sovereign Bulblax, Sovereign Bulblax, \
Stellar Orb, Stellar Orb, Stellar Orb, Stellar Orb, \
Bulblax Kingdom, Bulblax Kingdom, Bulblax Kingdom, Bulblax Kingdom, \
Sagittarius, Sagittarius, Survival Series, Survival Series";
