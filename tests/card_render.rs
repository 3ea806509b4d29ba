use pikcards_bot::config::Config;
use pikcards_bot::deck::render::{ButtonTone, card_buttons, card_render, fifth_prompt_button, title_case};
use pikcards_bot::deck::session::{CardAction, CardId, HandCard};
use pikcards_bot::error::ConfigError;
use serenity::model::id::{GuildId, UserId};
use std::collections::HashMap;
use std::path::PathBuf;

fn hand_card(name: &str, action: CardAction) -> HandCard {
    HandCard {
        id: CardId::parse("c0ffee").expect("id"),
        name: name.to_string(),
        message_id: None,
        action,
    }
}

#[test]
fn buttons_follow_card_action() {
    let user = UserId::new(9);
    let redraw = card_buttons(user, &hand_card("red pikmin", CardAction::Redraw));
    assert_eq!(redraw.len(), 1);
    assert_eq!(redraw[0].label, "Redraw Red Pikmin");
    assert_eq!(redraw[0].custom_id, "deck:redraw:9:c0ffee");
    assert_eq!(redraw[0].tone, ButtonTone::Danger);

    let play = card_buttons(user, &hand_card("red pikmin", CardAction::Play));
    assert_eq!(play[0].label, "Play Red Pikmin");
    assert_eq!(play[0].tone, ButtonTone::Success);

    assert!(card_buttons(user, &hand_card("red pikmin", CardAction::Idle)).is_empty());
}

#[test]
fn long_labels_are_clipped() {
    let name = "x".repeat(120);
    let buttons = card_buttons(UserId::new(9), &hand_card(&name, CardAction::Play));
    assert_eq!(buttons[0].label.chars().count(), 80);
    assert!(buttons[0].label.ends_with('…'));
}

#[test]
fn image_replaces_text() {
    let card = hand_card("bulborb larva", CardAction::Redraw);
    let text = card_render(UserId::new(1), &card, None);
    assert_eq!(text.content.as_deref(), Some("Bulborb Larva"));
    let image = card_render(UserId::new(1), &card, Some(PathBuf::from("a.png")));
    assert_eq!(image.content, None);
    assert_eq!(image.image, Some(PathBuf::from("a.png")));
    assert_eq!(fifth_prompt_button(UserId::new(1)).custom_id, "deck:choosefifth:1");
    assert_eq!(title_case("sOVEREIGN  bulblax"), "Sovereign Bulblax");
}

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn config_defaults_and_overrides() {
    let vars = env(&[("DISCORD_TOKEN", "abc")]);
    let config = Config::from_lookup(|k| vars.get(k).cloned()).expect("config");
    assert_eq!(config.guild_id, None);
    assert_eq!(config.decks_dir, PathBuf::from("data/games"));
    assert_eq!(config.card_images_dir, PathBuf::from("assets/card_images"));

    let vars = env(&[
        ("DISCORD_TOKEN", "abc"),
        ("SERVER_ID", "1234"),
        ("DECKS_DIR", "/tmp/decks"),
        ("CARD_IMAGES_DIR", " "),
    ]);
    let config = Config::from_lookup(|k| vars.get(k).cloned()).expect("config");
    assert_eq!(config.guild_id, Some(GuildId::new(1234)));
    assert_eq!(config.decks_dir, PathBuf::from("/tmp/decks"));
    assert_eq!(config.card_images_dir, PathBuf::from("assets/card_images"));
}

#[test]
fn config_errors() {
    let none = env(&[]);
    assert!(matches!(
        Config::from_lookup(|k| none.get(k).cloned()),
        Err(ConfigError::Missing("DISCORD_TOKEN"))
    ));
    let bad = env(&[("DISCORD_TOKEN", "abc"), ("SERVER_ID", "guild")]);
    assert!(matches!(
        Config::from_lookup(|k| bad.get(k).cloned()),
        Err(ConfigError::Invalid { name: "SERVER_ID", .. })
    ));
}
