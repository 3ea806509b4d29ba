use pikcards_bot::deck::session::CardId;
use pikcards_bot::interactions::ids::{Action, ActionId, IdError, fifth_text_input_id};
use pikcards_bot::interactions::{NOT_YOURS, STALE_ID, authorize};
use serenity::model::id::{MessageId, UserId};

fn card(raw: &str) -> CardId {
    CardId::parse(raw).expect("valid card id")
}

#[test]
fn redraw_id_wire_form() {
    let id = ActionId::new(UserId::new(1234), Action::Redraw(card("abc123")));
    assert_eq!(id.encode(), "deck:redraw:1234:abc123");
    let parsed: ActionId = "deck:redraw:1234:abc123".parse().expect("should parse");
    assert_eq!(parsed, id);
}

#[test]
fn fifth_modal_carries_prompt_message() {
    let id = ActionId::new(UserId::new(7), Action::SubmitFifth(Some(MessageId::new(99))));
    assert_eq!(id.encode(), "deck:modalfifth:7:99");
    let bare: ActionId = "deck:modalfifth:7".parse().expect("should parse");
    assert_eq!(bare.action, Action::SubmitFifth(None));
}

#[test]
fn end_ids_use_their_own_domain() {
    assert_eq!(ActionId::new(UserId::new(5), Action::EndAll).encode(), "end:all:5");
    let parsed: ActionId = "end:selection:5".parse().expect("should parse");
    assert_eq!(parsed.actor, UserId::new(5));
    assert_eq!(parsed.action, Action::EndSelection);
}

#[test]
fn foreign_ids_are_not_ours() {
    assert_eq!("help_menu".parse::<ActionId>(), Err(IdError::ForeignDomain));
    assert_eq!("rps:accept:1:2".parse::<ActionId>(), Err(IdError::ForeignDomain));
}

#[test]
fn malformed_ids_rejected() {
    for raw in [
        "deck",
        "deck:redraw",
        "deck:redraw:0:abc",
        "deck:redraw:nope:abc",
        "deck:redraw:12",
        "deck:redraw:12:bad id!",
        "deck:play:12:",
        "deck:choosefifth:12:extra",
        "deck:modalfifth:12:notanumber",
        "deck:shuffle:12",
        "end:all:12:3",
    ] {
        assert!(
            matches!(raw.parse::<ActionId>(), Err(IdError::Malformed(_))),
            "{raw} should be malformed"
        );
    }
}

#[test]
fn text_input_id_is_per_user() {
    assert_eq!(fifth_text_input_id(UserId::new(42)), "deck:txtfifth:42");
}

#[test]
fn authorize_refuses_other_players() {
    let raw = ActionId::new(UserId::new(1), Action::Redraw(card("abc123"))).encode();
    assert_eq!(authorize(&raw, UserId::new(2)), Err(NOT_YOURS));
    let own = authorize(&raw, UserId::new(1)).expect("owner is let through");
    assert_eq!(own.map(|id| id.action), Some(Action::Redraw(card("abc123"))));
}

#[test]
fn authorize_ignores_foreign_components() {
    assert_eq!(authorize("help:page:1", UserId::new(1)), Ok(None));
}

#[test]
fn authorize_flags_mangled_ids_as_stale() {
    assert_eq!(authorize("deck:redraw:notanumber:abc123", UserId::new(1)), Err(STALE_ID));
    assert_eq!(authorize("deck:teleport:1", UserId::new(1)), Err(STALE_ID));
}
