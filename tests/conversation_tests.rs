// Conversation tests: contact selection, the message thread and typing indicators

mod common;
use common::{after, last_message, message_ids, setup_app, setup_app_with};

use chatmock::{
    conversation::Conversation,
    models::{MediaAttachment, MediaKind, Sender},
    seed, ChatApp, Features,
};
use tokio::time::{Duration, Instant};

/// Appends keep insertion order and grow the thread by exactly one each
#[test]
fn test_append_preserves_order() {
    let mut conversation = Conversation::seeded();
    let texts = ["one", "two", "three", "four", "five"];

    for text in texts {
        conversation.append(Sender::Me, text, None, "12:00".to_string());
    }

    let messages = conversation.messages();
    assert_eq!(messages.len(), 4 + texts.len());
    let appended: Vec<&str> = messages[4..].iter().map(|m| m.text.as_str()).collect();
    assert_eq!(appended, texts);

    let ids: Vec<u32> = messages.iter().map(|m| m.id).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids must increase: {:?}", ids);
}

/// Ids come from a counter, not from the thread length
#[test]
fn test_ids_follow_counter_not_length() {
    let seeded = seed::messages();
    // A thread whose highest id is ahead of its length
    let sparse = vec![seeded[0].clone(), seeded[3].clone()];
    let mut conversation = Conversation::new(seed::contacts(), sparse, 1);

    let id = conversation.append(Sender::Peer, "after gap", None, "12:00".to_string());
    assert_eq!(id, Some(5));
}

#[test]
fn test_empty_message_is_rejected() {
    let mut conversation = Conversation::seeded();
    assert_eq!(conversation.append(Sender::Me, "", None, "12:00".to_string()), None);
    assert_eq!(conversation.messages().len(), 4);

    // Whitespace counts as text at this level; the draft is what trims
    assert!(conversation.append(Sender::Me, " ", None, "12:00".to_string()).is_some());

    let sticker = MediaAttachment::new(MediaKind::Sticker, "👍");
    assert!(conversation.append(Sender::Me, "", Some(sticker), "12:00".to_string()).is_some());
}

#[test]
fn test_select_unknown_contact() {
    let mut app = setup_app();
    app.select_conversation(3);
    assert_eq!(app.conversation().active_contact().map(|c| c.name.as_str()), Some("Мария Петрова"));

    app.select_conversation(42);
    assert_eq!(app.conversation().active_contact_id(), 42);
    assert!(app.conversation().active_contact().is_none());
    // Nothing else moved
    assert_eq!(app.conversation().messages().len(), 4);
}

/// Typing shows immediately and clears 3000 ms later
#[test]
fn test_typing_indicator_expires() {
    let t0 = Instant::now();
    let mut app = setup_app();

    assert!(app.simulate_typing(t0));
    assert!(app.conversation().contact(1).unwrap().typing);
    assert_eq!(app.next_deadline(), Some(t0 + Duration::from_millis(3000)));

    app.run_due_timers(t0 + Duration::from_millis(2999));
    assert!(app.conversation().contact(1).unwrap().typing);

    assert_eq!(app.run_due_timers(after(t0, 3)), 1);
    assert!(!app.conversation().contact(1).unwrap().typing);
    assert_eq!(app.next_deadline(), None);
}

/// A second call does not push the first expiry back
#[test]
fn test_typing_rearm_keeps_earlier_timer() {
    let t0 = Instant::now();
    let mut app = setup_app();

    app.simulate_typing(t0);
    app.simulate_typing(after(t0, 2));

    // First timer fires at 3s even though the flag was set again at 2s
    app.run_due_timers(after(t0, 3));
    assert!(!app.conversation().contact(1).unwrap().typing);

    // The second timer is still pending and fires harmlessly at 5s
    assert_eq!(app.next_deadline(), Some(after(t0, 5)));
    assert_eq!(app.run_due_timers(after(t0, 5)), 1);
    assert!(!app.conversation().contact(1).unwrap().typing);
}

#[test]
fn test_typing_follows_active_contact() {
    let t0 = Instant::now();
    let mut app = setup_app();

    app.select_conversation(5);
    app.simulate_typing(t0);
    assert!(app.conversation().contact(5).unwrap().typing);
    assert!(!app.conversation().contact(1).unwrap().typing);

    // Switching away does not cancel the pending expiry
    app.select_conversation(1);
    app.run_due_timers(after(t0, 3));
    assert!(!app.conversation().contact(5).unwrap().typing);
}

#[test]
fn test_typing_without_valid_contact_or_feature() {
    let t0 = Instant::now();
    let mut app = setup_app();
    app.select_conversation(99);
    assert!(!app.simulate_typing(t0));
    assert_eq!(app.next_deadline(), None);

    let mut quiet = setup_app_with(Features {
        typing_simulation: false,
        ..Features::default()
    });
    assert!(!quiet.simulate_typing(t0));
    assert!(!quiet.conversation().contact(1).unwrap().typing);
}

#[test]
fn test_messages_from_every_source_share_one_counter() {
    let t0 = Instant::now();
    let mut app: ChatApp = setup_app();

    app.set_draft_text("text");
    app.commit_draft();
    app.send_sticker("🔥");
    app.send_gif("/placeholder.svg");
    app.start_recording(t0);
    app.stop_recording();

    assert_eq!(message_ids(&app), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(last_message(&app).media.as_ref().map(|m| m.kind), Some(MediaKind::Voice));
}
