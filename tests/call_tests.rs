// Call tests: starting, growing and ending simulated calls

mod common;
use common::{setup_app, setup_app_with};

use chatmock::{
    call::{CallSession, MAX_PARTICIPANTS},
    models::CallModality,
    Features,
};

#[test]
fn test_video_call_with_active_contact() {
    let mut app = setup_app();
    app.select_conversation(3);

    assert!(app.start_call(CallModality::Video));
    let call = app.call();
    assert!(call.is_active());
    assert_eq!(call.modality(), Some(CallModality::Video));
    assert_eq!(call.participants(), &[3]);
}

#[test]
fn test_audio_call() {
    let mut app = setup_app();
    app.start_call(CallModality::Audio);
    assert_eq!(app.call().modality(), Some(CallModality::Audio));
    assert_eq!(app.call().participants(), &[1]);
}

/// The group call always starts with contacts 1, 2 and 3
#[test]
fn test_group_call_ignores_active_contact() {
    let mut app = setup_app();
    app.select_conversation(5);

    assert!(app.start_group_call());
    let call = app.call();
    assert!(call.is_active());
    assert_eq!(call.modality(), Some(CallModality::Video));
    assert_eq!(call.participants(), &[1, 2, 3]);
}

#[test]
fn test_add_participant_is_idempotent() {
    let mut app = setup_app();
    app.start_group_call();

    assert!(app.add_participant(4));
    assert!(!app.add_participant(4));
    assert!(!app.add_participant(2));
    assert_eq!(app.call().participants(), &[1, 2, 3, 4]);
}

#[test]
fn test_add_participant_saturates_at_capacity() {
    let mut call = CallSession::new();
    call.start_group();
    for id in 4..=6 {
        assert!(call.add_participant(id));
    }
    assert_eq!(call.participants().len(), MAX_PARTICIPANTS);

    assert!(!call.add_participant(7));
    assert_eq!(call.participants().len(), MAX_PARTICIPANTS);
    assert_eq!(call.participants(), &[1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_add_participant_without_call() {
    let mut app = setup_app();
    assert!(!app.add_participant(2));
    assert!(!app.call().is_active());
    assert!(app.call().participants().is_empty());
}

#[test]
fn test_end_call() {
    let mut app = setup_app();
    app.start_group_call();
    app.end_call();

    let call = app.call();
    assert!(!call.is_active());
    assert_eq!(call.modality(), None);

    // Ending again is harmless
    app.end_call();
    assert!(!app.call().is_active());

    // A new call starts from scratch
    app.select_conversation(4);
    app.start_call(CallModality::Audio);
    assert_eq!(app.call().participants(), &[4]);
}

#[test]
fn test_starting_over_an_active_call_replaces_it() {
    let mut app = setup_app();
    app.start_group_call();
    app.add_participant(5);

    app.select_conversation(2);
    app.start_call(CallModality::Audio);
    assert_eq!(app.call().modality(), Some(CallModality::Audio));
    assert_eq!(app.call().participants(), &[2]);
}

#[test]
fn test_calls_disabled() {
    let mut app = setup_app_with(Features {
        calls: false,
        ..Features::default()
    });
    assert!(!app.start_call(CallModality::Video));
    assert!(!app.start_group_call());
    assert!(!app.call().is_active());
}

#[test]
fn test_group_calls_disabled() {
    let mut app = setup_app_with(Features {
        group_calls: false,
        ..Features::default()
    });
    assert!(!app.start_group_call());
    assert!(app.start_call(CallModality::Video));
}
