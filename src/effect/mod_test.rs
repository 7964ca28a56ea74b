use std::path::Path;

use crate::transport::mock::{Command, MockTransport};

use super::file_test::{constant_record, container, list_chunk, rumble_record, write_effect_file};
use super::{CreationPolicy, Effect, EffectError};

fn two_record_file(stem: &str) -> std::path::PathBuf {
    let bytes = container(&[list_chunk(
        b"main",
        &[constant_record(0, 1000, 5000), rumble_record(3000, 1000)],
    )]);
    write_effect_file(stem, &bytes)
}

#[test]
fn immediate_create_uploads_every_record() {
    let mut transport = MockTransport::new();
    let path = two_record_file("immediate");

    let effect =
        Effect::create(&mut transport, "bump", &path, CreationPolicy::Immediate).unwrap();

    assert!(effect.is_loaded());
    assert!(!effect.is_playing());
    assert_eq!(effect.descriptors().len(), 2);
    assert_eq!(transport.uploaded_ids(), vec![0, 1]);
}

#[test]
fn lazy_create_defers_upload_until_play() {
    let mut transport = MockTransport::new();
    let path = two_record_file("lazy");

    let mut effect =
        Effect::create(&mut transport, "bump", &path, CreationPolicy::OnFirstPlay).unwrap();
    assert!(!effect.is_loaded());
    assert!(effect.descriptors().is_empty());
    assert!(transport.uploaded.is_empty());

    effect.play(&mut transport).unwrap();
    assert!(effect.is_loaded());
    assert!(effect.is_playing());
    assert_eq!(effect.descriptors().len(), 2);
    assert!(transport.commands.contains(&Command::Play(0)));
    assert!(transport.commands.contains(&Command::Play(1)));
}

#[test]
fn play_stop_unload_releases_descriptors() {
    let mut transport = MockTransport::new();
    let path = two_record_file("lifecycle");

    let mut effect =
        Effect::create(&mut transport, "bump", &path, CreationPolicy::Immediate).unwrap();
    effect.play(&mut transport).unwrap();
    effect.stop(&mut transport).unwrap();

    assert!(effect.unload(&mut transport).unwrap());
    assert!(!effect.is_loaded());
    assert!(effect.descriptors().is_empty());
    assert!(transport.uploaded.is_empty());
}

#[test]
fn unload_defers_while_playing() {
    let mut transport = MockTransport::new();
    let path = two_record_file("deferred");

    let mut effect =
        Effect::create(&mut transport, "bump", &path, CreationPolicy::Immediate).unwrap();
    effect.play(&mut transport).unwrap();

    // No intervening stop: the unload must refuse and keep everything
    assert!(!effect.unload(&mut transport).unwrap());
    assert!(effect.is_loaded());
    assert_eq!(effect.descriptors().len(), 2);
    assert_eq!(transport.uploaded_ids(), vec![0, 1]);
}

#[test]
fn rejected_upload_rolls_back() {
    let mut transport = MockTransport::new();
    transport.fail_uploads_after = Some(1);
    let path = two_record_file("rollback");

    let result = Effect::create(&mut transport, "bump", &path, CreationPolicy::Immediate);
    assert!(matches!(result, Err(EffectError::Device(_))));
    // The one descriptor that made it on must have been erased again
    assert!(transport.uploaded.is_empty());
}

#[test]
fn rejected_start_keeps_descriptors_loaded() {
    let mut transport = MockTransport::new();
    let path = two_record_file("badstart");

    let mut effect =
        Effect::create(&mut transport, "bump", &path, CreationPolicy::Immediate).unwrap();
    transport.fail_play = true;

    assert!(matches!(
        effect.play(&mut transport),
        Err(EffectError::Device(_))
    ));
    assert!(effect.is_loaded());
    assert!(!effect.is_playing());
    assert_eq!(transport.uploaded_ids(), vec![0, 1]);
}

#[test]
fn missing_file_is_an_io_error() {
    let mut transport = MockTransport::new();
    let result = Effect::create(
        &mut transport,
        "ghost",
        Path::new("/nonexistent/ffjoy.ffe"),
        CreationPolicy::Immediate,
    );
    assert!(matches!(result, Err(EffectError::Io(_))));
}

#[test]
fn malformed_file_is_a_format_error() {
    let mut transport = MockTransport::new();
    let path = write_effect_file("garbage", b"not an effect container at all");
    let result = Effect::create(&mut transport, "bad", &path, CreationPolicy::Immediate);
    assert!(matches!(result, Err(EffectError::Format(_))));
    assert!(transport.uploaded.is_empty());
}
