use pretty_assertions::assert_eq;
use std::fs;
use synthbox_infra_storage_fs::FsStorage;
use synthbox_ports::storage::{SerialMidiSettings, SettingsDto, StorageError, StoragePort};
use synthbox_ports::types::ChannelFilter;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = FsStorage::new(dir.path().to_path_buf());
    assert_eq!(storage.load_settings().expect("load"), SettingsDto::default());
}

#[test]
fn saved_settings_load_back() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = FsStorage::new(dir.path().join("nested"));
    let settings = SettingsDto {
        midi_channel: ChannelFilter::ALL,
        default_program: 12,
        display_enabled: true,
        serial_midi: Some(SerialMidiSettings {
            device: "/dev/ttyAMA0".to_string(),
            baud_rate: 31_250,
        }),
        ..SettingsDto::default()
    };

    storage.save_settings(&settings).expect("save");
    assert_eq!(storage.load_settings().expect("load"), settings);
}

#[test]
fn hand_written_file_uses_defaults_for_missing_keys() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("box.json");
    fs::write(&path, r#"{ "midi_channel": 9, "soundfont_path": "/media/grand.sf2" }"#)
        .expect("write");

    let settings = FsStorage::with_file(path).load_settings().expect("load");
    assert_eq!(settings.midi_channel, ChannelFilter::only(9));
    assert_eq!(settings.soundfont_path.as_deref(), Some("/media/grand.sf2"));
    assert_eq!(settings.poll_interval_ms, 2_000);
}

#[test]
fn malformed_and_invalid_files_are_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ not json").expect("write");
    assert!(matches!(
        FsStorage::with_file(broken).load_settings(),
        Err(StorageError::Serde(_))
    ));

    let invalid = dir.path().join("invalid.json");
    fs::write(&invalid, r#"{ "midi_channel": 42 }"#).expect("write");
    assert!(matches!(
        FsStorage::with_file(invalid).load_settings(),
        Err(StorageError::Invalid(_))
    ));

    let loud = dir.path().join("loud.json");
    fs::write(&loud, r#"{ "master_volume": 5.0 }"#).expect("write");
    assert!(matches!(
        FsStorage::with_file(loud).load_settings(),
        Err(StorageError::Invalid(_))
    ));
}
