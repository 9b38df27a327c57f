use crate::types::*;
use serde::{Deserialize, Serialize};

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_soundfont_path() -> Option<String> {
    Some("synths.sf2".to_string())
}

fn default_master_volume() -> Volume01 {
    Volume01::new(1.0)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_baud_rate() -> u32 {
    31_250
}

fn default_down_pin() -> u32 {
    18
}

fn default_up_pin() -> u32 {
    17
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ButtonSettings {
    #[serde(default = "default_down_pin")]
    pub down_pin: u32,
    #[serde(default = "default_up_pin")]
    pub up_pin: u32,
}

impl Default for ButtonSettings {
    fn default() -> Self {
        Self {
            down_pin: default_down_pin(),
            up_pin: default_up_pin(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerialMidiSettings {
    /// Character device the UART is exposed as.
    pub device: String,
    /// Line rate; the port is always opened 8N1 without flow control.
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsDto {
    pub midi_channel: ChannelFilter,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_soundfont_path")]
    pub soundfont_path: Option<String>,
    pub default_bank: u8,
    pub default_program: u8,
    #[serde(default = "default_master_volume")]
    pub master_volume: Volume01,
    pub audio_output: Option<String>,
    pub audio_buffer_size_frames: Option<u32>,
    pub buttons: Option<ButtonSettings>,
    pub display_enabled: bool,
    pub serial_midi: Option<SerialMidiSettings>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for SettingsDto {
    fn default() -> Self {
        Self {
            midi_channel: ChannelFilter::default(),
            poll_interval_ms: default_poll_interval_ms(),
            soundfont_path: default_soundfont_path(),
            default_bank: 0,
            default_program: 0,
            master_volume: default_master_volume(),
            audio_output: None,
            audio_buffer_size_frames: None,
            buttons: None,
            display_enabled: false,
            serial_midi: None,
            log_level: default_log_level(),
        }
    }
}

impl SettingsDto {
    pub fn validate(&self) -> Result<(), StorageError> {
        if !self.midi_channel.is_valid() {
            return Err(StorageError::Invalid(format!(
                "midi_channel must be 0..={} or null, got {:?}",
                MAX_CHANNEL,
                self.midi_channel.channel()
            )));
        }
        if self.default_program > MAX_PROGRAM {
            return Err(StorageError::Invalid(format!(
                "default_program must be 0..={}, got {}",
                MAX_PROGRAM, self.default_program
            )));
        }
        if self.default_bank > MAX_PROGRAM {
            return Err(StorageError::Invalid(format!(
                "default_bank must be 0..={}, got {}",
                MAX_PROGRAM, self.default_bank
            )));
        }
        let volume = self.master_volume.get();
        if !volume.is_finite() || !(0.0..=1.0).contains(&volume) {
            return Err(StorageError::Invalid(format!(
                "master_volume must be 0.0..=1.0, got {}",
                volume
            )));
        }
        if let Some(serial) = &self.serial_midi {
            if serial.baud_rate == 0 {
                return Err(StorageError::Invalid(
                    "serial_midi.baud_rate must be positive".to_string(),
                ));
            }
        }
        if self.poll_interval_ms == 0 {
            return Err(StorageError::Invalid(
                "poll_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

pub trait StoragePort: Send + Sync {
    fn load_settings(&self) -> Result<SettingsDto, StorageError>;
    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError>;
}
