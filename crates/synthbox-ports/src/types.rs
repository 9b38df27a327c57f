use serde::{Deserialize, Serialize};
use std::fmt;

pub type SampleTime = u64; // audio sample index, monotonic while stream running

pub const MAX_CHANNEL: u8 = 15;
pub const MAX_PROGRAM: u8 = 127;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub String);

/// One entry of a MIDI input enumeration: position in the list plus reported name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiInputDevice {
    pub index: usize,
    pub name: String,
}

impl MidiInputDevice {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AudioOutputDevice {
    pub id: DeviceId,
    pub name: String,
    pub default_config: AudioConfig,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct AudioConfig {
    pub sample_rate_hz: u32,
    pub channels: u16, // fixed 2
    pub buffer_size_frames: Option<u32>,
}

/// Which incoming MIDI channel the appliance listens to. `None` accepts every channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelFilter(pub Option<u8>);

impl ChannelFilter {
    pub const ALL: ChannelFilter = ChannelFilter(None);

    pub fn only(channel: u8) -> Self {
        Self(Some(channel))
    }

    pub fn channel(self) -> Option<u8> {
        self.0
    }

    pub fn accepts(self, channel: u8) -> bool {
        match self.0 {
            Some(wanted) => wanted == channel,
            None => true,
        }
    }

    pub fn is_valid(self) -> bool {
        self.0.map_or(true, |ch| ch <= MAX_CHANNEL)
    }
}

impl Default for ChannelFilter {
    fn default() -> Self {
        Self::only(0)
    }
}

impl fmt::Display for ChannelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ch) => write!(f, "channel {}", ch),
            None => write!(f, "all channels"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct Volume01(pub f32);

impl Volume01 {
    pub fn new(value: f32) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
