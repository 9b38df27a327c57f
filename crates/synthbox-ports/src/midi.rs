use crate::types::*;
use std::{sync::Arc, time::Duration};

pub const NOTE_OFF: u8 = 0x8;
pub const NOTE_ON: u8 = 0x9;
pub const CONTROL_CHANGE: u8 = 0xB;
pub const PROGRAM_CHANGE: u8 = 0xC;
pub const CHANNEL_PRESSURE: u8 = 0xD;

/// A raw channel-style MIDI message of 1..=3 bytes.
///
/// Only the length is validated here; classification (and rejection of
/// out-of-range data bytes) is the dispatcher's job.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct MidiMessage {
    bytes: [u8; 3],
    len: u8,
}

impl MidiMessage {
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() || bytes.len() > 3 {
            return None;
        }
        let mut buf = [0u8; 3];
        buf[..bytes.len()].copy_from_slice(bytes);
        Some(Self {
            bytes: buf,
            len: bytes.len() as u8,
        })
    }

    pub fn status(&self) -> u8 {
        self.bytes[0]
    }

    /// High nibble of the status byte.
    pub fn kind(&self) -> u8 {
        self.bytes[0] >> 4
    }

    /// Low nibble of the status byte.
    pub fn channel(&self) -> u8 {
        self.bytes[0] & 0x0F
    }

    pub fn data1(&self) -> Option<u8> {
        self.data(1)
    }

    pub fn data2(&self) -> Option<u8> {
        self.data(2)
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    fn data(&self, index: usize) -> Option<u8> {
        if index < self.len as usize {
            Some(self.bytes[index])
        } else {
            None
        }
    }
}

impl std::fmt::Debug for MidiMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MidiMessage({:02X?})", self.as_bytes())
    }
}

/// What a transport hands to a port callback.
#[derive(Clone, Copy, Debug)]
pub struct TimedMidiMessage {
    pub message: MidiMessage,
    /// Time since the previous message on the same port; zero for the first one.
    pub delta: Duration,
}

#[derive(thiserror::Error, Debug)]
pub enum MidiError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// MIDI input stream handle: close releases the underlying port.
pub trait MidiInputStream: Send {
    fn close(self: Box<Self>);
}

pub type MidiMessageCallback = Arc<dyn Fn(TimedMidiMessage) + Send + Sync + 'static>;

pub trait MidiInputPort: Send + Sync {
    fn list_inputs(&self) -> Result<Vec<MidiInputDevice>, MidiError>;

    /// Open input stream: implementation should invoke cb from a background thread/callback.
    fn open_input(
        &self,
        device: &MidiInputDevice,
        cb: MidiMessageCallback,
    ) -> Result<Box<dyn MidiInputStream>, MidiError>;
}
