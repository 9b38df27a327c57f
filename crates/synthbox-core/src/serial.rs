use crate::dispatcher::Dispatcher;
use crate::shutdown::Shutdown;
use crate::subsystem::Subsystem;
use std::io::{ErrorKind, Read};
use std::sync::Arc;
use synthbox_ports::midi::{MidiMessage, CHANNEL_PRESSURE, PROGRAM_CHANGE};
use tracing::{info, warn};

/// Reassembles MIDI messages from a raw 31250 baud byte stream.
///
/// A status byte always starts a new message. Data bytes seen before any
/// status byte are dropped. Running status is not supported.
#[derive(Debug, Default)]
pub struct SerialFramer {
    buf: [u8; 3],
    len: usize,
}

impl SerialFramer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, byte: u8) -> Option<MidiMessage> {
        if byte >= 0xF8 {
            // system real-time, may be interleaved anywhere
            return None;
        }

        if byte & 0x80 != 0 {
            self.buf[0] = byte;
            self.len = 1;
            return None;
        }

        if self.len == 0 {
            return None;
        }

        self.buf[self.len] = byte;
        self.len += 1;

        if self.len == self.expected_len() {
            let message = MidiMessage::from_bytes(&self.buf[..self.len]);
            self.len = 0;
            return message;
        }
        None
    }

    fn expected_len(&self) -> usize {
        match self.buf[0] >> 4 {
            PROGRAM_CHANGE | CHANNEL_PRESSURE => 2,
            _ => 3,
        }
    }
}

/// Feeds a serial MIDI byte stream through the dispatcher until EOF or shutdown.
pub struct SerialMidiInput<R> {
    name: String,
    reader: R,
    dispatcher: Arc<Dispatcher>,
}

impl<R: Read + Send> SerialMidiInput<R> {
    pub fn new(name: impl Into<String>, reader: R, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            name: name.into(),
            reader,
            dispatcher,
        }
    }

    pub fn pump(&mut self, shutdown: &Shutdown) {
        let mut framer = SerialFramer::new();
        let mut chunk = [0u8; 64];

        while !shutdown.is_triggered() {
            let read = match self.reader.read(&mut chunk) {
                Ok(0) => {
                    info!("serial MIDI input {} reached end of stream", self.name);
                    return;
                }
                Ok(read) => read,
                // idle line: the reader's timeout expired
                Err(err)
                    if matches!(
                        err.kind(),
                        ErrorKind::Interrupted | ErrorKind::TimedOut | ErrorKind::WouldBlock
                    ) =>
                {
                    continue
                }
                Err(err) => {
                    warn!("serial MIDI input {} failed: {}", self.name, err);
                    return;
                }
            };

            for byte in &chunk[..read] {
                if let Some(message) = framer.push(*byte) {
                    self.dispatcher.dispatch(&message);
                }
            }
        }
    }
}

impl<R: Read + Send + 'static> Subsystem for SerialMidiInput<R> {
    fn name(&self) -> &'static str {
        "serial-midi"
    }

    fn run(mut self: Box<Self>, shutdown: Shutdown) {
        self.pump(&shutdown);
    }

    fn joins_on_shutdown(&self) -> bool {
        false
    }
}
