use midir::{Ignore, MidiInput, MidiInputConnection};
use std::time::Duration;
use synthbox_ports::midi::{
    MidiError, MidiInputPort, MidiInputStream, MidiMessage, MidiMessageCallback,
    TimedMidiMessage,
};
use synthbox_ports::types::MidiInputDevice;
use tracing::trace;

/// SysEx, clock and active sensing are dropped by the backend before delivery.
const INPUT_FILTER: Ignore = Ignore::All;

pub struct MidirMidiInputPort {
    client_name: String,
}

impl MidirMidiInputPort {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
        }
    }

    fn create_midi_in(&self) -> Result<MidiInput, MidiError> {
        let midi_in = MidiInput::new(&self.client_name)
            .map_err(|e| MidiError::Backend(e.to_string()))?;
        Ok(midi_in)
    }

    fn port_names(midi_in: &MidiInput) -> Vec<(midir::MidiInputPort, String)> {
        midi_in
            .ports()
            .into_iter()
            .map(|port| {
                let name = midi_in
                    .port_name(&port)
                    .unwrap_or_else(|_| "Unknown Input".to_string());
                (port, name)
            })
            .collect()
    }
}

impl Default for MidirMidiInputPort {
    fn default() -> Self {
        Self::new("synthbox")
    }
}

/// Per-connection state handed to the midir callback.
struct PortContext {
    callback: MidiMessageCallback,
    last_stamp: Option<u64>,
}

impl PortContext {
    fn deliver(&mut self, stamp: u64, bytes: &[u8]) {
        let delta = match self.last_stamp {
            Some(last) => Duration::from_micros(stamp.saturating_sub(last)),
            None => Duration::ZERO,
        };
        self.last_stamp = Some(stamp);

        match MidiMessage::from_bytes(bytes) {
            Some(message) => (self.callback)(TimedMidiMessage { message, delta }),
            None => trace!("skipping {}-byte message", bytes.len()),
        }
    }
}

pub struct MidirMidiInputStream {
    connection: Option<MidiInputConnection<PortContext>>,
}

impl MidiInputStream for MidirMidiInputStream {
    fn close(mut self: Box<Self>) {
        if let Some(connection) = self.connection.take() {
            let _ = connection.close();
        }
    }
}

impl MidiInputPort for MidirMidiInputPort {
    fn list_inputs(&self) -> Result<Vec<MidiInputDevice>, MidiError> {
        let midi_in = self.create_midi_in()?;
        Ok(Self::port_names(&midi_in)
            .into_iter()
            .enumerate()
            .map(|(index, (_, name))| MidiInputDevice::new(index, name))
            .collect())
    }

    fn open_input(
        &self,
        device: &MidiInputDevice,
        cb: MidiMessageCallback,
    ) -> Result<Box<dyn MidiInputStream>, MidiError> {
        let mut midi_in = self.create_midi_in()?;
        midi_in.ignore(INPUT_FILTER);

        let mut ports = Self::port_names(&midi_in);
        // The list may have shifted since enumeration; prefer the same slot, else the same name.
        let position = match ports.get(device.index) {
            Some((_, name)) if name == &device.name => Some(device.index),
            _ => ports.iter().position(|(_, name)| name == &device.name),
        };
        let (port, _) = position
            .map(|idx| ports.swap_remove(idx))
            .ok_or_else(|| MidiError::DeviceNotFound(device.name.clone()))?;

        let context = PortContext {
            callback: cb,
            last_stamp: None,
        };
        let connection = midi_in
            .connect(
                &port,
                "synthbox-midi-input",
                move |stamp, message, context| context.deliver(stamp, message),
                context,
            )
            .map_err(|e| MidiError::DeviceUnavailable(format!("{}: {}", device.name, e)))?;

        Ok(Box::new(MidirMidiInputStream {
            connection: Some(connection),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn delta_is_measured_between_messages_on_a_port() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut context = PortContext {
            callback: Arc::new(move |timed: TimedMidiMessage| {
                sink.lock().unwrap().push((timed.message.as_bytes().to_vec(), timed.delta));
            }),
            last_stamp: None,
        };

        context.deliver(1_000, &[0x90, 60, 100]);
        context.deliver(3_500, &[0x80, 60, 0]);
        context.deliver(4_000, &[0xF0, 1, 2, 3, 0xF7]);
        context.deliver(4_200, &[0xC0, 1]);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].1, Duration::ZERO);
        assert_eq!(seen[1].1, Duration::from_micros(2_500));
        assert_eq!(seen[2], (vec![0xC0, 1], Duration::from_micros(200)));
    }

    #[test]
    fn inputs_filter_clock_active_sensing_and_sysex() {
        let dropped = Ignore::TimeAndActiveSense as u8 | Ignore::Sysex as u8;
        assert_eq!(INPUT_FILTER as u8 & dropped, dropped);
    }
}
