use crate::shutdown::Shutdown;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use synthbox_ports::midi::{MidiError, MidiInputPort, MidiInputStream, MidiMessageCallback};
use synthbox_ports::types::MidiInputDevice;
use tracing::{info, warn};

/// Outcome of one reconciliation cycle.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub registered: Vec<String>,
    pub unregistered: Vec<String>,
    pub failed: Vec<(String, MidiError)>,
}

impl ReconcileReport {
    pub fn is_unchanged(&self) -> bool {
        self.registered.is_empty() && self.unregistered.is_empty() && self.failed.is_empty()
    }
}

/// Keeps one open input stream per available MIDI port name.
pub struct Reconciler {
    midi_port: Box<dyn MidiInputPort>,
    callback: MidiMessageCallback,
    registered: BTreeMap<String, Box<dyn MidiInputStream>>,
}

impl Reconciler {
    pub fn new(midi_port: Box<dyn MidiInputPort>, callback: MidiMessageCallback) -> Self {
        Self {
            midi_port,
            callback,
            registered: BTreeMap::new(),
        }
    }

    pub fn registered_names(&self) -> Vec<String> {
        self.registered.keys().cloned().collect()
    }

    /// Applies one snapshot of the port list: opens new names, then releases vanished ones.
    pub fn reconcile(&mut self, current: &[MidiInputDevice]) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for device in current {
            if self.registered.contains_key(&device.name) {
                continue;
            }
            match self.midi_port.open_input(device, self.callback.clone()) {
                Ok(stream) => {
                    info!(
                        "Registered MIDI port #{} device: {}",
                        device.index, device.name
                    );
                    self.registered.insert(device.name.clone(), stream);
                    report.registered.push(device.name.clone());
                }
                Err(err) => {
                    warn!(
                        "Failed to open MIDI port #{} device: {}: {}",
                        device.index, device.name, err
                    );
                    report.failed.push((device.name.clone(), err));
                }
            }
        }

        let present: HashSet<&str> = current.iter().map(|d| d.name.as_str()).collect();
        let vanished: Vec<String> = self
            .registered
            .keys()
            .filter(|name| !present.contains(name.as_str()))
            .cloned()
            .collect();

        for name in vanished {
            if let Some(stream) = self.registered.remove(&name) {
                stream.close();
                info!("Unregistered MIDI device: {}", name);
                report.unregistered.push(name);
            }
        }

        report
    }

    /// Enumerates the transport once and reconciles against that snapshot.
    pub fn poll_once(&mut self) -> Result<ReconcileReport, MidiError> {
        let current = self.midi_port.list_inputs()?;
        Ok(self.reconcile(&current))
    }

    /// Polls until shutdown, then releases every registered port.
    pub fn run(&mut self, interval: Duration, shutdown: &Shutdown) {
        while !shutdown.is_triggered() {
            if let Err(err) = self.poll_once() {
                warn!("MIDI port enumeration failed: {}", err);
            }
            if shutdown.wait_timeout(interval) {
                break;
            }
        }
        self.close_all();
    }

    pub fn close_all(&mut self) {
        for (name, stream) in std::mem::take(&mut self.registered) {
            stream.close();
            info!("Unregistered MIDI device: {}", name);
        }
    }
}
