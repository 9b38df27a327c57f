#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use synthbox_ports::audio::{AudioError, AudioOutputPort, AudioRenderCallback, AudioStreamHandle};
use synthbox_ports::midi::{
    MidiError, MidiInputPort, MidiInputStream, MidiMessage, MidiMessageCallback,
    TimedMidiMessage,
};
use synthbox_ports::panel::{ButtonPanel, DisplayPort, PanelButton, PanelError};
use synthbox_ports::synth::{SoundFontInfo, SynthError, SynthPort};
use synthbox_ports::types::{AudioConfig, AudioOutputDevice, DeviceId, MidiInputDevice, Volume01};

#[derive(Clone, Debug, PartialEq)]
pub enum SynthCall {
    LoadSoundFont(String),
    SampleRate(u32),
    MasterVolume(Volume01),
    NoteOn(u8, u8, u8),
    NoteOff(u8, u8),
    ProgramChange(u8, u8),
    ControlChange(u8, u8, u8),
    BankSelect(u8, u8),
    ProgramSelect(u8, u8, u8),
}

#[derive(Default)]
pub struct RecordingSynth {
    calls: Mutex<Vec<SynthCall>>,
    fail_events: Mutex<bool>,
}

impl RecordingSynth {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<SynthCall> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    pub fn fail_events(&self, fail: bool) {
        *self.fail_events.lock() = fail;
    }

    fn record(&self, call: SynthCall) -> Result<(), SynthError> {
        self.calls.lock().push(call);
        if *self.fail_events.lock() {
            Err(SynthError::Backend("scripted failure".to_string()))
        } else {
            Ok(())
        }
    }
}

impl SynthPort for RecordingSynth {
    fn load_soundfont_from_path(&self, path: &str) -> Result<SoundFontInfo, SynthError> {
        self.calls
            .lock()
            .push(SynthCall::LoadSoundFont(path.to_string()));
        Ok(SoundFontInfo {
            name: "test".to_string(),
            preset_count: 128,
        })
    }

    fn set_sample_rate(&self, sample_rate_hz: u32) {
        self.calls.lock().push(SynthCall::SampleRate(sample_rate_hz));
    }

    fn set_master_volume(&self, volume: Volume01) {
        self.calls.lock().push(SynthCall::MasterVolume(volume));
    }

    fn note_on(&self, channel: u8, note: u8, velocity: u8) -> Result<(), SynthError> {
        self.record(SynthCall::NoteOn(channel, note, velocity))
    }

    fn note_off(&self, channel: u8, note: u8) -> Result<(), SynthError> {
        self.record(SynthCall::NoteOff(channel, note))
    }

    fn program_change(&self, channel: u8, program: u8) -> Result<(), SynthError> {
        self.record(SynthCall::ProgramChange(channel, program))
    }

    fn control_change(&self, channel: u8, controller: u8, value: u8) -> Result<(), SynthError> {
        self.record(SynthCall::ControlChange(channel, controller, value))
    }

    fn bank_select(&self, channel: u8, bank: u8) -> Result<(), SynthError> {
        self.record(SynthCall::BankSelect(channel, bank))
    }

    fn program_select(&self, channel: u8, bank: u8, program: u8) -> Result<(), SynthError> {
        self.record(SynthCall::ProgramSelect(channel, bank, program))
    }

    fn render(&self, out_l: &mut [f32], out_r: &mut [f32]) {
        out_l.fill(0.5);
        out_r.fill(-0.5);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PortEvent {
    Open(String),
    Close(String),
}

#[derive(Default)]
struct PortState {
    ports: Vec<MidiInputDevice>,
    fail_open: HashSet<String>,
    fail_list: bool,
    list_calls: usize,
    events: Vec<PortEvent>,
    callbacks: HashMap<String, MidiMessageCallback>,
}

/// Fake transport whose port list is set by the test.
#[derive(Clone, Default)]
pub struct ScriptedMidiPort {
    state: Arc<Mutex<PortState>>,
}

impl ScriptedMidiPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ports(&self, ports: &[(usize, &str)]) {
        self.state.lock().ports = ports
            .iter()
            .map(|(index, name)| MidiInputDevice::new(*index, *name))
            .collect();
    }

    pub fn fail_open(&self, name: &str, fail: bool) {
        let mut state = self.state.lock();
        if fail {
            state.fail_open.insert(name.to_string());
        } else {
            state.fail_open.remove(name);
        }
    }

    pub fn fail_list(&self, fail: bool) {
        self.state.lock().fail_list = fail;
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().list_calls
    }

    pub fn events(&self) -> Vec<PortEvent> {
        self.state.lock().events.clone()
    }

    /// Delivers a message as the named port's transport thread would.
    pub fn deliver(&self, name: &str, bytes: &[u8]) -> bool {
        let callback = self.state.lock().callbacks.get(name).cloned();
        match (callback, MidiMessage::from_bytes(bytes)) {
            (Some(callback), Some(message)) => {
                callback(TimedMidiMessage {
                    message,
                    delta: Duration::ZERO,
                });
                true
            }
            _ => false,
        }
    }
}

impl MidiInputPort for ScriptedMidiPort {
    fn list_inputs(&self) -> Result<Vec<MidiInputDevice>, MidiError> {
        let mut state = self.state.lock();
        state.list_calls += 1;
        if state.fail_list {
            return Err(MidiError::Backend("enumeration failed".to_string()));
        }
        Ok(state.ports.clone())
    }

    fn open_input(
        &self,
        device: &MidiInputDevice,
        cb: MidiMessageCallback,
    ) -> Result<Box<dyn MidiInputStream>, MidiError> {
        let mut state = self.state.lock();
        if state.fail_open.contains(&device.name) {
            return Err(MidiError::DeviceUnavailable(device.name.clone()));
        }
        state.events.push(PortEvent::Open(device.name.clone()));
        state.callbacks.insert(device.name.clone(), cb);
        Ok(Box::new(ScriptedStream {
            name: device.name.clone(),
            state: self.state.clone(),
        }))
    }
}

struct ScriptedStream {
    name: String,
    state: Arc<Mutex<PortState>>,
}

impl MidiInputStream for ScriptedStream {
    fn close(self: Box<Self>) {
        let mut state = self.state.lock();
        state.callbacks.remove(&self.name);
        state.events.push(PortEvent::Close(self.name.clone()));
    }
}

#[derive(Clone, Default)]
pub struct FakeAudioPort {
    opened: Arc<Mutex<Vec<(DeviceId, AudioConfig)>>>,
    closed: Arc<Mutex<usize>>,
}

impl FakeAudioPort {
    pub fn opened(&self) -> Vec<(DeviceId, AudioConfig)> {
        self.opened.lock().clone()
    }

    pub fn closed(&self) -> usize {
        *self.closed.lock()
    }

    fn device(index: usize, name: &str, rate: u32) -> AudioOutputDevice {
        AudioOutputDevice {
            id: DeviceId(format!("fake:{}", index)),
            name: name.to_string(),
            default_config: AudioConfig {
                sample_rate_hz: rate,
                channels: 2,
                buffer_size_frames: None,
            },
        }
    }
}

impl AudioOutputPort for FakeAudioPort {
    fn list_outputs(&self) -> Result<Vec<AudioOutputDevice>, AudioError> {
        Ok(vec![
            Self::device(0, "Built-in", 48_000),
            Self::device(1, "USB DAC", 44_100),
        ])
    }

    fn default_output(&self) -> Result<AudioOutputDevice, AudioError> {
        Ok(Self::device(0, "Built-in", 48_000))
    }

    fn open_output(
        &self,
        device_id: &DeviceId,
        config: AudioConfig,
        _cb: Arc<dyn AudioRenderCallback>,
    ) -> Result<Box<dyn AudioStreamHandle>, AudioError> {
        self.opened.lock().push((device_id.clone(), config));
        Ok(Box::new(FakeStream {
            closed: self.closed.clone(),
        }))
    }
}

struct FakeStream {
    closed: Arc<Mutex<usize>>,
}

impl AudioStreamHandle for FakeStream {
    fn close(self: Box<Self>) {
        *self.closed.lock() += 1;
    }
}

/// Button panel whose state is driven by the test.
#[derive(Clone, Default)]
pub struct FakeButtons {
    pressed: Arc<Mutex<HashSet<PanelButton>>>,
    broken: Arc<Mutex<bool>>,
}

impl FakeButtons {
    pub fn press(&self, button: PanelButton) {
        self.pressed.lock().insert(button);
    }

    pub fn release_all(&self) {
        self.pressed.lock().clear();
    }

    pub fn break_panel(&self) {
        *self.broken.lock() = true;
    }
}

impl ButtonPanel for FakeButtons {
    fn is_pressed(&mut self, button: PanelButton) -> Result<bool, PanelError> {
        if *self.broken.lock() {
            return Err(PanelError::Io("gpio read failed".to_string()));
        }
        Ok(self.pressed.lock().contains(&button))
    }
}

#[derive(Clone, Default)]
pub struct RecordingDisplay {
    shown: Arc<Mutex<Vec<String>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingDisplay {
    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().clone()
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock() = fail;
    }
}

impl DisplayPort for RecordingDisplay {
    fn show(&mut self, text: &str) -> Result<(), PanelError> {
        if *self.fail.lock() {
            return Err(PanelError::Io("i2c nack".to_string()));
        }
        self.shown.lock().push(text.to_string());
        Ok(())
    }
}
