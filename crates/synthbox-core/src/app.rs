use crate::audio_graph::SynthRenderer;
use crate::buttons::ButtonPoller;
use crate::dispatcher::{Dispatcher, OUTPUT_CHANNEL};
use crate::display::DisplayRefresher;
use crate::program::CurrentProgram;
use crate::reconciler::Reconciler;
use crate::serial::SerialMidiInput;
use crate::shutdown::Shutdown;
use crate::subsystem::{spawn_subsystem, Disabled, Subsystem};
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use synthbox_ports::audio::{AudioError, AudioOutputPort, AudioStreamHandle};
use synthbox_ports::midi::{MidiError, MidiInputPort};
use synthbox_ports::panel::{ButtonPanel, DisplayPort, PanelError};
use synthbox_ports::storage::{SettingsDto, StorageError};
use synthbox_ports::synth::{SynthError, SynthPort};
use synthbox_ports::types::{AudioConfig, AudioOutputDevice};
use tracing::{debug, info, warn};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("audio error: {0}")]
    Audio(#[from] AudioError),
    #[error("midi error: {0}")]
    Midi(#[from] MidiError),
    #[error("synth error: {0}")]
    Synth(#[from] SynthError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("panel error: {0}")]
    Panel(#[from] PanelError),
}

/// Hardware that may or may not be fitted; `None` selects the disabled variant.
#[derive(Default)]
pub struct Peripherals {
    pub buttons: Option<Box<dyn ButtonPanel>>,
    pub display: Option<Box<dyn DisplayPort>>,
    pub serial_midi: Option<(String, Box<dyn Read + Send>)>,
}

pub struct Appliance {
    settings: SettingsDto,
    audio_port: Box<dyn AudioOutputPort>,
    synth: Arc<dyn SynthPort>,
    program: Arc<CurrentProgram>,
    dispatcher: Arc<Dispatcher>,
    reconciler: Reconciler,
    subsystems: Vec<Box<dyn Subsystem>>,
    shutdown: Shutdown,
    audio_stream: Option<Box<dyn AudioStreamHandle>>,
}

impl Appliance {
    pub fn new(
        settings: SettingsDto,
        midi_port: Box<dyn MidiInputPort>,
        audio_port: Box<dyn AudioOutputPort>,
        synth: Arc<dyn SynthPort>,
    ) -> Result<Self, AppError> {
        settings.validate()?;

        let program = Arc::new(CurrentProgram::new(settings.default_program));
        let dispatcher = Arc::new(Dispatcher::new(
            synth.clone(),
            program.clone(),
            settings.midi_channel,
        ));
        let reconciler = Reconciler::new(midi_port, dispatcher.callback());

        Ok(Self {
            settings,
            audio_port,
            synth,
            program,
            dispatcher,
            reconciler,
            subsystems: Vec::new(),
            shutdown: Shutdown::new(),
            audio_stream: None,
        })
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        self.dispatcher.clone()
    }

    pub fn program(&self) -> Arc<CurrentProgram> {
        self.program.clone()
    }

    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.settings.poll_interval_ms)
    }

    pub fn subsystem_names(&self) -> Vec<&'static str> {
        self.subsystems.iter().map(|s| s.name()).collect()
    }

    /// Turns each fitted peripheral into its subsystem, or a disabled stand-in.
    pub fn install_peripherals(&mut self, peripherals: Peripherals) {
        let buttons: Box<dyn Subsystem> = match peripherals.buttons {
            Some(panel) => Box::new(ButtonPoller::new(
                panel,
                self.program.clone(),
                self.synth.clone(),
                self.settings.default_bank,
            )),
            None => Box::new(Disabled("buttons")),
        };
        let display: Box<dyn Subsystem> = match peripherals.display {
            Some(display) => Box::new(DisplayRefresher::new(display, self.program.clone())),
            None => Box::new(Disabled("display")),
        };
        let serial: Box<dyn Subsystem> = match peripherals.serial_midi {
            Some((name, reader)) => Box::new(SerialMidiInput::new(
                name,
                reader,
                self.dispatcher.clone(),
            )),
            None => Box::new(Disabled("serial-midi")),
        };
        self.subsystems.extend([buttons, display, serial]);
    }

    /// Brings the synth and audio output up and selects the startup program.
    pub fn start(&mut self) -> Result<(), AppError> {
        let device = self.resolve_audio_output()?;
        self.synth.set_sample_rate(device.default_config.sample_rate_hz);

        match self.settings.soundfont_path.as_deref() {
            Some(path) => {
                let info = self.synth.load_soundfont_from_path(path)?;
                info!(
                    "Loaded soundfont {} ({} presets) from {}",
                    info.name, info.preset_count, path
                );
            }
            None => warn!("no soundfont configured, synth will stay silent"),
        }
        self.synth.set_master_volume(self.settings.master_volume);

        let config = AudioConfig {
            sample_rate_hz: device.default_config.sample_rate_hz,
            channels: 2,
            buffer_size_frames: self.settings.audio_buffer_size_frames,
        };
        let renderer = Arc::new(SynthRenderer::new(self.synth.clone()));
        let stream = self.audio_port.open_output(&device.id, config, renderer)?;
        self.audio_stream = Some(stream);
        info!(
            "Audio output {} at {} Hz",
            device.name, config.sample_rate_hz
        );

        let (bank, program) = (self.settings.default_bank, self.settings.default_program);
        if let Err(err) = self.synth.program_select(OUTPUT_CHANNEL, bank, program) {
            warn!("startup program select failed: {}", err);
        }
        self.program.set(program);
        Ok(())
    }

    /// Runs subsystems and the port reconciler until shutdown is triggered.
    pub fn run(mut self) -> Result<(), AppError> {
        info!(
            "Listening on {}, polling MIDI ports every {:?}",
            self.dispatcher.filter(),
            self.poll_interval()
        );

        let handles: Vec<_> = std::mem::take(&mut self.subsystems)
            .into_iter()
            .filter_map(|subsystem| spawn_subsystem(subsystem, self.shutdown.clone()))
            .collect();

        let interval = self.poll_interval();
        self.reconciler.run(interval, &self.shutdown);

        self.shutdown.trigger();
        for started in handles {
            if !started.joins_on_shutdown {
                debug!("not waiting for {}", started.name);
                continue;
            }
            if started.handle.join().is_err() {
                warn!("{} thread panicked", started.name);
            }
        }
        if let Some(stream) = self.audio_stream.take() {
            stream.close();
        }
        info!("stopped");
        Ok(())
    }

    fn resolve_audio_output(&self) -> Result<AudioOutputDevice, AppError> {
        match self.settings.audio_output.as_deref() {
            Some(name) => self
                .audio_port
                .list_outputs()?
                .into_iter()
                .find(|device| device.name == name)
                .ok_or_else(|| AppError::Audio(AudioError::DeviceNotFound(name.to_string()))),
            None => Ok(self.audio_port.default_output()?),
        }
    }
}
