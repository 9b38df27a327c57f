use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use synthbox_core::{Appliance, LogDisplay, Peripherals};
use synthbox_infra_audio_cpal::CpalAudioOutputPort;
use synthbox_infra_midi_midir::MidirMidiInputPort;
use synthbox_infra_panel_linux::{open_serial_midi, SysfsButtonPanel};
use synthbox_infra_storage_fs::FsStorage;
use synthbox_infra_synth_rustysynth::RustySynth;
use synthbox_ports::audio::AudioOutputPort;
use synthbox_ports::midi::MidiInputPort;
use synthbox_ports::panel::{ButtonPanel, DisplayPort};
use synthbox_ports::storage::{SettingsDto, StoragePort};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "synthbox", version, about = "Play MIDI input devices through a SoundFont synth")]
struct Args {
    /// Settings file (defaults to settings.json in the user config dir)
    #[arg(short, long, env = "SYNTHBOX_CONFIG")]
    config: Option<PathBuf>,

    /// Log level, overrides the settings file (RUST_LOG takes precedence over both)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Print MIDI inputs and audio outputs, then exit
    #[arg(long)]
    list_devices: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let storage = match &args.config {
        Some(path) => FsStorage::with_file(path.clone()),
        None => FsStorage::default(),
    };
    let settings = storage
        .load_settings()
        .with_context(|| format!("loading {}", storage.settings_path().display()))?;

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| settings.log_level.clone());
    init_logging(&level);
    info!("synthbox {} starting", env!("CARGO_PKG_VERSION"));

    let midi_port = MidirMidiInputPort::default();
    let audio_port = CpalAudioOutputPort::new();

    if args.list_devices {
        return list_devices(&midi_port, &audio_port);
    }

    let synth = Arc::new(RustySynth::default());
    let peripherals = build_peripherals(&settings);
    let mut app = Appliance::new(
        settings,
        Box::new(midi_port),
        Box::new(audio_port),
        synth,
    )?;
    app.install_peripherals(peripherals);
    app.start().context("starting synth and audio output")?;
    app.run()?;
    Ok(())
}

fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_names(true),
        )
        .init();
}

/// Opens whatever front-panel hardware is enabled. A piece that fails to open is left out.
fn build_peripherals(settings: &SettingsDto) -> Peripherals {
    let buttons = settings
        .buttons
        .as_ref()
        .and_then(|buttons| match SysfsButtonPanel::new(buttons) {
            Ok(panel) => Some(Box::new(panel) as Box<dyn ButtonPanel>),
            Err(err) => {
                warn!("buttons disabled: {}", err);
                None
            }
        });

    let display = settings
        .display_enabled
        .then(|| Box::new(LogDisplay) as Box<dyn DisplayPort>);

    let serial_midi = settings
        .serial_midi
        .as_ref()
        .and_then(|serial| match open_serial_midi(serial) {
            Ok(reader) => {
                let reader: Box<dyn Read + Send> = Box::new(reader);
                Some((serial.device.clone(), reader))
            }
            Err(err) => {
                warn!("serial MIDI disabled: {}", err);
                None
            }
        });

    Peripherals {
        buttons,
        display,
        serial_midi,
    }
}

fn list_devices(midi_port: &dyn MidiInputPort, audio_port: &dyn AudioOutputPort) -> Result<()> {
    println!("MIDI inputs:");
    for device in midi_port.list_inputs()? {
        println!("  #{} {}", device.index, device.name);
    }

    println!("Audio outputs:");
    let default = audio_port.default_output().ok().map(|device| device.id);
    for device in audio_port.list_outputs()? {
        let marker = if Some(&device.id) == default.as_ref() {
            "*"
        } else {
            " "
        };
        println!(
            " {} {} ({} Hz)",
            marker, device.name, device.default_config.sample_rate_hz
        );
    }
    Ok(())
}
