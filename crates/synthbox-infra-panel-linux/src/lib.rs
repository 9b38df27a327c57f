//! Front-panel hardware on Linux boards: sysfs GPIO buttons and a UART MIDI input.

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use synthbox_ports::panel::{ButtonPanel, PanelButton, PanelError};
use synthbox_ports::storage::{ButtonSettings, SerialMidiSettings};
use tracing::{debug, info};

pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// Upper bound on one blocking read, so the reader notices shutdown on an idle line.
pub const SERIAL_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Momentary buttons wired active-low to GPIO inputs with pull-ups.
pub struct SysfsButtonPanel {
    root: PathBuf,
    down_pin: u32,
    up_pin: u32,
}

impl SysfsButtonPanel {
    pub fn new(settings: &ButtonSettings) -> Result<Self, PanelError> {
        Self::with_root(PathBuf::from(SYSFS_GPIO_ROOT), settings)
    }

    /// Same as `new` but against an arbitrary sysfs-like tree.
    pub fn with_root(root: PathBuf, settings: &ButtonSettings) -> Result<Self, PanelError> {
        let panel = Self {
            root,
            down_pin: settings.down_pin,
            up_pin: settings.up_pin,
        };
        panel.export_input(panel.down_pin)?;
        panel.export_input(panel.up_pin)?;
        Ok(panel)
    }

    fn pin_dir(&self, pin: u32) -> PathBuf {
        self.root.join(format!("gpio{}", pin))
    }

    fn export_input(&self, pin: u32) -> Result<(), PanelError> {
        let dir = self.pin_dir(pin);
        if !dir.exists() {
            write(&self.root.join("export"), &pin.to_string())?;
            debug!("exported gpio{}", pin);
        }
        write(&dir.join("direction"), "in")
    }

    fn pin_for(&self, button: PanelButton) -> u32 {
        match button {
            PanelButton::ProgramDown => self.down_pin,
            PanelButton::ProgramUp => self.up_pin,
        }
    }
}

impl ButtonPanel for SysfsButtonPanel {
    fn is_pressed(&mut self, button: PanelButton) -> Result<bool, PanelError> {
        let path = self.pin_dir(self.pin_for(button)).join("value");
        let value = fs::read_to_string(&path)
            .map_err(|e| PanelError::Io(format!("{}: {}", path.display(), e)))?;
        match value.trim() {
            "0" => Ok(true),
            "1" => Ok(false),
            other => Err(PanelError::Backend(format!(
                "unexpected gpio value {:?} in {}",
                other,
                path.display()
            ))),
        }
    }
}

/// UART MIDI input in raw mode. Reads return `TimedOut` after
/// [`SERIAL_READ_TIMEOUT`] without data.
pub struct SerialMidiReader {
    port: Box<dyn SerialPort>,
}

impl Read for SerialMidiReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

/// Opens the UART at the configured rate, 8 data bits, no parity, one stop bit.
pub fn open_serial_midi(settings: &SerialMidiSettings) -> Result<SerialMidiReader, PanelError> {
    let port = serialport::new(settings.device.as_str(), settings.baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(SERIAL_READ_TIMEOUT)
        .open()
        .map_err(|e| PanelError::Io(format!("{}: {}", settings.device, e)))?;
    info!(
        "opened serial MIDI on {} at {} baud",
        settings.device, settings.baud_rate
    );
    Ok(SerialMidiReader { port })
}

fn write(path: &Path, value: &str) -> Result<(), PanelError> {
    fs::write(path, value).map_err(|e| PanelError::Io(format!("{}: {}", path.display(), e)))
}
