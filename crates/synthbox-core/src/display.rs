use crate::program::CurrentProgram;
use crate::shutdown::Shutdown;
use crate::subsystem::Subsystem;
use std::sync::Arc;
use std::time::Duration;
use synthbox_ports::panel::{DisplayPort, PanelError};
use tracing::{info, warn};

pub const DISPLAY_REFRESH_INTERVAL: Duration = Duration::from_millis(100);
pub const DISPLAY_PLACEHOLDER: &str = "----";

pub fn format_program(program: u8) -> String {
    format!("{:>4}", program)
}

/// Mirrors the current program onto a display whenever it changes.
pub struct DisplayRefresher {
    display: Box<dyn DisplayPort>,
    program: Arc<CurrentProgram>,
    last_shown: Option<u8>,
}

impl DisplayRefresher {
    pub fn new(display: Box<dyn DisplayPort>, program: Arc<CurrentProgram>) -> Self {
        Self {
            display,
            program,
            last_shown: None,
        }
    }

    pub fn show_placeholder(&mut self) -> Result<(), PanelError> {
        self.last_shown = None;
        self.display.show(DISPLAY_PLACEHOLDER)
    }

    /// Pushes the program to the display if it changed. Returns whether anything was written.
    pub fn refresh(&mut self) -> bool {
        let program = self.program.get();
        if self.last_shown == Some(program) {
            return false;
        }
        match self.display.show(&format_program(program)) {
            Ok(()) => {
                self.last_shown = Some(program);
                true
            }
            Err(err) => {
                warn!("display update failed: {}", err);
                false
            }
        }
    }
}

impl Subsystem for DisplayRefresher {
    fn name(&self) -> &'static str {
        "display"
    }

    fn run(mut self: Box<Self>, shutdown: Shutdown) {
        if let Err(err) = self.show_placeholder() {
            warn!("display init failed: {}", err);
        }
        loop {
            self.refresh();
            if shutdown.wait_timeout(DISPLAY_REFRESH_INTERVAL) {
                break;
            }
        }
    }
}

/// Display adapter that writes to the log instead of hardware.
#[derive(Default)]
pub struct LogDisplay;

impl DisplayPort for LogDisplay {
    fn show(&mut self, text: &str) -> Result<(), PanelError> {
        info!("display: [{}]", text);
        Ok(())
    }
}
