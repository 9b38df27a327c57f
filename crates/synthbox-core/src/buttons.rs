use crate::dispatcher::OUTPUT_CHANNEL;
use crate::program::CurrentProgram;
use crate::shutdown::Shutdown;
use crate::subsystem::Subsystem;
use std::sync::Arc;
use std::time::{Duration, Instant};
use synthbox_ports::panel::{ButtonPanel, PanelButton};
use synthbox_ports::synth::SynthPort;
use tracing::{info, warn};

pub const BUTTON_POLL_INTERVAL: Duration = Duration::from_millis(20);
pub const BUTTON_DEBOUNCE: Duration = Duration::from_millis(200);

/// Steps the current program with the front-panel up/down buttons.
pub struct ButtonPoller {
    panel: Box<dyn ButtonPanel>,
    program: Arc<CurrentProgram>,
    synth: Arc<dyn SynthPort>,
    bank: u8,
    last_press: Option<Instant>,
}

impl ButtonPoller {
    pub fn new(
        panel: Box<dyn ButtonPanel>,
        program: Arc<CurrentProgram>,
        synth: Arc<dyn SynthPort>,
        bank: u8,
    ) -> Self {
        Self {
            panel,
            program,
            synth,
            bank,
            last_press: None,
        }
    }

    /// One poll at `now`. Returns the newly selected program if a press was accepted.
    pub fn poll(&mut self, now: Instant) -> Option<u8> {
        if let Some(last) = self.last_press {
            if now.saturating_duration_since(last) <= BUTTON_DEBOUNCE {
                return None;
            }
        }

        let program = if self.pressed(PanelButton::ProgramDown) {
            self.program.decrement()
        } else if self.pressed(PanelButton::ProgramUp) {
            self.program.increment()
        } else {
            return None;
        };

        self.last_press = Some(now);
        info!("program {} selected from panel", program);
        if let Err(err) = self
            .synth
            .program_select(OUTPUT_CHANNEL, self.bank, program)
        {
            warn!("program select {} failed: {}", program, err);
        }
        Some(program)
    }

    fn pressed(&mut self, button: PanelButton) -> bool {
        match self.panel.is_pressed(button) {
            Ok(pressed) => pressed,
            Err(err) => {
                warn!("reading {:?} failed: {}", button, err);
                false
            }
        }
    }
}

impl Subsystem for ButtonPoller {
    fn name(&self) -> &'static str {
        "buttons"
    }

    fn run(mut self: Box<Self>, shutdown: Shutdown) {
        loop {
            self.poll(Instant::now());
            if shutdown.wait_timeout(BUTTON_POLL_INTERVAL) {
                break;
            }
        }
    }
}
