use crate::program::CurrentProgram;
use std::sync::Arc;
use synthbox_ports::midi::{
    MidiMessage, MidiMessageCallback, TimedMidiMessage, CONTROL_CHANGE, NOTE_OFF, NOTE_ON,
    PROGRAM_CHANGE,
};
use synthbox_ports::synth::{SynthError, SynthPort};
use synthbox_ports::types::ChannelFilter;
use tracing::{debug, warn};

/// Every engine call goes to this channel; the incoming channel is only used for filtering.
pub const OUTPUT_CHANNEL: u8 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SynthAction {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
    ProgramChange { program: u8 },
    ControlChange { controller: u8, value: u8 },
}

/// Turns raw MIDI messages into synth engine calls.
pub struct Dispatcher {
    synth: Arc<dyn SynthPort>,
    program: Arc<CurrentProgram>,
    filter: ChannelFilter,
}

impl Dispatcher {
    pub fn new(
        synth: Arc<dyn SynthPort>,
        program: Arc<CurrentProgram>,
        filter: ChannelFilter,
    ) -> Self {
        Self {
            synth,
            program,
            filter,
        }
    }

    pub fn filter(&self) -> ChannelFilter {
        self.filter
    }

    /// Pure classification: which engine call (if any) this message maps to.
    pub fn classify(&self, message: &MidiMessage) -> Option<SynthAction> {
        if !self.filter.accepts(message.channel()) {
            return None;
        }

        let note = data_byte(message.data1());
        let velocity = data_byte(message.data2());

        match message.kind() {
            NOTE_ON => match (note?, velocity?) {
                (note, 0) => Some(SynthAction::NoteOff { note }),
                (note, velocity) => Some(SynthAction::NoteOn { note, velocity }),
            },
            NOTE_OFF => Some(SynthAction::NoteOff { note: note? }),
            PROGRAM_CHANGE => Some(SynthAction::ProgramChange { program: note? }),
            CONTROL_CHANGE => Some(SynthAction::ControlChange {
                controller: note?,
                value: velocity?,
            }),
            _ => None,
        }
    }

    /// Classifies and applies a message. Engine failures are logged, never propagated.
    pub fn dispatch(&self, message: &MidiMessage) -> Option<SynthAction> {
        debug!(
            "type: {:X} channel: {} note: {:?} velocity: {:?}",
            message.kind(),
            message.channel(),
            message.data1(),
            message.data2()
        );

        let action = self.classify(message)?;
        if let Err(err) = self.apply(action) {
            warn!("synth rejected {:?}: {}", action, err);
        }
        Some(action)
    }

    /// Callback suitable for attaching to every input port.
    pub fn callback(self: &Arc<Self>) -> MidiMessageCallback {
        let dispatcher = Arc::clone(self);
        Arc::new(move |timed: TimedMidiMessage| {
            dispatcher.dispatch(&timed.message);
        })
    }

    fn apply(&self, action: SynthAction) -> Result<(), SynthError> {
        match action {
            SynthAction::NoteOn { note, velocity } => {
                self.synth.note_on(OUTPUT_CHANNEL, note, velocity)
            }
            SynthAction::NoteOff { note } => self.synth.note_off(OUTPUT_CHANNEL, note),
            SynthAction::ProgramChange { program } => {
                self.program.set(program);
                self.synth.program_change(OUTPUT_CHANNEL, program)
            }
            SynthAction::ControlChange { controller, value } => {
                self.synth.control_change(OUTPUT_CHANNEL, controller, value)
            }
        }
    }
}

// A byte with the high bit set in a data position means the framing is broken.
fn data_byte(byte: Option<u8>) -> Option<u8> {
    byte.filter(|b| *b < 0x80)
}
