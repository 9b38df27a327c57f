mod common;

use common::{RecordingSynth, SynthCall};
use proptest::prelude::*;
use std::sync::Arc;
use synthbox_core::{CurrentProgram, Dispatcher};
use synthbox_ports::midi::MidiMessage;
use synthbox_ports::types::ChannelFilter;

fn run(filter: ChannelFilter, bytes: &[u8]) -> (Vec<SynthCall>, u8) {
    let synth = RecordingSynth::new();
    let program = Arc::new(CurrentProgram::new(0));
    let dispatcher = Dispatcher::new(synth.clone(), program.clone(), filter);
    let message = MidiMessage::from_bytes(bytes).expect("valid length");
    dispatcher.dispatch(&message);
    (synth.calls(), program.get())
}

proptest! {
    #[test]
    fn note_on_with_velocity_calls_note_on(ch in 0u8..16, note in 0u8..128, vel in 1u8..128) {
        let (calls, _) = run(ChannelFilter::ALL, &[0x90 | ch, note, vel]);
        prop_assert_eq!(calls, vec![SynthCall::NoteOn(0, note, vel)]);
    }

    #[test]
    fn note_on_without_velocity_calls_note_off(ch in 0u8..16, note in 0u8..128) {
        let (calls, _) = run(ChannelFilter::ALL, &[0x90 | ch, note, 0]);
        prop_assert_eq!(calls, vec![SynthCall::NoteOff(0, note)]);
    }

    #[test]
    fn note_off_calls_note_off(ch in 0u8..16, note in 0u8..128, vel in 0u8..128) {
        let (calls, _) = run(ChannelFilter::ALL, &[0x80 | ch, note, vel]);
        prop_assert_eq!(calls, vec![SynthCall::NoteOff(0, note)]);
    }

    #[test]
    fn program_change_sets_program(ch in 0u8..16, prog in 0u8..128, extra in any::<u8>()) {
        let (calls, current) = run(ChannelFilter::ALL, &[0xC0 | ch, prog, extra]);
        prop_assert_eq!(current, prog);
        prop_assert_eq!(calls, vec![SynthCall::ProgramChange(0, prog)]);
    }

    #[test]
    fn control_change_calls_control_change(ch in 0u8..16, cc in 0u8..128, value in 0u8..128) {
        let (calls, _) = run(ChannelFilter::ALL, &[0xB0 | ch, cc, value]);
        prop_assert_eq!(calls, vec![SynthCall::ControlChange(0, cc, value)]);
    }

    #[test]
    fn other_channels_are_filtered(
        filter in 0u8..16,
        ch in 0u8..16,
        kind in prop::sample::select(vec![0x80u8, 0x90, 0xB0, 0xC0]),
        d1 in 0u8..128,
        d2 in 0u8..128,
    ) {
        prop_assume!(filter != ch);
        let (calls, current) = run(ChannelFilter::only(filter), &[kind | ch, d1, d2]);
        prop_assert!(calls.is_empty());
        prop_assert_eq!(current, 0);
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 1..=3)) {
        let (calls, _) = run(ChannelFilter::ALL, &bytes);
        prop_assert!(calls.len() <= 1);
    }
}
