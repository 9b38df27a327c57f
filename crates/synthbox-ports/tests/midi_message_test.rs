use synthbox_ports::midi::MidiMessage;

#[test]
fn splits_status_into_kind_and_channel() {
    let message = MidiMessage::from_bytes(&[0x9C, 60, 100]).expect("three bytes");
    assert_eq!(message.kind(), 0x9);
    assert_eq!(message.channel(), 0xC);
    assert_eq!(message.data1(), Some(60));
    assert_eq!(message.data2(), Some(100));
}

#[test]
fn short_messages_have_absent_data_bytes() {
    let message = MidiMessage::from_bytes(&[0xC0, 5]).expect("two bytes");
    assert_eq!(message.data1(), Some(5));
    assert_eq!(message.data2(), None);
    assert_eq!(message.as_bytes(), &[0xC0, 5]);

    let status_only = MidiMessage::from_bytes(&[0xF8]).expect("one byte");
    assert_eq!(status_only.data1(), None);
}

#[test]
fn empty_and_long_messages_are_rejected() {
    assert!(MidiMessage::from_bytes(&[]).is_none());
    assert!(MidiMessage::from_bytes(&[0xF0, 1, 2, 0xF7]).is_none());
}
