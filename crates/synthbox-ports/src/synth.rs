use crate::types::Volume01;

#[derive(thiserror::Error, Debug)]
pub enum SynthError {
    #[error("soundfont load failed: {0}")]
    SoundFontLoad(String),
    #[error("no soundfont loaded")]
    NoSoundFont,
    #[error("backend error: {0}")]
    Backend(String),
}

#[derive(Clone, Debug)]
pub struct SoundFontInfo {
    pub name: String,
    pub preset_count: usize,
}

/// Thread model:
/// - event methods are called from MIDI callback threads and auxiliary input loops concurrently
/// - render is called from the audio thread (must not block)
pub trait SynthPort: Send + Sync {
    fn load_soundfont_from_path(&self, path: &str) -> Result<SoundFontInfo, SynthError>;
    fn set_sample_rate(&self, sample_rate_hz: u32);
    fn set_master_volume(&self, volume: Volume01);

    fn note_on(&self, channel: u8, note: u8, velocity: u8) -> Result<(), SynthError>;
    fn note_off(&self, channel: u8, note: u8) -> Result<(), SynthError>;
    fn program_change(&self, channel: u8, program: u8) -> Result<(), SynthError>;
    fn control_change(&self, channel: u8, controller: u8, value: u8) -> Result<(), SynthError>;

    /// Out-of-band selection used at startup and by the front panel.
    fn bank_select(&self, channel: u8, bank: u8) -> Result<(), SynthError>;
    fn program_select(&self, channel: u8, bank: u8, program: u8) -> Result<(), SynthError>;

    /// Called by audio thread: render frames to out_l/out_r
    fn render(&self, out_l: &mut [f32], out_r: &mut [f32]);
}
