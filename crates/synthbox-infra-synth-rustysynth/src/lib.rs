use parking_lot::Mutex;
use rustysynth::{SoundFont, Synthesizer, SynthesizerSettings};
use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use synthbox_ports::synth::{SoundFontInfo, SynthError, SynthPort};
use synthbox_ports::types::Volume01;

const CONTROL_CHANGE: i32 = 0xB0;
const PROGRAM_CHANGE: i32 = 0xC0;
const BANK_SELECT_MSB: u8 = 0x00;

/// SoundFont wavetable engine. One synthesizer, serialized behind a mutex.
pub struct RustySynth {
    sample_rate_hz: AtomicU32,
    master_volume: AtomicU32,
    sound_font: Mutex<Option<Arc<SoundFont>>>,
    synth: Mutex<Option<Synthesizer>>,
}

impl Default for RustySynth {
    fn default() -> Self {
        Self::new(48_000)
    }
}

impl RustySynth {
    pub fn new(sample_rate_hz: u32) -> Self {
        Self {
            sample_rate_hz: AtomicU32::new(sample_rate_hz),
            master_volume: AtomicU32::new(1.0_f32.to_bits()),
            sound_font: Mutex::new(None),
            synth: Mutex::new(None),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.synth.lock().is_some()
    }

    fn master_volume(&self) -> f32 {
        f32::from_bits(self.master_volume.load(Ordering::Relaxed))
    }

    fn rebuild_synthesizer(&self, sound_font: Arc<SoundFont>) -> Result<(), SynthError> {
        let sample_rate_hz = self.sample_rate_hz.load(Ordering::Relaxed) as i32;
        let settings = SynthesizerSettings::new(sample_rate_hz);
        let mut synth = Synthesizer::new(&sound_font, &settings)
            .map_err(|e| SynthError::Backend(e.to_string()))?;
        synth.set_master_volume(self.master_volume());
        *self.synth.lock() = Some(synth);
        Ok(())
    }

    fn with_synth<T>(&self, f: impl FnOnce(&mut Synthesizer) -> T) -> Result<T, SynthError> {
        let mut guard = self.synth.lock();
        let synth = guard.as_mut().ok_or(SynthError::NoSoundFont)?;
        Ok(f(synth))
    }

    fn message(&self, channel: u8, command: i32, data1: u8, data2: u8) -> Result<(), SynthError> {
        self.with_synth(|synth| {
            synth.process_midi_message(channel as i32, command, data1 as i32, data2 as i32)
        })
    }
}

impl SynthPort for RustySynth {
    fn load_soundfont_from_path(&self, path: &str) -> Result<SoundFontInfo, SynthError> {
        let mut file = File::open(path).map_err(|e| SynthError::SoundFontLoad(e.to_string()))?;
        let sound_font = Arc::new(
            SoundFont::new(&mut file).map_err(|e| SynthError::SoundFontLoad(e.to_string()))?,
        );

        let name = sound_font.get_info().get_bank_name().trim().to_string();
        let name = if name.is_empty() {
            Path::new(path)
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("SoundFont")
                .to_string()
        } else {
            name
        };
        let preset_count = sound_font.get_presets().len();

        *self.sound_font.lock() = Some(sound_font.clone());
        self.rebuild_synthesizer(sound_font)?;

        Ok(SoundFontInfo { name, preset_count })
    }

    fn set_sample_rate(&self, sample_rate_hz: u32) {
        if self.sample_rate_hz.swap(sample_rate_hz, Ordering::Relaxed) == sample_rate_hz {
            return;
        }
        let sound_font = self.sound_font.lock().clone();
        if let Some(sound_font) = sound_font {
            let _ = self.rebuild_synthesizer(sound_font);
        }
    }

    fn set_master_volume(&self, volume: Volume01) {
        self.master_volume
            .store(volume.get().to_bits(), Ordering::Relaxed);
        let _ = self.with_synth(|synth| synth.set_master_volume(volume.get()));
    }

    fn note_on(&self, channel: u8, note: u8, velocity: u8) -> Result<(), SynthError> {
        self.with_synth(|synth| synth.note_on(channel as i32, note as i32, velocity as i32))
    }

    fn note_off(&self, channel: u8, note: u8) -> Result<(), SynthError> {
        self.with_synth(|synth| synth.note_off(channel as i32, note as i32))
    }

    fn program_change(&self, channel: u8, program: u8) -> Result<(), SynthError> {
        self.message(channel, PROGRAM_CHANGE, program, 0)
    }

    fn control_change(&self, channel: u8, controller: u8, value: u8) -> Result<(), SynthError> {
        self.message(channel, CONTROL_CHANGE, controller, value)
    }

    fn bank_select(&self, channel: u8, bank: u8) -> Result<(), SynthError> {
        self.message(channel, CONTROL_CHANGE, BANK_SELECT_MSB, bank)
    }

    fn program_select(&self, channel: u8, bank: u8, program: u8) -> Result<(), SynthError> {
        self.bank_select(channel, bank)?;
        self.program_change(channel, program)
    }

    fn render(&self, out_l: &mut [f32], out_r: &mut [f32]) {
        out_l.fill(0.0);
        out_r.fill(0.0);

        // never block the audio thread on an event burst
        if let Some(mut guard) = self.synth.try_lock() {
            if let Some(synth) = guard.as_mut() {
                let frames = out_l.len().min(out_r.len());
                synth.render(&mut out_l[..frames], &mut out_r[..frames]);
            }
        }
    }
}
