use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use synthbox_ports::audio::AudioRenderCallback;
use synthbox_ports::synth::SynthPort;
use synthbox_ports::types::SampleTime;

const LIMIT: f32 = 0.98;
const ATTACK: f32 = 0.25;
const RELEASE: f32 = 0.01;

/// Pulls audio from the synth engine and keeps the output below full scale.
pub struct SynthRenderer {
    synth: Arc<dyn SynthPort>,
    limiter_gain: AtomicU32,
}

impl SynthRenderer {
    pub fn new(synth: Arc<dyn SynthPort>) -> Self {
        Self {
            synth,
            limiter_gain: AtomicU32::new(1.0_f32.to_bits()),
        }
    }

    pub fn limiter_gain(&self) -> f32 {
        f32::from_bits(self.limiter_gain.load(Ordering::Relaxed))
    }

    fn apply_limiter(&self, out_l: &mut [f32], out_r: &mut [f32]) {
        let peak = out_l
            .iter()
            .chain(out_r.iter())
            .fold(0.0_f32, |peak, sample| peak.max(sample.abs()));

        let target_gain = if peak > LIMIT { LIMIT / peak } else { 1.0 };
        let current_gain = self.limiter_gain();
        let coeff = if target_gain < current_gain {
            ATTACK
        } else {
            RELEASE
        };
        let new_gain = (current_gain + coeff * (target_gain - current_gain)).clamp(0.0, 1.0);
        self.limiter_gain
            .store(new_gain.to_bits(), Ordering::Relaxed);

        if new_gain < 0.999 {
            for value in out_l.iter_mut().chain(out_r.iter_mut()) {
                *value *= new_gain;
            }
        }
    }
}

impl AudioRenderCallback for SynthRenderer {
    fn render(&self, _sample_time_start: SampleTime, out_l: &mut [f32], out_r: &mut [f32]) {
        let frames = out_l.len().min(out_r.len());
        let (out_l, out_r) = (&mut out_l[..frames], &mut out_r[..frames]);
        self.synth.render(out_l, out_r);
        self.apply_limiter(out_l, out_r);
    }
}
