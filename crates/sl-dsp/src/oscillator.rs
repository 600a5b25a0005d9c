//! Naive (non-band-limited) sawtooth oscillator.

const MIN_TUNING: f32 = 0.1;
const MAX_TUNING: f32 = 1000.0;
const MIN_FREQ: f32 = 10.0;
const MAX_FREQ: f32 = 10000.0;

/// Bipolar ramp in `(-1, 1]`, scaled by `volume` into 16-bit samples.
///
/// Phase carries over between blocks. On a rest (`note == 0.0`) the phase
/// stops moving and the last value is held for the whole block.
#[derive(Clone, Debug)]
pub struct Sawtooth {
    sample_rate: u32,
    volume: f32,
    /// Smoothed multiplier, clamped to `[0.1, 1000]`.
    tuning: f32,
    /// Phase for the next sample.
    last: f32,
}

impl Sawtooth {
    pub fn new(sample_rate: u32, volume: f32, tuning: f32) -> Self {
        Self {
            sample_rate,
            volume,
            tuning: tuning.clamp(MIN_TUNING, MAX_TUNING),
            last: 0.0,
        }
    }

    /// Fill `out` with one block at `note` Hz, gliding tuning by `tuning_target`.
    pub fn tick(&mut self, note: f32, tuning_target: f32, out: &mut [i16]) {
        let mut value = self.last;
        let mut delta = 0.0;
        if note != 0.0 {
            self.tuning = (self.tuning * tuning_target).clamp(MIN_TUNING, MAX_TUNING);
            let freq = (self.tuning * note).clamp(MIN_FREQ, MAX_FREQ);
            let period = self.sample_rate as f32 / freq;
            delta = 2.0 / period;
            value = wrap(self.last + delta);
        }

        let scale = self.volume * i16::MAX as f32;
        for sample in out.iter_mut() {
            *sample = (value * scale) as i16;
            value = wrap(value + delta);
        }
        self.last = value;
    }

    pub fn tuning(&self) -> f32 {
        self.tuning
    }

    pub fn phase(&self) -> f32 {
        self.last
    }
}

#[inline]
fn wrap(value: f32) -> f32 {
    if value > 1.0 {
        value - 2.0
    } else {
        value
    }
}
