//! Four-stage cascaded one-pole low-pass.

/// Number of cascaded one-pole stages.
pub const STAGES: usize = 4;

/// Each stage runs `y = x * c + y * (1 - c)` over the whole block before the
/// next stage sees it. The coefficient `c` is smoothed once per block.
#[derive(Clone, Debug)]
pub struct LowPass {
    /// Smoothed coefficient in `[0, 1]`; `1.0` passes the input through.
    coefficient: f32,
    /// Per-stage state, always within the `i16` range.
    stages: [f32; STAGES],
}

impl LowPass {
    pub fn new(coefficient: f32) -> Self {
        Self {
            coefficient: coefficient.clamp(0.0, 1.0),
            stages: [0.0; STAGES],
        }
    }

    /// Glide the coefficient by `cutoff_target`, then filter `block` in place.
    pub fn tick(&mut self, cutoff_target: f32, block: &mut [i16]) {
        self.coefficient = (self.coefficient * cutoff_target).clamp(0.0, 1.0);
        let c = self.coefficient;
        let keep = 1.0 - c;

        for state in self.stages.iter_mut() {
            let mut y = *state;
            for sample in block.iter_mut() {
                y = (*sample as f32 * c + y * keep).clamp(i16::MIN as f32, i16::MAX as f32);
                *sample = y as i16;
            }
            *state = y;
        }
    }

    pub fn coefficient(&self) -> f32 {
        self.coefficient
    }

    pub fn stages(&self) -> &[f32; STAGES] {
        &self.stages
    }
}
