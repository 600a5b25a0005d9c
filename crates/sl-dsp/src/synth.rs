//! Block generator: sequencer → sawtooth → low-pass.

use alloc::sync::Arc;

use crate::config::SynthConfig;
use crate::control::ControlTargets;
use crate::filter::LowPass;
use crate::oscillator::Sawtooth;
use crate::sequencer::{Pattern, Sequencer};

/// Monophonic synth voice rendered one block at a time.
///
/// Owned by the generator thread. Control targets are shared through an
/// [`Arc<ControlTargets>`] so any thread can steer tuning and cutoff.
pub struct SynthEngine {
    sequencer: Sequencer,
    oscillator: Sawtooth,
    filter: LowPass,
    controls: Arc<ControlTargets>,
}

impl SynthEngine {
    /// Create an engine with its own control targets.
    ///
    /// `config` must pass [`SynthConfig::validate`].
    pub fn new(config: &SynthConfig) -> Self {
        Self::with_controls(config, Arc::new(ControlTargets::new()))
    }

    /// Create an engine that reads from existing control targets.
    pub fn with_controls(config: &SynthConfig, controls: Arc<ControlTargets>) -> Self {
        let pattern = Pattern::with_tempo(config.pattern, config.sample_rate, config.bpm);
        Self {
            sequencer: Sequencer::new(pattern),
            oscillator: Sawtooth::new(config.sample_rate, config.volume, config.initial_tuning),
            filter: LowPass::new(config.initial_cutoff),
            controls,
        }
    }

    /// Render `block.len()` samples in place.
    pub fn generate_block(&mut self, block: &mut [i16]) {
        let note = self.sequencer.tick(block.len());
        self.oscillator
            .tick(note, self.controls.tuning_target(), block);
        self.filter.tick(self.controls.cutoff_target(), block);
    }

    pub fn set_tuning(&self, delta: i32) {
        self.controls.set_tuning(delta);
    }

    pub fn set_cutoff(&self, delta: i32) {
        self.controls.set_cutoff(delta);
    }

    /// Handle for steering this engine from another thread.
    pub fn controls(&self) -> Arc<ControlTargets> {
        Arc::clone(&self.controls)
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn oscillator(&self) -> &Sawtooth {
        &self.oscillator
    }

    pub fn filter(&self) -> &LowPass {
        &self.filter
    }
}
