//! Engine configuration.

use crate::sequencer::STEPS;

/// A-minor-ish arpeggio, in Hz. `0.0` is a rest.
pub const DEFAULT_PATTERN: [f32; STEPS] = [440.0, 0.0, 698.5, 400.0, 554.4, 698.5, 830.6, 554.4];

/// Error returned by [`SynthConfig::validate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("sample rate must be non-zero")]
    ZeroSampleRate,
    #[error("block size must be non-zero")]
    ZeroBlockSize,
    #[error("tempo must be non-zero")]
    ZeroTempo,
    /// Tempo is so fast that a beat is shorter than one sample.
    #[error("tempo {bpm} bpm is too fast for {sample_rate} Hz")]
    TempoTooFast { bpm: u32, sample_rate: u32 },
}

/// Everything fixed at engine construction.
#[derive(Clone, Debug, PartialEq)]
pub struct SynthConfig {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Samples generated per block and requested per device callback.
    pub block_size: usize,
    /// Sequencer tempo in steps per minute.
    pub bpm: u32,
    /// Step frequencies in Hz.
    pub pattern: [f32; STEPS],
    /// Oscillator gain applied before scaling to 16-bit.
    pub volume: f32,
    /// Starting tuning multiplier.
    pub initial_tuning: f32,
    /// Starting filter coefficient in `[0, 1]`.
    pub initial_cutoff: f32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            block_size: 1024,
            bpm: 138 * 4,
            pattern: DEFAULT_PATTERN,
            volume: 0.25,
            initial_tuning: 1.0,
            initial_cutoff: 0.5,
        }
    }
}

impl SynthConfig {
    /// Check that the sequencer and ring buffer can be built from this config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        if self.bpm == 0 {
            return Err(ConfigError::ZeroTempo);
        }
        if self.beat_length() == 0 {
            return Err(ConfigError::TempoTooFast {
                bpm: self.bpm,
                sample_rate: self.sample_rate,
            });
        }
        Ok(())
    }

    /// Samples per step, truncated to an integer.
    pub fn beat_length(&self) -> usize {
        if self.bpm == 0 {
            return 0;
        }
        (60 * self.sample_rate as u64 / self.bpm as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SynthConfig::default().validate(), Ok(()));
    }

    #[test]
    fn default_beat_length_truncates() {
        // 60 * 44100 / 552 = 4793.47...
        assert_eq!(SynthConfig::default().beat_length(), 4793);
    }

    #[test]
    fn zero_fields_are_rejected() {
        let base = SynthConfig::default();
        let cfg = SynthConfig { sample_rate: 0, ..base.clone() };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroSampleRate));
        let cfg = SynthConfig { block_size: 0, ..base.clone() };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroBlockSize));
        let cfg = SynthConfig { bpm: 0, ..base };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTempo));
    }

    #[test]
    fn sub_sample_beats_are_rejected() {
        let cfg = SynthConfig {
            sample_rate: 100,
            bpm: 10_000,
            ..SynthConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::TempoTooFast { bpm: 10_000, sample_rate: 100 })
        );
    }
}
