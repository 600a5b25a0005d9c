//! Fixed-pattern step sequencer.

/// Number of steps in a pattern.
pub const STEPS: usize = 8;

/// Eight step frequencies plus the tempo they play at.
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    steps: [f32; STEPS],
    beat_length: usize,
}

impl Pattern {
    /// Build a pattern. `beat_length` is in samples and must be non-zero.
    pub fn new(steps: [f32; STEPS], beat_length: usize) -> Self {
        assert!(beat_length > 0, "beat length must be at least one sample");
        Self { steps, beat_length }
    }

    /// Build a pattern from a tempo: `beat_length = 60 * sample_rate / bpm`.
    pub fn with_tempo(steps: [f32; STEPS], sample_rate: u32, bpm: u32) -> Self {
        let beat_length = if bpm == 0 {
            0
        } else {
            (60 * sample_rate as u64 / bpm as u64) as usize
        };
        Self::new(steps, beat_length)
    }

    pub fn beat_length(&self) -> usize {
        self.beat_length
    }

    /// Samples in one full pass over the pattern.
    pub fn period(&self) -> usize {
        self.beat_length * STEPS
    }

    /// Step frequency at a sample position inside the pattern.
    pub fn note_at(&self, sample: usize) -> f32 {
        self.steps[(sample / self.beat_length) % STEPS]
    }
}

/// Loops a [`Pattern`] forever, one block at a time.
///
/// The note for a block is whatever is playing at its first sample; a step
/// change inside a block takes effect on the next block.
#[derive(Clone, Debug)]
pub struct Sequencer {
    pattern: Pattern,
    /// Always in `[0, pattern.period())`.
    sample: usize,
}

impl Sequencer {
    pub fn new(pattern: Pattern) -> Self {
        Self { pattern, sample: 0 }
    }

    /// Return the note at the current position, then advance by `count`.
    pub fn tick(&mut self, count: usize) -> f32 {
        let note = self.pattern.note_at(self.sample);
        let period = self.pattern.period();
        self.sample = (self.sample + count % period) % period;
        note
    }

    /// Current position in samples.
    pub fn position(&self) -> usize {
        self.sample
    }

    /// Rewind to the first step.
    pub fn reset(&mut self) {
        self.sample = 0;
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }
}
