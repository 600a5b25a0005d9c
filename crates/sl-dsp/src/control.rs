//! Lock-free control targets shared with the input thread.

use core::sync::atomic::{AtomicU32, Ordering};

/// An `f32` stored as raw bits in an `AtomicU32`.
///
/// Loads and stores are `Relaxed`: the value only steers a smoothing glide,
/// so a reader seeing it one block late is harmless.
#[derive(Debug)]
pub struct ControlCell(AtomicU32);

impl ControlCell {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Per-block multipliers applied to the oscillator tuning and filter
/// coefficient. `1.0` means hold.
#[derive(Debug)]
pub struct ControlTargets {
    tuning: ControlCell,
    cutoff: ControlCell,
}

impl ControlTargets {
    pub fn new() -> Self {
        Self {
            tuning: ControlCell::new(1.0),
            cutoff: ControlCell::new(1.0),
        }
    }

    /// Glide the tuning up (`+1`), down (`-1`) or hold it (`0`).
    pub fn set_tuning(&self, delta: i32) {
        self.tuning.set(delta_to_multiplier(delta));
    }

    /// Glide the filter coefficient up (`+1`), down (`-1`) or hold it (`0`).
    pub fn set_cutoff(&self, delta: i32) {
        self.cutoff.set(delta_to_multiplier(delta));
    }

    pub fn tuning_target(&self) -> f32 {
        self.tuning.get()
    }

    pub fn cutoff_target(&self) -> f32 {
        self.cutoff.get()
    }
}

impl Default for ControlTargets {
    fn default() -> Self {
        Self::new()
    }
}

fn delta_to_multiplier(delta: i32) -> f32 {
    (1.0 + 0.01 * delta as f64) as f32
}
