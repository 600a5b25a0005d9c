//! Synthesis core for sawloop.
//!
//! A fixed eight-step sequencer drives a sawtooth oscillator whose output is
//! smoothed by a four-stage low-pass. Everything here runs on the generator
//! thread except [`ControlTargets`], which is written from any thread.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod config;
mod control;
mod filter;
mod oscillator;
mod sequencer;
mod synth;

pub use config::{ConfigError, SynthConfig, DEFAULT_PATTERN};
pub use control::{ControlCell, ControlTargets};
pub use filter::{LowPass, STAGES};
pub use oscillator::Sawtooth;
pub use sequencer::{Pattern, Sequencer, STEPS};
pub use synth::SynthEngine;
