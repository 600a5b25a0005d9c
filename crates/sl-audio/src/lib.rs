//! Audio output for sawloop.
//!
//! [`RingBuffer`] bridges the generator thread and the device callback;
//! [`OutputDevice`] is the seam to the OS audio subsystem.

mod cpal_backend;
#[cfg(any(test, feature = "test-util"))]
mod manual;
mod ring;
mod traits;

pub use cpal_backend::CpalDevice;
#[cfg(any(test, feature = "test-util"))]
pub use manual::ManualDevice;
pub use ring::{RingBuffer, SampleConsumer, SampleProducer, RING_BLOCKS};
pub use traits::{AudioError, DeviceSpec, OutputDevice, RenderCallback};
