//! Sensor-side pipeline: sampling thread, smoother, and the shared slot the
//! simulation tick reads from.
//!
//! ```text
//! PositionSensor ─► CameraMapping ─► PositionSmoother ─► SharedTrackingState ─► Session::tick
//!        └──────────── sampling thread ────────────────┘      (any thread reads)
//! ```

pub mod sampler;
pub mod sensors;
pub mod shared;
pub mod smoother;

pub use sampler::{CameraMapping, PositionSensor, SamplerSettings, SamplingLoop, SensorReading};
pub use sensors::{CursorSensor, ScriptedSensor};
pub use shared::{CursorFeed, Mailbox, SharedSlot, SharedTrackingState};
pub use smoother::{PositionSmoother, RawSample, SmoothedTarget, SmootherSettings};
