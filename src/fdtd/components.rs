//! Field sources.

mod point_source;
mod pulse_source;
mod line_source;

pub use point_source::{PointSource, PointSourceDescriptor};
pub use pulse_source::{PulseSource, PulseSourceDescriptor};
pub use line_source::{LineSource, LineSourceDescriptor, Orientation};
