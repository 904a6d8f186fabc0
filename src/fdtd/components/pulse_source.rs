use crate::fdtd::{Axis, Source};

pub struct PulseSourceDescriptor {
    pub row: usize,
    pub col: usize,
    pub amplitude: f32,
    /// Time at which the envelope peaks.
    pub delay: f32,
    /// Duration over which the envelope falls by a factor of e.
    pub width: f32,
    pub axis: Axis,
}

/// A single Gaussian-enveloped burst at one cell.
pub struct PulseSource {
    cell: [[usize; 2]; 1],
    amplitude: f32,
    delay: f32,
    width: f32,
    axis: Axis,
}
impl PulseSource {
    #[inline]
    pub fn new(desc: PulseSourceDescriptor) -> Self {
        Self {
            cell: [[desc.row, desc.col]],
            amplitude: desc.amplitude,
            delay: desc.delay,
            width: desc.width,
            axis: desc.axis,
        }
    }

    fn envelope(&self, time: f32) -> f32 {
        let x = (time - self.delay) / self.width;
        f32::exp(-x * x)
    }
}
impl Source for PulseSource {
    fn axis(&self) -> Axis {
        self.axis
    }

    fn cells(&self) -> &[[usize; 2]] {
        &self.cell
    }

    #[inline]
    fn generate(&self, time: f32, omega: f32) -> f32 {
        self.amplitude * self.envelope(time) * f32::sin(omega * (time - self.delay))
    }
}
