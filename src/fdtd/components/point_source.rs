use crate::fdtd::{Axis, Source};

pub struct PointSourceDescriptor {
    pub row: usize,
    pub col: usize,
    pub amplitude: f32,
    /// Phase offset, in radians.
    pub phase: f32,
    pub axis: Axis,
}

/// A continuous sinusoidal source at a single cell.
pub struct PointSource {
    cell: [[usize; 2]; 1],
    amplitude: f32,
    phase: f32,
    axis: Axis,
}
impl PointSource {
    #[inline]
    pub fn new(desc: PointSourceDescriptor) -> Self {
        Self {
            cell: [[desc.row, desc.col]],
            amplitude: desc.amplitude,
            phase: desc.phase,
            axis: desc.axis,
        }
    }
}
impl Source for PointSource {
    fn axis(&self) -> Axis {
        self.axis
    }

    fn cells(&self) -> &[[usize; 2]] {
        &self.cell
    }

    #[inline]
    fn generate(&self, time: f32, omega: f32) -> f32 {
        self.amplitude * f32::sin(omega * time + self.phase)
    }
}
