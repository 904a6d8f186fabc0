use crate::fdtd::{Axis, Source};

/// Direction in which a `LineSource` extends from its start cell.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Orientation {
    /// Along a row, toward increasing columns.
    Horizontal,
    /// Along a column, toward increasing rows.
    Vertical,
}

pub struct LineSourceDescriptor {
    pub row: usize,
    pub col: usize,
    /// Number of driven cells.
    pub length: usize,
    pub orientation: Orientation,
    pub amplitude: f32,
    pub axis: Axis,
}

/// A continuous sinusoidal source driving a straight run of cells in phase,
/// which launches an approximately plane wave.
pub struct LineSource {
    cells: Vec<[usize; 2]>,
    amplitude: f32,
    axis: Axis,
}
impl LineSource {
    pub fn new(desc: LineSourceDescriptor) -> Self {
        Self {
            cells: (0..desc.length)
                .map(|n| match desc.orientation {
                    Orientation::Horizontal => [desc.row, desc.col + n],
                    Orientation::Vertical => [desc.row + n, desc.col],
                })
                .collect::<Vec<_>>(),
            amplitude: desc.amplitude,
            axis: desc.axis,
        }
    }
}
impl Source for LineSource {
    fn axis(&self) -> Axis {
        self.axis
    }

    fn cells(&self) -> &[[usize; 2]] {
        &self.cells
    }

    #[inline]
    fn generate(&self, time: f32, omega: f32) -> f32 {
        self.amplitude * f32::sin(omega * time)
    }
}
