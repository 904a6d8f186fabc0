pub mod components;

mod fdtd_solver;

pub use fdtd_solver::{FdtdSolver, FdtdSolverDescriptor};

/// A component of the electric field.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Channel index of this component in a field array.
    pub fn channel(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Drives a soft current into the electric field at a fixed set of cells.
pub trait Source {
    /// The electric field component the source drives.
    fn axis(&self) -> Axis;
    /// `[row, col]` of every driven cell.
    fn cells(&self) -> &[[usize; 2]];
    /// Current density emitted at `time` for the angular frequency `omega`.
    fn generate(&self, time: f32, omega: f32) -> f32;
}
