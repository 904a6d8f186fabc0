//! A framework for simulating 2-dimensional electromagnetic wave propagation.
//!
//! Fields live on a Yee grid surrounded by an absorbing border, and are advanced
//! with a leapfrog FDTD update. To get started, refer to the `demos` directory.
//!
//! Diagnostics are emitted as `tracing` events (grid creation, frame progress,
//! Courant warnings). The library installs no subscriber; hosts that want to
//! see them register one of their own.

mod grid;
mod simulation;

pub mod fdtd;
pub mod prelude;

pub use grid::{GridDescriptor, GridState, MaterialDescriptor};
pub use simulation::{
    RunDescriptor, SaveSettings, SaveType, Settings, Simulation, SimulationDescriptor,
    SimulationParameters, SUBSTEPS,
};

/// Represents an error in the simulation.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("{field} must be positive and finite \
        ( value: {value} at row {row}, col {col} )")]
    BadMaterial {
        field: &'static str,
        value: f32,
        row: usize,
        col: usize,
    },
    #[error("Source cell ( row {row}, col {col} ) lies outside the \
        {rows}x{cols} grid")]
    SourceOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error(transparent)]
    H5Error(#[from] hdf5::Error),
}

/// Advances the fields of a `GridState`.
pub trait Solver {
    /// Performs one sub-step of duration `desc.delta_t`, ending at `desc.time`.
    ///
    /// `check_bounds` must have accepted the grid's extents beforehand;
    /// `Simulation::new` does this for you.
    fn step(&self, grid: &mut GridState, desc: StepDescriptor);

    /// Verifies that everything the solver writes to fits in a grid of the given size.
    fn check_bounds(&self, rows: usize, cols: usize) -> Result<(), Error>;
}

/// Describes a single sub-step for a `Solver`.
#[derive(Copy, Clone, Debug)]
pub struct StepDescriptor {
    /// Size of a grid cell.
    pub delta_x: f32,
    /// Duration of the sub-step.
    pub delta_t: f32,
    /// Absolute simulation time at the end of the sub-step.
    pub time: f32,
    /// Angular frequency driving any sources.
    pub omega: f32,
}
