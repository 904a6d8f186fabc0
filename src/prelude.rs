//! Includes commonly used library components.

pub use crate::{
    GridDescriptor,
    GridState,
    MaterialDescriptor,
    RunDescriptor,
    SaveSettings,
    SaveType,
    Settings,
    Simulation,
    SimulationDescriptor,
    SimulationParameters,
    Solver,
    StepDescriptor,
};
pub use crate::fdtd::{Axis, Source};
