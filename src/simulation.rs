use std::f32::consts::{FRAC_1_SQRT_2, PI};
use std::path::Path;

use ndarray::{Axis, s};

use crate::{Error, GridDescriptor, GridState, Solver, StepDescriptor};

/// Number of solver sub-steps taken per `Simulation::update`.
pub const SUBSTEPS: usize = 5;

/// Largest time step ever used by `Simulation::update`.
const MAX_TIME_STEP: f32 = 0.5;

/// Simulation specific parameters.
#[derive(Copy, Clone, Debug)]
pub struct SimulationParameters {
    /// The physical size of each grid cell.
    pub delta_x: f32,
    /// The length of each temporal step in the simulation.
    pub delta_t: f32,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            delta_x: 1.0,
            delta_t: 0.3,
        }
    }
}

impl SimulationParameters {
    /// Ratio of the distance light travels in one step to the cell size.
    pub fn courant_number(&self) -> f32 {
        self.delta_t / self.delta_x
    }

    /// Whether the parameters satisfy the 2-dimensional Courant condition in vacuum.
    pub fn is_stable(&self) -> bool {
        self.courant_number() <= FRAC_1_SQRT_2
    }

    fn validate(&self) -> Result<(), Error> {
        if !(self.delta_t.is_finite() && self.delta_t > 0.0) {
            return Err(Error::Configuration(format!(
                "time step must be positive ( delta_t: {} )",
                self.delta_t,
            )));
        }
        // delta_x is checked along with the grid
        Ok(())
    }
}

/// Per-update settings chosen by the host.
#[derive(Copy, Clone, Debug)]
pub struct Settings {
    wavelength: f32,
}

impl Settings {
    pub fn new(wavelength: f32) -> Result<Self, Error> {
        if !(wavelength.is_finite() && wavelength > 0.0) {
            return Err(Error::Configuration(format!(
                "wavelength must be positive ( wavelength: {} )",
                wavelength,
            )));
        }
        Ok(Self { wavelength })
    }

    pub fn wavelength(&self) -> f32 {
        self.wavelength
    }

    /// Angular frequency of the sources.
    pub fn omega(&self) -> f32 {
        2.0 * PI / self.wavelength
    }

    /// Sub-step length, shortened for short wavelengths.
    pub fn time_step(&self) -> f32 {
        MAX_TIME_STEP.min(self.wavelength / 10.0)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self { wavelength: 10.0 }
    }
}

/// Describes a simulation.
pub struct SimulationDescriptor<S: Solver> {
    /// The `Solver` for the simulation.
    pub solver: S,
    /// The parameters for the simulation.
    pub sim_params: SimulationParameters,
    /// The grid that the simulation starts with.
    pub grid: GridState,
}

/// Describes a simulation run.
pub struct RunDescriptor<P: AsRef<Path>> {
    /// How many frames, each of `SUBSTEPS` sub-steps, to run.
    pub frames: usize,
    /// The settings used for every frame.
    pub settings: Settings,
    /// Whether or not to print information to the console.
    pub verbose: bool,
    /// What, if any, information to save to file.
    pub save_settings: Option<SaveSettings<P>>,
}

/// How data should be saved to file.
#[derive(Debug)]
pub struct SaveSettings<P: AsRef<Path>> {
    /// The path to the save file.
    pub filename: P,
    /// What information to save.
    pub save_type: SaveType,
    /// Whether or not to overwrite any possible saved data.
    pub overwrite: bool,
}

/// Represents what data to save.
#[derive(PartialEq, Debug)]
pub enum SaveType {
    /// Save the electric and magnetic fields after every frame.
    Full,
    /// Save the fields and accumulators after the last frame only.
    End,
}

/// The main `struct` of the framework.
pub struct Simulation<S: Solver> {
    solver: S,
    sim_params: SimulationParameters,
    state: GridState,
}

impl<S: Solver> Simulation<S> {
    /// Creates a new `Simulation` instance.
    #[inline]
    pub fn new(desc: SimulationDescriptor<S>) -> Result<Self, Error> {
        desc.sim_params.validate()?;
        if desc.sim_params.delta_x != desc.grid.delta_x() {
            return Err(Error::Configuration(format!(
                "spatial step ( {} ) does not match the grid ( {} )",
                desc.sim_params.delta_x,
                desc.grid.delta_x(),
            )));
        }
        let (rows, cols) = desc.grid.dim();
        desc.solver.check_bounds(rows, cols)?;

        Ok(Self {
            solver: desc.solver,
            sim_params: desc.sim_params,
            state: desc.grid,
        })
    }

    /// Creates a vacuum simulation sized for a `pixel_width` by `pixel_height` view.
    ///
    /// `delta_x` and `delta_t` default to 1 and 0.3.
    pub fn create(
        pixel_width: usize,
        pixel_height: usize,
        border_size: usize,
        delta_x: Option<f32>,
        delta_t: Option<f32>,
        solver: S,
    ) -> Result<Self, Error> {
        let defaults = SimulationParameters::default();
        let sim_params = SimulationParameters {
            delta_x: delta_x.unwrap_or(defaults.delta_x),
            delta_t: delta_t.unwrap_or(defaults.delta_t),
        };
        // reject a bad time step before allocating the grid
        sim_params.validate()?;

        let grid = GridState::new(GridDescriptor {
            pixel_width,
            pixel_height,
            border_size,
            delta_x: sim_params.delta_x,
        })?;

        Self::new(SimulationDescriptor {
            solver,
            sim_params,
            grid,
        })
    }

    /// Advances the grid by one frame of `SUBSTEPS` sub-steps.
    pub fn update(&mut self, settings: &Settings) {
        let delta_t = settings.time_step();
        let omega = settings.omega();

        let params = SimulationParameters { delta_t, ..self.sim_params };
        if !params.is_stable() {
            tracing::warn!(
                courant = params.courant_number(),
                "time step exceeds the Courant limit; fields may diverge"
            );
        }

        for _ in 0..SUBSTEPS {
            let time = self.state.time() + delta_t;
            self.solver.step(&mut self.state, StepDescriptor {
                delta_x: self.sim_params.delta_x,
                delta_t,
                time,
                omega,
            });
        }

        tracing::debug!(time = self.state.time(), "frame complete");
    }

    /// Zeroes the fields and resets the clock.
    pub fn clear(&mut self) {
        self.state.clear();
    }

    pub fn state(&self) -> &GridState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GridState {
        &mut self.state
    }

    pub fn sim_params(&self) -> SimulationParameters {
        self.sim_params
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Runs several frames, optionally saving results to an HDF5 file.
    #[inline]
    pub fn run<P: AsRef<Path>>(
        &mut self,
        desc: RunDescriptor<P>,
    ) -> Result<(), Error> {
        let nframes = desc.frames;
        let (rows, cols) = self.state.dim();
        let mut frame_offset = 0;

        // optionally create file
        if let Some(SaveSettings {
            ref filename,
            ref save_type,
            overwrite,
        }) = desc.save_settings {
            let filename = filename.as_ref();
            if filename.exists() && !overwrite {
                let file = hdf5::File::append(filename)?;

                if *save_type == SaveType::Full {
                    if let Ok(full_group) = file.group("full") {
                        let previous_size = full_group.dataset("e_field")?.shape()[0];
                        frame_offset = previous_size;
                        // resize full datasets
                        full_group.dataset("e_field")?
                            .resize((previous_size + nframes, rows, cols, 3))?;
                        full_group.dataset("h_field")?
                            .resize((previous_size + nframes, rows, cols, 3))?;
                        full_group.dataset("time")?.resize(previous_size + nframes)?;
                    } else {
                        create_full_group(&file, nframes, rows, cols)?;
                    }
                }

                write_run_attrs(&file, self.sim_params.delta_x, &desc.settings)?;
                file.close()?;
            } else {
                let file = hdf5::File::create(filename)?;

                if *save_type == SaveType::Full {
                    create_full_group(&file, nframes, rows, cols)?;
                }

                write_run_attrs(&file, self.sim_params.delta_x, &desc.settings)?;
                file.close()?;
            }
        }

        // setup output if verbose
        let bar = if desc.verbose {
            println!("# of frames: {}", nframes);
            Some(indicatif::ProgressBar::new(nframes as u64))
        } else {
            None
        };

        let full_file = match desc.save_settings {
            Some(SaveSettings { ref filename, save_type: SaveType::Full, .. }) => {
                Some(hdf5::File::open_rw(filename)?)
            },
            _ => None,
        };

        for frame in 0..nframes {
            self.update(&desc.settings);

            if let Some(ref file) = full_file {
                let index = frame_offset + frame;
                file.dataset("full/e_field")?.write_slice(
                    self.state.e_field().view().insert_axis(Axis(0)),
                    s![index..(index + 1), .., .., ..],
                )?;
                file.dataset("full/h_field")?.write_slice(
                    self.state.h_field().view().insert_axis(Axis(0)),
                    s![index..(index + 1), .., .., ..],
                )?;
                file.dataset("full/time")?.write_slice(
                    ndarray::aview1(&[self.state.time()]),
                    s![index..(index + 1)],
                )?;
            }

            if let Some(ref bar) = bar {
                bar.inc(1)
            }
        }

        if let Some(file) = full_file {
            file.close()?;
        }

        // save the final state
        if let Some(SaveSettings {
            ref filename,
            save_type: SaveType::End,
            ..
        }) = desc.save_settings {
            let file = hdf5::File::open_rw(filename)?;
            // replace any previously saved end state
            if file.group("end").is_ok() {
                file.unlink("end")?;
            }
            let end_group = file.create_group("end")?;

            end_group.new_dataset::<f32>()
                .shape((rows, cols, 3))
                .create("e_field")?
                .write(self.state.e_field())?;
            end_group.new_dataset::<f32>()
                .shape((rows, cols, 3))
                .create("h_field")?
                .write(self.state.h_field())?;
            end_group.new_dataset::<f32>()
                .shape((rows, cols, 2))
                .create("power")?
                .write(self.state.power())?;
            end_group.new_dataset::<f32>()
                .shape((rows, cols))
                .create("absorption")?
                .write(self.state.absorption())?;
            end_group.new_dataset::<f32>()
                .shape((rows, cols))
                .create("emission")?
                .write(self.state.emission())?;

            write_scalar_attr(&end_group, "time", self.state.time())?;

            file.close()?;
        }

        if let Some(ref bar) = bar {
            bar.finish();
        }

        Ok(())
    }
}

/// Saves the step sizes of the latest run as file attributes.
fn write_run_attrs(file: &hdf5::File, delta_x: f32, settings: &Settings) -> Result<(), Error> {
    write_scalar_attr(file, "length_step", delta_x)?;
    write_scalar_attr(file, "time_step", settings.time_step())?;
    write_scalar_attr(file, "wavelength", settings.wavelength())
}

/// Writes a scalar attribute, replacing the value of an existing one.
fn write_scalar_attr(loc: &hdf5::Location, name: &str, value: f32) -> Result<(), Error> {
    let attr = match loc.attr(name) {
        Ok(attr) => attr,
        Err(_) => loc.new_attr::<f32>()
            .shape(hdf5::Extents::Scalar)
            .create(name)?,
    };
    attr.write_scalar(&value)?;
    Ok(())
}

fn create_full_group(
    file: &hdf5::File,
    nframes: usize,
    rows: usize,
    cols: usize,
) -> Result<(), Error> {
    let full_group = file.create_group("full")?;
    full_group.new_dataset::<f32>()
        .shape((hdf5::Extent::resizable(nframes), rows, cols, 3))
        .create("e_field")?;
    full_group.new_dataset::<f32>()
        .shape((hdf5::Extent::resizable(nframes), rows, cols, 3))
        .create("h_field")?;
    full_group.new_dataset::<f32>()
        .shape(hdf5::Extent::resizable(nframes))
        .create("time")?;
    Ok(())
}
