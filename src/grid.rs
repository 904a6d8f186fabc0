use std::ops::Range;

use ndarray::{Array2, Array3, ArrayViewMut3, Axis, Zip, s};

use crate::Error;

/// Rate at which fields are damped across the absorbing border.
const ATTENUATION_RATE: f32 = 0.1;
/// Rate at which the local time step shrinks across the absorbing border.
const DILATION_RATE: f32 = 0.05;

/// Describes the extents of a `GridState`.
#[derive(Copy, Clone, Debug)]
pub struct GridDescriptor {
    /// Width of the visible area, in cells.
    pub pixel_width: usize,
    /// Height of the visible area, in cells.
    pub pixel_height: usize,
    /// Thickness of the absorbing border added on every side, in cells.
    pub border_size: usize,
    /// The physical size of each grid cell.
    pub delta_x: f32,
}

impl GridDescriptor {
    fn validate(&self) -> Result<(), Error> {
        if self.pixel_width == 0 || self.pixel_height == 0 {
            return Err(Error::Configuration(format!(
                "grid dimensions must be positive ( width: {}, height: {} )",
                self.pixel_width, self.pixel_height,
            )));
        }
        if self.border_size == 0 {
            return Err(Error::Configuration("border size must be positive".to_string()));
        }
        if !(self.delta_x.is_finite() && self.delta_x > 0.0) {
            return Err(Error::Configuration(format!(
                "spatial step must be positive ( delta_x: {} )",
                self.delta_x,
            )));
        }
        Ok(())
    }

    /// Number of rows in the simulated area, border included.
    pub fn rows(&self) -> usize {
        self.pixel_height + 2 * self.border_size
    }

    /// Number of columns in the simulated area, border included.
    pub fn cols(&self) -> usize {
        self.pixel_width + 2 * self.border_size
    }
}

/// Per-cell material functions, evaluated at cell centers `(x, y)`.
pub struct MaterialDescriptor<Fe: Fn(f32, f32) -> f32, Fu: Fn(f32, f32) -> f32> {
    /// Relative permittivity.
    pub permittivity_fn: Fe,
    /// Relative permeability.
    pub permeability_fn: Fu,
}

/// All per-cell data of a simulation at time `time`.
///
/// Field arrays are indexed `[row, col, channel]` with channels ordered x, y, z.
/// Material and border arrays are fixed once the grid is built.
#[derive(Clone, Debug)]
pub struct GridState {
    pub(crate) time: f32,
    pub(crate) delta_x: f32,
    pub(crate) border_size: usize,
    pub(crate) pixel_width: usize,
    pub(crate) pixel_height: usize,
    pub(crate) e_field: Array3<f32>,
    pub(crate) h_field: Array3<f32>,
    pub(crate) permittivity: Array2<f32>,
    pub(crate) permeability: Array2<f32>,
    pub(crate) power: Array3<f32>,
    pub(crate) gx: Array2<f32>,
    pub(crate) gy: Array2<f32>,
    pub(crate) dilation: Array2<f32>,
    pub(crate) attenuation: Array2<f32>,
    pub(crate) absorption: Array2<f32>,
    pub(crate) emission: Array2<f32>,
}

impl GridState {
    /// Creates a grid filled with vacuum.
    pub fn new(desc: GridDescriptor) -> Result<Self, Error> {
        Self::with_material(desc, MaterialDescriptor {
            permittivity_fn: |_, _| 1.0,
            permeability_fn: |_, _| 1.0,
        })
    }

    /// Creates a grid whose materials are given by per-position functions.
    pub fn with_material<Fe: Fn(f32, f32) -> f32, Fu: Fn(f32, f32) -> f32>(
        desc: GridDescriptor,
        material: MaterialDescriptor<Fe, Fu>,
    ) -> Result<Self, Error> {
        desc.validate()?;

        let rows = desc.rows();
        let cols = desc.cols();
        let dx = desc.delta_x;

        // evaluate everything at cell centers
        let gx = Array2::from_shape_fn((rows, cols), |(_, c)| (c as f32 + 0.5) * dx);
        let gy = Array2::from_shape_fn((rows, cols), |(r, _)| (r as f32 + 0.5) * dx);

        let permittivity = sample_material("permittivity", &gx, &gy, &material.permittivity_fn)?;
        let permeability = sample_material("permeability", &gx, &gy, &material.permeability_fn)?;

        let width = cols as f32 * dx;
        let height = rows as f32 * dx;
        let border_len = desc.border_size as f32 * dx;
        let border = Zip::from(&gx)
            .and(&gy)
            .map_collect(|&x, &y| {
                let dist = x.min(y).min(width - x).min(height - y);
                (dist / border_len).clamp(0.0, 1.0)
            });
        let dilation = border.mapv(|b| f32::exp(-DILATION_RATE * (b - 1.0).abs()));
        let attenuation = border.mapv(|b| f32::exp(-ATTENUATION_RATE * (b - 1.0).abs()));

        tracing::info!(
            rows,
            cols,
            border_size = desc.border_size,
            delta_x = dx,
            "created simulation grid"
        );

        Ok(Self {
            time: 0.0,
            delta_x: dx,
            border_size: desc.border_size,
            pixel_width: desc.pixel_width,
            pixel_height: desc.pixel_height,
            e_field: Array3::zeros((rows, cols, 3)),
            h_field: Array3::zeros((rows, cols, 3)),
            permittivity,
            permeability,
            power: Array3::zeros((rows, cols, 2)),
            gx,
            gy,
            dilation,
            attenuation,
            absorption: Array2::zeros((rows, cols)),
            emission: Array2::zeros((rows, cols)),
        })
    }

    /// Zeroes the fields, the accumulated power and the clock.
    ///
    /// Materials, border coefficients, absorption and emission are untouched.
    pub fn clear(&mut self) {
        self.time = 0.0;
        self.e_field.fill(0.0);
        self.h_field.fill(0.0);
        self.power.fill(0.0);
    }

    /// Zeroes the absorption and emission tallies.
    pub fn reset_accumulators(&mut self) {
        self.absorption.fill(0.0);
        self.emission.fill(0.0);
    }

    /// Whether the grid is in its cleared state.
    pub fn is_cleared(&self) -> bool {
        self.time == 0.0
            && self.e_field.iter().all(|&v| v == 0.0)
            && self.h_field.iter().all(|&v| v == 0.0)
            && self.power.iter().all(|&v| v == 0.0)
    }

    pub(crate) fn advance_to(&mut self, time: f32) {
        self.time = self.time.max(time);
    }

    /// `(rows, cols)` of the simulated area, border included.
    pub fn dim(&self) -> (usize, usize) {
        self.permittivity.dim()
    }

    /// Row and column ranges of the visible area.
    pub fn pixel_region(&self) -> (Range<usize>, Range<usize>) {
        (
            self.border_size..(self.border_size + self.pixel_height),
            self.border_size..(self.border_size + self.pixel_width),
        )
    }

    pub fn time(&self) -> f32 {
        self.time
    }
    pub fn delta_x(&self) -> f32 {
        self.delta_x
    }
    pub fn border_size(&self) -> usize {
        self.border_size
    }
    pub fn e_field(&self) -> &Array3<f32> {
        &self.e_field
    }
    pub fn h_field(&self) -> &Array3<f32> {
        &self.h_field
    }
    /// Mutable view of the electric field, for seeding initial conditions.
    ///
    /// Values may change but the extents stay those of the grid.
    pub fn e_field_mut(&mut self) -> ArrayViewMut3<'_, f32> {
        self.e_field.view_mut()
    }
    /// Mutable view of the magnetic field, for seeding initial conditions.
    pub fn h_field_mut(&mut self) -> ArrayViewMut3<'_, f32> {
        self.h_field.view_mut()
    }
    pub fn permittivity(&self) -> &Array2<f32> {
        &self.permittivity
    }
    pub fn permeability(&self) -> &Array2<f32> {
        &self.permeability
    }
    pub fn power(&self) -> &Array3<f32> {
        &self.power
    }
    pub fn gx(&self) -> &Array2<f32> {
        &self.gx
    }
    pub fn gy(&self) -> &Array2<f32> {
        &self.gy
    }
    pub fn dilation(&self) -> &Array2<f32> {
        &self.dilation
    }
    pub fn attenuation(&self) -> &Array2<f32> {
        &self.attenuation
    }
    pub fn absorption(&self) -> &Array2<f32> {
        &self.absorption
    }
    pub fn emission(&self) -> &Array2<f32> {
        &self.emission
    }

    /// Total electromagnetic energy stored in the grid.
    pub fn field_energy(&self) -> f32 {
        self.energy_in(0..self.dim().0, 0..self.dim().1)
    }

    /// Electromagnetic energy stored in the visible area.
    pub fn interior_energy(&self) -> f32 {
        let (rows, cols) = self.pixel_region();
        self.energy_in(rows, cols)
    }

    fn energy_in(&self, rows: Range<usize>, cols: Range<usize>) -> f32 {
        let e_sq = self.e_field.slice(s![rows.clone(), cols.clone(), ..])
            .map_axis(Axis(2), |c| c.dot(&c));
        let h_sq = self.h_field.slice(s![rows.clone(), cols.clone(), ..])
            .map_axis(Axis(2), |c| c.dot(&c));

        let density = Zip::from(&e_sq)
            .and(&h_sq)
            .and(self.permittivity.slice(s![rows.clone(), cols.clone()]))
            .and(self.permeability.slice(s![rows, cols]))
            .fold(0.0, |acc, &e2, &h2, &eps, &mu| acc + 0.5 * (eps * e2 + mu * h2));

        density * self.delta_x * self.delta_x
    }

    /// Whether every field value is finite.
    pub fn is_finite(&self) -> bool {
        self.e_field.iter().chain(self.h_field.iter()).all(|v| v.is_finite())
    }
}

fn sample_material<F: Fn(f32, f32) -> f32>(
    field: &'static str,
    gx: &Array2<f32>,
    gy: &Array2<f32>,
    material_fn: F,
) -> Result<Array2<f32>, Error> {
    let values = Zip::from(gx).and(gy).map_collect(|&x, &y| material_fn(x, y));

    if let Some(((row, col), &value)) = values
        .indexed_iter()
        .find(|(_, v)| !(v.is_finite() && **v > 0.0))
    {
        return Err(Error::BadMaterial { field, value, row, col });
    }

    Ok(values)
}
