use ndarray::{Array3, Axis, Zip};

use crate::{Error, GridState, Solver, StepDescriptor};
use crate::fdtd::Source;

/// Describes the composition of an `FdtdSolver`.
#[derive(Default)]
pub struct FdtdSolverDescriptor {
    pub sources: Vec<Box<dyn Source>>,
}

/// Does single threaded Yee-grid computations on the CPU.
///
/// Each step updates H from the curl of the previous E, then E from the curl
/// of the new H, so the two fields stay half a step apart in time.
#[derive(Default)]
pub struct FdtdSolver {
    sources: Vec<Box<dyn Source>>,
}

impl FdtdSolver {
    #[inline]
    pub fn new(desc: FdtdSolverDescriptor) -> Self {
        Self {
            sources: desc.sources,
        }
    }

    pub fn add_source(&mut self, source: Box<dyn Source>) {
        self.sources.push(source);
    }

    pub fn nsources(&self) -> usize {
        self.sources.len()
    }

    fn inject(&self, grid: &mut GridState, desc: &StepDescriptor) {
        for source in &self.sources {
            let value = source.generate(desc.time, desc.omega);
            let channel = source.axis().channel();

            for &[r, c] in source.cells() {
                debug_assert!(
                    grid.permittivity.get([r, c]).is_some(),
                    "source cell ( {}, {} ) outside the grid; call check_bounds first",
                    r,
                    c,
                );
                let (Some(&eps), Some(&dil)) = (
                    grid.permittivity.get([r, c]),
                    grid.dilation.get([r, c]),
                ) else {
                    continue;
                };
                let dt_local = desc.delta_t * dil;

                let before = grid.e_field[[r, c, channel]];
                let after = before + value * dt_local / eps;
                grid.e_field[[r, c, channel]] = after;
                grid.emission[[r, c]] += 0.5 * eps * (after * after - before * before);
            }
        }
    }
}

impl Solver for FdtdSolver {
    fn step(&self, grid: &mut GridState, desc: StepDescriptor) {
        update_h(grid, &desc);
        update_e(grid, &desc);
        self.inject(grid, &desc);
        accumulate_power(grid, &desc);
        grid.advance_to(desc.time);
    }

    fn check_bounds(&self, rows: usize, cols: usize) -> Result<(), Error> {
        for source in &self.sources {
            if let Some(&[row, col]) = source.cells().iter().find(|[r, c]| *r >= rows || *c >= cols) {
                return Err(Error::SourceOutOfBounds { row, col, rows, cols });
            }
        }
        Ok(())
    }
}

/// Curl with forward differences; cells past the far edges read as zero.
///
/// Columns run along x and rows along y, with no variation along z.
#[inline]
fn forward_curl(field: &Array3<f32>, r: usize, c: usize) -> [f32; 3] {
    let (rows, cols, _) = field.dim();
    let here = |k: usize| field[[r, c, k]];
    let right = |k: usize| if c + 1 < cols { field[[r, c + 1, k]] } else { 0.0 };
    let below = |k: usize| if r + 1 < rows { field[[r + 1, c, k]] } else { 0.0 };

    [
        below(2) - here(2),
        -(right(2) - here(2)),
        (right(1) - here(1)) - (below(0) - here(0)),
    ]
}

/// Curl with backward differences; cells before the near edges read as zero.
#[inline]
fn backward_curl(field: &Array3<f32>, r: usize, c: usize) -> [f32; 3] {
    let here = |k: usize| field[[r, c, k]];
    let left = |k: usize| if c > 0 { field[[r, c - 1, k]] } else { 0.0 };
    let above = |k: usize| if r > 0 { field[[r - 1, c, k]] } else { 0.0 };

    [
        here(2) - above(2),
        -(here(2) - left(2)),
        (here(1) - left(1)) - (here(0) - above(0)),
    ]
}

fn update_h(grid: &mut GridState, desc: &StepDescriptor) {
    let GridState {
        ref e_field,
        ref mut h_field,
        ref permeability,
        ref dilation,
        ref attenuation,
        ref mut absorption,
        ..
    } = *grid;
    let inv_dx = desc.delta_x.recip();

    Zip::indexed(h_field.lanes_mut(Axis(2)))
        .and(permeability)
        .and(dilation)
        .and(attenuation)
        .and(absorption)
        .for_each(|(r, c), mut h, &mu, &dil, &att, absorbed| {
            let curl = forward_curl(e_field, r, c);
            let coef = desc.delta_t * dil * inv_dx / mu;
            let removed = 0.5 * mu * (1.0 - att * att);

            for k in 0..3 {
                let next = h[k] - coef * curl[k];
                *absorbed += removed * next * next;
                h[k] = att * next;
            }
        });
}

fn update_e(grid: &mut GridState, desc: &StepDescriptor) {
    let GridState {
        ref mut e_field,
        ref h_field,
        ref permittivity,
        ref dilation,
        ref attenuation,
        ref mut absorption,
        ..
    } = *grid;
    let inv_dx = desc.delta_x.recip();

    Zip::indexed(e_field.lanes_mut(Axis(2)))
        .and(permittivity)
        .and(dilation)
        .and(attenuation)
        .and(absorption)
        .for_each(|(r, c), mut e, &eps, &dil, &att, absorbed| {
            let curl = backward_curl(h_field, r, c);
            let coef = desc.delta_t * dil * inv_dx / eps;
            let removed = 0.5 * eps * (1.0 - att * att);

            for k in 0..3 {
                let next = e[k] + coef * curl[k];
                *absorbed += removed * next * next;
                e[k] = att * next;
            }
        });
}

fn accumulate_power(grid: &mut GridState, desc: &StepDescriptor) {
    let GridState {
        ref e_field,
        ref h_field,
        ref dilation,
        ref mut power,
        ..
    } = *grid;

    // in-plane Poynting vector E x H
    Zip::from(power.lanes_mut(Axis(2)))
        .and(e_field.lanes(Axis(2)))
        .and(h_field.lanes(Axis(2)))
        .and(dilation)
        .for_each(|mut s, e, h, &dil| {
            let dt_local = desc.delta_t * dil;
            s[0] += (e[1] * h[2] - e[2] * h[1]) * dt_local;
            s[1] += (e[2] * h[0] - e[0] * h[2]) * dt_local;
        });
}
