//! Integration tests for the field stepper and its driver.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use ndarray::s;
use yee2d::fdtd::components::{
    LineSource, LineSourceDescriptor, Orientation, PointSource, PointSourceDescriptor,
};
use yee2d::fdtd::{FdtdSolver, FdtdSolverDescriptor};
use yee2d::prelude::*;
use yee2d::Error;

fn vacuum(pixels: usize, border: usize) -> GridState {
    GridState::new(GridDescriptor {
        pixel_width: pixels,
        pixel_height: pixels,
        border_size: border,
        delta_x: 1.0,
    })
    .unwrap()
}

/// Seeds a Gaussian bump of Ez centered on `(center, center)`.
fn seed_gaussian(grid: &mut GridState, center: f32, sigma: f32) {
    grid.e_field_mut()
        .slice_mut(s![.., .., 2])
        .indexed_iter_mut()
        .for_each(|((r, c), v)| {
            let dr = r as f32 - center;
            let dc = c as f32 - center;
            *v = f32::exp(-(dr * dr + dc * dc) / (2.0 * sigma * sigma));
        });
}

fn sim_with(grid: GridState, solver: FdtdSolver) -> Simulation<FdtdSolver> {
    Simulation::new(SimulationDescriptor {
        solver,
        sim_params: SimulationParameters::default(),
        grid,
    })
    .unwrap()
}

fn center_source(cell: usize) -> FdtdSolver {
    FdtdSolver::new(FdtdSolverDescriptor {
        sources: vec![Box::new(PointSource::new(PointSourceDescriptor {
            row: cell,
            col: cell,
            amplitude: 1.0,
            phase: 0.0,
            axis: Axis::Z,
        }))],
    })
}

#[test]
fn no_source_means_no_wave() {
    let mut sim = Simulation::create(10, 10, 2, Some(1.0), None, FdtdSolver::default()).unwrap();
    let settings = Settings::new(10.0).unwrap();
    assert_eq!(settings.time_step(), 0.5);

    sim.update(&settings);

    let state = sim.state();
    assert_eq!(state.time(), 2.5);
    assert!(state.e_field().iter().all(|&v| v == 0.0));
    assert!(state.h_field().iter().all(|&v| v == 0.0));
    assert!(state.power().iter().all(|&v| v == 0.0));
}

#[test]
fn border_absorbs_outgoing_pulse() {
    let mut grid = vacuum(40, 10);
    seed_gaussian(&mut grid, 29.5, 3.0);
    let mut sim = sim_with(grid, FdtdSolver::default());
    let settings = Settings::new(10.0).unwrap();

    let initial = sim.state().field_energy();
    assert!(initial > 0.0);

    let mut energies = vec![initial];
    for _ in 0..60 {
        sim.update(&settings);
        energies.push(sim.state().field_energy());
    }

    for energy in &energies {
        assert!(*energy <= 1.1 * initial);
    }
    for pair in energies.iter().step_by(10).collect::<Vec<_>>().windows(2) {
        assert!(*pair[1] <= 1.05 * *pair[0]);
    }
    assert!(*energies.last().unwrap() < 0.2 * initial);
    assert!(sim.state().absorption().sum() > 0.0);
    // nothing is absorbed away from the border
    let (rows, cols) = sim.state().pixel_region();
    assert!(sim.state().absorption().slice(s![rows, cols]).iter().all(|&v| v == 0.0));
}

#[test]
fn interior_energy_never_grows() {
    let mut grid = vacuum(40, 40);
    let (rows, _) = grid.dim();
    seed_gaussian(&mut grid, (rows as f32 - 1.0) / 2.0, 3.0);
    let mut sim = sim_with(grid, FdtdSolver::default());
    let settings = Settings::new(10.0).unwrap();

    let initial = sim.state().interior_energy();
    assert!(initial > 0.0);

    let mut energies = vec![initial];
    for _ in 0..60 {
        sim.update(&settings);
        energies.push(sim.state().interior_energy());
    }

    for energy in &energies {
        assert!(*energy <= 1.05 * initial, "{} > {}", energy, initial);
    }
    // E and H are sampled half a step apart, so allow a sliver of slack
    for pair in energies.windows(2) {
        assert!(pair[1] <= pair[0] + 0.01 * initial, "{} -> {}", pair[0], pair[1]);
    }
    assert!(*energies.last().unwrap() < 0.05 * initial);
}

#[test]
fn transposed_pattern_stays_transposed() {
    let mut grid = vacuum(20, 5);
    seed_gaussian(&mut grid, 12.0, 2.0);
    let mut sim = sim_with(grid, center_source(15));
    let settings = Settings::new(8.0).unwrap();

    for _ in 0..12 {
        sim.update(&settings);
    }

    let state = sim.state();
    let (rows, cols) = state.dim();
    let e = state.e_field();
    let h = state.h_field();
    let p = state.power();
    for r in 0..rows {
        for c in 0..cols {
            assert_abs_diff_eq!(e[[r, c, 2]], e[[c, r, 2]], epsilon = 1e-5);
            assert_abs_diff_eq!(h[[r, c, 0]], -h[[c, r, 1]], epsilon = 1e-5);
            assert_abs_diff_eq!(p[[r, c, 0]], p[[c, r, 1]], epsilon = 1e-5);
            assert_abs_diff_eq!(
                state.absorption()[[r, c]],
                state.absorption()[[c, r]],
                epsilon = 1e-5
            );
        }
    }
    assert!(e.iter().any(|&v| v.abs() > 1e-3));
}

#[test]
fn clear_twice_equals_clear_once() {
    let mut sim = sim_with(vacuum(16, 4), center_source(12));
    let settings = Settings::default();
    for _ in 0..4 {
        sim.update(&settings);
    }
    assert!(!sim.state().is_cleared());
    let permittivity = sim.state().permittivity().clone();
    let attenuation = sim.state().attenuation().clone();

    sim.clear();
    let once = sim.state().clone();
    sim.clear();

    let state = sim.state();
    assert!(state.is_cleared());
    assert_eq!(state.time(), 0.0);
    assert_eq!(state.e_field(), once.e_field());
    assert_eq!(state.h_field(), once.h_field());
    assert_eq!(state.power(), once.power());
    assert_eq!(state.permittivity(), &permittivity);
    assert_eq!(state.attenuation(), &attenuation);

    // a cleared grid starts running again on the next update
    sim.update(&settings);
    assert!(!sim.state().is_cleared());
    assert_relative_eq!(sim.state().time(), 2.5);
}

#[test]
fn identical_runs_are_identical() {
    let settings = Settings::new(6.0).unwrap();
    let mut a = sim_with(vacuum(16, 4), center_source(10));
    let mut b = sim_with(vacuum(16, 4), center_source(10));

    for _ in 0..8 {
        a.update(&settings);
        b.update(&settings);
    }

    assert_eq!(a.state().e_field(), b.state().e_field());
    assert_eq!(a.state().h_field(), b.state().h_field());
    assert_eq!(a.state().power(), b.state().power());
    assert_eq!(a.state().absorption(), b.state().absorption());
    assert_eq!(a.state().emission(), b.state().emission());
    assert_eq!(a.state().time(), b.state().time());
}

#[test]
fn source_energy_is_absorbed_by_border() {
    let solver = FdtdSolver::new(FdtdSolverDescriptor {
        sources: vec![Box::new(LineSource::new(LineSourceDescriptor {
            row: 8,
            col: 6,
            length: 20,
            orientation: Orientation::Horizontal,
            amplitude: 0.5,
            axis: Axis::Z,
        }))],
    });
    let mut sim = sim_with(vacuum(20, 6), solver);
    let settings = Settings::new(10.0).unwrap();

    for _ in 0..40 {
        sim.update(&settings);
    }

    let emitted = sim.state().emission().sum();
    let absorbed = sim.state().absorption().sum();
    assert!(emitted > 0.0);
    assert!(absorbed > 0.0);
    assert!(absorbed < 1.5 * emitted);
    assert!(sim.state().is_finite());
    // the line only emits in its own row
    assert!(sim.state().emission().row(8).sum() > 0.0);
    assert_eq!(sim.state().emission().row(12).sum(), 0.0);
}

#[test]
fn permittivity_slows_the_update() {
    let mut grid = GridState::with_material(
        GridDescriptor {
            pixel_width: 4,
            pixel_height: 4,
            border_size: 1,
            delta_x: 1.0,
        },
        MaterialDescriptor {
            permittivity_fn: |_, _| 4.0,
            permeability_fn: |_, _| 1.0,
        },
    )
    .unwrap();
    grid.e_field_mut()[[3, 3, 2]] = 1.0;

    let solver = FdtdSolver::default();
    solver.step(&mut grid, StepDescriptor {
        delta_x: 1.0,
        delta_t: 0.5,
        time: 0.5,
        omega: 1.0,
    });

    assert_relative_eq!(grid.e_field()[[2, 3, 2]], 0.0625);
    assert_relative_eq!(grid.e_field()[[3, 3, 2]], 0.75);
}

#[test]
fn courant_violation_diverges() {
    let solver = FdtdSolver::default();
    let run = |delta_t: f32| {
        let mut grid = vacuum(30, 2);
        grid.e_field_mut()[[17, 17, 2]] = 1.0;
        let initial = grid.field_energy();
        for n in 1..=40 {
            solver.step(&mut grid, StepDescriptor {
                delta_x: 1.0,
                delta_t,
                time: n as f32 * delta_t,
                omega: 1.0,
            });
        }
        (initial, grid)
    };

    let (initial, unstable) = run(2.0);
    assert!(!unstable.is_finite() || unstable.field_energy() > 1e6 * initial);

    let mut grid = vacuum(30, 2);
    seed_gaussian(&mut grid, 17.0, 2.0);
    let initial = grid.field_energy();
    for n in 1..=40 {
        solver.step(&mut grid, StepDescriptor {
            delta_x: 1.0,
            delta_t: 0.5,
            time: n as f32 * 0.5,
            omega: 1.0,
        });
    }
    assert!(grid.is_finite());
    assert!(grid.field_energy() <= 1.2 * initial);
}

#[test]
fn sources_must_fit_the_grid() {
    let result = Simulation::new(SimulationDescriptor {
        solver: center_source(40),
        sim_params: SimulationParameters::default(),
        grid: vacuum(10, 2),
    });
    assert!(matches!(result, Err(Error::SourceOutOfBounds { row: 40, col: 40, .. })));
}
