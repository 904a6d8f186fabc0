use yee2d::prelude::*;
use yee2d::fdtd::*;

fn main() {
    let pixels = 300;
    let border = 40;
    let wavelength = 12.0;
    let settings = Settings::new(wavelength).unwrap();

    // glass-like slab (n = 1.5) across the lower half of the view
    let slab_top = (border + pixels / 2) as f32;
    let grid = GridState::with_material(
        GridDescriptor {
            pixel_width: pixels,
            pixel_height: pixels,
            border_size: border,
            delta_x: 1.0,
        },
        MaterialDescriptor {
            permittivity_fn: |_, y| if y > slab_top { 2.25 } else { 1.0 },
            permeability_fn: |_, _| 1.0,
        },
    )
    .unwrap();

    // a line source launches a plane wave toward the slab
    let solver = FdtdSolver::new(FdtdSolverDescriptor {
        sources: vec![Box::new(components::LineSource::new(components::LineSourceDescriptor {
            row: border + 20,
            col: border,
            length: pixels,
            orientation: components::Orientation::Horizontal,
            amplitude: 0.5,
            axis: Axis::Z,
        }))],
    });

    let mut simulation = Simulation::new(SimulationDescriptor {
        solver,
        sim_params: SimulationParameters::default(),
        grid,
    })
    .unwrap();

    simulation.run(RunDescriptor {
        frames: 150,
        settings,
        verbose: true,
        save_settings: Some(SaveSettings {
            filename: "data/dielectric_slab.h5",
            save_type: SaveType::End,
            overwrite: true,
        }),
    })
    .unwrap();

    println!(
        "t = {:.1}, emitted: {:.3e}, absorbed: {:.3e}",
        simulation.state().time(),
        simulation.state().emission().sum(),
        simulation.state().absorption().sum(),
    );
}
