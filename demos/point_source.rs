use yee2d::prelude::*;
use yee2d::fdtd::*;

fn main() {
    let wavelength = 20.0;
    let settings = Settings::new(wavelength).unwrap();

    // a single continuous source in the middle of a 200x200 view
    let mut solver = FdtdSolver::default();
    solver.add_source(Box::new(components::PointSource::new(components::PointSourceDescriptor {
        row: 140,
        col: 140,
        amplitude: 1.0,
        phase: 0.0,
        axis: Axis::Z,
    })));
    println!("Sources: {}", solver.nsources());

    let mut simulation = Simulation::create(200, 200, 40, None, None, solver).unwrap();
    let (rows, cols) = simulation.state().dim();

    println!(
        "\n-- General Simulation Info --\n\
        Grid:         {} x {} cells\n\
        Δx:           {:<9.2}\n\
        Δt:           {:<9.2}\n\
        Wavelength:   {:<9.2}\n",
        rows,
        cols,
        simulation.sim_params().delta_x,
        settings.time_step(),
        wavelength,
    );

    println!("-- Run Part 1 --");
    // let the wave fill the view and save every frame
    simulation.run(RunDescriptor {
        frames: 60,
        settings,
        verbose: true,
        save_settings: Some(SaveSettings {
            filename: "data/point_source.h5",
            save_type: SaveType::Full,
            overwrite: true,
        }),
    })
    .unwrap();

    println!("-- Run Part 2 --");
    // keep going and append to the same file
    simulation.run(RunDescriptor {
        frames: 60,
        settings,
        verbose: true,
        save_settings: Some(SaveSettings {
            filename: "data/point_source.h5",
            save_type: SaveType::Full,
            overwrite: false,
        }),
    })
    .unwrap();

    println!(
        "Energy in view: {:.3e}, absorbed by border: {:.3e}",
        simulation.state().interior_energy(),
        simulation.state().absorption().sum(),
    );
}
