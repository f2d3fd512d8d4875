//! Headless scene simulation command

use anyhow::{bail, Context, Result};
use ember_particles::{ParticleRng, ParticleSystem};

pub struct SimulateArgs {
    pub scene: String,
    pub seconds: f32,
    pub fps: u32,
    pub seed: Option<u64>,
    pub no_emit: bool,
}

pub fn run(args: SimulateArgs) -> Result<()> {
    if args.fps == 0 {
        bail!("--fps must be greater than zero");
    }
    if args.seconds.is_nan() || args.seconds < 0.0 {
        bail!("--seconds must be a non-negative number");
    }

    let rng = match args.seed {
        Some(seed) => ParticleRng::new(seed),
        None => ParticleRng::from_entropy(),
    };
    let mut system = ParticleSystem::from_toml_file(&args.scene, rng)
        .with_context(|| format!("Failed to load scene: {}", args.scene))?;
    system.set_emission_enabled(!args.no_emit);

    let dt = 1.0 / args.fps as f32;
    let frames = (args.seconds * args.fps as f32).round() as u32;
    println!(
        "Simulating {} emitter(s) for {} frame(s) at {} fps",
        system.emitter_count(),
        frames,
        args.fps
    );

    for frame in 1..=frames {
        system.update(dt);
        if frame % args.fps == 0 || frame == frames {
            print_populations(&system, frame as f32 * dt);
        }
    }

    system.pack_instances();
    let pool = system.pool();
    println!();
    println!("Instances packed: {}", system.instance_buffer().len());
    println!(
        "Pool: {} constructed, {} free",
        pool.constructed_count(),
        pool.free_count()
    );
    Ok(())
}

fn print_populations(system: &ParticleSystem, time: f32) {
    println!("t = {time:.2}s  total {}", system.total_alive());
    for slot in system.emitters() {
        println!(
            "  {:<16} {:>6}",
            slot.name,
            slot.emitter.particle_count()
        );
    }
}
