//! Scene validation command

use anyhow::{Context, Result};
use ember_particles::{CustomShape, EmitterShape, ParticleRng, ParticleSystem};

pub fn run(scene: &str) -> Result<()> {
    let system = ParticleSystem::from_toml_file(scene, ParticleRng::new(0))
        .with_context(|| format!("Invalid scene: {}", scene))?;

    println!("Scene: {}", scene);
    println!("Emitters: {}", system.emitter_count());

    let mut problems = 0;
    for slot in system.emitters() {
        let config = &slot.emitter.config;
        let mode = if config.immortal { "immortal" } else { "per second" };
        println!();
        println!("  {}", slot.name);
        println!("    shape:     {:?} ({:?} emission)", config.shape, config.emission);
        println!("    number:    {} {}", config.number, mode);
        println!("    linkage:   {:?}", config.linkage);
        println!(
            "    lifetime:  {} ± {}",
            config.lifetime.median, config.lifetime.dispersion
        );
        println!("    modifiers: {}", slot.modifiers.len());
        println!("    magnets:   {}", slot.magnets.len());
        if config.time_shift > 0.0 {
            println!("    preroll:   {}s", config.time_shift);
        }

        if slot.modifiers.is_empty() {
            println!("    warning: no modifiers, nothing will spawn");
            problems += 1;
        }
        if config.shape == EmitterShape::Custom {
            let shape = CustomShape::new(&config.points);
            let expected = config.points.len().saturating_sub(2);
            println!(
                "    polygon:   {} point(s), {} triangle(s), area {:.2}",
                config.points.len(),
                shape.triangles().len(),
                shape.area()
            );
            if config.points.len() < 3 || shape.triangles().len() != expected {
                println!("    warning: polygon is degenerate or self-intersecting");
                problems += 1;
            }
        }
    }

    println!();
    if problems == 0 {
        println!("No problems found.");
    } else {
        println!("{} warning(s).", problems);
    }
    Ok(())
}
