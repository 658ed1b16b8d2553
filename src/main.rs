use anyhow::{Context, Result};
use clap::Parser;
use std::fs;

use wirecam::cli::Cli;
use wirecam::demo::{FrameReport, SceneConfig, Simulation};

fn load_scene(cli: &Cli) -> Result<SceneConfig> {
    let mut config = match &cli.scene {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read scene {}", path.display()))?;
            SceneConfig::from_json(&json)?
        }
        None => SceneConfig::demo(),
    };
    config.options.debug |= cli.debug;
    config.options.auto_start = true;
    Ok(config)
}

fn print_row(report: &FrameReport) {
    let pair = report
        .pair
        .map(|pair| format!("{} -> {} ({:.3})", pair.prev, pair.next, pair.blend))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:>4}  {:>8.1}  ({:>7.2}, {:>7.2}, {:>7.2})  {:>6.2}  {}",
        report.step,
        report.scroll,
        report.position.x,
        report.position.y,
        report.position.z,
        report.fov,
        pair
    );
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = load_scene(&cli)?;
    let mut sim = Simulation::build(&config)?;

    let dt = 1.0 / cli.fps.max(1.0);
    let steps = cli.steps.max(1);

    // Settle on the initial layout before scrolling
    sim.advance(cli.frames_per_step, dt);

    if !cli.json {
        println!("step    scroll  position                     fov     pair");
    }
    for step in 0..=steps {
        let scroll = config.max_scroll() * step as f32 / steps as f32;
        sim.scroll_to(scroll);
        sim.advance(cli.frames_per_step, dt);

        let report = sim.report(step);
        if cli.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            print_row(&report);
        }
    }

    sim.engine.dispose();
    Ok(())
}
