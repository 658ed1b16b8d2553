// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "wirecam-sim")]
#[command(about = "Headless scroll-driven camera simulator", long_about = None)]
pub struct Cli {
    /// Scene description (JSON); the built-in demo page is used when omitted
    #[arg(long)]
    pub scene: Option<PathBuf>,

    /// Number of scroll positions sampled from top to bottom of the page
    #[arg(long, default_value_t = 40)]
    pub steps: u32,

    /// Frame rate of the simulated host
    #[arg(long, default_value_t = 60.0)]
    pub fps: f32,

    /// Frames rendered at each scroll position
    #[arg(long = "frames-per-step", default_value_t = 6)]
    pub frames_per_step: u32,

    /// Enable the debug overlay
    #[arg(long, default_value = "false")]
    pub debug: bool,

    /// Print one JSON object per step instead of a table
    #[arg(long, default_value = "false")]
    pub json: bool,
}
