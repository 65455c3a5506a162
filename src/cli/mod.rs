//! CLI Module
//!
//! Command-line interface for the AuraFX compiler.

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// AuraFX - compile layered particle scenes into effect scripts
#[derive(Parser, Debug)]
#[command(name = "aurafx")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty scene with one layer
    #[command(name = "new")]
    New {
        /// Path of the scene file
        scene: PathBuf,
    },

    /// Print a layer summary
    #[command(name = "info")]
    Info {
        /// Path of the scene file
        scene: PathBuf,
    },

    /// Compile a scene into a script
    #[command(name = "compile")]
    Compile {
        /// Path of the scene file
        scene: PathBuf,

        #[command(flatten)]
        options: CompileArgs,

        /// Write the script here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail if any layer had to be skipped
        #[arg(long)]
        strict: bool,
    },

    /// Add the vertices of an OBJ mesh to a layer
    #[command(name = "import-obj")]
    ImportObj {
        /// Path of the scene file
        scene: PathBuf,

        /// OBJ file to read
        obj: PathBuf,

        /// Target layer index
        #[arg(short, long, default_value_t = 0)]
        layer: usize,

        /// Scale applied to every vertex
        #[arg(long, default_value_t = 1.0)]
        scale: f64,

        /// Keep only every 4th vertex
        #[arg(long)]
        performance: bool,
    },

    /// Replace a layer's elements with points sampled from an image
    #[command(name = "import-image")]
    ImportImage {
        /// Path of the scene file
        scene: PathBuf,

        /// Image file to read
        image: PathBuf,

        /// Target layer index
        #[arg(short, long, default_value_t = 0)]
        layer: usize,

        /// Side of the square the image is resized to
        #[arg(long, default_value_t = 20)]
        size: u32,

        /// Color elements with the pixel colors
        #[arg(long)]
        real_color: bool,

        /// Halve the size and drop faint pixels
        #[arg(long)]
        performance: bool,
    },

    /// Dump raw preview points as JSON
    #[command(name = "preview")]
    Preview {
        /// Path of the scene file
        scene: PathBuf,

        /// Write the JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Compile settings. Flags override values loaded with `--config`.
#[derive(Args, Debug, Default, Clone)]
pub struct CompileArgs {
    /// JSON settings file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Skill name written in the header
    #[arg(long)]
    pub skill_name: Option<String>,

    /// Rotate the whole layer about the origin at this speed
    #[arg(long, value_name = "SPEED")]
    pub rotate: Option<f64>,

    /// Orbit every element about its own position at this speed
    #[arg(long, value_name = "SPEED")]
    pub local_rotate: Option<f64>,

    /// Orbit radius for local rotation
    #[arg(long, requires = "local_rotate")]
    pub radius: Option<f64>,

    /// Height gained per rise step
    #[arg(long)]
    pub rise_speed: Option<f64>,

    /// Height the rise stops at
    #[arg(long)]
    pub rise_limit: Option<f64>,

    /// Commands between proximity delays
    #[arg(long)]
    pub proximity_step: Option<i64>,

    /// Ticks of each proximity delay
    #[arg(long)]
    pub proximity_delay: Option<i64>,

    /// Emit long-lived clouds with no delays
    #[arg(long)]
    pub persistent: bool,

    /// Cycle the hue on every command
    #[arg(long)]
    pub rainbow: bool,

    /// Merge repeated lines
    #[arg(long)]
    pub performance: bool,

    /// Emit cloud commands instead of particles
    #[arg(long)]
    pub clouds: bool,

    /// Added to every layer's vertical offset
    #[arg(long, allow_hyphen_values = true)]
    pub y_offset: Option<f64>,
}
