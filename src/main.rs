//! AuraFX CLI - Particle Effect Compiler
//!
//! Command-line interface for the AuraFX scene compiler.

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::info;

use aurafx::cli::commands;
use aurafx::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("AuraFX v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("AuraFX v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::New { scene } => commands::new_scene(&scene)
            .with_context(|| format!("creating {}", scene.display())),
        Commands::Info { scene } => commands::show_info(&scene)
            .with_context(|| format!("reading {}", scene.display())),
        Commands::Compile {
            scene,
            options,
            output,
            strict,
        } => commands::compile_scene(&scene, &options, output.as_deref(), strict)
            .with_context(|| format!("compiling {}", scene.display())),
        Commands::ImportObj {
            scene,
            obj,
            layer,
            scale,
            performance,
        } => commands::import_obj(&scene, &obj, layer, scale, performance)
            .with_context(|| format!("importing {}", obj.display())),
        Commands::ImportImage {
            scene,
            image,
            layer,
            size,
            real_color,
            performance,
        } => commands::import_image(&scene, &image, layer, size, real_color, performance)
            .with_context(|| format!("importing {}", image.display())),
        Commands::Preview { scene, output } => commands::preview(&scene, output.as_deref())
            .with_context(|| format!("previewing {}", scene.display())),
    }
}
