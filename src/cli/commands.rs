//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::{info, warn};

use super::CompileArgs;
use crate::error::{FxError, Result};
use crate::import::{ObjImport, PixelImport};
use crate::jobs::{spawn_import, spawn_scene_compile, DEFAULT_IMPORT_CHUNK};
use crate::preview::preview_points;
use crate::scene::{ElementSource, Scene, SceneDocument};
use crate::script::{CompileOptions, EffectKind, Progress};

/// Name of the layer every new scene starts with.
const FIRST_LAYER_NAME: &str = "Layer 1";

/// Create an empty scene file.
pub fn new_scene(path: &Path) -> Result<()> {
    info!("Creating new scene at: {}", path.display());
    if path.exists() {
        warn!("Overwriting existing scene: {}", path.display());
    }

    let mut scene = Scene::new();
    scene.add_layer(FIRST_LAYER_NAME, 0);
    scene.to_document().save(path)?;

    println!("Scene created: {}", path.display());
    Ok(())
}

/// Print one line per layer.
pub fn show_info(path: &Path) -> Result<()> {
    info!("Showing scene: {}", path.display());

    let scene = Scene::from_document(SceneDocument::load(path)?);

    if scene.layers().is_empty() {
        println!("No layers in scene.");
        return Ok(());
    }

    println!("Layers:");
    println!("{:-<60}", "");
    for (i, layer) in scene.layers().iter().enumerate() {
        let marker = if layer.visible { "    " } else { "  x " };
        println!(
            "{}{}: {} ({} elements, ticks {}..{}, {} {})",
            marker,
            i,
            layer.name,
            layer.len(),
            layer.tick_start,
            layer.tick_end,
            layer.particle,
            layer.color
        );
    }
    println!("{:-<60}", "");
    println!(
        "Layers: {} | Elements: {}",
        scene.layers().len(),
        scene.element_count()
    );

    Ok(())
}

/// Build compile options from a settings file and flag overrides.
pub fn resolve_options(args: &CompileArgs) -> Result<CompileOptions> {
    let mut options = match &args.config {
        Some(path) => CompileOptions::load(path)?,
        None => CompileOptions::default(),
    };
    let modes = &mut options.modes;

    if let Some(name) = &args.skill_name {
        options.skill_name = name.clone();
    }
    if let Some(speed) = args.rotate {
        modes.rotate.enabled = true;
        modes.rotate.speed = speed;
    }
    if let Some(speed) = args.local_rotate {
        modes.local_rotate.enabled = true;
        modes.local_rotate.speed = speed;
    }
    if let Some(radius) = args.radius {
        modes.local_rotate.radius = radius;
    }
    if args.rise_speed.is_some() || args.rise_limit.is_some() {
        modes.rise.enabled = true;
        modes.rise.speed = args.rise_speed.unwrap_or(modes.rise.speed);
        modes.rise.limit = args.rise_limit.unwrap_or(modes.rise.limit);
    }
    if args.proximity_step.is_some() || args.proximity_delay.is_some() {
        modes.proximity.enabled = true;
        modes.proximity.step = args.proximity_step.unwrap_or(modes.proximity.step);
        modes.proximity.delay_ticks = args.proximity_delay.unwrap_or(modes.proximity.delay_ticks);
    }
    modes.persistent |= args.persistent;
    modes.rainbow |= args.rainbow;
    modes.performance |= args.performance;
    if args.clouds {
        options.effect_kind = EffectKind::Clouds;
    }
    if let Some(y) = args.y_offset {
        options.global_y_offset = y;
    }

    Ok(options)
}

/// Compile a scene on a worker thread and print or write the script.
pub fn compile_scene(
    path: &Path,
    args: &CompileArgs,
    output: Option<&Path>,
    strict: bool,
) -> Result<()> {
    info!("Compiling scene: {}", path.display());

    let options = resolve_options(args)?;
    let scene = Scene::from_document(SceneDocument::load(path)?).into_shared();
    let job = spawn_scene_compile(&scene, options)?;

    // The channel closes when the worker finishes.
    for progress in job.progress().iter() {
        match progress {
            Progress::Processing(f) => info!("Processing: {:.0}%", f * 100.0),
            Progress::Writing(f) => info!("Writing: {:.0}%", f * 100.0),
        }
    }

    let compiled = job.wait()?;
    for warning in &compiled.warnings {
        warn!("{}", warning);
    }
    if strict {
        compiled.check_faults()?;
    }

    match output {
        Some(out) => {
            fs::write(out, &compiled.script).map_err(|e| FxError::FileWriteError {
                path: out.to_path_buf(),
                source: e,
            })?;
            println!(
                "Script written: {} ({} lines, {} commands)",
                out.display(),
                compiled.line_count,
                compiled.command_count()
            );
        }
        None => print!("{}", compiled.script),
    }

    Ok(())
}

/// Run an element source against one layer of a saved scene, then save it.
fn import_into<S>(path: &Path, layer: usize, source: S) -> Result<()>
where
    S: ElementSource + Send + 'static,
{
    let mut scene = Scene::from_document(SceneDocument::load(path)?);
    if scene.layers().is_empty() {
        scene.add_layer(FIRST_LAYER_NAME, 0);
    }
    let shared = scene.into_shared();

    let job = spawn_import(Arc::clone(&shared), layer, source, DEFAULT_IMPORT_CHUNK);
    let summary = job.wait()?;

    let document = shared
        .read()
        .map_err(|_| FxError::LockPoisoned)?
        .to_document();
    document.save(path)?;

    println!(
        "Imported {} of {} elements into layer {}",
        summary.appended, summary.total, layer
    );
    Ok(())
}

pub fn import_obj(path: &Path, obj: &Path, layer: usize, scale: f64, performance: bool) -> Result<()> {
    info!("Importing mesh {} into {}", obj.display(), path.display());

    let source = ObjImport::from_file(obj)?
        .with_scale(scale)
        .with_performance(performance);
    info!("Mesh has {} vertices", source.vertex_count());
    import_into(path, layer, source)
}

pub fn import_image(
    path: &Path,
    image: &Path,
    layer: usize,
    size: u32,
    real_color: bool,
    performance: bool,
) -> Result<()> {
    info!("Importing image {} into {}", image.display(), path.display());

    let source = PixelImport::open(image)?
        .with_size(size)
        .with_real_color(real_color)
        .with_performance(performance);
    info!("Sampling at {}x{}", source.target_size(), source.target_size());
    import_into(path, layer, source)
}

/// Dump preview points as JSON.
pub fn preview(path: &Path, output: Option<&Path>) -> Result<()> {
    info!("Building preview for: {}", path.display());

    let layers = SceneDocument::load(path)?.into_layers();
    let points = preview_points(&layers);
    let json = serde_json::to_string_pretty(&points)?;

    match output {
        Some(out) => {
            fs::write(out, json).map_err(|e| FxError::FileWriteError {
                path: out.to_path_buf(),
                source: e,
            })?;
            println!("Preview written: {} ({} points)", out.display(), points.len());
        }
        None => println!("{}", json),
    }

    Ok(())
}
