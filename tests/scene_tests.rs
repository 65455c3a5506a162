//! Scene Tests
//!
//! Editing, history, persistence and background jobs working together.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use image::{Rgba, RgbaImage};
use tempfile::tempdir;

use aurafx::import::{CanvasFrame, Mirror, ObjImport, PixelImport, Shape, ShapeTool};
use aurafx::jobs::{spawn_compile, spawn_import, spawn_scene_compile};
use aurafx::preview::preview_points;
use aurafx::scene::{ActionType, LayerEdit, Position};
use aurafx::state::{spawn_autosave_loop, AutosaveManager, AutosaveSettings};
use aurafx::{
    compile, CompileOptions, Compiler, Element, ElementKind, FxError, Layer, Progress, Scene,
    SceneDocument,
};

fn points(n: usize) -> Vec<Element> {
    (0..n)
        .map(|i| Element::new(ElementKind::Free, (i as f64, 0.0)))
        .collect()
}

// === History ===

#[test]
fn test_undo_redo_across_edits() {
    let mut scene = Scene::new();
    scene.add_layer("Layer 1", 0);
    scene.append_elements(0, points(3)).unwrap();
    scene.set_layer_color(0, "#00ff00").unwrap();
    scene
        .edit_layer(0, LayerEdit::Particle("flame".to_string()))
        .unwrap();

    scene.undo().unwrap();
    assert_eq!(scene.layer(0).unwrap().particle, "reddust");
    scene.undo().unwrap();
    assert_eq!(scene.layer(0).unwrap().color, "#000000");
    assert_eq!(scene.layer(0).unwrap().elements[0].color, None);

    scene.redo().unwrap();
    assert_eq!(scene.layer(0).unwrap().color, "#00ff00");

    // A new edit drops the redo tail.
    scene.rename_layer(0, "Renamed").unwrap();
    assert!(matches!(scene.redo(), Err(FxError::NothingToRedo)));
    assert_eq!(scene.history().current().action_type, ActionType::LayerEdit);
}

#[test]
fn test_history_is_bounded() {
    let mut scene = Scene::new();
    scene.add_layer("L", 0);
    for i in 0..80 {
        scene.rename_layer(0, format!("L{}", i)).unwrap();
    }
    assert_eq!(scene.history().entries().len(), scene.history().max_entries());

    while scene.history().can_undo() {
        scene.undo().unwrap();
    }
    assert_eq!(scene.layers().len(), 1);
    assert_ne!(scene.layer(0).unwrap().name, "L79");
}

#[test]
fn test_compile_ignores_later_edits() {
    let mut scene = Scene::new();
    scene.add_layer("L", 0);
    scene.append_elements(0, points(2)).unwrap();

    let snapshot = scene.snapshot();
    scene.append_elements(0, points(5)).unwrap();

    let output = compile(&snapshot, &CompileOptions::default()).unwrap();
    assert_eq!(output.command_count(), 2);
}

// === Element Providers ===

#[test]
fn test_shape_tool_import_is_one_undo_step() {
    let mut scene = Scene::new();
    scene.add_layer("L", 0);

    let circle = ShapeTool::click(ElementKind::Circle, 400.0, 300.0, 40.0, 6).unwrap();
    let tool = ShapeTool::new(circle, CanvasFrame::default()).with_mirror(Mirror::X);
    let added = scene.import(0, &tool).unwrap();
    assert_eq!(added, 12);
    assert_eq!(scene.history().current().description, "Draw circle");

    scene.undo().unwrap();
    assert!(scene.layer(0).unwrap().is_empty());
}

#[test]
fn test_free_point_maps_canvas_center_to_origin() {
    let mut scene = Scene::new();
    scene.add_layer("L", 0);
    let tool = ShapeTool::new(Shape::Point { x: 400.0, y: 300.0 }, CanvasFrame::default());
    scene.import(0, &tool).unwrap();
    assert_eq!(
        scene.layer(0).unwrap().elements[0].position,
        Position::new(0.0, 0.0)
    );
}

#[test]
fn test_obj_and_image_imports_from_disk() {
    let temp = tempdir().unwrap();
    let obj = temp.path().join("tri.obj");
    std::fs::write(&obj, "o tri\nv 1 2 3\nv 0 0 0\nv -1 0.5 2\nf 1 2 3\n").unwrap();
    let png = temp.path().join("dot.png");
    RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255]))
        .save(&png)
        .unwrap();

    let mut scene = Scene::new();
    scene.add_layer("Mesh", 0);
    scene.add_layer("Picture", 0);

    let mesh = ObjImport::from_file(&obj).unwrap().with_scale(2.0);
    scene.import(0, &mesh).unwrap();
    let first = &scene.layer(0).unwrap().elements[0];
    assert_eq!(first.position, Position::new(2.0, -6.0));
    assert_eq!(first.y_offset, 4.0);

    scene.append_elements(1, points(3)).unwrap();
    let picture = PixelImport::open(&png).unwrap().with_size(8);
    scene.import(1, &picture).unwrap();
    let layer = scene.layer(1).unwrap();
    assert_eq!(layer.len(), 16);
    assert!(layer.elements.iter().all(|e| e.kind == ElementKind::Image));
}

#[test]
fn test_obj_parse_error_has_line() {
    let err = ObjImport::parse("v 1 2 3\nv 1 two 3\n").unwrap_err();
    assert!(matches!(err, FxError::ObjParse { line: 2, .. }));
}

// === Background Jobs ===

#[test]
fn test_compile_job_progress_ends_at_one() {
    let layers = vec![
        Layer::new("A").with_elements(points(150)),
        Layer::new("B").with_tick_start(5).with_elements(points(50)),
    ];
    let direct = compile(&layers, &CompileOptions::default()).unwrap();

    let job = spawn_compile(layers, CompileOptions::default());
    let reports: Vec<Progress> = job.progress().iter().collect();
    let output = job.wait().unwrap();

    assert_eq!(output, direct);
    assert_eq!(
        reports
            .iter()
            .filter(|p| matches!(p, Progress::Processing(_)))
            .collect::<Vec<_>>(),
        vec![&Progress::Processing(0.75), &Progress::Processing(1.0)]
    );
    assert_eq!(reports.last(), Some(&Progress::Writing(1.0)));
}

#[test]
fn test_cancel_between_layers() {
    let layers = vec![
        Layer::new("A").with_elements(points(2)),
        Layer::new("B").with_elements(points(2)),
    ];
    let options = CompileOptions::default();
    let flag = AtomicBool::new(false);

    let result = Compiler::new(&options)
        .with_cancel(&flag)
        .with_progress(|_| flag.store(true, std::sync::atomic::Ordering::Relaxed))
        .compile(&layers);
    assert!(matches!(result, Err(FxError::Cancelled)));
}

#[test]
fn test_scene_compile_uses_snapshot() {
    let mut scene = Scene::new();
    scene.add_layer("L", 0);
    scene.append_elements(0, points(4)).unwrap();
    let shared = scene.into_shared();

    let job = spawn_scene_compile(&shared, CompileOptions::default()).unwrap();
    shared.write().unwrap().clear_layer(0).unwrap();
    assert_eq!(job.wait().unwrap().command_count(), 4);
}

#[test]
fn test_import_job_replaces_and_reports() {
    let mut scene = Scene::new();
    scene.add_layer("L", 0);
    scene.append_elements(0, points(7)).unwrap();
    let shared = scene.into_shared();

    let image = image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        20,
        20,
        Rgba([255, 255, 255, 255]),
    ));
    let source = PixelImport::from_image(image).with_real_color(true);
    let job = spawn_import(Arc::clone(&shared), 0, source, 30);
    let fractions: Vec<f64> = job.progress().iter().collect();
    let summary = job.wait().unwrap();

    assert_eq!(summary.total, 100);
    assert_eq!(summary.appended, 100);
    assert_eq!(fractions.len(), 4);
    assert_eq!(fractions.last(), Some(&1.0));

    let scene = shared.read().unwrap();
    assert_eq!(scene.layer(0).unwrap().len(), 100);
}

// === Persistence ===

#[test]
fn test_autosave_loop_writes_and_stops() {
    let temp = tempdir().unwrap();
    let mut scene = Scene::new();
    scene.add_layer("L", 0);
    scene.append_elements(0, points(2)).unwrap();
    let shared = scene.into_shared();

    let settings = AutosaveSettings {
        interval_seconds: 0,
        ..AutosaveSettings::default()
    };
    let manager = AutosaveManager::with_settings(temp.path().join("backups"), settings);
    let running = spawn_autosave_loop(manager, Arc::clone(&shared));

    let backups = temp.path().join("backups");
    let mut latest = None;
    for _ in 0..50 {
        latest = AutosaveManager::get_latest_autosave(&backups).unwrap();
        if latest.is_some() {
            break;
        }
        thread::sleep(Duration::from_millis(20));
    }
    let manager = running.stop().unwrap();
    assert!(manager.last_save_time.is_some());

    let restored = Scene::from_document(SceneDocument::load(&latest.unwrap()).unwrap());
    assert_eq!(restored.layers().len(), 1);
    assert_eq!(restored.element_count(), 2);
}

#[test]
fn test_preview_uses_raw_coordinates() {
    let mut layer = Layer::new("L").with_color("#0000ff");
    layer.y_offset = 10.0;
    layer.add_element(Element::new(ElementKind::Obj, (3.0, -4.0)).with_y_offset(1.5));

    let points = preview_points(&[layer]);
    assert_eq!(points.len(), 1);
    assert_eq!((points[0].x, points[0].y, points[0].z), (3.0, 1.5, -4.0));
    assert_eq!(points[0].rgb().unwrap(), (0, 0, 255));
}
