//! Compile Tests
//!
//! End-to-end tests for the scene → script pipeline.

use std::f64::consts::FRAC_PI_2;

use approx::assert_abs_diff_eq;
use pretty_assertions::assert_eq;
use tempfile::tempdir;
use test_case::test_case;

use aurafx::geometry::{proximity_order, rise_heights, rotate_about_origin};
use aurafx::scene::{Position, Targeter};
use aurafx::script::{optimize_lines, EffectKind};
use aurafx::{compile, CompileOptions, CompileWarning, Element, ElementKind, Layer, SceneDocument};

/// Layer with white free points at `coords`.
fn layer(name: &str, coords: &[(f64, f64)]) -> Layer {
    let elements = coords
        .iter()
        .map(|&c| Element::new(ElementKind::Free, c))
        .collect();
    Layer::new(name).with_color("#ffffff").with_elements(elements)
}

fn commands(script: &str) -> Vec<&str> {
    script
        .lines()
        .filter(|l| l.starts_with("  - effect") || l.starts_with("  - summon"))
        .collect()
}

// === Scenario Tests ===

#[test]
fn test_reference_scenario() {
    let layers = vec![layer("L1", &[(0.0, 0.0), (1.0, 0.0)])];
    let output = compile(&layers, &CompileOptions::new("Test")).unwrap();

    let expected = "\
Test:
  Skills:
  # L1
  - delay 0
  - effect:particles{p=reddust;c=#ffffff;a=1;size=1;repeat=1;repeatInterval=1} @Origin{xoffset=0.0000;zoffset=0.0000;yoffset=0.0000}
  - effect:particles{p=reddust;c=#ffffff;a=1;size=1;repeat=1;repeatInterval=1} @Origin{xoffset=1.0000;zoffset=0.0000;yoffset=0.0000}
";
    assert_eq!(output.script, expected);
    assert_eq!(output.line_count, 6);
    assert!(output.is_clean());
}

#[test]
fn test_empty_scene_is_header_only() {
    let output = compile(&[], &CompileOptions::new("   ")).unwrap();
    assert_eq!(output.script, "MySkill:\n  Skills:\n");
}

#[test]
fn test_hidden_and_empty_layers_emit_nothing() {
    let mut hidden = layer("Hidden", &[(0.0, 0.0)]);
    hidden.visible = false;
    let layers = vec![hidden, Layer::new("Empty"), layer("Shown", &[(0.0, 0.0)])];

    let output = compile(&layers, &CompileOptions::default()).unwrap();
    let comments: Vec<&str> = output.lines().filter(|l| l.starts_with("  # ")).collect();
    assert_eq!(comments, vec!["  # Shown"]);
}

#[test]
fn test_custom_targeter_is_rendered() {
    let mut l = layer("L", &[(0.0, 0.0)]);
    l.targeter = Targeter::parse("Ring{radius=2}");
    let output = compile(&[l], &CompileOptions::default()).unwrap();
    assert!(commands(&output.script)[0].contains(" @Ring{radius=2}{xoffset="));
}

// === Determinism / Round Trip ===

#[test]
fn test_compile_is_deterministic() {
    let layers = vec![
        layer("A", &[(0.0, 0.0), (3.0, 1.0)]),
        layer("B", &[(2.0, 2.0)]).with_tick_start(10),
    ];
    let mut options = CompileOptions::new("Twice");
    options.modes.rainbow = true;
    options.modes.rotate.enabled = true;

    let first = compile(&layers, &options).unwrap();
    let second = compile(&layers, &options).unwrap();
    assert_eq!(first.script, second.script);
}

#[test]
fn test_round_trip_through_document() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("scene.fxgen");

    let mut a = layer("A", &[(0.5, -1.25), (2.0, 3.0)]);
    a.y_offset = 1.5;
    a.repeat = 3;
    a.repeat_interval = 2;
    a.targeter = Targeter::parse("Self{y=1}");
    a.elements[1] = a.elements[1].clone().with_color("#123456").with_y_offset(0.25);
    let mut b = layer("B", &[(4.0, 4.0)]).with_tick_start(7);
    b.visible = false;
    let layers = vec![a, b];

    SceneDocument::from_layers(&layers).save(&path).unwrap();
    let restored = SceneDocument::load(&path).unwrap().into_layers();

    let options = CompileOptions::new("Round");
    assert_eq!(
        compile(&restored, &options).unwrap().script,
        compile(&layers, &options).unwrap().script
    );
}

#[test]
fn test_document_defaults_for_missing_fields() {
    let json = r#"{"layers":[{"name":"Sparse","elements":[{"position":[1.0,2.0]}]}]}"#;
    let layers = SceneDocument::from_json(json).unwrap().into_layers();

    let l = &layers[0];
    assert_eq!(l.particle, "reddust");
    assert_eq!(l.color, "#ffffff");
    assert_eq!(l.repeat, 1);
    assert_eq!(l.elements[0].kind, ElementKind::Point);
    assert_eq!(l.elements[0].tick_end, Some(20));
    assert_eq!(l.elements[0].position, Position::new(1.0, 2.0));
}

// === Optimizer ===

#[test]
fn test_performance_folds_repeat() {
    let layers = vec![layer("L", &[(0.0, 0.0), (0.0, 0.0), (0.0, 0.0), (1.0, 0.0), (0.0, 0.0)])];
    let mut options = CompileOptions::default();
    options.modes.performance = true;

    let output = compile(&layers, &options).unwrap();
    let cmds = commands(&output.script);
    assert_eq!(cmds.len(), 3);
    assert!(cmds[0].contains("repeat=3;"));
    assert!(cmds[1].contains("repeat=1;"));
    assert!(cmds[2].contains("repeat=1;"));
}

#[test]
fn test_performance_collapses_cloud_runs() {
    let layers = vec![layer("L", &[(0.0, 0.0), (0.0, 0.0), (0.0, 0.0), (2.0, 0.0)])];
    let mut options = CompileOptions::default();
    options.effect_kind = EffectKind::Clouds;
    options.modes.performance = true;

    let output = compile(&layers, &options).unwrap();
    let cmds = commands(&output.script);
    assert_eq!(
        cmds,
        vec![
            "  - summonareaeffectcloud{particle=reddust;d=100;r=1;color=#ffffff} @Origin{xoffset=0.0000;zoffset=0.0000;yoffset=0.0000}",
            "  - summonareaeffectcloud{particle=reddust;d=100;r=1;color=#ffffff} @Origin{xoffset=2.0000;zoffset=0.0000;yoffset=0.0000}",
        ]
    );
    assert!(!output.script.contains("repeat="));
}

#[test_case(1, 4, "repeat=4;" ; "single repeat")]
#[test_case(3, 2, "repeat=6;" ; "multiplied repeat")]
#[test_case(5, 1, "repeat=5;" ; "no run")]
fn test_rle_multiplies_repeat(repeat: u32, run: usize, expected: &str) {
    let mut l = layer("L", &[]);
    l.repeat = repeat;
    l.elements = vec![Element::new(ElementKind::Free, (0.0, 0.0)); run];
    let raw = compile(&[l], &CompileOptions::default()).unwrap();
    let lines: Vec<String> = raw.lines().map(str::to_string).collect();

    let optimized = optimize_lines(&lines);
    let cmds: Vec<&String> = optimized.iter().filter(|l| l.contains("effect:")).collect();
    assert_eq!(cmds.len(), 1);
    assert!(cmds[0].contains(expected));
    assert!(cmds[0].contains("repeatInterval=1}"));
}

// === Geometry ===

#[test]
fn test_rotation_sign_convention() {
    let p = rotate_about_origin(Position::new(1.0, 0.0), FRAC_PI_2);
    assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(p.z, 1.0, epsilon = 1e-6);
}

#[test]
fn test_tour_visits_every_element_once() {
    let elements: Vec<Element> = (0..40)
        .map(|i| {
            let t = i as f64 * 0.7;
            Element::new(ElementKind::Free, (t.cos() * i as f64, t.sin() * 3.0))
        })
        .collect();

    let mut order = proximity_order(&elements);
    assert_eq!(order[0], 0);
    order.sort_unstable();
    assert_eq!(order, (0..40).collect::<Vec<_>>());
}

#[test]
fn test_rise_bound() {
    assert_eq!(
        rise_heights(2.0, 5.0).unwrap().collect::<Vec<_>>(),
        vec![0.0, 2.0, 4.0]
    );

    let mut options = CompileOptions::default();
    options.modes.rise.enabled = true;
    options.modes.rise.speed = 2.0;
    options.modes.rise.limit = 5.0;
    let output = compile(&[layer("L", &[(1.0, 1.0)])], &options).unwrap();

    let heights: Vec<&str> = commands(&output.script)
        .into_iter()
        .map(|l| l.rsplit("yoffset=").next().unwrap_or(""))
        .collect();
    assert_eq!(heights, vec!["0.0000}", "2.0000}", "4.0000}"]);
    assert_eq!(output.lines().filter(|l| *l == "  - delay 3").count(), 3);
}

// === Modes ===

#[test]
fn test_proximity_mode_follows_tour() {
    let mut options = CompileOptions::default();
    options.modes.proximity.enabled = true;
    options.modes.proximity.step = 2;
    options.modes.proximity.delay_ticks = 7;

    let layers = vec![layer("L", &[(0.0, 0.0), (5.0, 0.0), (1.0, 0.0), (2.0, 0.0)])];
    let output = compile(&layers, &options).unwrap();
    let body: Vec<&str> = output.lines().skip(3).collect();

    assert!(body[0].contains("xoffset=0.0000"));
    assert!(body[1].contains("xoffset=1.0000"));
    assert_eq!(body[2], "  - delay 7");
    assert!(body[3].contains("xoffset=2.0000"));
    assert!(body[4].contains("xoffset=5.0000"));
    assert_eq!(body[5], "  - delay 7");
}

#[test]
fn test_rotation_takes_priority() {
    let mut options = CompileOptions::default();
    options.modes.rotate.enabled = true;
    options.modes.local_rotate.enabled = true;
    options.modes.persistent = true;

    let output = compile(&[layer("L", &[(1.0, 0.0)])], &options).unwrap();
    let cmds = commands(&output.script);
    assert!(cmds.len() > 1);
    assert!(cmds.iter().all(|l| l.contains("effect:particles")));
    assert!(cmds[0].contains("xoffset=1.0000;zoffset=0.0000"));
}

#[test]
fn test_rainbow_overrides_colors() {
    let mut options = CompileOptions::default();
    options.modes.rainbow = true;

    let output = compile(&[layer("L", &[(0.0, 0.0), (1.0, 0.0)])], &options).unwrap();
    let cmds = commands(&output.script);
    assert!(cmds.iter().all(|l| !l.contains("c=#ffffff;")));
    assert_ne!(cmds[0], cmds[1].replace("xoffset=1.0000", "xoffset=0.0000"));
}

#[test]
fn test_invalid_rise_is_reported() {
    let mut options = CompileOptions::default();
    options.modes.rise.enabled = true;
    options.modes.rise.speed = 0.0;

    let output = compile(&[layer("L", &[(0.0, 0.0)])], &options).unwrap();
    assert!(matches!(
        output.warnings[0],
        CompileWarning::RiseDisabled { .. }
    ));
    assert!(output.lines().any(|l| l == "  - delay 0"));
}
