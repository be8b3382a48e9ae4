// Tests for the scripted demo scene and the headless run loop.

use clap::Parser;
use glam::Vec2;
use wavefield_core::{EmitterOverrides, FieldConfig, Scale};
use wavefield_native::cli::Args;
use wavefield_native::scene::{EmitterTuning, Scene, SceneConfig, BLAST, CANNON, THRUSTER};

const FRAME: f32 = 1.0 / 60.0;

fn small_config() -> SceneConfig {
    SceneConfig {
        field: FieldConfig::new(600.0, 600.0, 30),
        ..Default::default()
    }
}

fn run_for(scene: &mut Scene, frames: usize) {
    for _ in 0..frames {
        scene.step(FRAME, &mut []);
    }
}

#[test]
fn cannon_fires_volleys_on_cue() {
    let mut scene = Scene::new(small_config()).expect("valid scene");
    run_for(&mut scene, 55);
    let cannon = |s: &Scene| s.simulation().emitter(CANNON).expect("cannon").emitted();
    assert_eq!(cannon(&scene), 0);
    // First volley at 1s, second at 2.5s, three shots each
    run_for(&mut scene, 125);
    assert_eq!(cannon(&scene), 6);
}

#[test]
fn blast_goes_off_after_three_seconds() {
    let mut scene = Scene::new(small_config()).expect("valid scene");
    run_for(&mut scene, 170);
    assert_eq!(scene.simulation().emitter(BLAST).expect("blast").emitted(), 0);
    run_for(&mut scene, 20);
    assert_eq!(scene.simulation().emitter(BLAST).expect("blast").emitted(), 1);
}

#[test]
fn thruster_orbits_the_center() {
    let mut scene = Scene::new(small_config()).expect("valid scene");
    let center = Vec2::new(300.0, 300.0);
    let start = scene.simulation().emitter(THRUSTER).expect("thruster").position;
    assert!(((start - center).length() - 180.0).abs() < 1e-3);

    run_for(&mut scene, 30);
    let later = scene.simulation().emitter(THRUSTER).expect("thruster");
    assert!(((later.position - center).length() - 180.0).abs() < 1e-3);
    assert!((later.position - start).length() > 10.0);
    assert!(later.emitted() > 0);
}

#[test]
fn tuning_reaches_the_emitters() {
    let config = SceneConfig {
        tuning: EmitterTuning {
            weapon: EmitterOverrides {
                spread_angle: Some(90.0),
                ..Default::default()
            },
            ..Default::default()
        }
        .with_scale(Scale::Pentatonic),
        ..small_config()
    };
    let scene = Scene::new(config).expect("valid scene");
    let sim = scene.simulation();
    let cannon = sim.emitter(CANNON).expect("cannon").properties();
    assert_eq!(cannon.spread_angle, 90.0);
    assert_eq!(cannon.scale, Scale::Pentatonic);
    assert_eq!(
        sim.emitter(THRUSTER).expect("thruster").properties().scale,
        Scale::Pentatonic
    );
}

#[test]
fn invalid_field_is_rejected() {
    let config = SceneConfig {
        field: FieldConfig::new(600.0, 600.0, 0),
        ..Default::default()
    };
    assert!(Scene::new(config).is_err());
}

#[test]
fn headless_run_reports_its_work() {
    let args = Args::try_parse_from([
        "wavefield",
        "--seconds",
        "1.5",
        "--resolution",
        "24",
        "--frame-every",
        "0",
    ])
    .expect("valid arguments");
    let summary = wavefield_native::run(&args).expect("run");
    assert_eq!(summary.frames, 90);
    assert!((summary.simulated_ms - 1500.0).abs() < 1.0);
    assert!(summary.waves_emitted > 0);
    assert!(summary.peak_energy > 0.0);
    assert!(summary.audio_seconds.is_none());
}

#[test]
fn headless_run_writes_wav() {
    let path = std::env::temp_dir().join(format!("wavefield-run-{}.wav", std::process::id()));
    let args = Args::try_parse_from([
        "wavefield",
        "--seconds",
        "0.5",
        "--resolution",
        "24",
        "--frame-every",
        "0",
        "--sample-rate",
        "8000",
        "--wav",
        path.to_str().expect("utf8 temp path"),
    ])
    .expect("valid arguments");
    let summary = wavefield_native::run(&args).expect("run");
    let secs = summary.audio_seconds.expect("audio rendered");
    assert!((secs - 0.5).abs() < 1e-2);

    let reader = hound::WavReader::open(&path).expect("readable wav");
    assert_eq!(reader.spec().channels, 2);
    assert_eq!(reader.spec().sample_rate, 8000);
    // Two channels, about 4000 frames
    assert!((reader.len() as i64 - 8000).abs() <= 2, "{} samples", reader.len());
    drop(reader);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn realtime_run_steps_by_measured_time() {
    let args = Args::try_parse_from([
        "wavefield",
        "--seconds",
        "0.1",
        "--resolution",
        "16",
        "--frame-every",
        "0",
        "--realtime",
    ])
    .expect("valid arguments");
    let summary = wavefield_native::run(&args).expect("run");
    assert_eq!(summary.frames, 6);
    // Each measured step sleeps at least one frame and is clamped to 100ms
    assert!(summary.simulated_ms >= 90.0, "{}", summary.simulated_ms);
    assert!(summary.simulated_ms <= 600.0 + 1e-6);
}
