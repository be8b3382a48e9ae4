// Tests for command-line parsing and its translation into scene settings.

use clap::Parser;
use wavefield_core::{Scale, UpdateStrategy};
use wavefield_native::cli::{Args, StrategyArg};

fn parse(extra: &[&str]) -> Args {
    let mut argv = vec!["wavefield"];
    argv.extend_from_slice(extra);
    Args::try_parse_from(argv).expect("valid arguments")
}

#[test]
fn defaults_describe_a_short_text_run() {
    let args = parse(&[]);
    assert_eq!(args.fps, 60);
    assert_eq!(args.resolution, 48);
    assert_eq!(args.strategy, StrategyArg::CopySwap);
    assert!(args.wav.is_none());
    assert!(args.scale.is_none());
    assert_eq!(args.frames().expect("frames"), 480);

    let config = args.field_config();
    assert_eq!(config.resolution, 48);
    assert!((config.decay_rate - 0.96).abs() < 1e-6);
    assert_eq!(config.strategy, UpdateStrategy::CopySwap);
}

#[test]
fn field_options_are_forwarded() {
    let args = parse(&[
        "--size",
        "500",
        "--resolution",
        "25",
        "--decay",
        "0.9",
        "--strategy",
        "double-buffer",
        "--seconds",
        "2",
        "--fps",
        "30",
    ]);
    let config = args.field_config();
    assert_eq!(config.width, 500.0);
    assert_eq!(config.height, 500.0);
    assert_eq!(config.resolution, 25);
    assert_eq!(config.strategy, UpdateStrategy::DoubleBuffer);
    assert_eq!(args.frames().expect("frames"), 60);
}

#[test]
fn typed_set_only_touches_that_type() {
    let args = parse(&["--set", "weapon.spreadAngle=45", "--set", "thruster.waveform=square"]);
    let tuning = args.tuning().expect("valid overrides");
    assert_eq!(tuning.weapon.spread_angle, Some(45.0));
    assert!(tuning.explosion.spread_angle.is_none());
    assert_eq!(tuning.thruster.waveform, Some(wavefield_core::Waveform::Square));
}

#[test]
fn untyped_set_applies_to_every_type() {
    let args = parse(&["--set", "gain = 0.3"]);
    let tuning = args.tuning().expect("valid overrides");
    for overrides in [&tuning.thruster, &tuning.weapon, &tuning.explosion, &tuning.default] {
        assert_eq!(overrides.gain, Some(0.3));
    }
}

#[test]
fn global_scale_fills_in_unset_types() {
    let args = parse(&["--scale", "blues", "--set", "weapon.scale=dorian"]);
    assert_eq!(args.scale, Some(Scale::Blues));
    let tuning = args.tuning().expect("valid overrides");
    assert_eq!(tuning.weapon.scale, Some(Scale::Dorian));
    assert_eq!(tuning.thruster.scale, Some(Scale::Blues));
    assert_eq!(tuning.default.scale, Some(Scale::Blues));
}

#[test]
fn unknown_option_names_are_ignored() {
    let args = parse(&["--set", "weapon.sparkle=1"]);
    assert_eq!(args.tuning().expect("ignored"), Default::default());
}

#[test]
fn malformed_overrides_are_errors() {
    assert!(parse(&["--set", "gain"]).tuning().is_err());
    assert!(parse(&["--set", "laser.gain=0.3"]).tuning().is_err());
    assert!(parse(&["--set", "weapon.gain=loud"]).tuning().is_err());
    assert!(Args::try_parse_from(["wavefield", "--scale", "whole-tone"]).is_err());
    assert!(Args::try_parse_from(["wavefield", "--strategy", "triple"]).is_err());
}

#[test]
fn degenerate_timing_is_rejected() {
    assert!(parse(&["--fps", "0"]).frames().is_err());
    assert!(parse(&["--seconds=-1"]).frames().is_err());
}
