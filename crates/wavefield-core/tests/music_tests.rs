// Host-side tests for pitch conversion and scale quantization.

use wavefield_core::*;

const ALL_SCALES: [Scale; 10] = [
    Scale::Major,
    Scale::Minor,
    Scale::Pentatonic,
    Scale::Blues,
    Scale::Dorian,
    Scale::Phrygian,
    Scale::Lydian,
    Scale::Mixolydian,
    Scale::Locrian,
    Scale::Chromatic,
];

#[test]
fn midi_to_hz_matches_a4_and_octave() {
    let a4 = midi_to_hz(69.0);
    assert!((a4 - 440.0).abs() < 1e-4);
    let a5 = midi_to_hz(81.0);
    assert!((a5 - 880.0).abs() < 1e-3);
    assert!((a5 / a4 - 2.0).abs() < 1e-4);
}

#[test]
fn midi_to_hz_is_monotonic_over_range() {
    let mut prev = midi_to_hz(20.0);
    for m in 21..=100 {
        let f = midi_to_hz(m as f32);
        assert!(f > prev, "frequency not increasing at midi {m}");
        prev = f;
    }
}

#[test]
fn hz_to_midi_inverts_midi_to_hz() {
    for m in 20..110 {
        let back = hz_to_midi(midi_to_hz(m as f32));
        assert!((back - m as f32).abs() < 1e-3, "midi {m} came back as {back}");
    }
}

#[test]
fn snap_keeps_in_scale_tones() {
    // A4 and B4 are in C major
    assert!((snap_to_scale(440.0, Scale::Major) - 440.0).abs() < 0.01);
    assert!((snap_to_scale(midi_to_hz(71.0), Scale::Major) - midi_to_hz(71.0)).abs() < 0.01);
}

#[test]
fn snap_moves_to_nearest_degree() {
    // Slightly sharp of C4 (~0.56 semitones) goes back down to C4
    let c4 = midi_to_hz(60.0);
    assert!((snap_to_scale(270.0, Scale::Major) - c4).abs() < 0.01);
    // A little above F#4 lands on G4 rather than F4
    let g4 = midi_to_hz(67.0);
    assert!((snap_to_scale(midi_to_hz(66.3), Scale::Major) - g4).abs() < 0.01);
}

#[test]
fn snap_wraps_to_next_octave_root() {
    // B4 is not in the pentatonic set; C5 (one semitone up) beats A4 (two down)
    let snapped = snap_to_scale(midi_to_hz(71.0), Scale::Pentatonic);
    assert!((snapped - midi_to_hz(72.0)).abs() < 0.01, "got {snapped}");
}

#[test]
fn snap_works_below_reference_pitch() {
    // A2 is in C major, two octaves below A4
    let a2 = midi_to_hz(45.0);
    assert!((snap_to_scale(a2 * 1.01, Scale::Major) - a2).abs() < 0.01);
}

#[test]
fn snapped_tones_are_scale_members() {
    for scale in ALL_SCALES {
        let degrees = scale.degrees();
        let mut f = 30.0_f32;
        while f < 8000.0 {
            let snapped = snap_to_scale(f, scale);
            if scale != Scale::Chromatic {
                let semis = (hz_to_midi(snapped) - 60.0).round() as i32;
                let degree = semis.rem_euclid(12);
                assert!(
                    degrees.contains(&degree) || (degree == 0 && degrees.contains(&12)),
                    "{f} Hz snapped to {snapped} Hz, degree {degree} not in {scale}"
                );
            }
            f *= 1.013;
        }
    }
}

#[test]
fn snap_is_idempotent() {
    for scale in ALL_SCALES {
        let mut f = 20.0_f32;
        while f < 10_000.0 {
            let once = snap_to_scale(f, scale);
            let twice = snap_to_scale(once, scale);
            assert!(
                (once - twice).abs() <= once * 1e-5,
                "{scale}: {f} -> {once} -> {twice}"
            );
            f *= 1.007;
        }
    }
}

#[test]
fn chromatic_and_invalid_input_pass_through() {
    assert_eq!(snap_to_scale(123.4, Scale::Chromatic), 123.4);
    assert_eq!(snap_to_scale(0.0, Scale::Major), 0.0);
    assert_eq!(snap_to_scale(-5.0, Scale::Major), -5.0);
    assert!(snap_to_scale(f32::NAN, Scale::Major).is_nan());
}

#[test]
fn scale_names_parse_and_display() {
    for scale in ALL_SCALES {
        assert_eq!(scale.to_string().parse::<Scale>().unwrap(), scale);
    }
    assert_eq!("IONIAN".parse::<Scale>().unwrap(), Scale::Major);
    assert_eq!("aeolian".parse::<Scale>().unwrap(), Scale::Minor);
    assert!(matches!(
        "whole-tone".parse::<Scale>(),
        Err(ConfigError::UnknownScale(_))
    ));
}

#[test]
fn waveform_and_filter_names_parse() {
    assert_eq!("sine".parse::<Waveform>().unwrap(), Waveform::Sine);
    assert_eq!("Sawtooth".parse::<Waveform>().unwrap(), Waveform::Saw);
    assert_eq!("square".parse::<Waveform>().unwrap(), Waveform::Square);
    assert_eq!("triangle".parse::<Waveform>().unwrap(), Waveform::Triangle);
    assert!("noise".parse::<Waveform>().is_err());
    assert_eq!("highpass".parse::<FilterType>().unwrap(), FilterType::Highpass);
    assert!(matches!(
        "comb".parse::<FilterType>(),
        Err(ConfigError::UnknownFilter(_))
    ));
}
