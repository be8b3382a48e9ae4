// Tests for the offline synthesizer backend.

use std::f32::consts::PI;
use std::io::Cursor;
use wavefield_core::{AudioBackend, Tone, Waveform};
use wavefield_native::synth::{render_wave_sample, SoftwareSynth};

fn tone(frequency: f32, gain: f32, pan: f32) -> Tone {
    Tone {
        frequency,
        gain,
        pan,
        waveform: Waveform::Sine,
    }
}

#[test]
fn waveforms_stay_in_range() {
    for waveform in [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Saw,
        Waveform::Triangle,
    ] {
        for i in 0..200 {
            let phase = i as f32 * 0.1;
            let s = render_wave_sample(phase, waveform);
            assert!((-1.0..=1.0).contains(&s), "{waveform:?} at {phase}: {s}");
        }
    }
    assert!((render_wave_sample(PI / 2.0, Waveform::Sine) - 1.0).abs() < 1e-6);
    assert!((render_wave_sample(0.0, Waveform::Saw) + 1.0).abs() < 1e-6);
    assert!((render_wave_sample(PI, Waveform::Triangle) - 1.0).abs() < 1e-5);
    assert_eq!(render_wave_sample(0.5, Waveform::Square), 1.0);
}

#[test]
fn no_tones_render_silence() {
    let mut synth = SoftwareSynth::new(1000);
    synth.render(&[], 0.1);
    assert_eq!(synth.frames(), 100);
    assert!(synth.samples().iter().all(|s| *s == 0.0));
}

#[test]
fn fractional_frames_carry_over() {
    let mut synth = SoftwareSynth::new(44_100);
    for _ in 0..60 {
        synth.render(&[], 1.0 / 60.0);
    }
    assert!((synth.frames() as i64 - 44_100).abs() <= 1, "{}", synth.frames());
    assert!((synth.duration_secs() - 1.0).abs() < 1e-3);
}

#[test]
fn tones_are_audible_and_bounded() {
    let mut synth = SoftwareSynth::new(8000);
    synth.render(&[tone(440.0, 0.8, 0.0)], 0.25);
    let peak = synth.peak();
    assert!(peak > 0.3, "peak {peak}");
    assert!(peak < 1.0);
    assert_eq!(synth.voice_count(), 1);
}

#[test]
fn hard_left_pan_silences_the_right_channel() {
    let mut synth = SoftwareSynth::new(8000);
    synth.render(&[tone(300.0, 0.5, -1.0)], 0.1);
    let (mut left, mut right) = (0.0f32, 0.0f32);
    for frame in synth.samples().chunks(2) {
        left = left.max(frame[0].abs());
        right = right.max(frame[1].abs());
    }
    assert!(left > 0.1);
    assert!(right < 1e-4);
}

#[test]
fn close_tones_keep_their_oscillator() {
    let mut synth = SoftwareSynth::new(8000);
    synth.render(&[tone(440.0, 0.5, 0.0)], 0.05);
    synth.render(&[tone(441.0, 0.5, 0.0)], 0.05);
    assert_eq!(synth.voice_count(), 1);

    synth.render(&[tone(441.0, 0.5, 0.0), tone(660.0, 0.2, 0.0)], 0.05);
    assert_eq!(synth.voice_count(), 2);
}

#[test]
fn dropped_tones_glide_out() {
    let mut synth = SoftwareSynth::new(8000);
    synth.render(&[tone(440.0, 0.5, 0.0)], 0.1);
    synth.render(&[], 0.005);
    assert_eq!(synth.voice_count(), 1, "still releasing");
    synth.render(&[], 0.1);
    assert_eq!(synth.voice_count(), 0);

    let tail = &synth.samples()[synth.samples().len() - 20..];
    assert!(tail.iter().all(|s| s.abs() < 1e-3));
}

#[test]
fn wav_output_round_trips_through_hound() {
    let mut synth = SoftwareSynth::new(8000);
    synth.render(&[tone(220.0, 0.4, 0.3)], 0.1);

    let mut buffer = Cursor::new(Vec::new());
    synth.write_wav_to(&mut buffer).expect("encode");
    buffer.set_position(0);

    let reader = hound::WavReader::new(buffer).expect("decode");
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 8000);
    assert_eq!(spec.sample_format, hound::SampleFormat::Float);
    let decoded: Vec<f32> = reader
        .into_samples::<f32>()
        .collect::<Result<_, _>>()
        .expect("samples");
    assert_eq!(decoded, synth.samples());
}
