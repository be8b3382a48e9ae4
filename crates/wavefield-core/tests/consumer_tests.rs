// Tests for the read-only frame contract and the voice allocator.

use glam::Vec2;
use wavefield_core::*;

fn make_field() -> WaveField {
    WaveField::new(FieldConfig::new(640.0, 640.0, 64)).expect("valid field")
}

fn frame<'a>(field: &'a WaveField, waves: &'a [Wave]) -> FrameView<'a> {
    FrameView {
        field,
        waves,
        time_ms: 0.0,
        delta_time: 1.0 / 60.0,
    }
}

#[test]
fn cell_instances_pack_lit_cells() {
    let mut field = make_field();
    field.add_energy(3, 4, 0.5, 330.0, [255, 0, 0]);
    field.add_energy(10, 10, 0.02, 330.0, [255, 0, 0]);

    let view = frame(&field, &[]);
    let instances = view.cell_instances(0.05);
    assert_eq!(instances.len(), 1);
    let inst = instances[0];
    assert_eq!(inst.pos, [35.0, 45.0]);
    assert_eq!(inst.size, [10.0, 10.0]);
    assert_eq!(inst.energy, 0.5);
    assert_eq!(inst.color[3], 0.5);
    assert!((inst.color[0] - 1.0).abs() < 1e-6);

    // Instances upload as a flat float buffer
    let bytes: &[u8] = bytemuck::cast_slice(&instances);
    assert_eq!(bytes.len(), std::mem::size_of::<CellInstance>());
    assert_eq!(std::mem::size_of::<CellInstance>(), 12 * 4);
}

#[test]
fn centroid_and_dominant_frequency_are_energy_weighted() {
    let mut field = make_field();
    assert!(energy_centroid(&field, 0.05).is_none());
    assert!(dominant_frequency(&field, 0.05).is_none());

    field.add_energy(0, 0, 0.3, 200.0, [0, 0, 255]);
    field.add_energy(2, 0, 0.9, 400.0, [0, 0, 255]);

    let centroid = energy_centroid(&field, 0.05).expect("lit");
    // (5 * 0.3 + 25 * 0.9) / 1.2 = 20
    assert!((centroid - Vec2::new(20.0, 5.0)).length() < 1e-4);
    let freq = dominant_frequency(&field, 0.05).expect("lit");
    assert!((freq - 350.0).abs() < 1e-3);
}

#[test]
fn allocator_merges_nearby_pitches_and_limits_voices() {
    let mut field = make_field();
    for i in 0..12 {
        field.add_energy(i * 4, 5, 0.5, 200.0 + i as f32 * 50.0, [255, 255, 255]);
    }
    // Shares a bucket with the first cell
    field.add_energy(1, 5, 0.5, 201.0, [255, 255, 255]);

    let allocator = VoiceAllocator {
        max_voices: 4,
        ..Default::default()
    };
    let tones = allocator.allocate(&frame(&field, &[]));
    assert_eq!(tones.len(), 4);
    assert!((tones[0].frequency - 200.5).abs() < 0.5, "loudest bucket first");
    let total: f32 = tones.iter().map(|t| t.gain).sum();
    assert!(total <= 0.8 + 1e-5);
    assert!(tones.iter().all(|t| t.waveform == Waveform::Sine));
}

#[test]
fn tone_pan_follows_world_x() {
    let mut field = make_field();
    field.add_energy(0, 10, 0.2, 300.0, [255, 255, 255]);
    field.add_energy(63, 10, 0.2, 600.0, [255, 255, 255]);

    let tones = VoiceAllocator::default().allocate(&frame(&field, &[]));
    let left = tones.iter().find(|t| t.frequency < 400.0).expect("left voice");
    let right = tones.iter().find(|t| t.frequency > 400.0).expect("right voice");
    assert!(left.pan < -0.9);
    assert!(right.pan > 0.9);
    // Quiet fields are not scaled up
    assert!((left.gain - 0.2).abs() < 1e-6);
}

#[test]
fn tones_take_the_waveform_of_the_closest_wave() {
    let mut field = make_field();
    field.add_energy(5, 5, 0.5, 445.0, [255, 255, 255]);
    let mut emitter = Emitter::new(
        EmitterConfig::new(EmitterType::Weapon)
            .with_id("gun")
            .with_seed(1),
    )
    .expect("valid emitter");
    let wave = emitter.emit_wave(1.0, 0.0).expect("active");

    let tones = VoiceAllocator::default().allocate(&frame(&field, std::slice::from_ref(&wave)));
    assert_eq!(tones.len(), 1);
    assert_eq!(tones[0].waveform, Waveform::Square);
}
