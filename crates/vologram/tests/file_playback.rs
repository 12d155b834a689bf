mod common;

use std::fs::File;
use std::io::Write;
use std::path::Path;

use common::{RecordingMesh, RecordingObserver, RecordingTextures};
use glam::{Vec2, Vec3, Vec4};
use image::{Rgb, RgbImage};
use vologram::{
    ImageSequenceDecoder, PlaybackPhase, Player, PlayerSettings, SessionPaths, VolFileDecoder,
};
use vologram_decode::{FrameBuilder, Header};

const FRAMES: u32 = 3;

fn write_fixture(dir: &Path) -> SessionPaths {
    let header = Header {
        frame_count: FRAMES,
        has_normals: true,
        format_version: 11,
        ..Header::default()
    };
    let quad = [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::new(1.0, 1.0, 0.0)];
    let normals = [Vec3::Z; 4];

    let header_path = dir.join("header.vols");
    let sequence_path = dir.join("sequence_0.vols");
    std::fs::write(&header_path, header.to_bytes()).unwrap();

    let mut sequence = File::create(&sequence_path).unwrap();
    let key = FrameBuilder::keyframe(0)
        .vertices(&quad)
        .normals(&normals)
        .uvs(&[Vec2::ZERO, Vec2::X, Vec2::Y, Vec2::ONE])
        .triangles(&[0, 1, 2, 2, 1, 3]);
    sequence.write_all(&key.to_bytes(&header)).unwrap();
    for i in 1..FRAMES {
        let moved: Vec<Vec3> = quad.iter().map(|p| *p + Vec3::Z * i as f32).collect();
        let delta = FrameBuilder::delta(i).vertices(&moved).normals(&normals);
        sequence.write_all(&delta.to_bytes(&header)).unwrap();
    }

    let video_dir = dir.join("texture");
    std::fs::create_dir(&video_dir).unwrap();
    for i in 0..FRAMES {
        let value = u8::try_from(i * 50).unwrap();
        RgbImage::from_pixel(4, 2, Rgb([value, 0, 0]))
            .save(video_dir.join(format!("frame_{i:05}.png")))
            .unwrap();
    }

    SessionPaths::new(header_path, sequence_path, video_dir)
}

#[test]
fn plays_files_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_fixture(dir.path());

    let observer = RecordingObserver::default();
    let mut player = Player::new(
        VolFileDecoder::new(),
        ImageSequenceDecoder::new(0.0),
        PlayerSettings {
            paths: Some(paths),
            ..PlayerSettings::default()
        },
    )
    .with_observer(observer.clone());
    let mut mesh = RecordingMesh::default();
    let mut textures = RecordingTextures::default();

    // First tick loads and shows frame 0.
    player.advance(0.0, &mut mesh, &mut textures);
    assert_eq!(player.phase(), PlaybackPhase::Playing);
    assert_eq!(player.frame_count(), FRAMES);
    assert!((player.state().fps - 30.0).abs() < f64::EPSILON);

    let buffers = player.mesh();
    assert_eq!(buffers.vertex_count(), 4);
    assert_eq!(buffers.triangle_count(), 2);
    assert_eq!(buffers.indices, vec![0, 2, 1, 2, 3, 1]);
    assert_eq!(buffers.normals, vec![Vec3::X; 4]);
    assert_eq!(buffers.colors, vec![Vec4::new(1.0, 0.0, 0.0, 1.0); 4]);
    assert_eq!(buffers.uvs[0], Vec2::new(0.0, 1.0));
    assert_eq!(textures.uploads, vec![0]);
    assert_eq!(textures.bound[0].1, "colour");

    player.advance(1.0 / 30.0, &mut mesh, &mut textures);
    assert_eq!(player.state().current_frame, 1);
    // Source Z offset lands on render X.
    assert_eq!(player.mesh().vertices[0], Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(textures.uploads, vec![0, 50]);

    player.advance(1.0 / 30.0, &mut mesh, &mut textures);
    player.advance(1.0 / 30.0, &mut mesh, &mut textures);
    assert_eq!(player.state().current_frame, 0);
    assert_eq!(player.phase(), PlaybackPhase::Looped);
    assert_eq!(textures.uploads, vec![0, 50, 100, 0]);
    assert_eq!(mesh.rebuilds, 2);
    assert_eq!(mesh.updates, 2);
    assert_eq!(observer.count("calibrated"), 1);
}

#[test]
fn default_observer_logs_through_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let dir = tempfile::tempdir().unwrap();
    let paths = write_fixture(dir.path());
    let mut player = Player::new(
        VolFileDecoder::new(),
        ImageSequenceDecoder::new(30.0),
        PlayerSettings::default(),
    );
    let mut mesh = RecordingMesh::default();
    let mut textures = RecordingTextures::default();

    player.load(paths, &mut textures).unwrap();
    for _ in 0..5 {
        player.advance(1.0 / 30.0, &mut mesh, &mut textures);
    }
    player.close();
    assert_eq!(player.phase(), PlaybackPhase::Unloaded);
}

#[test]
fn missing_video_leaves_player_unloaded() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = write_fixture(dir.path());
    paths.video = dir.path().join("missing");

    let observer = RecordingObserver::default();
    let mut player = Player::new(
        VolFileDecoder::new(),
        ImageSequenceDecoder::new(30.0),
        PlayerSettings::default(),
    )
    .with_observer(observer.clone());
    let mut textures = RecordingTextures::default();

    assert!(player.load(paths, &mut textures).is_err());
    assert_eq!(player.phase(), PlaybackPhase::Unloaded);
    assert!(player.header().is_none());
    assert_eq!(observer.events(), vec!["load_failed"]);
}
