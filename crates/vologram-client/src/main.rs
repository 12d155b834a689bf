//! Vologram viewer.
//!
//! Run: `cargo run -p vologram-client -- <header.vols> <sequence.vols> <texture-dir> [fps]`
//!
//! Controls: Space play/pause, L loop, N normal colors, Right arrow step while
//! paused, left-drag orbit, scroll zoom.

mod camera;
mod player;

use bevy::prelude::*;
use tracing_subscriber::EnvFilter;
use vologram::{PlayerSettings, SessionPaths};

use crate::camera::CameraControllerPlugin;
use crate::player::PlayerPlugin;

const USAGE: &str = "usage: vologram-client <header.vols> <sequence.vols> <texture-dir> [fps]";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let paths = match args.as_slice() {
        [header, sequence, video, ..] => Some(SessionPaths::new(header, sequence, video)),
        _ => {
            tracing::warn!("{USAGE}");
            None
        }
    };
    let video_fps = args.get(3).map_or(0.0, |fps| {
        fps.parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid fps {fps:?}");
            0.0
        })
    });

    let settings = PlayerSettings {
        paths,
        // Bevy scenes are in meters, like the capture.
        unit_scale: 1.0,
        ..PlayerSettings::default()
    };

    App::new()
        .insert_resource(ClearColor(Color::srgb(0.1, 0.1, 0.12)))
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Vologram".into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins((
            PlayerPlugin {
                settings,
                video_fps,
            },
            CameraControllerPlugin,
        ))
        .run();
}
