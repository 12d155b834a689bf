//! Vologram playback inside Bevy.
//!
//! The [`Player`] lives in a resource and is driven once per frame. Mesh and
//! texture updates go through short-lived sinks wrapping the asset stores, so
//! the player never holds on to Bevy borrows.

use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use vologram::{
    DEFAULT_TEXTURE_PARAMETER, ImageSequenceDecoder, MeshSink, PlaybackPhase, Player,
    PlayerSettings, ResourceError, TextureHandle, TextureSink, VolFileDecoder,
};
use vologram_decode::MeshBuffers;

/// Plugin for vologram playback.
pub struct PlayerPlugin {
    pub settings: PlayerSettings,
    /// Frame rate reported for the image sequence; zero falls back.
    pub video_fps: f64,
}

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        let player = Player::new(
            VolFileDecoder::new(),
            ImageSequenceDecoder::new(self.video_fps),
            self.settings.clone(),
        );
        app.insert_resource(VologramPlayer(player))
            .init_resource::<TextureSlots>()
            .init_resource::<DebugView>()
            .add_systems(Startup, spawn_vologram)
            .add_systems(Update, (playback_controls, drive_player).chain());
    }
}

/// The player driving the scene's vologram.
#[derive(Resource)]
pub struct VologramPlayer(pub Player<VolFileDecoder, ImageSequenceDecoder>);

/// Debug toggles.
#[derive(Resource, Default)]
pub struct DebugView {
    /// Show the per-vertex normal colors instead of the video texture.
    pub normal_colors: bool,
}

/// Marker for the entity showing the vologram.
#[derive(Component)]
pub struct Vologram;

/// Bevy images behind the player's texture handles.
#[derive(Resource, Default)]
pub struct TextureSlots {
    next: u64,
    images: HashMap<TextureHandle, Handle<Image>>,
}

impl TextureSlots {
    fn insert(&mut self, image: Handle<Image>) -> TextureHandle {
        self.next += 1;
        let handle = TextureHandle(self.next);
        self.images.insert(handle, image);
        handle
    }

    fn get(&self, handle: TextureHandle) -> Option<&Handle<Image>> {
        self.images.get(&handle)
    }
}

/// Spawn the mesh entity the player writes into.
///
/// Vologram geometry is Z-up; the entity starts rotated into Bevy's Y-up, and
/// the player's calibration composes on top of that.
fn spawn_vologram(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    let material = StandardMaterial {
        base_color: Color::WHITE,
        unlit: true,
        double_sided: true,
        cull_mode: None,
        ..default()
    };

    commands.spawn((
        Mesh3d(meshes.add(mesh)),
        MeshMaterial3d(materials.add(material)),
        Transform::from_rotation(Quat::from_rotation_x(-FRAC_PI_2)),
        Vologram,
    ));
}

/// Space toggles playback, L toggles looping, N toggles normal colors.
#[allow(clippy::needless_pass_by_value)]
fn playback_controls(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut player: ResMut<VologramPlayer>,
    mut debug: ResMut<DebugView>,
) {
    let player = &mut player.0;

    if keyboard.just_pressed(KeyCode::Space) {
        if player.state().playing {
            player.pause();
        } else {
            player.play();
        }
        tracing::info!(playing = player.state().playing, "Toggled playback");
    }

    if keyboard.just_pressed(KeyCode::KeyL) {
        let looping = !player.state().looping;
        player.set_loop(looping);
        tracing::info!(looping, "Toggled looping");
    }

    if keyboard.just_pressed(KeyCode::KeyN) {
        debug.normal_colors = !debug.normal_colors;
        let normal_colors = debug.normal_colors;
        tracing::info!(normal_colors, "Toggled normal colors");
    }
}

/// Advance the player and push its output into the scene.
///
/// Right arrow steps one frame of geometry while paused.
#[allow(clippy::needless_pass_by_value, clippy::too_many_arguments)]
fn drive_player(
    time: Res<Time>,
    keyboard: Res<ButtonInput<KeyCode>>,
    debug: Res<DebugView>,
    mut player: ResMut<VologramPlayer>,
    mut slots: ResMut<TextureSlots>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut query: Query<(&Mesh3d, &MeshMaterial3d<StandardMaterial>, &mut Transform), With<Vologram>>,
) {
    let Ok((mesh, material, mut transform)) = query.single_mut() else {
        return;
    };
    let player = &mut player.0;

    let mut mesh_sink = BevyMeshSink {
        meshes: &mut meshes,
        mesh: &mesh.0,
        transform: &mut transform,
        normal_colors: debug.normal_colors,
    };
    let mut texture_sink = BevyTextureSink {
        images: &mut images,
        materials: &mut materials,
        material: &material.0,
        slots: &mut slots,
    };

    let paused = player.phase() == PlaybackPhase::MetaLoaded;
    let shown = player.state().last_frame_index;
    let reshow = shown.filter(|_| paused && debug.is_changed() && !debug.is_added());
    let step = shown
        .filter(|_| paused && keyboard.just_pressed(KeyCode::ArrowRight))
        .map(|frame| frame + 1)
        .filter(|&frame| frame < player.frame_count());

    if let Some(frame) = step.or(reshow) {
        if let Err(e) = player.set_frame(frame, false, &mut mesh_sink, &mut texture_sink) {
            tracing::warn!(frame, "Failed to show frame: {}", e);
        }
        return;
    }

    player.advance(time.delta_secs_f64(), &mut mesh_sink, &mut texture_sink);
}

fn to_bevy_transform(affine: glam::Affine3A) -> Transform {
    let (scale, rotation, translation) = affine.to_scale_rotation_translation();
    Transform {
        translation: Vec3::from_array(translation.to_array()),
        rotation: Quat::from_array(rotation.to_array()),
        scale: Vec3::from_array(scale.to_array()),
    }
}

fn to_affine(transform: &Transform) -> glam::Affine3A {
    glam::Affine3A::from_scale_rotation_translation(
        glam::Vec3::from_array(transform.scale.to_array()),
        glam::Quat::from_array(transform.rotation.to_array()),
        glam::Vec3::from_array(transform.translation.to_array()),
    )
}

/// Writes [`MeshBuffers`] into a Bevy mesh asset.
struct BevyMeshSink<'a> {
    meshes: &'a mut Assets<Mesh>,
    mesh: &'a Handle<Mesh>,
    transform: &'a mut Transform,
    normal_colors: bool,
}

impl BevyMeshSink<'_> {
    fn write_section(&mut self, buffers: &MeshBuffers, topology: bool) -> Result<(), ResourceError> {
        let Some(mut mesh) = self.meshes.get_mut(self.mesh) else {
            return Err(ResourceError::new("mesh", "vologram mesh asset is gone"));
        };

        if topology {
            mesh.insert_indices(Indices::U32(buffers.indices.clone()));
            mesh.insert_attribute(
                Mesh::ATTRIBUTE_UV_0,
                buffers.uvs.iter().map(|uv| uv.to_array()).collect::<Vec<_>>(),
            );
            mesh.insert_attribute(
                Mesh::ATTRIBUTE_TANGENT,
                buffers.tangents.iter().map(|t| t.to_array()).collect::<Vec<_>>(),
            );
        }

        mesh.insert_attribute(
            Mesh::ATTRIBUTE_POSITION,
            buffers.vertices.iter().map(|v| v.to_array()).collect::<Vec<_>>(),
        );

        if buffers.normals.is_empty() {
            mesh.remove_attribute(Mesh::ATTRIBUTE_NORMAL);
        } else {
            mesh.insert_attribute(
                Mesh::ATTRIBUTE_NORMAL,
                buffers.normals.iter().map(|n| n.to_array()).collect::<Vec<_>>(),
            );
        }

        if self.normal_colors && !buffers.colors.is_empty() {
            mesh.insert_attribute(
                Mesh::ATTRIBUTE_COLOR,
                buffers.colors.iter().map(|c| c.to_array()).collect::<Vec<_>>(),
            );
        } else {
            mesh.remove_attribute(Mesh::ATTRIBUTE_COLOR);
        }
        Ok(())
    }
}

impl MeshSink for BevyMeshSink<'_> {
    fn rebuild_section(&mut self, mesh: &MeshBuffers) -> Result<(), ResourceError> {
        self.write_section(mesh, true)
    }

    fn update_section(&mut self, mesh: &MeshBuffers) -> Result<(), ResourceError> {
        self.write_section(mesh, false)
    }

    fn transform(&self) -> glam::Affine3A {
        to_affine(self.transform)
    }

    fn set_transform(&mut self, transform: glam::Affine3A) {
        *self.transform = to_bevy_transform(transform);
    }
}

/// Uploads video frames into Bevy images bound to the vologram material.
struct BevyTextureSink<'a> {
    images: &'a mut Assets<Image>,
    materials: &'a mut Assets<StandardMaterial>,
    material: &'a Handle<StandardMaterial>,
    slots: &'a mut TextureSlots,
}

impl TextureSink for BevyTextureSink<'_> {
    fn upload(
        &mut self,
        target: Option<TextureHandle>,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TextureHandle, ResourceError> {
        if let Some(target) = target {
            let Some(mut image) = self.slots.get(target).and_then(|h| self.images.get_mut(h))
            else {
                return Err(ResourceError::new(
                    "texture",
                    format!("texture {} is gone", target.0),
                ));
            };
            match image.data.as_mut() {
                Some(data) => {
                    data.clear();
                    data.extend_from_slice(rgba);
                }
                None => image.data = Some(rgba.to_vec()),
            }
            return Ok(target);
        }

        let image = Image::new(
            Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            rgba.to_vec(),
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::default(),
        );
        tracing::debug!(width, height, "Created video texture");
        Ok(self.slots.insert(self.images.add(image)))
    }

    fn bind(&mut self, texture: TextureHandle, parameter: &str) -> Result<(), ResourceError> {
        if parameter != DEFAULT_TEXTURE_PARAMETER {
            return Err(ResourceError::new(
                "material",
                format!("no texture slot named {parameter:?}"),
            ));
        }
        let image = self
            .slots
            .get(texture)
            .ok_or_else(|| ResourceError::new("texture", format!("unknown texture {}", texture.0)))?
            .clone();
        let Some(mut material) = self.materials.get_mut(self.material) else {
            return Err(ResourceError::new("material", "vologram material is gone"));
        };
        if material.base_color_texture.as_ref() != Some(&image) {
            material.base_color_texture = Some(image);
        }
        Ok(())
    }
}
