//! Builds a [`Scene`] from a glTF 2.0 file: nodes become named objects and
//! translation, rotation and scale animation channels become clips.

use anyhow::{ensure, Context};
use glam::{Mat4, Quat, Vec3, Vec4};
use gltf::animation::util::ReadOutputs;
use gltf::buffer;
use itertools::{izip, Itertools};
use std::collections::HashMap;
use std::path::Path;

use crate::scene_graph::animation::{
    Animatable, AnimationClip, Channel, ChannelProperty, Interpolation, Key, Track,
};
use crate::scene_graph::object3d::{Object3D, ObjectId};
use crate::scene_graph::scene::{Scene, DEFAULT_FPS};
use crate::scene_graph::transform::Transform;

pub type Buffers<'a> = &'a [buffer::Data];

/// glTF is Y up, the scene is Z up: (x, y, z) -> (x, -z, y).
pub const Y_UP_TO_Z_UP: Mat4 = Mat4::from_cols(Vec4::X, Vec4::Z, Vec4::NEG_Y, Vec4::W);

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub fps: u32,
    /// Frame shown at animation time zero; also the first frame of the range.
    pub frame_start: i32,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            frame_start: 1,
        }
    }
}

pub fn import_gltf(path: impl AsRef<Path>, options: &ImportOptions) -> anyhow::Result<Scene> {
    let path = path.as_ref();
    let gltf::Gltf { document, blob } = gltf::Gltf::open(path)
        .with_context(|| format!("Failed to open glTF file {}", path.display()))?;
    let buffers = gltf::import_buffers(&document, path.parent(), blob)
        .with_context(|| format!("Failed to load buffers of {}", path.display()))?;

    let mut scene = Scene::new();
    scene.set_file_path(path);
    populate_scene(&mut scene, &document, &buffers, options)?;

    Ok(scene)
}

/// Imports a self-contained glTF (embedded buffers or GLB) from memory.
pub fn import_gltf_slice(bytes: &[u8], options: &ImportOptions) -> anyhow::Result<Scene> {
    let gltf::Gltf { document, blob } =
        gltf::Gltf::from_slice(bytes).context("Failed to parse glTF")?;
    let buffers =
        gltf::import_buffers(&document, None, blob).context("Failed to load glTF buffers")?;

    let mut scene = Scene::new();
    populate_scene(&mut scene, &document, &buffers, options)?;

    Ok(scene)
}

fn populate_scene(
    scene: &mut Scene,
    document: &gltf::Document,
    buffers: Buffers,
    options: &ImportOptions,
) -> anyhow::Result<()> {
    let gltf_scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .context("No scenes in glTF")?;

    let mut node_objects = HashMap::new();
    for node in gltf_scene.nodes() {
        spawn_gltf_node(scene, &node, None, &mut node_objects);
    }
    scene.set_world_basis(Y_UP_TO_Z_UP);

    let mut longest_clip = 0.0f32;
    for animation in document.animations() {
        let clip = read_animation(&animation, buffers, &node_objects)?;
        log::debug!(
            "Animation '{}': {} channels, {:.3}s",
            clip.name,
            clip.channels.len(),
            clip.duration()
        );
        longest_clip = longest_clip.max(clip.duration());
        scene.add_animation(clip);
    }

    scene.set_fps(options.fps);
    scene.set_time_origin_frame(options.frame_start);
    let frame_end = options.frame_start + (longest_clip * options.fps as f32).round() as i32;
    scene.set_frame_range(options.frame_start, frame_end);
    scene.set_frame(options.frame_start);

    log::info!(
        "Imported {} objects and {} animations, frames {}..={} at {} fps",
        node_objects.len(),
        scene.animations.len(),
        options.frame_start,
        frame_end,
        options.fps
    );

    Ok(())
}

fn spawn_gltf_node(
    scene: &mut Scene,
    node: &gltf::Node,
    parent: Option<ObjectId>,
    node_objects: &mut HashMap<usize, ObjectId>,
) -> ObjectId {
    let (translation, rotation, scale) = node.transform().decomposed();
    let object = Object3D::named(node.name().unwrap_or("Unnamed")).with_transform(
        Transform::from_trs(
            Vec3::from(translation),
            Quat::from_array(rotation),
            Vec3::from(scale),
        ),
    );

    let object_id = scene.add_object(object);
    node_objects.insert(node.index(), object_id);

    if let Some(parent_id) = parent {
        scene.set_object_parent(object_id, Some(parent_id));
    }

    for child in node.children() {
        spawn_gltf_node(scene, &child, Some(object_id), node_objects);
    }

    object_id
}

fn read_animation(
    animation: &gltf::Animation,
    buffers: Buffers,
    node_objects: &HashMap<usize, ObjectId>,
) -> anyhow::Result<AnimationClip> {
    let name = animation
        .name()
        .map(String::from)
        .unwrap_or_else(|| format!("Animation {}", animation.index()));
    let mut clip = AnimationClip::new(name);

    for channel in animation.channels() {
        let node = channel.target().node();
        let Some(&target) = node_objects.get(&node.index()) else {
            log::debug!(
                "Skipping channel for node {} outside the imported scene",
                node.index()
            );
            continue;
        };

        let interpolation = match channel.sampler().interpolation() {
            gltf::animation::Interpolation::Step => Interpolation::Step,
            gltf::animation::Interpolation::Linear => Interpolation::Linear,
            gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
        };

        let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
        let times = reader
            .read_inputs()
            .context("Animation channel without key times")?
            .collect::<Vec<f32>>();
        let outputs = reader
            .read_outputs()
            .context("Animation channel without key values")?;

        let property = match outputs {
            ReadOutputs::Translations(values) => ChannelProperty::Translation(build_track(
                interpolation,
                &times,
                values.map(Vec3::from),
            )?),
            ReadOutputs::Rotations(values) => ChannelProperty::Rotation(build_track(
                interpolation,
                &times,
                values.into_f32().map(Quat::from_array),
            )?),
            ReadOutputs::Scales(values) => {
                ChannelProperty::Scale(build_track(interpolation, &times, values.map(Vec3::from))?)
            }
            ReadOutputs::MorphTargetWeights(_) => {
                log::debug!("Skipping morph target weights on node {}", node.index());
                continue;
            }
        };

        clip.channels.push(Channel { target, property });
    }

    Ok(clip)
}

fn build_track<T: Animatable>(
    interpolation: Interpolation,
    times: &[f32],
    values: impl Iterator<Item = T>,
) -> anyhow::Result<Track<T>> {
    let keys: Vec<Key<T>> = match interpolation {
        Interpolation::CubicSpline => izip!(times, values.tuples())
            .map(|(&time, (in_tangent, value, out_tangent))| {
                Key::with_tangents(time, in_tangent, value, out_tangent)
            })
            .collect(),
        Interpolation::Step | Interpolation::Linear => izip!(times, values)
            .map(|(&time, value)| Key::new(time, value))
            .collect(),
    };

    ensure!(
        keys.len() == times.len(),
        "Animation channel has {} key times but {} values",
        times.len(),
        keys.len()
    );

    Track::new(interpolation, keys)
}
