use glam::{Mat4, Quat, Vec3};
use id_arena::Arena;
use std::path::{Path, PathBuf};

use crate::host::SceneHost;
use crate::scene_graph::animation::{AnimationClip, ChannelProperty};
use crate::scene_graph::object3d::{Object3D, ObjectId};
use crate::scene_graph::transform::Transform;

pub const DEFAULT_FPS: u32 = 24;

pub struct Scene {
    pub objects: Arena<Object3D>,
    pub animations: Vec<AnimationClip>,
    frame_start: i32,
    frame_end: i32,
    fps: u32,
    current_frame: i32,
    /// Frame shown at animation time zero.
    time_origin_frame: i32,
    /// Parent matrix of every root object.
    world_basis: Mat4,
    file_path: Option<PathBuf>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Arena::new(),
            animations: Vec::new(),
            frame_start: 1,
            frame_end: 250,
            fps: DEFAULT_FPS,
            current_frame: 1,
            time_origin_frame: 1,
            world_basis: Mat4::IDENTITY,
            file_path: None,
        }
    }

    pub fn add_object(&mut self, object: Object3D) -> ObjectId {
        self.objects.alloc(object)
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id)
    }

    pub fn get_object_mut(&mut self, id: ObjectId) -> Option<&mut Object3D> {
        self.objects.get_mut(id)
    }

    pub fn get_object_by_name(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|(_, object)| object.name == name)
            .map(|(id, _)| id)
    }

    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.iter().map(|(_, object)| object.name.as_str())
    }

    pub fn add_animation(&mut self, clip: AnimationClip) {
        self.animations.push(clip);
    }

    pub fn set_frame_range(&mut self, frame_start: i32, frame_end: i32) {
        self.frame_start = frame_start;
        self.frame_end = frame_end;
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps.max(1);
    }

    pub fn set_time_origin_frame(&mut self, frame: i32) {
        self.time_origin_frame = frame;
    }

    pub fn set_world_basis(&mut self, basis: Mat4) {
        self.world_basis = basis;
        for (_, object) in self.objects.iter() {
            object.transform.invalidate_world();
        }
    }

    pub fn set_file_path(&mut self, path: impl Into<PathBuf>) {
        self.file_path = Some(path.into());
    }

    /// Animation time in seconds shown at `frame`.
    pub fn frame_to_time(&self, frame: i32) -> f32 {
        (frame - self.time_origin_frame) as f32 / self.fps as f32
    }

    /// Moves the playhead to `frame`, evaluates every animation clip there and
    /// propagates world matrices.
    pub fn set_frame(&mut self, frame: i32) {
        self.current_frame = frame;
        let time = self.frame_to_time(frame);

        for clip in &self.animations {
            for channel in &clip.channels {
                let Some(object) = self.objects.get_mut(channel.target) else {
                    log::warn!(
                        "Animation '{}' targets a missing object, skipping channel",
                        clip.name
                    );
                    continue;
                };

                match &channel.property {
                    ChannelProperty::Translation(track) => {
                        object.transform.set_translation(track.sample(time))
                    }
                    ChannelProperty::Rotation(track) => {
                        object.transform.set_rotation(track.sample(time))
                    }
                    ChannelProperty::Scale(track) => object.transform.set_scale(track.sample(time)),
                }
            }
        }

        for clip in &self.animations {
            for channel in &clip.channels {
                self.invalidate_object_hierarchy(channel.target);
            }
        }

        self.late_update();
    }

    /// Updates all object transforms in hierarchical order
    fn update_transforms(&self) {
        let root_objects = self.objects.iter().filter_map(|(id, object)| {
            if object.parent_id.is_none() {
                Some(id)
            } else {
                None
            }
        });

        for root_id in root_objects {
            self.update_object_transform_recursive(root_id, self.world_basis, false);
        }
    }

    /// Recursively updates an object's world transform and its children
    fn update_object_transform_recursive(
        &self,
        object_id: ObjectId,
        parent_world_matrix: Mat4,
        parent_changed: bool,
    ) {
        if let Some(object) = self.objects.get(object_id) {
            let changed = parent_changed || object.transform.is_world_dirty();
            if changed {
                let local_matrix = *object.transform.get_local_matrix();
                let world_matrix = parent_world_matrix * local_matrix;
                object.transform.set_world_matrix(world_matrix);
            }

            let world_matrix = *object.transform.get_world_matrix();
            for &child_id in &object.child_ids {
                self.update_object_transform_recursive(child_id, world_matrix, changed);
            }
        }
    }

    /// Invalidates world transforms for an object and all its descendants
    pub fn invalidate_object_hierarchy(&self, object_id: ObjectId) {
        if let Some(object) = self.objects.get(object_id) {
            object.transform.invalidate_world();

            for &child_id in &object.child_ids {
                self.invalidate_object_hierarchy(child_id);
            }
        }
    }

    /// Sets the parent of an object and updates child relationships
    pub fn set_object_parent(&mut self, child_id: ObjectId, new_parent_id: Option<ObjectId>) {
        if let Some(child) = self.objects.get(child_id) {
            if let Some(old_parent_id) = child.parent_id {
                if let Some(old_parent) = self.objects.get_mut(old_parent_id) {
                    old_parent.child_ids.retain(|&id| id != child_id);
                }
            }
        }

        if let Some(child) = self.objects.get_mut(child_id) {
            child.parent_id = new_parent_id;

            if let Some(new_parent_id) = new_parent_id {
                if let Some(new_parent) = self.objects.get_mut(new_parent_id) {
                    new_parent.child_ids.push(child_id);
                }
            }
        }

        self.invalidate_object_hierarchy(child_id);
    }

    pub fn set_object_translation(&mut self, object_id: ObjectId, translation: Vec3) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_translation(translation);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn set_object_transform(
        &mut self,
        object_id: ObjectId,
        translation: Vec3,
        rotation: Quat,
        scale: Vec3,
    ) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_transform(translation, rotation, scale);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn get_object_transform(&self, object_id: ObjectId) -> Option<&Transform> {
        self.objects.get(object_id).map(|object| &object.transform)
    }

    pub fn late_update(&mut self) {
        self.update_transforms();
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneHost for Scene {
    type Object = ObjectId;

    fn find_object(&self, name: &str) -> Option<ObjectId> {
        if name.is_empty() {
            return None;
        }
        self.get_object_by_name(name)
    }

    fn world_position(&self, object: ObjectId) -> Vec3 {
        match self.get_object_transform(object) {
            Some(transform) => transform.world_translation(),
            None => {
                log::warn!(
                    "No object for {:?} at frame {}, using the origin",
                    object,
                    self.current_frame
                );
                Vec3::ZERO
            }
        }
    }

    fn frame_range(&self) -> (i32, i32) {
        (self.frame_start, self.frame_end)
    }

    fn fps(&self) -> u32 {
        self.fps
    }

    fn current_frame(&self) -> i32 {
        self.current_frame
    }

    fn set_frame(&mut self, frame: i32) {
        Scene::set_frame(self, frame);
    }

    fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }
}
