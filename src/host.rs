//! What the exporter needs from a 3D scene.
//!
//! The exporter never sees concrete scene types. It resolves objects by name,
//! seeks the playhead and reads world positions through [`SceneHost`].

use glam::Vec3;
use std::ops::{Deref, DerefMut};
use std::path::Path;

pub trait SceneHost {
    /// Handle to a resolved object, valid for the duration of an export.
    type Object: Copy;

    fn find_object(&self, name: &str) -> Option<Self::Object>;

    /// World-space position of `object` at the current frame.
    fn world_position(&self, object: Self::Object) -> Vec3;

    /// Inclusive `(start, end)` frame range.
    fn frame_range(&self) -> (i32, i32);

    fn fps(&self) -> u32;

    fn current_frame(&self) -> i32;

    /// Seeks the playhead. May re-evaluate the whole scene.
    fn set_frame(&mut self, frame: i32);

    /// Path of the scene file, `None` for unsaved scenes.
    fn file_path(&self) -> Option<&Path>;
}

/// Holds the playhead of a scene while frames are sampled and puts it back
/// where it was when dropped, including on early returns.
pub struct FrameGuard<'a, H: SceneHost + ?Sized> {
    host: &'a mut H,
    saved_frame: i32,
}

impl<'a, H: SceneHost + ?Sized> FrameGuard<'a, H> {
    pub fn new(host: &'a mut H) -> Self {
        let saved_frame = host.current_frame();
        Self { host, saved_frame }
    }

    pub fn saved_frame(&self) -> i32 {
        self.saved_frame
    }
}

impl<H: SceneHost + ?Sized> Deref for FrameGuard<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: SceneHost + ?Sized> DerefMut for FrameGuard<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: SceneHost + ?Sized> Drop for FrameGuard<'_, H> {
    fn drop(&mut self) {
        log::debug!("Restoring playhead to frame {}", self.saved_frame);
        self.host.set_frame(self.saved_frame);
    }
}
