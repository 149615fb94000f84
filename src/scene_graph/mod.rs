pub mod animation;
pub mod gltf_import;
pub mod object3d;
pub mod scene;
pub mod transform;

pub use animation::{AnimationClip, Channel, ChannelProperty, Interpolation, Key, Track};
pub use gltf_import::{import_gltf, ImportOptions};
pub use object3d::{Object3D, ObjectId};
pub use scene::Scene;
pub use transform::Transform;
