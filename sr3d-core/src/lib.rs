/// SR3D Core Library - software 3D rendering pipeline
///
/// This library holds everything that does not depend on a display:
/// matrix and vector helpers, the mesh loader, triangle clipping, the
/// per-frame pipeline that turns a mesh into screen-space decal quads, and
/// the first-person camera controllers. Hosts implement [`Platform`] and
/// [`DecalSink`] and drive a [`Renderer`] through the [`Application`]
/// callbacks.

pub mod app;
pub mod camera;
pub mod clip;
pub mod config;
pub mod decal;
pub mod error;
pub mod geometry;
pub mod input;
pub mod math;
pub mod obj;
pub mod pipeline;
pub mod transform;

// Re-export commonly used types
pub use app::{Application, Renderer};
pub use camera::{CameraController, CameraState, MouseLook, NudgeController, PhysicsController};
pub use clip::{clip_triangle, Clipped, Plane, ScreenClipper};
pub use config::{CameraModel, Lighting, RendererConfig};
pub use decal::{DecalQuad, DecalSink, Texture, TextureHandle, Tint};
pub use error::{ConfigError, MeshError};
pub use geometry::{Mesh, Triangle};
pub use input::{FrameInput, Key, KeyState, Platform};
pub use math::{Vec2, Vec3, Vec4};
pub use obj::{load_mesh, load_mesh_or_empty, parse_mesh};
pub use pipeline::{FrameStats, Pipeline};
pub use transform::{Mat4, RotationState, Transform};
