//! Scene Description: the façade as an immutable list of primitives and lights.
//!
//! # Invariants
//! - Scene construction is pure; calling it twice yields equal scenes.
//! - Primitives and lights are fixed for the process lifetime.
//! - The renderer reads the scene and never mutates it.

pub mod facade;
pub mod light;
pub mod material;
pub mod primitive;
pub mod scene;

pub use facade::{FinRow, build_facade, daylight_rig};
pub use light::{
    AmbientLight, DirectionalLight, HemisphereLight, LightSource, PointLight, ShadowConfig,
};
pub use material::{Emissive, GlassMaterial, Material, OpaqueMaterial};
pub use primitive::{Primitive, ShapeKind};
pub use scene::{Scene, SceneSummary};
