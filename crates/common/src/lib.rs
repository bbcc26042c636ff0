//! Shared value types for the façade viewer.

mod types;

pub use types::{Aabb, Color, linear_to_srgb, srgb_to_linear};
