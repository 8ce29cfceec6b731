//! Scene-side camera data

mod camera;
mod transform;

pub use camera::*;
pub use transform::*;
