//! Area-of-effect geometry.
//!
//! [`ShapeGrid`] is a single boolean stencil, [`DirectionalArea`] holds one
//! stencil per facing, and [`project_area`] lays the selected stencil onto
//! world positions around a target.
mod directional;
mod error;
mod grid;
mod projector;

pub use directional::DirectionalArea;
pub use error::AreaError;
pub use grid::{GridCell, ShapeGrid};
pub use projector::project_area;
