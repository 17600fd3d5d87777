//! Retained-state graphics pipeline cache and quadtree terrain meshing.
//!
//! Two halves share this crate. The [`pipeline`] module wraps an
//! immediate-mode rendering device behind a state cache that elides
//! redundant state changes, with the device itself abstracted behind the
//! [`pipeline::device::RenderDevice`] trait. The [`terrain`] module builds
//! camera-driven level-of-detail terrain: a 2:1 balanced quadtree selects
//! patch placement and a reusable generator turns heightfield samples into
//! seam-free triangle meshes.

pub mod error;
pub mod pipeline;
pub mod terrain;

pub use error::{RenderError, RenderResult};
pub use pipeline::Pipeline;
pub use terrain::TerrainSystem;
