pub mod basemap;
mod geometry;
pub mod markers;
mod projection;
pub mod spatial;

pub use markers::MarkerLayer;
pub use projection::{GeoBounds, Viewport};
