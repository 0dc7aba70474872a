mod geometry;
mod projection;
mod renderer;
mod spatial;

pub use geometry::{Bounds, Ring};
pub use projection::Viewport;
pub use renderer::{ChoroplethRenderer, Country, MapFrame};
