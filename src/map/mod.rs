pub mod basemap;
pub mod geometry;
pub mod projection;
mod terminal;

pub use basemap::{Basemap, Lod};
pub use projection::Viewport;
pub use terminal::{MapLayers, MarkerGlyph, OverlayId, TerminalSurface};
