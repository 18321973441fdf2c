//! Output encoders and concrete axis canvases (PNG, SVG).

mod png_encoder;
mod raster;
mod svg;

pub use png_encoder::PngEncoder;
pub use raster::{RasterCanvas, RecordedLabel};
pub(crate) use raster::white_background;
pub use svg::{SvgCanvas, SvgElement, SvgEncoder};
