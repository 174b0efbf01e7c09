//! SVG parsing and CPU rasterization
//!
//! The pipeline: SVG text goes through [`parse`] into a [`Document`], the
//! [`Renderer`] walks its elements, flattens curves into polylines, expands
//! strokes into outlines and fills everything through the scanline
//! [`Rasterizer`] into an RGB [`ImageOwned`].
//!
//! ```no_run
//! use svgrast::{parse, Image, Renderer, RenderSettings};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (document, diagnostics) = parse(r#"<svg width="64" height="64">
//!     <circle cx="32" cy="32" r="24" fill="coral"/>
//! </svg>"#)?;
//! for diagnostic in &diagnostics {
//!     eprintln!("warning: {}", diagnostic);
//! }
//! let renderer = Renderer::new(RenderSettings::default());
//! let image = renderer.render(&document, 64, 64)?;
//! let rgb_bytes = image.to_rgb8();
//! # let _ = rgb_bytes;
//! # Ok(())
//! # }
//! ```
#![deny(warnings)]

pub mod blur;
mod color;
pub mod curve;
pub mod font;
mod geometry;
mod image;
mod parser;
mod path;
mod pathdata;
mod raster;
mod render;
mod scene;
mod stroke;
pub mod utils;

pub use crate::image::{Image, ImageIter, ImageMut, ImageOwned, Shape, Size};
pub use color::{Color, ColorError, Rgb, Rgb8, Rgba, SVG_COLORS};
pub use curve::{EllipArc, DEFAULT_FLATNESS, MAX_SUBDIVISIONS};
pub use font::{BitmapFont, FontRegistry};
pub use geometry::{
    scalar_fmt, BBox, Point, Scalar, Transform, TransformStack, EPSILON, EPSILON_SQRT, PI,
};
pub use parser::{parse, parse_bytes, Diagnostic, ParseError};
pub use path::{Path, Polyline};
pub use pathdata::{PathCmd, PathDataError, PathDataParser};
pub use raster::{AaMode, FillRule, Rasterizer};
pub use render::{RenderError, RenderSettings, Renderer};
pub use scene::{
    CircleElement, Document, Element, EllipseElement, LineElement, PathElement, RectElement, Style,
    TextElement, ViewBox,
};
pub use stroke::{apply_dashes, stroke_polyline, LineCap, LineJoin, StrokeStyle};

/// Add debug log message with time taken to execute provided function
pub fn timeit<F: FnOnce() -> R, R>(msg: &str, f: F) -> R {
    let start = std::time::Instant::now();
    let result = f();
    log::debug!("{} {:?}", msg, start.elapsed());
    result
}
