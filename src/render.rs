//! Renderer: walks the document and composites elements into an RGB raster
use crate::{
    font::{FontRegistry, GLYPH_ADVANCE, GLYPH_ROWS},
    stroke::{apply_dashes, stroke_polyline},
    utils::clamp,
    AaMode, CircleElement, Document, Element, EllipseElement, FillRule, Image, ImageMut,
    ImageOwned, LineElement, PathElement, Point, Polyline, Rasterizer, RectElement, Rgb, Rgba,
    Scalar, Size, Style, TextElement, Transform, TransformStack, PI,
};
use std::fmt;

/// Number of segments used to polygonize circles and ellipses
const ELLIPSE_SEGMENTS: usize = 64;
/// Segments per rounded rectangle corner
const CORNER_SEGMENTS: usize = 8;
/// Strokes thinner than this produce no geometry
const MIN_STROKE_WIDTH: Scalar = 0.1;

/// Render failure, the target buffer is left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderError {
    /// Requested raster has no pixels
    EmptyTarget { width: usize, height: usize },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::EmptyTarget { width, height } => {
                write!(f, "render target {}x{} has no pixels", width, height)
            }
        }
    }
}

impl std::error::Error for RenderError {}

/// Options consumed from the configuration layer
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    /// Color the buffer is cleared to
    pub background_color: Rgba,
    /// Master anti-aliasing switch, off forces center sampling
    pub anti_aliasing_enabled: bool,
    pub aa_mode: AaMode,
    /// Bezier flattening tolerance in device pixels, clamped to 0.1..=5.0
    pub flatness_tolerance: Scalar,
    /// Fill rule used when an element does not set one
    pub fill_rule_default: FillRule,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            background_color: Rgba::new(1.0, 1.0, 1.0, 1.0),
            anti_aliasing_enabled: true,
            aa_mode: AaMode::default(),
            flatness_tolerance: 0.5,
            fill_rule_default: FillRule::NonZero,
        }
    }
}

/// Document renderer
///
/// A render call is a pure function of the document, the target size and
/// the settings; the renderer keeps no state between calls apart from the
/// injected font registry.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    pub settings: RenderSettings,
    pub fonts: FontRegistry,
}

impl Renderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            fonts: FontRegistry::new(),
        }
    }

    pub fn with_fonts(settings: RenderSettings, fonts: FontRegistry) -> Self {
        Self { settings, fonts }
    }

    fn aa_mode(&self) -> AaMode {
        if self.settings.anti_aliasing_enabled {
            self.settings.aa_mode
        } else {
            AaMode::None
        }
    }

    fn tolerance(&self) -> Scalar {
        clamp(self.settings.flatness_tolerance, 0.1, 5.0)
    }

    /// Render the document into a `width x height` RGB image
    pub fn render(
        &self,
        document: &Document,
        width: usize,
        height: usize,
    ) -> Result<ImageOwned<Rgb>, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyTarget { width, height });
        }
        let start = std::time::Instant::now();

        let mut image = ImageOwned::new_with(
            Size::new(width, height),
            self.settings.background_color.rgb(),
        );

        // the viewBox transform maps user units onto the canvas
        let root = match document.view_box {
            Some(view_box) => view_box.to_device(width as Scalar, height as Scalar),
            None => Transform::identity(),
        };
        let mut stack = TransformStack::new(root);

        for element in document.elements() {
            stack.push();
            stack.multiply(element.transform());
            match element {
                Element::Path(path) => self.render_path(path, &stack, &mut image),
                Element::Rect(rect) => self.render_rect(rect, &stack, &mut image),
                Element::Circle(circle) => self.render_circle(circle, &stack, &mut image),
                Element::Ellipse(ellipse) => self.render_ellipse(ellipse, &stack, &mut image),
                Element::Line(line) => self.render_line(line, &stack, &mut image),
                Element::Text(text) => self.render_text(text, &stack, &mut image),
            }
            stack.pop();
        }

        log::debug!(
            "rendered {} elements at {}x{} in {:?}",
            document.elements().len(),
            width,
            height,
            start.elapsed()
        );
        Ok(image)
    }

    fn render_path(&self, element: &PathElement, stack: &TransformStack, image: &mut ImageOwned<Rgb>) {
        let subpaths = element.path.flatten(stack.current(), self.tolerance());
        if subpaths.is_empty() {
            return;
        }
        self.fill_and_stroke(&subpaths, &element.style, stack, image);
    }

    fn render_rect(&self, element: &RectElement, stack: &TransformStack, image: &mut ImageOwned<Rgb>) {
        if element.width <= 0.0 || element.height <= 0.0 {
            return;
        }
        if element.rx < 0.0 || element.ry < 0.0 {
            return;
        }
        let points = if element.rx > 0.0 || element.ry > 0.0 {
            rounded_rect_vertices(
                element.position,
                element.width,
                element.height,
                element.rx,
                element.ry,
            )
        } else {
            let Point([x, y]) = element.position;
            vec![
                Point::new(x, y),
                Point::new(x + element.width, y),
                Point::new(x + element.width, y + element.height),
                Point::new(x, y + element.height),
            ]
        };
        let points: Vec<Point> = points.into_iter().map(|p| stack.transform_point(p)).collect();
        let subpaths = [Polyline::new(points, true)];
        self.fill_and_stroke(&subpaths, &element.style, stack, image);
    }

    fn render_circle(
        &self,
        element: &CircleElement,
        stack: &TransformStack,
        image: &mut ImageOwned<Rgb>,
    ) {
        if element.radius <= 0.0 {
            return;
        }
        let scale = stack.current().scale_factor();
        let center = stack.transform_point(element.center);
        let points = ellipse_vertices(
            center,
            element.radius * scale,
            element.radius * scale,
            ELLIPSE_SEGMENTS,
        );
        let subpaths = [Polyline::new(points, true)];
        self.fill_and_stroke(&subpaths, &element.style, stack, image);
    }

    fn render_ellipse(
        &self,
        element: &EllipseElement,
        stack: &TransformStack,
        image: &mut ImageOwned<Rgb>,
    ) {
        if element.rx <= 0.0 || element.ry <= 0.0 {
            return;
        }
        let scale = stack.current().scale_factor();
        let center = stack.transform_point(element.center);
        let points = ellipse_vertices(
            center,
            element.rx * scale,
            element.ry * scale,
            ELLIPSE_SEGMENTS,
        );
        let subpaths = [Polyline::new(points, true)];
        self.fill_and_stroke(&subpaths, &element.style, stack, image);
    }

    fn render_line(&self, element: &LineElement, stack: &TransformStack, image: &mut ImageOwned<Rgb>) {
        let points = vec![
            stack.transform_point(element.start),
            stack.transform_point(element.end),
        ];
        // lines have no interior, only the stroke pipeline applies
        let subpaths = [Polyline::new(points, false)];
        if let Some(color) = element.style.stroke_color() {
            self.stroke_subpaths(&subpaths, color, &element.style, stack, image);
        }
    }

    /// Render glyphs as unions of filled squares from the 5x7 bitmap
    fn render_text(&self, element: &TextElement, stack: &TransformStack, image: &mut ImageOwned<Rgb>) {
        if element.font_size <= 0.0 || element.text.is_empty() {
            return;
        }
        let Some(color) = element.style.fill_color() else {
            return;
        };
        let font = self.fonts.resolve(&element.font_family);
        let origin = stack.transform_point(element.position);
        let cell = element.font_size / GLYPH_ROWS as Scalar * stack.current().scale_factor();
        if cell <= 0.0 || !origin.is_finite() {
            return;
        }

        let mut squares: Vec<Vec<Point>> = Vec::new();
        let mut x_offset: Scalar = 0.0;
        for codepoint in element.text.chars() {
            if !font.has_glyph(codepoint) {
                continue;
            }
            for (col, row) in font.glyph_cells(codepoint) {
                let x0 = origin.x() + (x_offset + col as Scalar) * cell;
                let y0 = origin.y() + row as Scalar * cell;
                squares.push(vec![
                    Point::new(x0, y0),
                    Point::new(x0 + cell, y0),
                    Point::new(x0 + cell, y0 + cell),
                    Point::new(x0, y0 + cell),
                ]);
            }
            x_offset += GLYPH_ADVANCE as Scalar;
        }
        if squares.is_empty() {
            return;
        }
        let rasterizer = Rasterizer::new(FillRule::NonZero, self.aa_mode());
        let mask = rasterizer.mask(&squares, image.width(), image.height());
        composite(image, &mask, color);
    }

    fn fill_and_stroke(
        &self,
        subpaths: &[Polyline],
        style: &Style,
        stack: &TransformStack,
        image: &mut ImageOwned<Rgb>,
    ) {
        if let Some(color) = style.fill_color() {
            let fill_rule = style.fill_rule.unwrap_or(self.settings.fill_rule_default);
            let rasterizer = Rasterizer::new(fill_rule, self.aa_mode());
            let mask = rasterizer.mask_subpaths(
                subpaths
                    .iter()
                    .filter(|subpath| subpath.points.len() >= 3)
                    .map(|subpath| subpath.points.as_slice()),
                image.width(),
                image.height(),
            );
            composite(image, &mask, color);
        }
        if let Some(color) = style.stroke_color() {
            self.stroke_subpaths(subpaths, color, style, stack, image);
        }
    }

    /// Expand and fill the stroke of every sub-path
    ///
    /// Stroke width scales with the transform's uniform scale factor. Dash
    /// segments are expanded and filled independently as open polylines.
    fn stroke_subpaths(
        &self,
        subpaths: &[Polyline],
        color: Rgba,
        style: &Style,
        stack: &TransformStack,
        image: &mut ImageOwned<Rgb>,
    ) {
        let stroke_style = style.stroke_style().scaled(stack.current().scale_factor());
        if stroke_style.width < MIN_STROKE_WIDTH {
            return;
        }
        let rasterizer = Rasterizer::new(FillRule::NonZero, self.aa_mode());
        for subpath in subpaths {
            if subpath.points.len() < 2 {
                continue;
            }
            if stroke_style.dash_array.is_empty() {
                let outline = stroke_polyline(&subpath.points, subpath.closed, &stroke_style);
                if outline.len() >= 3 {
                    let mask = rasterizer.mask_polygon(&outline, image.width(), image.height());
                    composite(image, &mask, color);
                }
            } else {
                let dashes = apply_dashes(
                    &subpath.points,
                    subpath.closed,
                    &stroke_style.dash_array,
                    stroke_style.dash_offset,
                );
                for dash in dashes {
                    if dash.len() < 2 {
                        continue;
                    }
                    let outline = stroke_polyline(&dash, false, &stroke_style);
                    if outline.len() >= 3 {
                        let mask = rasterizer.mask_polygon(&outline, image.width(), image.height());
                        composite(image, &mask, color);
                    }
                }
            }
        }
    }
}

/// Blend a coverage mask with a paint color over the image
///
/// Effective alpha is the paint alpha times the pixel coverage, applied
/// with source-over onto the opaque buffer.
fn composite(image: &mut ImageOwned<Rgb>, mask: &ImageOwned<Scalar>, color: Rgba) {
    let src = color.rgb();
    let alpha = color.alpha();
    let shape = image.shape();
    for row in 0..shape.height {
        for col in 0..shape.width {
            let coverage = match mask.get(row, col) {
                Some(coverage) if *coverage > 0.0 => *coverage as f32,
                _ => continue,
            };
            if let Some(pixel) = image.get_mut(row, col) {
                *pixel = pixel.blend_over(src, alpha * coverage);
            }
        }
    }
}

/// Polygonize an axis-aligned ellipse
fn ellipse_vertices(center: Point, rx: Scalar, ry: Scalar, segments: usize) -> Vec<Point> {
    let mut points = Vec::with_capacity(segments);
    for i in 0..segments {
        let angle = 2.0 * PI * i as Scalar / segments as Scalar;
        let (sin, cos) = angle.sin_cos();
        points.push(center + Point::new(cos * rx, sin * ry));
    }
    points
}

/// Polygonize a rounded rectangle in user space
fn rounded_rect_vertices(
    position: Point,
    width: Scalar,
    height: Scalar,
    rx: Scalar,
    ry: Scalar,
) -> Vec<Point> {
    // clamp radii to the half extents, a single radius is mirrored
    let mut rx = rx.min(width * 0.5);
    let mut ry = ry.min(height * 0.5);
    if ry == 0.0 {
        ry = rx;
    }
    if rx == 0.0 {
        rx = ry;
    }
    let Point([x, y]) = position;

    let mut points = Vec::with_capacity(4 * (CORNER_SEGMENTS + 1));
    let corner = |points: &mut Vec<Point>, cx: Scalar, cy: Scalar, start_angle: Scalar| {
        for i in 0..=CORNER_SEGMENTS {
            let angle = start_angle + PI * 0.5 * i as Scalar / CORNER_SEGMENTS as Scalar;
            let (sin, cos) = angle.sin_cos();
            points.push(Point::new(cx + cos * rx, cy + sin * ry));
        }
    };
    // corner centers, walked in +angle order so the polygon stays convex
    corner(&mut points, x + width - rx, y + ry, -PI * 0.5);
    corner(&mut points, x + width - rx, y + height - ry, 0.0);
    corner(&mut points, x + rx, y + height - ry, PI * 0.5);
    corner(&mut points, x + rx, y + ry, PI);
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, Color};

    fn render_svg(svg: &str, width: usize, height: usize) -> ImageOwned<Rgb> {
        let (document, diagnostics) = parse(svg).expect("parse failed");
        assert!(diagnostics.is_empty(), "diagnostics: {:?}", diagnostics);
        let renderer = Renderer::new(RenderSettings {
            anti_aliasing_enabled: false,
            ..Default::default()
        });
        renderer.render(&document, width, height).expect("render failed")
    }

    fn pixel(image: &ImageOwned<Rgb>, x: usize, y: usize) -> [u8; 3] {
        image.get(y, x).unwrap().to_rgb()
    }

    const WHITE: [u8; 3] = [255, 255, 255];

    #[test]
    fn test_empty_document_is_background() {
        let image = render_svg("<svg width=\"4\" height=\"4\"></svg>", 4, 4);
        assert!(image.iter().all(|p| p.to_rgb() == WHITE));
    }

    #[test]
    fn test_zero_target_fails() {
        let (document, _) = parse("<svg/>").unwrap();
        let renderer = Renderer::default();
        let error = renderer.render(&document, 0, 4).unwrap_err();
        assert_eq!(error, RenderError::EmptyTarget { width: 0, height: 4 });
    }

    #[test]
    fn test_solid_circle() {
        // red disc of radius 3 at (5, 5) on a 10x10 canvas
        let image = render_svg(
            r#"<svg width="10" height="10"><circle cx="5" cy="5" r="3" fill="rgb(255,0,0)"/></svg>"#,
            10,
            10,
        );
        for y in 0..10 {
            for x in 0..10 {
                let dx = x as Scalar + 0.5 - 5.0;
                let dy = y as Scalar + 0.5 - 5.0;
                let inside = dx * dx + dy * dy <= 9.0;
                let expected = if inside { [255, 0, 0] } else { WHITE };
                // pixels touching the polygonized rim may go either way
                let rim = (dx * dx + dy * dy - 9.0).abs() < 3.0;
                if !rim {
                    assert_eq!(pixel(&image, x, y), expected, "pixel ({}, {})", x, y);
                }
            }
        }
        // center certainly filled, corners certainly not
        assert_eq!(pixel(&image, 5, 5), [255, 0, 0]);
        assert_eq!(pixel(&image, 0, 0), WHITE);
    }

    #[test]
    fn test_even_odd_donut() {
        let svg = r#"<svg width="20" height="20"><path
            d="M2,2 L18,2 L18,18 L2,18 Z M6,6 L14,6 L14,14 L6,14 Z"
            fill="black" fill-rule="evenodd"/></svg>"#;
        let image = render_svg(svg, 20, 20);
        // frame is filled, hole shows the background
        assert_eq!(pixel(&image, 4, 4), [0, 0, 0]);
        assert_eq!(pixel(&image, 10, 10), WHITE);
        assert_eq!(pixel(&image, 0, 0), WHITE);

        // nonzero fills the hole, both sub-paths wind the same direction
        let svg = r#"<svg width="20" height="20"><path
            d="M2,2 L18,2 L18,18 L2,18 Z M6,6 L14,6 L14,14 L6,14 Z"
            fill="black"/></svg>"#;
        let image = render_svg(svg, 20, 20);
        assert_eq!(pixel(&image, 10, 10), [0, 0, 0]);
    }

    #[test]
    fn test_dashed_stroke() {
        let svg = r#"<svg width="100" height="10"><line x1="0" y1="5" x2="100" y2="5"
            stroke="black" stroke-width="2" stroke-dasharray="10 5"/></svg>"#;
        let image = render_svg(svg, 100, 10);
        // dashes at x in [0,10], [15,25], ... gaps in between
        assert_eq!(pixel(&image, 5, 5), [0, 0, 0]);
        assert_eq!(pixel(&image, 12, 5), WHITE);
        assert_eq!(pixel(&image, 20, 5), [0, 0, 0]);
        assert_eq!(pixel(&image, 27, 5), WHITE);
        assert_eq!(pixel(&image, 95, 5), [0, 0, 0]);
        // stroke is 2 pixels tall around y = 5
        assert_eq!(pixel(&image, 5, 4), [0, 0, 0]);
        assert_eq!(pixel(&image, 5, 2), WHITE);
        assert_eq!(pixel(&image, 5, 7), WHITE);
    }

    #[test]
    fn test_view_box_scaling() {
        let svg = r#"<svg width="200" height="200" viewBox="0 0 100 100">
            <rect x="25" y="25" width="50" height="50" fill="blue"/></svg>"#;
        let image = render_svg(svg, 200, 200);
        let blue = [0, 0, 255];
        assert_eq!(pixel(&image, 100, 100), blue);
        assert_eq!(pixel(&image, 55, 55), blue);
        assert_eq!(pixel(&image, 145, 145), blue);
        assert_eq!(pixel(&image, 45, 45), WHITE);
        assert_eq!(pixel(&image, 155, 155), WHITE);
    }

    #[test]
    fn test_smooth_cubic_curve_stroke() {
        // the S command reflects the previous control point producing an
        // s-shaped curve through (40, 50) and (70, 50)
        let svg = r#"<svg width="100" height="100">
            <path d="M10,50 C10,10 40,10 40,50 S70,90 70,50" stroke="black" fill="none"/></svg>"#;
        let image = render_svg(svg, 100, 100);
        // curve passes near its anchor points
        let near_black = |x: usize, y: usize| {
            let mut hit = false;
            for dy in y.saturating_sub(2)..=(y + 2).min(99) {
                for dx in x.saturating_sub(2)..=(x + 2).min(99) {
                    hit |= pixel(&image, dx, dy) == [0, 0, 0];
                }
            }
            hit
        };
        assert!(near_black(10, 50));
        assert!(near_black(40, 50));
        assert!(near_black(70, 50));
        // first bow is above the anchors, the reflected one below
        assert!(near_black(25, 20));
        assert!(near_black(55, 80));
        // nothing paints in the opposite quadrants
        assert!(!near_black(25, 80));
        assert!(!near_black(55, 20));
    }

    #[test]
    fn test_degenerate_shapes_render_nothing() {
        let svg = r#"<svg width="10" height="10">
            <circle cx="5" cy="5" r="0" fill="black"/>
            <rect x="1" y="1" width="0" height="5" fill="black"/>
            <path d="M5,5" fill="black"/>
        </svg>"#;
        let image = render_svg(svg, 10, 10);
        assert!(image.iter().all(|p| p.to_rgb() == WHITE));
    }

    #[test]
    fn test_collapsed_transform_renders_nothing() {
        // zero determinant flattens the shape to a line with no interior
        let svg = r#"<svg width="10" height="10">
            <rect width="8" height="8" fill="black" transform="scale(1, 0)"/></svg>"#;
        let image = render_svg(svg, 10, 10);
        assert!(image.iter().all(|p| p.to_rgb() == WHITE));
    }

    #[test]
    fn test_painting_order() {
        let svg = r#"<svg width="4" height="4">
            <rect width="4" height="4" fill="black"/>
            <rect width="4" height="4" fill="red"/></svg>"#;
        let image = render_svg(svg, 4, 4);
        assert_eq!(pixel(&image, 2, 2), [255, 0, 0]);
    }

    #[test]
    fn test_alpha_blending() {
        // half transparent black over white gives mid gray
        let svg = r#"<svg width="4" height="4">
            <rect width="4" height="4" fill="black" fill-opacity="0.5"/></svg>"#;
        let image = render_svg(svg, 4, 4);
        let [r, g, b] = pixel(&image, 2, 2);
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert!(r > 120 && r < 135, "{}", r);
    }

    #[test]
    fn test_stroke_width_scales_with_transform() {
        let svg = r#"<svg width="40" height="40" viewBox="0 0 20 20">
            <line x1="0" y1="10" x2="20" y2="10" stroke="black" stroke-width="2"/></svg>"#;
        let image = render_svg(svg, 40, 40);
        // 2 user units at 2x scale cover 4 device pixels vertically
        assert_eq!(pixel(&image, 20, 18), [0, 0, 0]);
        assert_eq!(pixel(&image, 20, 21), [0, 0, 0]);
        assert_eq!(pixel(&image, 20, 15), WHITE);
        assert_eq!(pixel(&image, 20, 24), WHITE);
    }

    #[test]
    fn test_rounded_rect_corners() {
        let svg = r#"<svg width="20" height="20">
            <rect x="2" y="2" width="16" height="16" rx="6" fill="black"/></svg>"#;
        let image = render_svg(svg, 20, 20);
        // center and edge midpoints are filled, extreme corners are rounded
        // away
        assert_eq!(pixel(&image, 10, 10), [0, 0, 0]);
        assert_eq!(pixel(&image, 10, 3), [0, 0, 0]);
        assert_eq!(pixel(&image, 2, 2), WHITE);
        assert_eq!(pixel(&image, 17, 17), WHITE);
    }

    #[test]
    fn test_text_renders_glyph_pixels() {
        let svg = r#"<svg width="20" height="20">
            <text x="2" y="2" font-size="14" fill="black">|</text></svg>"#;
        let image = render_svg(svg, 20, 20);
        // the bar glyph fills its center column over the full height
        let cell = 2.0; // 14 / 7
        let x = (2.0 + 2.0 * cell + 1.0) as usize;
        assert_eq!(pixel(&image, x, 4), [0, 0, 0]);
        assert_eq!(pixel(&image, x, 14), [0, 0, 0]);
        // nothing outside the glyph box
        assert_eq!(pixel(&image, 1, 10), WHITE);
    }

    #[test]
    fn test_render_pure_function() {
        let (document, _) = parse(
            r#"<svg width="10" height="10"><circle cx="5" cy="5" r="3" fill="red"/></svg>"#,
        )
        .unwrap();
        let renderer = Renderer::default();
        let a = renderer.render(&document, 10, 10).unwrap();
        let b = renderer.render(&document, 10, 10).unwrap();
        assert!(a.iter().zip(b.iter()).all(|(p0, p1)| p0 == p1));
    }

    #[test]
    fn test_transform_composition_matches_pretransform() {
        // rendering with composed transform A * B equals pre-transforming
        // the geometry by B and rendering with A
        let composed = r#"<svg width="40" height="40">
            <rect width="4" height="4" fill="black" transform="translate(10,10) scale(2)"/></svg>"#;
        let pre = r#"<svg width="40" height="40">
            <rect width="8" height="8" fill="black" transform="translate(10,10)"/></svg>"#;
        let a = render_svg(composed, 40, 40);
        let b = render_svg(pre, 40, 40);
        for (pa, pb) in a.iter().zip(b.iter()) {
            assert_eq!(pa.to_rgb(), pb.to_rgb());
        }
    }

    #[test]
    fn test_aa_produces_partial_coverage() {
        let renderer = Renderer::new(RenderSettings::default());
        let (document, _) = parse(
            r#"<svg width="10" height="10"><circle cx="5" cy="5" r="3" fill="black"/></svg>"#,
        )
        .unwrap();
        let image = renderer.render(&document, 10, 10).unwrap();
        // some rim pixel is neither pure black nor pure white
        let partial = image.iter().any(|p| {
            let [r, _, _] = p.to_rgb();
            r > 10 && r < 245
        });
        assert!(partial);
    }

    #[test]
    fn test_miter_limit_bevel_no_spike() {
        // 5 degree wedge with miter limit 2 falls back to bevel, nothing
        // paints past two half-widths right of the vertex
        let angle_y = 60.0 - 50.0 * (5.0 as Scalar).to_radians().tan();
        let svg = format!(
            r#"<svg width="100" height="100"><path
                d="M10,60 L60,60 L10,{:.3}" fill="none" stroke="black"
                stroke-width="10" stroke-linejoin="miter" stroke-miterlimit="2"/></svg>"#,
            angle_y
        );
        let image = render_svg(&svg, 100, 100);
        for x in 71..100 {
            for y in 0..100 {
                assert_eq!(pixel(&image, x, y), WHITE, "spike at ({}, {})", x, y);
            }
        }
        // the stroke body itself is painted
        assert_eq!(pixel(&image, 30, 62), [0, 0, 0]);
    }
}
