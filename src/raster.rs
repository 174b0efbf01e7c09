//! Scanline polygon rasterization with coverage anti-aliasing
//!
//! All sub-polygons of a shape contribute their edges to one edge table, a
//! shared winding count across sub-paths is what makes holes fill correctly.
//! Per pixel coverage is computed by point sampling (center or a fixed
//! multi-sample pattern) or by accumulating inside-span lengths on a set of
//! sublines through the pixel.
use crate::{BBox, ImageMut, ImageOwned, Point, Scalar, Size};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The algorithm used to determine the inside of a shape when filling it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FillRule {
    /// Fill area with non-zero winding number
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "nonzero"))]
    NonZero,
    /// Fill area with odd winding number
    #[cfg_attr(feature = "serde", serde(rename = "evenodd"))]
    EvenOdd,
}

impl FillRule {
    #[inline]
    pub fn is_inside(&self, winding: i32) -> bool {
        match self {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => winding & 1 != 0,
        }
    }
}

impl FromStr for FillRule {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nonzero" => Ok(FillRule::NonZero),
            "evenodd" => Ok(FillRule::EvenOdd),
            _ => Err(()),
        }
    }
}

impl fmt::Display for FillRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillRule::NonZero => "nonzero".fmt(f),
            FillRule::EvenOdd => "evenodd".fmt(f),
        }
    }
}

/// Anti-aliasing mode of the rasterizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum AaMode {
    /// Single sample at the pixel center
    None,
    /// Four sample rotated grid
    #[default]
    Coverage4x,
    /// Eight sample pattern
    Coverage8x,
    /// Sixteen sample jittered grid
    Coverage16x,
    /// Span accumulation on eight sublines per pixel
    Analytical,
}

// rotated-grid pattern, robust for near axis-aligned edges
const PATTERN_1X: [(Scalar, Scalar); 1] = [(0.5, 0.5)];
const PATTERN_4X: [(Scalar, Scalar); 4] = [
    (0.375, 0.125),
    (0.875, 0.375),
    (0.125, 0.625),
    (0.625, 0.875),
];
const PATTERN_8X: [(Scalar, Scalar); 8] = [
    (0.5625, 0.3125),
    (0.4375, 0.6875),
    (0.8125, 0.5625),
    (0.3125, 0.1875),
    (0.1875, 0.8125),
    (0.0625, 0.4375),
    (0.6875, 0.9375),
    (0.9375, 0.0625),
];
// jittered 4x4 grid
const PATTERN_16X: [(Scalar, Scalar); 16] = [
    (0.0625, 0.0625),
    (0.1875, 0.3125),
    (0.3125, 0.1875),
    (0.4375, 0.4375),
    (0.5625, 0.0625),
    (0.6875, 0.3125),
    (0.8125, 0.1875),
    (0.9375, 0.4375),
    (0.0625, 0.5625),
    (0.1875, 0.8125),
    (0.3125, 0.6875),
    (0.4375, 0.9375),
    (0.5625, 0.5625),
    (0.6875, 0.8125),
    (0.8125, 0.6875),
    (0.9375, 0.9375),
];

impl AaMode {
    fn sample_pattern(&self) -> &'static [(Scalar, Scalar)] {
        match self {
            AaMode::Coverage4x => &PATTERN_4X,
            AaMode::Coverage8x => &PATTERN_8X,
            AaMode::Coverage16x => &PATTERN_16X,
            _ => &PATTERN_1X,
        }
    }
}

/// Non-horizontal polygon edge
///
/// Kept in scanline form: x at the top y together with the inverse slope.
/// `dir` is `+1` for an edge going down and `-1` for an edge going up, their
/// sum along a ray is the winding number.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Edge {
    y_min: Scalar,
    y_max: Scalar,
    x_at_y_min: Scalar,
    dx_per_y: Scalar,
    dir: i32,
}

impl Edge {
    /// Construct edge from segment endpoints, horizontal segments carry no
    /// winding and are dropped
    fn new(p0: Point, p1: Point) -> Option<Self> {
        let dy = p1.y() - p0.y();
        if dy.abs() < 1e-6 {
            return None;
        }
        let (top, bottom, dir) = if p0.y() <= p1.y() {
            (p0, p1, 1)
        } else {
            (p1, p0, -1)
        };
        Some(Self {
            y_min: top.y(),
            y_max: bottom.y(),
            x_at_y_min: top.x(),
            dx_per_y: (bottom.x() - top.x()) / (bottom.y() - top.y()),
            dir,
        })
    }

    #[inline]
    fn x_at(&self, y: Scalar) -> Scalar {
        self.x_at_y_min + (y - self.y_min) * self.dx_per_y
    }

    /// Half-open interval test used for scanline crossings, the bottom end
    /// is excluded so shared vertices are counted once
    #[inline]
    fn crosses(&self, y: Scalar) -> bool {
        y >= self.y_min && y < self.y_max
    }
}

/// Scanline rasterizer producing a coverage mask
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rasterizer {
    pub fill_rule: FillRule,
    pub aa_mode: AaMode,
}

impl Rasterizer {
    pub fn new(fill_rule: FillRule, aa_mode: AaMode) -> Self {
        Self { fill_rule, aa_mode }
    }

    /// Rasterize sub-polygons into a `width x height` coverage mask
    ///
    /// Every sub-polygon is implicitly closed. Coverage is only computed
    /// inside the polygon bounding box clipped to the mask.
    pub fn mask(&self, subpaths: &[Vec<Point>], width: usize, height: usize) -> ImageOwned<Scalar> {
        self.mask_impl(subpaths.iter().map(|points| points.as_slice()), width, height)
    }

    /// Rasterize a single polygon, see [`Rasterizer::mask`]
    pub fn mask_polygon(
        &self,
        polygon: &[Point],
        width: usize,
        height: usize,
    ) -> ImageOwned<Scalar> {
        self.mask_impl(std::iter::once(polygon), width, height)
    }

    /// Rasterize sub-polygons provided as an iterator of point slices
    pub fn mask_subpaths<'a>(
        &self,
        subpaths: impl Iterator<Item = &'a [Point]>,
        width: usize,
        height: usize,
    ) -> ImageOwned<Scalar> {
        self.mask_impl(subpaths, width, height)
    }

    fn mask_impl<'a>(
        &self,
        subpaths: impl Iterator<Item = &'a [Point]>,
        width: usize,
        height: usize,
    ) -> ImageOwned<Scalar> {
        let mut mask = ImageOwned::new_default(Size::new(width, height));
        if width == 0 || height == 0 {
            return mask;
        }

        let mut edges = Vec::new();
        let mut bbox = BBox::empty();
        for points in subpaths {
            if points.len() < 2 {
                continue;
            }
            for i in 0..points.len() {
                let j = (i + 1) % points.len();
                if !points[i].is_finite() || !points[j].is_finite() {
                    continue;
                }
                bbox = bbox.extend(points[i]);
                edges.extend(Edge::new(points[i], points[j]));
            }
        }
        if edges.is_empty() || bbox.is_empty() {
            return mask;
        }
        if bbox.max().y() < 0.0 || bbox.max().x() < 0.0 {
            return mask;
        }

        let y_min = bbox.y().floor().max(0.0) as usize;
        let y_max = bbox.max().y().ceil().min(height as Scalar - 1.0).max(0.0) as usize;
        let x_min = bbox.x().floor().max(0.0) as usize;
        let x_max = bbox.max().x().ceil().min(width as Scalar - 1.0).max(0.0) as usize;

        for y in y_min..=y_max {
            // skip rows no edge passes through
            let row_top = y as Scalar;
            let active = edges
                .iter()
                .any(|edge| edge.y_min <= row_top + 1.0 && edge.y_max >= row_top);
            if !active {
                continue;
            }
            for x in x_min..=x_max {
                let coverage = self.pixel_coverage(x, y, &edges);
                if coverage > 0.0 {
                    if let Some(pixel) = mask.get_mut(y, x) {
                        *pixel = coverage;
                    }
                }
            }
        }
        mask
    }

    fn pixel_coverage(&self, px: usize, py: usize, edges: &[Edge]) -> Scalar {
        match self.aa_mode {
            AaMode::Analytical => self.analytical_coverage(px, py, edges),
            _ => {
                let samples = self.aa_mode.sample_pattern();
                let mut hits = 0usize;
                for (sx, sy) in samples {
                    let x = px as Scalar + sx;
                    let y = py as Scalar + sy;
                    let mut winding = 0;
                    for edge in edges {
                        if edge.crosses(y) && edge.x_at(y) > x {
                            winding += edge.dir;
                        }
                    }
                    if self.fill_rule.is_inside(winding) {
                        hits += 1;
                    }
                }
                hits as Scalar / samples.len() as Scalar
            }
        }
    }

    /// Accumulate the inside-span length on 8 sublines through the pixel
    fn analytical_coverage(&self, px: usize, py: usize, edges: &[Edge]) -> Scalar {
        const Y_STEPS: usize = 8;
        let left = px as Scalar;
        let right = left + 1.0;
        let top = py as Scalar;

        let mut coverage: Scalar = 0.0;
        let mut crossings: Vec<(Scalar, i32)> = Vec::new();
        for yi in 0..Y_STEPS {
            let y = top + (yi as Scalar + 0.5) / Y_STEPS as Scalar;

            crossings.clear();
            for edge in edges {
                if edge.crosses(y) {
                    let x = edge.x_at(y);
                    if x < right {
                        crossings.push((x, edge.dir));
                    }
                }
            }
            // winding accumulates left to right, crossings right of the
            // pixel never change the state inside of it
            crossings.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

            let mut winding = 0;
            let mut last_x = left;
            for (x, dir) in crossings.iter() {
                let clamped = x.clamp(left, right);
                if self.fill_rule.is_inside(winding) && clamped > last_x {
                    coverage += clamped - last_x;
                }
                winding += dir;
                last_x = last_x.max(clamped);
            }
            if self.fill_rule.is_inside(winding) && right > last_x {
                coverage += right - last_x;
            }
        }
        (coverage / Y_STEPS as Scalar).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_approx_eq, Image};

    fn square(x0: Scalar, y0: Scalar, x1: Scalar, y1: Scalar) -> Vec<Point> {
        vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]
    }

    #[test]
    fn test_fill_square_center_sampling() {
        let rasterizer = Rasterizer::new(FillRule::NonZero, AaMode::None);
        let mask = rasterizer.mask_polygon(&square(1.0, 1.0, 4.0, 3.0), 6, 5);
        for y in 0..5 {
            for x in 0..6 {
                let expected = if (1..4).contains(&x) && (1..3).contains(&y) {
                    1.0
                } else {
                    0.0
                };
                assert_approx_eq!(*mask.get(y, x).unwrap(), expected);
            }
        }
    }

    #[test]
    fn test_winding_direction_cancels() {
        // two overlapping squares with opposite orientation erase each other
        // under the non-zero rule
        let outer = square(0.0, 0.0, 6.0, 6.0);
        let inner: Vec<Point> = square(2.0, 2.0, 4.0, 4.0).into_iter().rev().collect();
        let rasterizer = Rasterizer::new(FillRule::NonZero, AaMode::None);
        let mask = rasterizer.mask(&[outer, inner], 6, 6);
        assert_approx_eq!(*mask.get(3, 3).unwrap(), 0.0);
        assert_approx_eq!(*mask.get(1, 1).unwrap(), 1.0);
    }

    #[test]
    fn test_even_odd_hole() {
        // same winding direction still produces a hole under even-odd
        let rasterizer = Rasterizer::new(FillRule::EvenOdd, AaMode::None);
        let subpaths = vec![square(0.0, 0.0, 8.0, 8.0), square(2.0, 2.0, 6.0, 6.0)];
        let mask = rasterizer.mask(&subpaths, 8, 8);
        assert_approx_eq!(*mask.get(4, 4).unwrap(), 0.0);
        assert_approx_eq!(*mask.get(1, 1).unwrap(), 1.0);

        // non-zero fills the hole
        let rasterizer = Rasterizer::new(FillRule::NonZero, AaMode::None);
        let mask = rasterizer.mask(&subpaths, 8, 8);
        assert_approx_eq!(*mask.get(4, 4).unwrap(), 1.0);
    }

    #[test]
    fn test_nonzero_covers_evenodd() {
        // NonZero coverage is pixelwise >= EvenOdd for identical geometry
        let subpaths = vec![square(0.0, 0.0, 8.0, 8.0), square(2.0, 2.0, 6.0, 6.0)];
        let nz = Rasterizer::new(FillRule::NonZero, AaMode::Coverage4x).mask(&subpaths, 8, 8);
        let eo = Rasterizer::new(FillRule::EvenOdd, AaMode::Coverage4x).mask(&subpaths, 8, 8);
        for (a, b) in nz.iter().zip(eo.iter()) {
            assert!(a >= b);
        }
    }

    #[test]
    fn test_half_covered_pixel() {
        // square covering the left half of pixel (0, 0)
        let polygon = square(0.0, 0.0, 0.5, 1.0);
        for aa_mode in [
            AaMode::Coverage4x,
            AaMode::Coverage8x,
            AaMode::Coverage16x,
            AaMode::Analytical,
        ] {
            let rasterizer = Rasterizer::new(FillRule::NonZero, aa_mode);
            let mask = rasterizer.mask_polygon(&polygon, 2, 2);
            let coverage = *mask.get(0, 0).unwrap();
            assert_approx_eq!(coverage, 0.5, 0.13);
        }
        // analytical is exact for axis aligned boxes
        let mask =
            Rasterizer::new(FillRule::NonZero, AaMode::Analytical).mask_polygon(&polygon, 2, 2);
        assert_approx_eq!(*mask.get(0, 0).unwrap(), 0.5, 1e-9);
    }

    #[test]
    fn test_diagonal_coverage_sums() {
        // triangle covering half of a 4x4 box, total coverage is its area
        let triangle = vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(0.0, 4.0),
        ];
        let rasterizer = Rasterizer::new(FillRule::NonZero, AaMode::Analytical);
        let mask = rasterizer.mask_polygon(&triangle, 4, 4);
        let total: Scalar = mask.iter().sum();
        assert_approx_eq!(total, 8.0, 0.1);
    }

    #[test]
    fn test_out_of_bounds_clipping() {
        let rasterizer = Rasterizer::new(FillRule::NonZero, AaMode::None);
        // polygon fully outside the mask
        let mask = rasterizer.mask_polygon(&square(-10.0, -10.0, -2.0, -2.0), 4, 4);
        assert_approx_eq!(mask.iter().sum::<Scalar>(), 0.0);
        let mask = rasterizer.mask_polygon(&square(10.0, 10.0, 20.0, 20.0), 4, 4);
        assert_approx_eq!(mask.iter().sum::<Scalar>(), 0.0);
        // partially visible polygon only covers the visible part
        let mask = rasterizer.mask_polygon(&square(-2.0, -2.0, 2.0, 2.0), 4, 4);
        assert_approx_eq!(mask.iter().sum::<Scalar>(), 4.0);
    }

    #[test]
    fn test_degenerate_input() {
        let rasterizer = Rasterizer::new(FillRule::NonZero, AaMode::None);
        let mask = rasterizer.mask_polygon(&[], 4, 4);
        assert_approx_eq!(mask.iter().sum::<Scalar>(), 0.0);
        let mask = rasterizer.mask_polygon(&[Point::new(1.0, 1.0)], 4, 4);
        assert_approx_eq!(mask.iter().sum::<Scalar>(), 0.0);
        // horizontal line only polygon has no area
        let line = vec![Point::new(0.0, 1.0), Point::new(3.0, 1.0)];
        let mask = rasterizer.mask_polygon(&line, 4, 4);
        assert_approx_eq!(mask.iter().sum::<Scalar>(), 0.0);
        let mask = rasterizer.mask_polygon(&[], 0, 0);
        assert_eq!(mask.size(), Size::new(0, 0));
    }
}
