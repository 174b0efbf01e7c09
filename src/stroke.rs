//! Stroke-to-outline expansion
//!
//! Converts a polyline with a stroke style into a closed polygon that, when
//! filled with the non-zero rule, covers exactly the stroked region. Joins
//! and caps follow the
//! [SVG painting model](https://www.w3.org/TR/SVG2/painting.html#StrokeShape).
use crate::{Point, Scalar, EPSILON};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// `LineCap` specifies the shape used at the ends of open sub-paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum LineCap {
    /// No extension beyond the endpoint
    #[default]
    Butt,
    /// Half-circle of stroke radius beyond the endpoint
    Round,
    /// Half-width box extension beyond the endpoint
    Square,
}

impl FromStr for LineCap {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "butt" => Ok(LineCap::Butt),
            "round" => Ok(LineCap::Round),
            "square" => Ok(LineCap::Square),
            _ => Err(()),
        }
    }
}

/// `LineJoin` defines the shape used where two stroked segments meet
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum LineJoin {
    /// Extend outer offset lines until they intersect, limited by the miter
    /// limit ratio
    #[default]
    Miter,
    /// Circular sector centered on the join point
    Round,
    /// Straight chord between the two offset points
    Bevel,
}

impl FromStr for LineJoin {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "miter" => Ok(LineJoin::Miter),
            "round" => Ok(LineJoin::Round),
            "bevel" => Ok(LineJoin::Bevel),
            _ => Err(()),
        }
    }
}

/// Style used to generate a stroke outline
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StrokeStyle {
    /// Width of the stroke
    pub width: Scalar,
    /// How to join segments at interior vertices
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "crate::utils::is_default")
    )]
    pub line_join: LineJoin,
    /// How to terminate open sub-paths
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "crate::utils::is_default")
    )]
    pub line_cap: LineCap,
    /// Miter length to half-width ratio at which miter falls back to bevel
    pub miter_limit: Scalar,
    /// Alternating on/off lengths, empty for a solid stroke
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub dash_array: Vec<Scalar>,
    /// Offset into the dash pattern
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "crate::utils::is_default")
    )]
    pub dash_offset: Scalar,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            line_join: LineJoin::default(),
            line_cap: LineCap::default(),
            miter_limit: 4.0,
            dash_array: Vec::new(),
            dash_offset: 0.0,
        }
    }
}

impl StrokeStyle {
    pub fn half_width(&self) -> Scalar {
        self.width / 2.0
    }

    /// Scale the stroke geometry by the transform's uniform scale factor
    pub fn scaled(&self, scale: Scalar) -> Self {
        Self {
            width: self.width * scale,
            ..self.clone()
        }
    }
}

/// Find intersection point of two infinite lines `(a0, a1)` and `(b0, b1)`
fn line_intersect(a0: Point, a1: Point, b0: Point, b1: Point) -> Option<Point> {
    let da = a1 - a0;
    let db = b1 - b0;
    let det = da.cross(db);
    if det.abs() < EPSILON {
        return None;
    }
    let t = (b0 - a0).cross(db) / det;
    Some(a0 + t * da)
}

/// Expand a polyline into the closed outline polygon of its stroke
///
/// The outline is the left offset side traversed forward joined with the
/// right offset side traversed backward. For closed polylines the start
/// vertex gets a join like any other vertex and the connecting edges between
/// the two sides cancel under the non-zero rule.
pub fn stroke_polyline(points: &[Point], closed: bool, style: &StrokeStyle) -> Vec<Point> {
    let half_width = style.half_width();
    if half_width < 0.01 {
        return Vec::new();
    }

    // drop repeated points, they produce no direction
    let mut vertices: Vec<Point> = Vec::with_capacity(points.len());
    for point in points {
        if vertices.last().map_or(true, |last| !last.is_close_to(*point)) {
            vertices.push(*point);
        }
    }
    if closed && vertices.len() >= 2 {
        if vertices[0].is_close_to(*vertices.last().expect("checked non empty")) {
            vertices.pop();
        }
    }
    let n = vertices.len();
    if n < 2 {
        return Vec::new();
    }

    // direction of every segment, including the closing one
    let mut directions: Vec<Point> = Vec::with_capacity(n);
    for i in 0..n - 1 {
        match (vertices[i + 1] - vertices[i]).normalize() {
            Some(dir) => directions.push(dir),
            None => return Vec::new(),
        }
    }
    if closed && n >= 3 {
        match (vertices[0] - vertices[n - 1]).normalize() {
            Some(dir) => directions.push(dir),
            None => return Vec::new(),
        }
    }

    let mut expander = Expander {
        half_width,
        style,
        left: Vec::new(),
        right: Vec::new(),
    };

    if !closed {
        expander.start_cap(vertices[0], directions[0]);
    }

    for i in 0..n {
        let p = vertices[i];
        let in_dir = if i > 0 {
            Some(directions[i - 1])
        } else if closed {
            directions.last().copied()
        } else {
            None
        };
        let out_dir = directions.get(i).copied();
        match (in_dir, out_dir) {
            (Some(in_dir), Some(out_dir)) => expander.join(p, in_dir, out_dir),
            (Some(in_dir), None) => {
                let perp = in_dir.normal();
                expander.left.push(p + half_width * perp);
                expander.right.push(p - half_width * perp);
            }
            (None, Some(out_dir)) => {
                let perp = out_dir.normal();
                expander.left.push(p + half_width * perp);
                expander.right.push(p - half_width * perp);
            }
            (None, None) => {}
        }
    }

    if !closed {
        expander.end_cap(vertices[n - 1], directions[n - 2]);
    }

    let Expander { mut left, right, .. } = expander;
    left.extend(right.into_iter().rev());
    left
}

struct Expander<'a> {
    half_width: Scalar,
    style: &'a StrokeStyle,
    left: Vec<Point>,
    right: Vec<Point>,
}

impl<'a> Expander<'a> {
    /// Append arc points of `radius` around `center` from `start` to `end`
    fn arc(&self, center: Point, start: Point, end: Point, clockwise: bool, out: &mut Vec<Point>) {
        let start_dir = match (start - center).normalize() {
            Some(dir) => dir,
            None => return,
        };
        let end_dir = match (end - center).normalize() {
            Some(dir) => dir,
            None => return,
        };
        let start_angle = start_dir.y().atan2(start_dir.x());
        let end_angle = end_dir.y().atan2(end_dir.x());
        let mut angle_diff = end_angle - start_angle;
        if clockwise {
            if angle_diff > 0.0 {
                angle_diff -= 2.0 * crate::PI;
            }
        } else if angle_diff < 0.0 {
            angle_diff += 2.0 * crate::PI;
        }
        // segment count proportional to the arc length
        let arc_length = angle_diff.abs() * self.half_width;
        let segments = ((arc_length / 2.0) as usize).max(4);
        let angle_step = angle_diff / segments as Scalar;
        for i in 1..=segments {
            let angle = start_angle + angle_step * i as Scalar;
            let (sin, cos) = angle.sin_cos();
            out.push(center + self.half_width * Point::new(cos, sin));
        }
    }

    fn start_cap(&mut self, point: Point, direction: Point) {
        let perp = direction.normal();
        let left = point + self.half_width * perp;
        let right = point - self.half_width * perp;
        match self.style.line_cap {
            LineCap::Butt => {
                self.left.push(left);
                self.right.push(right);
            }
            LineCap::Square => {
                self.left.push(left - self.half_width * direction);
                self.right.push(right - self.half_width * direction);
                self.left.push(left);
                self.right.push(right);
            }
            LineCap::Round => {
                // half circle through the back of the endpoint, it replaces
                // the closing edge between the two outline sides
                let mut arc = Vec::new();
                self.arc(point, right, left, true, &mut arc);
                self.left.extend(arc);
                self.right.push(right);
            }
        }
    }

    fn end_cap(&mut self, point: Point, direction: Point) {
        let perp = direction.normal();
        let left = point + self.half_width * perp;
        let right = point - self.half_width * perp;
        match self.style.line_cap {
            LineCap::Butt => {
                self.left.push(left);
                self.right.push(right);
            }
            LineCap::Square => {
                self.left.push(left);
                self.right.push(right);
                self.left.push(left + self.half_width * direction);
                self.right.push(right + self.half_width * direction);
            }
            LineCap::Round => {
                // half circle beyond the endpoint
                self.left.push(left);
                let mut arc = Vec::new();
                self.arc(point, left, right, true, &mut arc);
                self.left.extend(arc);
                self.right.push(right);
            }
        }
    }

    fn join(&mut self, point: Point, in_dir: Point, out_dir: Point) {
        let half_width = self.half_width;
        let in_perp = in_dir.normal();
        let out_perp = out_dir.normal();
        let cross = in_dir.cross(out_dir);
        let is_left_turn = cross > 0.0;

        let in_left = point + half_width * in_perp;
        let in_right = point - half_width * in_perp;
        let out_left = point + half_width * out_perp;
        let out_right = point - half_width * out_perp;

        // straight continuation needs no join geometry
        if cross.abs() < 1e-4 {
            self.left.push(out_left);
            self.right.push(out_right);
            return;
        }

        // inner side is always the intersection of the inner offset lines
        let inner_intersect = |a: Point, b: Point| -> Option<Point> {
            line_intersect(a - in_dir, a, b, b + out_dir)
        };

        match self.style.line_join {
            LineJoin::Bevel => {
                if is_left_turn {
                    match inner_intersect(in_left, out_left) {
                        Some(p) => self.left.push(p),
                        None => {
                            self.left.push(in_left);
                            self.left.push(out_left);
                        }
                    }
                    self.right.push(in_right);
                    self.right.push(out_right);
                } else {
                    self.left.push(in_left);
                    self.left.push(out_left);
                    match inner_intersect(in_right, out_right) {
                        Some(p) => self.right.push(p),
                        None => {
                            self.right.push(in_right);
                            self.right.push(out_right);
                        }
                    }
                }
            }
            LineJoin::Round => {
                // outer arc sweeps in the turn direction, the short way
                // between the two offsets
                if is_left_turn {
                    if let Some(p) = inner_intersect(in_left, out_left) {
                        self.left.push(p);
                    }
                    self.right.push(in_right);
                    let mut arc = Vec::new();
                    self.arc(point, in_right, out_right, false, &mut arc);
                    self.right.extend(arc);
                } else {
                    self.left.push(in_left);
                    let mut arc = Vec::new();
                    self.arc(point, in_left, out_left, true, &mut arc);
                    self.left.extend(arc);
                    if let Some(p) = inner_intersect(in_right, out_right) {
                        self.right.push(p);
                    }
                }
            }
            LineJoin::Miter => {
                let miter_dir = match (in_perp + out_perp).normalize() {
                    Some(dir) => dir,
                    None => {
                        // perpendiculars cancel on a half turn, use bevel
                        self.left.push(in_left);
                        self.left.push(out_left);
                        self.right.push(in_right);
                        self.right.push(out_right);
                        return;
                    }
                };
                let cos_half_angle = miter_dir.dot(in_perp).abs().max(0.01);
                let miter_length = half_width / cos_half_angle;
                let miter_ratio = miter_length / half_width;

                if miter_ratio > self.style.miter_limit {
                    // beyond the limit, fall back to bevel
                    if is_left_turn {
                        if let Some(p) = inner_intersect(in_left, out_left) {
                            self.left.push(p);
                        }
                        self.right.push(in_right);
                        self.right.push(out_right);
                    } else {
                        self.left.push(in_left);
                        self.left.push(out_left);
                        if let Some(p) = inner_intersect(in_right, out_right) {
                            self.right.push(p);
                        }
                    }
                } else if is_left_turn {
                    if let Some(p) = inner_intersect(in_left, out_left) {
                        self.left.push(p);
                    }
                    self.right.push(point - miter_length * miter_dir);
                } else {
                    self.left.push(point + miter_length * miter_dir);
                    if let Some(p) = inner_intersect(in_right, out_right) {
                        self.right.push(p);
                    }
                }
            }
        }
    }
}

/// Split a polyline into dash sub-polylines according to the dash pattern
///
/// Dash phases alternate on/off starting with "on"; the offset is applied
/// modulo the pattern length. Odd-length patterns are logically doubled.
/// Every emitted dash is an open polyline that receives caps at both ends,
/// even when the source polyline was closed.
pub fn apply_dashes(
    points: &[Point],
    closed: bool,
    dash_array: &[Scalar],
    dash_offset: Scalar,
) -> Vec<Vec<Point>> {
    let mut result = Vec::new();
    if dash_array.is_empty() {
        result.push(points.to_vec());
        return result;
    }
    if points.len() < 2 {
        return result;
    }

    // odd-length pattern repeats to even length
    let mut pattern: Vec<Scalar> = dash_array.iter().map(|d| d.max(0.0)).collect();
    if pattern.len() % 2 != 0 {
        let copy = pattern.clone();
        pattern.extend(copy);
    }
    let pattern_length: Scalar = pattern.iter().sum();
    if pattern_length < 1e-6 {
        result.push(points.to_vec());
        return result;
    }

    // segment lengths, including the closing segment for closed polylines
    let mut segments: Vec<(Point, Point, Scalar)> = points
        .windows(2)
        .map(|seg| (seg[0], seg[1], seg[0].dist(seg[1])))
        .collect();
    if closed {
        let first = points[0];
        let last = *points.last().expect("checked non empty");
        segments.push((last, first, last.dist(first)));
    }
    let total_length: Scalar = segments.iter().map(|(_, _, len)| len).sum();
    if total_length < 1e-6 {
        return result;
    }

    // position the walk inside the pattern according to the offset
    let mut offset = dash_offset.rem_euclid(pattern_length);
    let mut dash_index = 0;
    let mut dash_remaining = pattern[0];
    while offset >= dash_remaining {
        offset -= dash_remaining;
        dash_index = (dash_index + 1) % pattern.len();
        dash_remaining = pattern[dash_index];
    }
    dash_remaining -= offset;

    // even phases draw, odd phases skip
    let mut drawing = dash_index % 2 == 0;
    let mut current: Vec<Point> = Vec::new();
    if drawing {
        current.push(points[0]);
    }

    for (seg_start, seg_end, seg_length) in segments {
        if seg_length < 1e-6 {
            continue;
        }
        let mut progress: Scalar = 0.0;
        loop {
            let remaining = seg_length - progress;
            if remaining <= 1e-6 {
                break;
            }
            if dash_remaining <= remaining {
                // phase boundary falls inside this segment
                progress += dash_remaining;
                let t = progress / seg_length;
                let point = seg_start + t * (seg_end - seg_start);
                if drawing {
                    current.push(point);
                    if current.len() >= 2 {
                        result.push(std::mem::take(&mut current));
                    } else {
                        current.clear();
                    }
                }
                dash_index = (dash_index + 1) % pattern.len();
                dash_remaining = pattern[dash_index];
                drawing = !drawing;
                if drawing {
                    current.push(point);
                }
            } else {
                dash_remaining -= remaining;
                if drawing {
                    current.push(seg_end);
                }
                break;
            }
        }
    }

    if drawing && current.len() >= 2 {
        result.push(current);
    }
    result
}
