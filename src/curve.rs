//! Bezier curve flattening and elliptical arc conversion
//!
//! Curves are turned into polylines by recursive subdivision: if the control
//! points are within `tolerance` of the chord the chord is emitted, otherwise
//! the curve is split at `t = 0.5` with De Casteljau and both halves recurse.
use crate::{Point, Scalar, Transform, EPSILON, PI};

/// Default flatness tolerance in device pixels
pub const DEFAULT_FLATNESS: Scalar = 0.5;

/// Subdivision depth cap, curve is emitted as a chord once it is reached
pub const MAX_SUBDIVISIONS: usize = 10;

/// Maximum perpendicular distance from the control point to the chord `p0 -> p2`
pub fn quad_flatness(p0: Point, p1: Point, p2: Point) -> Scalar {
    let chord = p2 - p0;
    let len2 = chord.dot(chord);
    if len2 < 1e-10 {
        return (p1 - p0).length();
    }
    (p1 - p0).cross(chord).abs() / len2.sqrt()
}

/// Maximum perpendicular distance from either control point to the chord `p0 -> p3`
pub fn cubic_flatness(p0: Point, p1: Point, p2: Point, p3: Point) -> Scalar {
    let chord = p3 - p0;
    let len2 = chord.dot(chord);
    if len2 < 1e-10 {
        return (p1 - p0).length().max((p2 - p0).length());
    }
    let inv_len = len2.sqrt().recip();
    let d1 = (p1 - p0).cross(chord).abs() * inv_len;
    let d2 = (p2 - p0).cross(chord).abs() * inv_len;
    d1.max(d2)
}

/// Evaluate quadratic bezier at `t`
pub fn quad_at(p0: Point, p1: Point, p2: Point, t: Scalar) -> Point {
    let (t1, t_1) = (t, 1.0 - t);
    t_1 * t_1 * p0 + 2.0 * t1 * t_1 * p1 + t1 * t1 * p2
}

/// Evaluate cubic bezier at `t`
pub fn cubic_at(p0: Point, p1: Point, p2: Point, p3: Point, t: Scalar) -> Point {
    let (t1, t_1) = (t, 1.0 - t);
    let (t2, t_2) = (t1 * t1, t_1 * t_1);
    t_2 * t_1 * p0 + 3.0 * t1 * t_2 * p1 + 3.0 * t2 * t_1 * p2 + t2 * t1 * p3
}

/// Flatten quadratic bezier into `out`
///
/// The starting point is contributed by the previous command and is not
/// emitted here.
pub fn flatten_quad(p0: Point, p1: Point, p2: Point, tolerance: Scalar, out: &mut Vec<Point>) {
    flatten_quad_rec(p0, p1, p2, tolerance, 0, out)
}

fn flatten_quad_rec(
    p0: Point,
    p1: Point,
    p2: Point,
    tolerance: Scalar,
    depth: usize,
    out: &mut Vec<Point>,
) {
    if depth >= MAX_SUBDIVISIONS || quad_flatness(p0, p1, p2) <= tolerance {
        out.push(p2);
        return;
    }
    // De Casteljau split at t = 0.5
    let p01 = 0.5 * (p0 + p1);
    let p12 = 0.5 * (p1 + p2);
    let mid = 0.5 * (p01 + p12);
    flatten_quad_rec(p0, p01, mid, tolerance, depth + 1, out);
    flatten_quad_rec(mid, p12, p2, tolerance, depth + 1, out);
}

/// Flatten cubic bezier into `out`
///
/// The starting point is contributed by the previous command and is not
/// emitted here.
pub fn flatten_cubic(
    p0: Point,
    p1: Point,
    p2: Point,
    p3: Point,
    tolerance: Scalar,
    out: &mut Vec<Point>,
) {
    flatten_cubic_rec(p0, p1, p2, p3, tolerance, 0, out)
}

fn flatten_cubic_rec(
    p0: Point,
    p1: Point,
    p2: Point,
    p3: Point,
    tolerance: Scalar,
    depth: usize,
    out: &mut Vec<Point>,
) {
    if depth >= MAX_SUBDIVISIONS || cubic_flatness(p0, p1, p2, p3) <= tolerance {
        out.push(p3);
        return;
    }
    let p01 = 0.5 * (p0 + p1);
    let p12 = 0.5 * (p1 + p2);
    let p23 = 0.5 * (p2 + p3);
    let p012 = 0.5 * (p01 + p12);
    let p123 = 0.5 * (p12 + p23);
    let mid = 0.5 * (p012 + p123);
    flatten_cubic_rec(p0, p01, p012, mid, tolerance, depth + 1, out);
    flatten_cubic_rec(mid, p123, p23, p3, tolerance, depth + 1, out);
}

/// Elliptical arc in center parameterization
#[derive(Clone, Copy, PartialEq)]
pub struct EllipArc {
    /// center of the ellipse
    center: Point,
    /// radius along x-axis before the rotation
    rx: Scalar,
    /// radius along y-axis before the rotation
    ry: Scalar,
    /// rotation
    phi: Scalar,
    /// angular start
    eta: Scalar,
    /// angular size
    eta_delta: Scalar,
}

impl std::fmt::Debug for EllipArc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Arc center:{:?} radius:{:?} phi:{:.3?} eta:{:.3?} eta_delta:{:.3?}",
            self.center,
            Point([self.rx, self.ry]),
            self.phi,
            self.eta,
            self.eta_delta
        )
    }
}

impl EllipArc {
    /// Convert arc from SVG endpoint arguments to the parametric form
    ///
    /// This code mostly comes from arc implementation notes from SVG spec
    /// [Arc to Parametric](https://www.w3.org/TR/SVG/implnote.html#ArcImplementationNotes)
    pub fn new_param(
        src: Point,
        dst: Point,
        rx: Scalar,
        ry: Scalar,
        x_axis_rot: Scalar,
        large_flag: bool,
        sweep_flag: bool,
    ) -> Option<Self> {
        let rx = rx.abs();
        let ry = ry.abs();
        if rx < EPSILON || ry < EPSILON {
            return None;
        }
        let phi = x_axis_rot * PI / 180.0;

        // Eq 5.1
        let Point([x1, y1]) = Transform::new_rotate(-phi).apply(0.5 * (src - dst));
        // scale/normalize radii
        let s = (x1 / rx).powi(2) + (y1 / ry).powi(2);
        let (rx, ry) = if s > 1.0 {
            let s = s.sqrt();
            (rx * s, ry * s)
        } else {
            (rx, ry)
        };
        // Eq 5.2
        let sq = ((rx * ry).powi(2) / ((rx * y1).powi(2) + (ry * x1).powi(2)) - 1.0)
            .max(0.0)
            .sqrt();
        let sq = if large_flag == sweep_flag { -sq } else { sq };
        let center = sq * Point([rx * y1 / ry, -ry * x1 / rx]);
        let Point([cx, cy]) = center;
        // Eq 5.3 convert center to initial coordinates
        let center = Transform::new_rotate(phi).apply(center) + 0.5 * (dst + src);
        // Eq 5.5-6
        let v0 = Point([1.0, 0.0]);
        let v1 = Point([(x1 - cx) / rx, (y1 - cy) / ry]);
        let v2 = Point([(-x1 - cx) / rx, (-y1 - cy) / ry]);
        // initial angle
        let eta = v0.angle_between(v1)?;
        // delta angle to be covered when t changes from 0..1
        let eta_delta = v1.angle_between(v2)?.rem_euclid(2.0 * PI);
        let eta_delta = if !sweep_flag && eta_delta > 0.0 {
            eta_delta - 2.0 * PI
        } else if sweep_flag && eta_delta < 0.0 {
            eta_delta + 2.0 * PI
        } else {
            eta_delta
        };

        Some(Self {
            center,
            rx,
            ry,
            phi,
            eta,
            eta_delta,
        })
    }

    pub fn at(&self, t: Scalar) -> Point {
        let (angle_sin, angle_cos) = (self.eta + t * self.eta_delta).sin_cos();
        let point = Point([self.rx * angle_cos, self.ry * angle_sin]);
        Transform::new_rotate(self.phi).apply(point) + self.center
    }

    pub fn start(&self) -> Point {
        self.at(0.0)
    }

    pub fn end(&self) -> Point {
        self.at(1.0)
    }

    /// Convert elliptic arc to an iterator over cubic segments
    pub fn to_cubics(&self) -> EllipArcCubicIter {
        EllipArcCubicIter::new(*self)
    }

    /// Flatten the arc into `out` with the provided tolerance
    pub fn flatten(&self, tolerance: Scalar, out: &mut Vec<Point>) {
        for [p0, p1, p2, p3] in self.to_cubics() {
            flatten_cubic(p0, p1, p2, p3, tolerance, out);
        }
    }
}

/// Approximate arc with a sequence of cubic bezier curves
///
/// To achieve good approximation the arc is split in segments not bigger
/// than `pi / 2`, each segment is then approximated with a single cubic:
///     P0 = A(eta_1)
///     P1 = P0 + alpha * A'(eta_1)
///     P2 = P3 - alpha * A'(eta_2)
///     P3 = A(eta_2)
/// where
///     alpha = sin(eta_2 - eta_1) * (sqrt(4 + 3 * tan((eta_2 - eta_1) / 2) ^ 2) - 1) / 3
pub struct EllipArcCubicIter {
    arc: EllipArc,
    phi_tr: Transform,
    segment_delta: Scalar,
    segment_index: Scalar,
    segment_count: Scalar,
}

impl EllipArcCubicIter {
    fn new(arc: EllipArc) -> Self {
        let phi_tr = Transform::new_rotate(arc.phi);
        let segment_max_angle = PI / 2.0; // maximum `eta_delta` of a segment
        let segment_count = (arc.eta_delta.abs() / segment_max_angle).ceil().max(1.0);
        let segment_delta = arc.eta_delta / segment_count;
        Self {
            arc,
            phi_tr,
            segment_delta,
            segment_index: 0.0,
            segment_count: segment_count - 1.0,
        }
    }

    fn at(&self, alpha: Scalar) -> (Point, Point) {
        let (sin, cos) = alpha.sin_cos();
        let at = self
            .phi_tr
            .apply(Point([self.arc.rx * cos, self.arc.ry * sin]))
            + self.arc.center;
        let at_deriv = self
            .phi_tr
            .apply_vector(Point([-self.arc.rx * sin, self.arc.ry * cos]));
        (at, at_deriv)
    }
}

impl Iterator for EllipArcCubicIter {
    type Item = [Point; 4];

    fn next(&mut self) -> Option<Self::Item> {
        if self.segment_index > self.segment_count {
            return None;
        }
        let eta_1 = self.arc.eta + self.segment_delta * self.segment_index;
        let eta_2 = eta_1 + self.segment_delta;
        self.segment_index += 1.0;

        let sq = (4.0 + 3.0 * ((eta_2 - eta_1) / 2.0).tan().powi(2)).sqrt();
        let alpha = (eta_2 - eta_1).sin() * (sq - 1.0) / 3.0;
        let (p0, d0) = self.at(eta_1);
        let (p3, d3) = self.at(eta_2);
        let p1 = p0 + alpha * d0;
        let p2 = p3 - alpha * d3;
        Some([p0, p1, p2, p3])
    }
}
