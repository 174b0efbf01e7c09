//! Basic 2D geometry: points, affine transforms and bounding boxes
use std::{
    fmt,
    ops::{Add, Div, Mul, Neg, Sub},
};

pub type Scalar = f64;
pub const EPSILON: Scalar = f64::EPSILON;
pub const EPSILON_SQRT: Scalar = 1.490_116_119_384_765_6e-8;
pub const PI: Scalar = std::f64::consts::PI;

/// Format floats in a compact way suitable for SVG path
pub fn scalar_fmt(f: &mut fmt::Formatter<'_>, value: Scalar) -> fmt::Result {
    let value_abs = value.abs();
    if value_abs.fract() < EPSILON {
        write!(f, "{}", value.trunc() as i64)
    } else if value_abs > 9999.0 || value_abs <= 0.0001 {
        write!(f, "{:.3e}", value)
    } else {
        let ten: Scalar = 10.0;
        let round = ten.powi(6 - (value_abs.trunc() + 1.0).log10().ceil() as i32);
        write!(f, "{}", (value * round).round() / round)
    }
}

/// Value representing a 2D point or vector.
#[derive(Clone, Copy, PartialEq, Default)]
pub struct Point(pub [Scalar; 2]);

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Point([x, y]) = self;
        scalar_fmt(f, *x)?;
        write!(f, ",")?;
        scalar_fmt(f, *y)?;
        Ok(())
    }
}

impl Point {
    #[inline]
    pub fn new(x: Scalar, y: Scalar) -> Self {
        Self([x, y])
    }

    /// Get `x` component of the point
    #[inline]
    pub fn x(&self) -> Scalar {
        self.0[0]
    }

    /// Get `y` component of the point
    #[inline]
    pub fn y(self) -> Scalar {
        self.0[1]
    }

    /// Get length of the vector (distance from the origin)
    pub fn length(self) -> Scalar {
        let Self([x, y]) = self;
        x.hypot(y)
    }

    /// Distance between two points
    pub fn dist(self, other: Self) -> Scalar {
        (self - other).length()
    }

    /// Dot product between two vectors
    pub fn dot(self, other: Self) -> Scalar {
        let Self([x0, y0]) = self;
        let Self([x1, y1]) = other;
        x0 * x1 + y0 * y1
    }

    /// Cross product between two vectors
    pub fn cross(self, other: Self) -> Scalar {
        let Self([x0, y0]) = self;
        let Self([x1, y1]) = other;
        x0 * y1 - y0 * x1
    }

    /// Get vector normal (not a unit sized)
    pub fn normal(self) -> Point {
        let Self([x, y]) = self;
        Self([-y, x])
    }

    /// Convert vector to a unit size vector, if length is not zero
    pub fn normalize(self) -> Option<Point> {
        let Self([x, y]) = self;
        let length = self.length();
        if length < EPSILON_SQRT {
            None
        } else {
            Some(Self([x / length, y / length]))
        }
    }

    /// Calculate angle (from self to the other) between two vectors
    pub fn angle_between(self, other: Self) -> Option<Scalar> {
        let angle = crate::utils::clamp(self.cos_between(other)?, -1.0, 1.0).acos();
        if self.cross(other) < 0.0 {
            Some(-angle)
        } else {
            Some(angle)
        }
    }

    /// Cosine of the angle (from self to the other) between two vectors
    pub fn cos_between(self, other: Self) -> Option<Scalar> {
        let lengths = self.length() * other.length();
        if lengths < EPSILON {
            None
        } else {
            Some(self.dot(other) / lengths)
        }
    }

    /// Determine if self is close to the other within the margin of error
    pub fn is_close_to(self, other: Point) -> bool {
        let Self([x0, y0]) = self;
        let Self([x1, y1]) = other;
        (x0 - x1).abs() < EPSILON_SQRT && (y0 - y1).abs() < EPSILON_SQRT
    }

    /// Both components are finite numbers
    pub fn is_finite(self) -> bool {
        let Self([x, y]) = self;
        x.is_finite() && y.is_finite()
    }
}

impl From<(Scalar, Scalar)> for Point {
    #[inline]
    fn from(xy: (Scalar, Scalar)) -> Self {
        Self([xy.0, xy.1])
    }
}

impl Mul<Point> for Scalar {
    type Output = Point;

    #[inline]
    fn mul(self, other: Point) -> Self::Output {
        let Point([x, y]) = other;
        Point([self * x, self * y])
    }
}

impl Mul<Scalar> for Point {
    type Output = Point;

    #[inline]
    fn mul(self, rhs: Scalar) -> Self::Output {
        let Point([x, y]) = self;
        Point([x * rhs, y * rhs])
    }
}

impl Div<Scalar> for Point {
    type Output = Point;

    #[inline]
    fn div(self, rhs: Scalar) -> Self::Output {
        let Point([x, y]) = self;
        Point([x / rhs, y / rhs])
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, other: Point) -> Self::Output {
        let Point([x0, y0]) = self;
        let Point([x1, y1]) = other;
        Point([x0 + x1, y0 + y1])
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, other: Point) -> Self::Output {
        let Point([x0, y0]) = self;
        let Point([x1, y1]) = other;
        Point([x0 - x1, y0 - y1])
    }
}

impl Neg for Point {
    type Output = Point;

    #[inline]
    fn neg(self) -> Self::Output {
        let Point([x, y]) = self;
        Point([-x, -y])
    }
}

/// 2D affine transformation
///
/// Stored as an array [m00, m01, m02, m10, m11, m12] but semantically corresponds to
/// a matrix:
/// ┌             ┐
/// │ m00 m01 m02 │
/// │ m10 m11 m12 │
/// │   0   0   1 │
/// └             ┘
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform([Scalar; 6]);

impl Default for Transform {
    fn default() -> Self {
        Self([1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self::default()
    }

    /// Construct transform from the SVG `matrix(a, b, c, d, e, f)` order
    pub fn new(a: Scalar, b: Scalar, c: Scalar, d: Scalar, e: Scalar, f: Scalar) -> Self {
        Self([a, c, e, b, d, f])
    }

    pub fn new_translate(tx: Scalar, ty: Scalar) -> Self {
        Self([1.0, 0.0, tx, 0.0, 1.0, ty])
    }

    pub fn new_scale(sx: Scalar, sy: Scalar) -> Self {
        Self([sx, 0.0, 0.0, 0.0, sy, 0.0])
    }

    pub fn new_rotate(a: Scalar) -> Self {
        let (sin, cos) = a.sin_cos();
        Self([cos, -sin, 0.0, sin, cos, 0.0])
    }

    pub fn new_skew_x(a: Scalar) -> Self {
        Self([1.0, a.tan(), 0.0, 0.0, 1.0, 0.0])
    }

    pub fn new_skew_y(a: Scalar) -> Self {
        Self([1.0, 0.0, 0.0, a.tan(), 1.0, 0.0])
    }

    /// Apply this transformation to a point
    pub fn apply(&self, point: Point) -> Point {
        let Self([m00, m01, m02, m10, m11, m12]) = self;
        let Point([x, y]) = point;
        Point([x * m00 + y * m01 + m02, x * m10 + y * m11 + m12])
    }

    /// Apply this transformation to a vector (translation is ignored)
    pub fn apply_vector(&self, vector: Point) -> Point {
        let Self([m00, m01, _, m10, m11, _]) = self;
        let Point([x, y]) = vector;
        Point([x * m00 + y * m01, x * m10 + y * m11])
    }

    /// Find the inverse transformation
    pub fn invert(&self) -> Option<Self> {
        // inv([[M, v], [0, 1]]) = [[inv(M), - inv(M) * v], [0, 1]]
        let Self([m00, m01, m02, m10, m11, m12]) = self;
        let det = m00 * m11 - m10 * m01;
        if det.abs() <= EPSILON {
            return None;
        }
        let o00 = m11 / det;
        let o01 = -m01 / det;
        let o10 = -m10 / det;
        let o11 = m00 / det;
        let o02 = -o00 * m02 - o01 * m12;
        let o12 = -o10 * m02 - o11 * m12;
        Some(Self([o00, o01, o02, o10, o11, o12]))
    }

    /// Apply translation by `[tx, ty]` before self
    pub fn translate(&self, tx: Scalar, ty: Scalar) -> Self {
        self.matmul(Self::new_translate(tx, ty))
    }

    /// Apply scale transformation by `[sx, sy]` before self
    pub fn scale(&self, sx: Scalar, sy: Scalar) -> Self {
        self.matmul(Self::new_scale(sx, sy))
    }

    /// Apply rotation by `a` angle around the origin before self
    pub fn rotate(&self, a: Scalar) -> Self {
        self.matmul(Self::new_rotate(a))
    }

    /// Apply skew along the x axis by `a` angle before self
    pub fn skew_x(&self, a: Scalar) -> Self {
        self.matmul(Self::new_skew_x(a))
    }

    /// Apply skew along the y axis by `a` angle before self
    pub fn skew_y(&self, a: Scalar) -> Self {
        self.matmul(Self::new_skew_y(a))
    }

    /// Multiply transformations in matrix form
    pub fn matmul(&self, other: Transform) -> Self {
        let Self([s00, s01, s02, s10, s11, s12]) = self;
        let Self([o00, o01, o02, o10, o11, o12]) = other;

        // s00, s01, s02 | o00, o01, o02
        // s10, s11, s12 | o10, o11, o12
        // 0  , 0  , 1   | 0  , 0  , 1
        Self([
            s00 * o00 + s01 * o10,
            s00 * o01 + s01 * o11,
            s00 * o02 + s01 * o12 + s02,
            s10 * o00 + s11 * o10,
            s10 * o01 + s11 * o11,
            s10 * o02 + s11 * o12 + s12,
        ])
    }

    /// Uniform scale factor of the transform
    ///
    /// Average of the lengths of the two transformed axis vectors. Used to
    /// scale stroke widths when geometry goes through a transform.
    pub fn scale_factor(&self) -> Scalar {
        let Self([m00, m01, _, m10, m11, _]) = self;
        (m00.hypot(*m10) + m01.hypot(*m11)) / 2.0
    }

    /// Determinant of the linear part of the transform
    pub fn det(&self) -> Scalar {
        let Self([m00, m01, _, m10, m11, _]) = self;
        m00 * m11 - m10 * m01
    }
}

impl Mul<Transform> for Transform {
    type Output = Transform;

    fn mul(self, other: Transform) -> Self::Output {
        self.matmul(other)
    }
}

/// Stack of composed transforms used while walking a scene
#[derive(Debug, Clone)]
pub struct TransformStack {
    stack: Vec<Transform>,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new(Transform::identity())
    }
}

impl TransformStack {
    pub fn new(root: Transform) -> Self {
        Self { stack: vec![root] }
    }

    /// Current composed transform
    pub fn current(&self) -> Transform {
        *self.stack.last().expect("transform stack is never empty")
    }

    /// Duplicate the current transform on top of the stack
    pub fn push(&mut self) {
        self.stack.push(self.current());
    }

    /// Compose `tr` after the current transform
    pub fn multiply(&mut self, tr: Transform) {
        let top = self.stack.last_mut().expect("transform stack is never empty");
        *top = top.matmul(tr);
    }

    pub fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    pub fn transform_point(&self, point: Point) -> Point {
        self.current().apply(point)
    }
}

/// Bounding box with sides directed along the axes
///
/// The empty box is the sentinel with `min` at +∞ and `max` at −∞, so that
/// extending it with any point yields that point.
#[derive(Clone, Copy, PartialEq)]
pub struct BBox {
    min: Point,
    max: Point,
}

impl Default for BBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BBox {
    /// Construct bounding box which includes points `p0` and `p1`
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>) -> Self {
        let Point([x0, y0]) = p0.into();
        let Point([x1, y1]) = p1.into();
        let (x0, x1) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (y0, y1) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        Self {
            min: Point([x0, y0]),
            max: Point([x1, y1]),
        }
    }

    /// Bounding box containing nothing
    pub fn empty() -> Self {
        Self {
            min: Point([Scalar::INFINITY, Scalar::INFINITY]),
            max: Point([Scalar::NEG_INFINITY, Scalar::NEG_INFINITY]),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x() > self.max.x() || self.min.y() > self.max.y()
    }

    /// Point with minimum values of x and y coordinates
    #[inline]
    pub fn min(&self) -> Point {
        self.min
    }

    /// Point with maximum values of x and y coordinates
    #[inline]
    pub fn max(&self) -> Point {
        self.max
    }

    /// `x` coordinate of the point with the minimal value
    #[inline]
    pub fn x(&self) -> Scalar {
        self.min.x()
    }

    /// `y` coordinate of the point with the minimal value
    #[inline]
    pub fn y(&self) -> Scalar {
        self.min.y()
    }

    /// Width of the bounding box
    #[inline]
    pub fn width(&self) -> Scalar {
        self.max.x() - self.min.x()
    }

    /// Height of the bounding box
    #[inline]
    pub fn height(&self) -> Scalar {
        self.max.y() - self.min.y()
    }

    /// Determine if the point is inside of the bounding box
    pub fn contains(&self, point: Point) -> bool {
        let Point([x, y]) = point;
        self.min.x() <= x && x <= self.max.x() && self.min.y() <= y && y <= self.max.y()
    }

    /// Extend bounding box so it would contain provided point
    pub fn extend(&self, point: Point) -> Self {
        let Point([x, y]) = point;
        Self {
            min: Point([self.min.x().min(x), self.min.y().min(y)]),
            max: Point([self.max.x().max(x), self.max.y().max(y)]),
        }
    }

    /// Create bounding box that spans both boxes
    pub fn union(&self, other: BBox) -> Self {
        Self {
            min: Point([self.min.x().min(other.min.x()), self.min.y().min(other.min.y())]),
            max: Point([self.max.x().max(other.max.x()), self.max.y().max(other.max.y())]),
        }
    }

    /// Find bounding box of the intersection of two bounding boxes
    pub fn intersect(&self, other: BBox) -> Option<BBox> {
        let (x_min, x_max) =
            range_intersect(self.min.x(), self.max.x(), other.min.x(), other.max.x())?;
        let (y_min, y_max) =
            range_intersect(self.min.y(), self.max.y(), other.min.y(), other.max.y())?;
        Some(BBox {
            min: Point::new(x_min, y_min),
            max: Point::new(x_max, y_max),
        })
    }
}

/// Find intersection of two ranges
fn range_intersect(
    r0_min: Scalar,
    r0_max: Scalar,
    r1_min: Scalar,
    r1_max: Scalar,
) -> Option<(Scalar, Scalar)> {
    if r0_min > r1_max || r1_min > r0_max {
        None
    } else {
        Some((r0_min.max(r1_min), r0_max.min(r1_max)))
    }
}

impl fmt::Debug for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "BBox empty");
        }
        write!(f, "BBox x=")?;
        scalar_fmt(f, self.x())?;
        write!(f, ", y=")?;
        scalar_fmt(f, self.y())?;
        write!(f, ", w=")?;
        scalar_fmt(f, self.width())?;
        write!(f, ", h=")?;
        scalar_fmt(f, self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    #[test]
    fn test_transform() {
        let tr = Transform::identity()
            .translate(1.0, 2.0)
            .rotate(PI / 3.0)
            .skew_x(2.0)
            .skew_y(3.0)
            .scale(3.0, 2.0);
        let inv = tr.invert().unwrap();
        let p0 = Point::new(1.0, 1.0);

        let p1 = inv.apply(tr.apply(p0));
        assert_approx_eq!(p1.x(), 1.0, 1e-6);
        assert_approx_eq!(p1.y(), 1.0, 1e-6);

        // vector transform ignores translation
        let tr = Transform::new_translate(5.0, 7.0).scale(2.0, 3.0);
        let v = tr.apply_vector(Point::new(1.0, 1.0));
        assert_approx_eq!(v.x(), 2.0);
        assert_approx_eq!(v.y(), 3.0);
    }

    #[test]
    fn test_svg_matrix_order() {
        // matrix(a, b, c, d, e, f) maps (x, y) to (a x + c y + e, b x + d y + f)
        let tr = Transform::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        let p = tr.apply(Point::new(1.0, 1.0));
        assert_approx_eq!(p.x(), 9.0);
        assert_approx_eq!(p.y(), 12.0);
    }

    #[test]
    fn test_scale_factor() {
        assert_approx_eq!(Transform::identity().scale_factor(), 1.0);
        assert_approx_eq!(Transform::new_scale(2.0, 2.0).scale_factor(), 2.0);
        assert_approx_eq!(Transform::new_scale(1.0, 3.0).scale_factor(), 2.0);
        // rotation does not change the scale factor
        assert_approx_eq!(Transform::new_rotate(PI / 5.0).scale_factor(), 1.0, 1e-9);
    }

    #[test]
    fn test_transform_stack() {
        let mut stack = TransformStack::new(Transform::new_scale(2.0, 2.0));
        stack.push();
        stack.multiply(Transform::new_translate(1.0, 0.0));
        let p = stack.transform_point(Point::new(1.0, 1.0));
        assert_approx_eq!(p.x(), 4.0);
        assert_approx_eq!(p.y(), 2.0);
        stack.pop();
        let p = stack.transform_point(Point::new(1.0, 1.0));
        assert_approx_eq!(p.x(), 2.0);
        assert_approx_eq!(p.y(), 2.0);
    }

    #[test]
    fn test_bbox() {
        let bbox = BBox::empty();
        assert!(bbox.is_empty());
        let bbox = bbox.extend(Point::new(2.0, 3.0));
        assert!(!bbox.is_empty());
        assert!(bbox.min().is_close_to(Point::new(2.0, 3.0)));
        assert!(bbox.max().is_close_to(Point::new(2.0, 3.0)));

        let b0 = BBox::new((2.0, 2.0), (4.0, 4.0));
        let b1 = b0.extend(Point::new(1.0, 3.0));
        assert!(b1.min().is_close_to(Point::new(1.0, 2.0)));
        assert!(b1.max().is_close_to(b0.max()));

        let b2 = b1.union(BBox::new((3.0, 1.0), (5.0, 3.0)));
        assert!(b2.min().is_close_to(Point::new(1.0, 1.0)));
        assert!(b2.max().is_close_to(Point::new(5.0, 4.0)));

        let b3 = b0.intersect(BBox::new((3.0, 3.0), (9.0, 9.0))).unwrap();
        assert!(b3.min().is_close_to(Point::new(3.0, 3.0)));
        assert!(b3.max().is_close_to(Point::new(4.0, 4.0)));
        assert!(b0.intersect(BBox::new((5.0, 5.0), (6.0, 6.0))).is_none());

        assert!(b0.contains(Point::new(3.0, 3.0)));
        assert!(!b0.contains(Point::new(5.0, 3.0)));
    }
}
