//! Path representation and tessellation into polylines
use crate::{
    curve::{flatten_cubic, flatten_quad, EllipArc},
    BBox, PathCmd, PathDataError, PathDataParser, Point, Scalar, Transform, DEFAULT_FLATNESS,
};
use std::{fmt, io::Cursor, str::FromStr};

/// Connected piece of a path produced by tessellation
///
/// Sub-paths are device-space polylines. The `closed` flag records an
/// explicit ClosePath, fill treats every sub-path as closed regardless.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline {
    pub points: Vec<Point>,
    pub closed: bool,
}

impl Polyline {
    pub fn new(points: Vec<Point>, closed: bool) -> Self {
        Self { points, closed }
    }

    /// Bounding box of the polyline points
    pub fn bbox(&self) -> BBox {
        self.points
            .iter()
            .fold(BBox::empty(), |bbox, point| bbox.extend(*point))
    }

    /// Total arc length of the polyline, including the implicit closing
    /// segment for closed polylines
    pub fn length(&self) -> Scalar {
        let mut length: Scalar = self
            .points
            .windows(2)
            .map(|seg| seg[0].dist(seg[1]))
            .sum();
        if self.closed && self.points.len() >= 2 {
            let first = self.points[0];
            let last = *self.points.last().expect("checked non empty");
            length += last.dist(first);
        }
        length
    }
}

/// Ordered sequence of path commands with absolute coordinates
///
/// Represents the same concept as an
/// [SVG path](https://www.w3.org/TR/SVG11/paths.html). Geometry is never
/// mutated by rendering, tessellation produces fresh polylines per call.
#[derive(Clone, PartialEq, Default)]
pub struct Path {
    cmds: Vec<PathCmd>,
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cmd in self.cmds.iter() {
            writeln!(f, "{:?}", cmd)?;
        }
        Ok(())
    }
}

impl Path {
    /// Create path from the list of commands
    pub fn new(cmds: Vec<PathCmd>) -> Self {
        Self { cmds }
    }

    /// Create empty path
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// List of commands
    pub fn cmds(&self) -> &[PathCmd] {
        &self.cmds
    }

    /// Parse path data and report command letters skipped as unknown
    pub fn parse_with_unknown(text: &str) -> Result<(Self, Vec<char>), PathDataError> {
        let mut parser = PathDataParser::new(Cursor::new(text));
        let cmds = parser.by_ref().collect::<Result<Vec<_>, _>>()?;
        let unknown = parser.unknown_cmds().to_vec();
        Ok((Self { cmds }, unknown))
    }

    /// Move current position, ending current sub-path
    pub fn move_to(&mut self, p: impl Into<Point>) -> &mut Self {
        self.cmds.push(PathCmd::MoveTo(p.into()));
        self
    }

    /// Add line from the current position to the specified point
    pub fn line_to(&mut self, p: impl Into<Point>) -> &mut Self {
        self.cmds.push(PathCmd::LineTo(p.into()));
        self
    }

    /// Add quadratic bezier curve
    pub fn quad_to(&mut self, p1: impl Into<Point>, p2: impl Into<Point>) -> &mut Self {
        self.cmds.push(PathCmd::QuadTo(p1.into(), p2.into()));
        self
    }

    /// Add cubic bezier curve
    pub fn cubic_to(
        &mut self,
        p1: impl Into<Point>,
        p2: impl Into<Point>,
        p3: impl Into<Point>,
    ) -> &mut Self {
        self.cmds.push(PathCmd::CubicTo(p1.into(), p2.into(), p3.into()));
        self
    }

    /// Add elliptic arc segment
    pub fn arc_to(
        &mut self,
        radii: impl Into<Point>,
        x_axis_rot: Scalar,
        large: bool,
        sweep: bool,
        p: impl Into<Point>,
    ) -> &mut Self {
        self.cmds.push(PathCmd::ArcTo {
            radii: radii.into(),
            x_axis_rot,
            large,
            sweep,
            dst: p.into(),
        });
        self
    }

    /// Close current sub-path
    pub fn close(&mut self) -> &mut Self {
        let start = self.subpath_start();
        self.cmds.push(PathCmd::Close(start));
        self
    }

    // start point of the currently open sub-path
    fn subpath_start(&self) -> Point {
        for cmd in self.cmds.iter().rev() {
            match cmd {
                PathCmd::MoveTo(p) => return *p,
                PathCmd::Close(p) => return *p,
                _ => continue,
            }
        }
        Point::new(0.0, 0.0)
    }

    /// Tessellate the path into device-space sub-path polylines
    ///
    /// Control points go through `tr` first so `tolerance` is measured in
    /// device pixels. Sub-paths with less than two points are dropped.
    pub fn flatten(&self, tr: Transform, tolerance: Scalar) -> Vec<Polyline> {
        let mut subpaths = Vec::new();
        let mut current = Polyline::default();
        // user-space pen position, command coordinates are in user space
        let mut pen = Point::new(0.0, 0.0);

        fn push_subpath(subpaths: &mut Vec<Polyline>, current: &mut Polyline) {
            if current.points.len() >= 2 {
                subpaths.push(std::mem::take(current));
            } else {
                current.points.clear();
                current.closed = false;
            }
        }

        for cmd in self.cmds.iter() {
            // Close may implicitly begin a new sub-path at the close point
            if !matches!(cmd, PathCmd::MoveTo(_)) && current.points.is_empty() {
                current.points.push(tr.apply(pen));
            }
            match *cmd {
                PathCmd::MoveTo(p) => {
                    push_subpath(&mut subpaths, &mut current);
                    current.points.push(tr.apply(p));
                    pen = p;
                }
                PathCmd::LineTo(p) => {
                    current.points.push(tr.apply(p));
                    pen = p;
                }
                PathCmd::QuadTo(p1, p2) => {
                    flatten_quad(
                        tr.apply(pen),
                        tr.apply(p1),
                        tr.apply(p2),
                        tolerance,
                        &mut current.points,
                    );
                    pen = p2;
                }
                PathCmd::CubicTo(p1, p2, p3) => {
                    flatten_cubic(
                        tr.apply(pen),
                        tr.apply(p1),
                        tr.apply(p2),
                        tr.apply(p3),
                        tolerance,
                        &mut current.points,
                    );
                    pen = p3;
                }
                PathCmd::ArcTo {
                    radii,
                    x_axis_rot,
                    large,
                    sweep,
                    dst,
                } => {
                    let arc =
                        EllipArc::new_param(pen, dst, radii.x(), radii.y(), x_axis_rot, large, sweep);
                    match arc {
                        Some(arc) => {
                            // cubics survive the affine transform, the arc
                            // parameterization does not
                            for [p0, p1, p2, p3] in arc.to_cubics() {
                                flatten_cubic(
                                    tr.apply(p0),
                                    tr.apply(p1),
                                    tr.apply(p2),
                                    tr.apply(p3),
                                    tolerance,
                                    &mut current.points,
                                );
                            }
                        }
                        // degenerate radii collapse to a line
                        None => current.points.push(tr.apply(dst)),
                    }
                    pen = dst;
                }
                PathCmd::Close(start) => {
                    current.closed = true;
                    push_subpath(&mut subpaths, &mut current);
                    pen = start;
                }
            }
        }
        push_subpath(&mut subpaths, &mut current);
        subpaths
    }

    /// Bounding box of the path after the transformation is applied
    pub fn bbox(&self, tr: Transform) -> BBox {
        self.flatten(tr, DEFAULT_FLATNESS)
            .iter()
            .fold(BBox::empty(), |bbox, subpath| bbox.union(subpath.bbox()))
    }
}

impl FromStr for Path {
    type Err = PathDataError;

    fn from_str(text: &str) -> Result<Path, Self::Err> {
        let cmds = PathDataParser::new(Cursor::new(text)).collect::<Result<Vec<_>, _>>()?;
        Ok(Path { cmds })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    #[test]
    fn test_flatten_subpaths() -> Result<(), PathDataError> {
        let path: Path = "M2,2 L18,2 L18,18 L2,18 Z M6,6 L14,6 L14,14 L6,14 Z".parse()?;
        let subpaths = path.flatten(Transform::identity(), DEFAULT_FLATNESS);
        assert_eq!(subpaths.len(), 2);
        assert!(subpaths.iter().all(|sp| sp.closed));
        assert_eq!(subpaths[0].points.len(), 4);
        assert_eq!(subpaths[1].points.len(), 4);
        Ok(())
    }

    #[test]
    fn test_flatten_drops_degenerate() -> Result<(), PathDataError> {
        // single vertex produces nothing
        let path: Path = "M5,5".parse()?;
        assert!(path.flatten(Transform::identity(), DEFAULT_FLATNESS).is_empty());
        let path: Path = "M5,5 Z".parse()?;
        assert!(path.flatten(Transform::identity(), DEFAULT_FLATNESS).is_empty());
        Ok(())
    }

    #[test]
    fn test_flatten_curve_tolerance() -> Result<(), PathDataError> {
        let path: Path = "M0,0 C0,10 10,10 10,0".parse()?;
        let coarse = path.flatten(Transform::identity(), 1.0);
        let fine = path.flatten(Transform::identity(), 0.1);
        assert!(fine[0].points.len() > coarse[0].points.len());
        // scaling the transform makes the tolerance effectively tighter
        let scaled = path.flatten(Transform::new_scale(8.0, 8.0), 1.0);
        assert!(scaled[0].points.len() > coarse[0].points.len());
        Ok(())
    }

    #[test]
    fn test_close_starts_new_subpath() -> Result<(), PathDataError> {
        // segment after Z continues from the sub-path start
        let path: Path = "M0,0 L1,-1 L1,0 Z L0,1 L1,1 Z".parse()?;
        let subpaths = path.flatten(Transform::identity(), DEFAULT_FLATNESS);
        assert_eq!(subpaths.len(), 2);
        assert!(subpaths[1].points[0].is_close_to(Point::new(0.0, 0.0)));
        assert!(subpaths[1].points[1].is_close_to(Point::new(0.0, 1.0)));
        Ok(())
    }

    #[test]
    fn test_bbox() -> Result<(), PathDataError> {
        let path: Path = "M2,3 L10,3 L10,20 Z".parse()?;
        let bbox = path.bbox(Transform::identity());
        assert_approx_eq!(bbox.x(), 2.0);
        assert_approx_eq!(bbox.y(), 3.0);
        assert_approx_eq!(bbox.width(), 8.0);
        assert_approx_eq!(bbox.height(), 17.0);
        let empty = Path::empty().bbox(Transform::identity());
        assert!(empty.is_empty());
        Ok(())
    }

    #[test]
    fn test_polyline_length() {
        let polyline = Polyline::new(
            vec![Point::new(0.0, 0.0), Point::new(3.0, 0.0), Point::new(3.0, 4.0)],
            false,
        );
        assert_approx_eq!(polyline.length(), 7.0);
        let closed = Polyline::new(polyline.points.clone(), true);
        assert_approx_eq!(closed.length(), 12.0);
    }

    #[test]
    fn test_builder_interface() {
        let mut path = Path::empty();
        path.move_to((1.0, 1.0))
            .line_to((2.0, 1.0))
            .quad_to((3.0, 1.0), (3.0, 2.0))
            .close();
        assert_eq!(path.cmds().len(), 4);
        assert_eq!(path.cmds()[3], PathCmd::Close(Point::new(1.0, 1.0)));
    }
}
