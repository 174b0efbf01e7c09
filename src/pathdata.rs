//! SVG path-data lexer
//!
//! Parses the `d` attribute grammar: command letters `MmLlHhVvCcSsQqTtAaZz`
//! and signed numbers with optional exponents, separated by whitespace or a
//! single comma. Relative coordinates are resolved against the current
//! position and the `H`/`V`/`S`/`T` shorthands are expanded here, so emitted
//! commands carry absolute points only.
//!
//! See [SVG Path Specification](https://www.w3.org/TR/SVG11/paths.html#PathData)
use crate::{Point, Scalar};
use std::{fmt, io::Read};

/// Path command with resolved absolute coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCmd {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CubicTo(Point, Point, Point),
    ArcTo {
        radii: Point,
        x_axis_rot: Scalar,
        large: bool,
        sweep: bool,
        dst: Point,
    },
    Close(Point),
}

impl PathCmd {
    /// Get destination point of the command
    pub fn dst(&self) -> Point {
        use PathCmd::*;
        *match self {
            MoveTo(dst) => dst,
            LineTo(dst) => dst,
            QuadTo(_, dst) => dst,
            CubicTo(_, _, dst) => dst,
            ArcTo { dst, .. } => dst,
            Close(dst) => dst,
        }
    }
}

/// Streaming parser for SVG encoded path data
#[derive(Debug)]
pub struct PathDataParser<I> {
    // input containing unparsed path data
    input: I,
    // read but not consumed byte
    input_buffer: Option<u8>,
    // previous operation, replayed when a number follows directly
    prev_op: Option<u8>,
    // previous command (used to determine smooth control points)
    prev_cmd: Option<PathCmd>,
    // current position from which the next relative coordinate is resolved
    position: Point,
    // current sub-path starting position
    subpath_start: Point,
    // command letters that were skipped as unknown
    unknown_cmds: Vec<char>,
}

impl<I: Read> PathDataParser<I> {
    pub fn new(input: I) -> Self {
        Self {
            input,
            input_buffer: None,
            prev_op: None,
            prev_cmd: None,
            position: Point::new(0.0, 0.0),
            subpath_start: Point::new(0.0, 0.0),
            unknown_cmds: Vec::new(),
        }
    }

    /// Unknown command letters that were skipped during parsing
    pub fn unknown_cmds(&self) -> &[char] {
        &self.unknown_cmds
    }

    // consume single byte from the input
    fn parse_byte(&mut self) -> Result<Option<u8>, PathDataError> {
        match self.input_buffer.take() {
            None => {
                let mut byte = [0; 1];
                if self.input.read(&mut byte)? != 0 {
                    Ok(Some(byte[0]))
                } else {
                    Ok(None)
                }
            }
            byte => Ok(byte),
        }
    }

    // put byte into input buffer, at most one byte is cached
    fn unparse_byte(&mut self, byte: u8) {
        debug_assert!(self.input_buffer.is_none());
        self.input_buffer = Some(byte);
    }

    // consume input while `pred` predicate is true
    fn parse_while(
        &mut self,
        mut pred: impl FnMut(u8) -> bool,
        mut proc: impl FnMut(u8),
    ) -> Result<usize, PathDataError> {
        let mut count = 0;
        loop {
            let byte = match self.parse_byte()? {
                None => break,
                Some(byte) => byte,
            };
            if !pred(byte) {
                self.unparse_byte(byte);
                break;
            }
            count += 1;
            proc(byte);
        }
        Ok(count)
    }

    // consume at most one byte from the input, if predicate returns true
    fn parse_once(
        &mut self,
        pred: impl FnOnce(u8) -> bool,
        proc: impl FnOnce(u8),
    ) -> Result<bool, PathDataError> {
        let byte = match self.parse_byte()? {
            None => return Ok(false),
            Some(byte) => byte,
        };
        if pred(byte) {
            proc(byte);
            Ok(true)
        } else {
            self.unparse_byte(byte);
            Ok(false)
        }
    }

    // consume separators from the input
    fn parse_separators(&mut self) -> Result<(), PathDataError> {
        loop {
            let byte = match self.parse_byte()? {
                None => break,
                Some(byte) => byte,
            };
            if !matches!(byte, b' ' | b'\t' | b'\r' | b'\n' | b',') {
                self.unparse_byte(byte);
                break;
            }
        }
        Ok(())
    }

    // parse single scalar value from the input
    fn parse_scalar(&mut self) -> Result<Scalar, PathDataError> {
        self.parse_separators()?;

        let mut mantissa: i64 = 0;
        let mut exponent: i64 = 0;
        let mut sign = 1;

        fn push_digit(value: &mut i64, byte: u8) {
            let digit = byte - b'0';
            *value = value.wrapping_mul(10).wrapping_add(digit as i64);
        }

        self.parse_once(
            |byte| matches!(byte, b'-' | b'+'),
            |byte| {
                if byte == b'-' {
                    sign = -1
                }
            },
        )?;
        let whole = self.parse_while(
            |byte| byte.is_ascii_digit(),
            |byte| push_digit(&mut mantissa, byte),
        )?;
        let frac = if self.parse_once(|byte| matches!(byte, b'.'), |_| {})? {
            self.parse_while(
                |byte| byte.is_ascii_digit(),
                |byte| {
                    push_digit(&mut mantissa, byte);
                    exponent -= 1;
                },
            )?
        } else {
            0
        };
        mantissa *= sign;

        if whole + frac == 0 {
            return Err(PathDataError::InvalidScalar);
        }

        if self.parse_once(|byte| matches!(byte, b'e' | b'E'), |_| {})? {
            let mut sci: i64 = 0;
            let mut sci_sign = 1;
            self.parse_once(
                |byte| matches!(byte, b'-' | b'+'),
                |byte| {
                    if byte == b'-' {
                        sci_sign = -1
                    }
                },
            )?;
            if self.parse_while(
                |byte| byte.is_ascii_digit(),
                |byte| push_digit(&mut sci, byte),
            )? == 0
            {
                return Err(PathDataError::InvalidScalar);
            }
            exponent = exponent.wrapping_add(sci_sign * sci)
        }

        Ok((mantissa as Scalar) * (10.0 as Scalar).powi(exponent as i32))
    }

    // parse pair of scalars and convert it to a point
    fn parse_point(&mut self) -> Result<Point, PathDataError> {
        let point = Point::new(self.parse_scalar()?, self.parse_scalar()?);
        match self.prev_op {
            Some(cmd) if cmd.is_ascii_lowercase() => Ok(point + self.position),
            _ => Ok(point),
        }
    }

    // parse flag `0|1` used by the elliptic arc command
    fn parse_flag(&mut self) -> Result<bool, PathDataError> {
        self.parse_separators()?;
        match self.parse_byte()? {
            Some(b'0') => Ok(false),
            Some(b'1') => Ok(true),
            byte => {
                if let Some(byte) = byte {
                    self.unparse_byte(byte);
                }
                Err(PathDataError::InvalidFlag)
            }
        }
    }

    // parse command letter, none indicates end of input
    fn parse_op(&mut self) -> Result<Option<u8>, PathDataError> {
        loop {
            let op = match self.parse_byte()? {
                None => return Ok(None),
                Some(op) => op,
            };
            match op {
                b'M' | b'm' | b'L' | b'l' | b'V' | b'v' | b'H' | b'h' | b'C' | b'c' | b'S'
                | b's' | b'Q' | b'q' | b'T' | b't' | b'A' | b'a' | b'Z' | b'z' => {
                    self.prev_op = if op == b'm' {
                        Some(b'l')
                    } else if op == b'M' {
                        Some(b'L')
                    } else if op == b'Z' || op == b'z' {
                        None
                    } else {
                        Some(op)
                    };
                    return Ok(Some(op));
                }
                byte if byte.is_ascii_alphabetic() => {
                    // unknown command letter, skip until the next letter
                    self.unknown_cmds.push(byte as char);
                    self.parse_while(|byte| !byte.is_ascii_alphabetic(), |_| {})?;
                }
                byte => {
                    self.unparse_byte(byte);
                    match self.prev_op {
                        Some(op) => return Ok(Some(op)),
                        None => return Err(PathDataError::InvalidCmd(op as char)),
                    }
                }
            }
        }
    }

    /// Parse a single path command from the input
    pub fn parse_cmd(&mut self) -> Result<Option<PathCmd>, PathDataError> {
        self.parse_separators()?;
        let op = match self.parse_op()? {
            None => return Ok(None),
            Some(op) => op,
        };
        let cmd = match op {
            b'M' | b'm' => {
                let dst = self.parse_point()?;
                self.subpath_start = dst;
                PathCmd::MoveTo(dst)
            }
            b'L' | b'l' => PathCmd::LineTo(self.parse_point()?),
            b'V' | b'v' => {
                let y = self.parse_scalar()?;
                let p0 = self.position;
                let p1 = if op == b'v' {
                    Point::new(p0.x(), p0.y() + y)
                } else {
                    Point::new(p0.x(), y)
                };
                PathCmd::LineTo(p1)
            }
            b'H' | b'h' => {
                let x = self.parse_scalar()?;
                let p0 = self.position;
                let p1 = if op == b'h' {
                    Point::new(p0.x() + x, p0.y())
                } else {
                    Point::new(x, p0.y())
                };
                PathCmd::LineTo(p1)
            }
            b'Q' | b'q' => PathCmd::QuadTo(self.parse_point()?, self.parse_point()?),
            b'T' | b't' => {
                // reflect the previous control point across the current
                // position, it collapses to the position when the previous
                // command is not of the quadratic family
                let p1 = match self.prev_cmd {
                    Some(PathCmd::QuadTo(p1, p2)) => 2.0 * p2 - p1,
                    _ => self.position,
                };
                let p2 = self.parse_point()?;
                PathCmd::QuadTo(p1, p2)
            }
            b'C' | b'c' => PathCmd::CubicTo(
                self.parse_point()?,
                self.parse_point()?,
                self.parse_point()?,
            ),
            b'S' | b's' => {
                let p1 = match self.prev_cmd {
                    Some(PathCmd::CubicTo(_, p2, p3)) => 2.0 * p3 - p2,
                    _ => self.position,
                };
                let p2 = self.parse_point()?;
                let p3 = self.parse_point()?;
                PathCmd::CubicTo(p1, p2, p3)
            }
            b'A' | b'a' => {
                let rx = self.parse_scalar()?;
                let ry = self.parse_scalar()?;
                let x_axis_rot = self.parse_scalar()?;
                let large_flag = self.parse_flag()?;
                let sweep_flag = self.parse_flag()?;
                let dst = self.parse_point()?;
                PathCmd::ArcTo {
                    radii: Point::new(rx, ry),
                    x_axis_rot,
                    large: large_flag,
                    sweep: sweep_flag,
                    dst,
                }
            }
            b'Z' | b'z' => PathCmd::Close(self.subpath_start),
            _ => unreachable!(),
        };
        self.position = cmd.dst();
        self.prev_cmd = Some(cmd);
        Ok(self.prev_cmd)
    }
}

impl<I: Read> Iterator for PathDataParser<I> {
    type Item = Result<PathCmd, PathDataError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.parse_cmd().transpose()
    }
}

/// Error while parsing SVG path data
#[derive(Debug)]
pub enum PathDataError {
    /// Number found where a command letter was required
    InvalidCmd(char),
    /// Failed to parse scalar value
    InvalidScalar,
    /// Failed to parse arc flag value
    InvalidFlag,
    /// IO error propagated while reading input stream
    IoError(std::io::Error),
}

impl fmt::Display for PathDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathDataError::InvalidCmd(op) => write!(f, "invalid path command: {:?}", op),
            PathDataError::InvalidScalar => write!(f, "invalid number in path data"),
            PathDataError::InvalidFlag => write!(f, "invalid arc flag, expected 0 or 1"),
            PathDataError::IoError(error) => write!(f, "io error in path data: {}", error),
        }
    }
}

impl From<std::io::Error> for PathDataError {
    fn from(error: std::io::Error) -> Self {
        Self::IoError(error)
    }
}

impl std::error::Error for PathDataError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;
    use std::io::Cursor;

    fn parse_all(text: &str) -> Result<Vec<PathCmd>, PathDataError> {
        PathDataParser::new(Cursor::new(text)).collect()
    }

    #[test]
    fn test_parse_scalar() -> Result<(), PathDataError> {
        let mut parser = PathDataParser::new(Cursor::new("1 .22e0.32 3.21e-3-1.24 1e4"));
        assert_approx_eq!(parser.parse_scalar()?, 1.0);
        assert_approx_eq!(parser.parse_scalar()?, 0.22);
        assert_approx_eq!(parser.parse_scalar()?, 0.32);
        assert_approx_eq!(parser.parse_scalar()?, 3.21e-3);
        assert_approx_eq!(parser.parse_scalar()?, -1.24);
        assert_approx_eq!(parser.parse_scalar()?, 1e4);
        Ok(())
    }

    #[test]
    fn test_implicit_line_to() -> Result<(), PathDataError> {
        // M with extra points behaves as implicit LineTo
        let cmds = parse_all("M1,1 2,2 3,3")?;
        assert_eq!(
            cmds,
            vec![
                PathCmd::MoveTo(Point::new(1.0, 1.0)),
                PathCmd::LineTo(Point::new(2.0, 2.0)),
                PathCmd::LineTo(Point::new(3.0, 3.0)),
            ]
        );
        // relative variant keeps accumulating
        let cmds = parse_all("m1,1 2,2 3,3")?;
        assert_eq!(
            cmds,
            vec![
                PathCmd::MoveTo(Point::new(1.0, 1.0)),
                PathCmd::LineTo(Point::new(3.0, 3.0)),
                PathCmd::LineTo(Point::new(6.0, 6.0)),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_h_v_expansion() -> Result<(), PathDataError> {
        let cmds = parse_all("M1,2 H5 v3 h-2 V0")?;
        assert_eq!(
            cmds,
            vec![
                PathCmd::MoveTo(Point::new(1.0, 2.0)),
                PathCmd::LineTo(Point::new(5.0, 2.0)),
                PathCmd::LineTo(Point::new(5.0, 5.0)),
                PathCmd::LineTo(Point::new(3.0, 5.0)),
                PathCmd::LineTo(Point::new(3.0, 0.0)),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_smooth_cubic_reflection() -> Result<(), PathDataError> {
        let cmds = parse_all("M10,50 C10,10 40,10 40,50 S70,90 70,50")?;
        assert_eq!(
            cmds[2],
            PathCmd::CubicTo(
                // reflection of (40, 10) across (40, 50)
                Point::new(40.0, 90.0),
                Point::new(70.0, 90.0),
                Point::new(70.0, 50.0),
            )
        );
        // S after a non-cubic command collapses the control point
        let cmds = parse_all("M0,0 L10,0 S20,10 30,0")?;
        assert_eq!(
            cmds[2],
            PathCmd::CubicTo(
                Point::new(10.0, 0.0),
                Point::new(20.0, 10.0),
                Point::new(30.0, 0.0),
            )
        );
        Ok(())
    }

    #[test]
    fn test_smooth_quad_reflection() -> Result<(), PathDataError> {
        let cmds = parse_all("M0,0 Q5,10 10,0 T20,0")?;
        assert_eq!(
            cmds[2],
            PathCmd::QuadTo(Point::new(15.0, -10.0), Point::new(20.0, 0.0))
        );
        Ok(())
    }

    #[test]
    fn test_arc_flags() -> Result<(), PathDataError> {
        // flags may be packed without separators
        let cmds = parse_all("M0,0 A5,5 0 0,1 10,0 a5 5 0 1 0 -10 0")?;
        assert_eq!(
            cmds[1],
            PathCmd::ArcTo {
                radii: Point::new(5.0, 5.0),
                x_axis_rot: 0.0,
                large: false,
                sweep: true,
                dst: Point::new(10.0, 0.0),
            }
        );
        assert_eq!(
            cmds[2],
            PathCmd::ArcTo {
                radii: Point::new(5.0, 5.0),
                x_axis_rot: 0.0,
                large: true,
                sweep: false,
                dst: Point::new(0.0, 0.0),
            }
        );
        Ok(())
    }

    #[test]
    fn test_unknown_cmd_skipped() -> Result<(), PathDataError> {
        let mut parser = PathDataParser::new(Cursor::new("M0,0 X1,2,3 L1,1"));
        let cmds: Vec<_> = parser.by_ref().collect::<Result<_, _>>()?;
        assert_eq!(
            cmds,
            vec![
                PathCmd::MoveTo(Point::new(0.0, 0.0)),
                PathCmd::LineTo(Point::new(1.0, 1.0)),
            ]
        );
        assert_eq!(parser.unknown_cmds(), &['X']);
        Ok(())
    }

    #[test]
    fn test_not_separated_scalars() -> Result<(), PathDataError> {
        let cmds = parse_all("M.5-3-11-.11")?;
        assert_eq!(
            cmds,
            vec![
                PathCmd::MoveTo(Point::new(0.5, -3.0)),
                PathCmd::LineTo(Point::new(-11.0, -0.11)),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_close_returns_to_start() -> Result<(), PathDataError> {
        let cmds = parse_all("M1,1 L2,1 L2,2 Z M5,5 l1,0 z")?;
        assert_eq!(cmds[3], PathCmd::Close(Point::new(1.0, 1.0)));
        assert_eq!(cmds[6], PathCmd::Close(Point::new(5.0, 5.0)));
        Ok(())
    }
}
