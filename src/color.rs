//! RGBA colors: SVG parsing and source-over blending
use bytemuck::{Pod, Zeroable};
#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer, Serialize};
use std::{collections::HashMap, fmt, str::FromStr, sync::LazyLock};

pub static SVG_COLORS: LazyLock<HashMap<String, Rgba>> = LazyLock::new(|| {
    include_str!("./svg-colors.txt")
        .lines()
        .map(|line| {
            let mut iter = line.split(' ');
            let name = iter.next()?;
            let color = parse_hex(iter.next()?).ok()?;
            Some((name.to_owned(), color))
        })
        .collect::<Option<HashMap<String, Rgba>>>()
        .expect("failed to parse embedded svg colors")
});

/// Common interface to all color representations
pub trait Color: Copy {
    /// Convert color to 8-bit sRGB-range list (alpha is discarded)
    fn to_rgb(self) -> [u8; 3];

    /// Convert color to 8-bit RGBA list
    fn to_rgba(self) -> [u8; 4];
}

/// Straight-alpha RGBA color with channels in `[0, 1]`
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Rgba([f32; 4]);

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self([r, g, b, a])
    }

    pub const fn opaque_black() -> Self {
        Self([0.0, 0.0, 0.0, 1.0])
    }

    pub const fn transparent() -> Self {
        Self([0.0, 0.0, 0.0, 0.0])
    }

    pub const fn red(self) -> f32 {
        self.0[0]
    }

    pub const fn green(self) -> f32 {
        self.0[1]
    }

    pub const fn blue(self) -> f32 {
        self.0[2]
    }

    pub const fn alpha(self) -> f32 {
        self.0[3]
    }

    /// Multiply the alpha channel, used to fold opacity attributes in
    pub fn mul_alpha(self, alpha: f32) -> Self {
        let Self([r, g, b, a]) = self;
        Self([r, g, b, a * alpha])
    }

    /// Color component triple
    pub fn rgb(self) -> Rgb {
        let Self([r, g, b, _]) = self;
        Rgb([r, g, b])
    }

    /// Parse color, falling back to the provided name table
    pub fn from_str_named(color: &str, colors: &HashMap<String, Rgba>) -> Result<Self, ColorError> {
        let color = color.trim();
        if color.is_empty() {
            return Err(ColorError::Empty);
        }
        // currentColor resolves to black, there is no element color context
        if color == "currentColor" {
            return Ok(Rgba::opaque_black());
        }
        if color.starts_with('#') {
            return parse_hex(color);
        }
        if let Some(args) = color.strip_prefix("rgb(").and_then(|rest| rest.strip_suffix(')')) {
            return parse_rgb_args(args);
        }
        colors
            .get(color)
            .copied()
            .ok_or_else(|| ColorError::UnknownColor(color.to_owned()))
    }
}

/// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA`
fn parse_hex(color: &str) -> Result<Rgba, ColorError> {
    let digit = |byte| match byte {
        b'A'..=b'F' => Ok((byte - b'A' + 10) as f32),
        b'a'..=b'f' => Ok((byte - b'a' + 10) as f32),
        b'0'..=b'9' => Ok((byte - b'0') as f32),
        _ => Err(ColorError::HexExpected),
    };
    let bytes = color.as_bytes();
    match bytes.len() {
        // #RGB shorthand, each digit is doubled
        4 => {
            let r = digit(bytes[1])?;
            let g = digit(bytes[2])?;
            let b = digit(bytes[3])?;
            Ok(Rgba::new(
                (r * 16.0 + r) / 255.0,
                (g * 16.0 + g) / 255.0,
                (b * 16.0 + b) / 255.0,
                1.0,
            ))
        }
        7 | 9 => {
            let mut hex = bytes[1..]
                .chunks(2)
                .map(|pair| Ok::<f32, ColorError>((digit(pair[0])? * 16.0 + digit(pair[1])?) / 255.0));
            Ok(Rgba::new(
                hex.next().unwrap_or(Ok(0.0))?,
                hex.next().unwrap_or(Ok(0.0))?,
                hex.next().unwrap_or(Ok(0.0))?,
                hex.next().unwrap_or(Ok(1.0))?,
            ))
        }
        _ => Err(ColorError::HexExpected),
    }
}

/// Parse the argument list of `rgb(r, g, b)`, integer or percentage components
fn parse_rgb_args(args: &str) -> Result<Rgba, ColorError> {
    let mut channels = [0.0f32; 3];
    let mut count = 0;
    for token in args.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if count >= 3 {
            return Err(ColorError::InvalidRgbFunction);
        }
        let value = match token.strip_suffix('%') {
            Some(percent) => percent
                .trim()
                .parse::<f32>()
                .map_err(|_| ColorError::InvalidRgbFunction)?
                / 100.0,
            None => token
                .parse::<f32>()
                .map_err(|_| ColorError::InvalidRgbFunction)?
                / 255.0,
        };
        channels[count] = crate::utils::clamp(value, 0.0, 1.0);
        count += 1;
    }
    if count != 3 {
        return Err(ColorError::InvalidRgbFunction);
    }
    Ok(Rgba::new(channels[0], channels[1], channels[2], 1.0))
}

impl Color for Rgba {
    fn to_rgb(self) -> [u8; 3] {
        self.rgb().to_rgb()
    }

    fn to_rgba(self) -> [u8; 4] {
        let Self([r, g, b, a]) = self;
        [
            (r * 255.0 + 0.5) as u8,
            (g * 255.0 + 0.5) as u8,
            (b * 255.0 + 0.5) as u8,
            (a * 255.0 + 0.5) as u8,
        ]
    }
}

impl fmt::Debug for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba();
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)?;
        if a != 255 {
            write!(f, "{:02x}", a)?;
        }
        Ok(())
    }
}

impl FromStr for Rgba {
    type Err = ColorError;

    fn from_str(color: &str) -> Result<Self, Self::Err> {
        Rgba::from_str_named(color, &SVG_COLORS)
    }
}

#[cfg(feature = "serde")]
impl Serialize for Rgba {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        std::borrow::Cow::<'de, str>::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

/// Opaque RGB pixel with channels in `[0, 1]`
///
/// The render target has no destination alpha, colors are composited onto it
/// with source-over using the effective source alpha.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Rgb(pub [f32; 3]);

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self([r, g, b])
    }

    pub const fn white() -> Self {
        Self([1.0, 1.0, 1.0])
    }

    /// Source-over blend: `dst * (1 - alpha) + src * alpha`
    pub fn blend_over(self, src: Rgb, alpha: f32) -> Rgb {
        let Self([dr, dg, db]) = self;
        let Rgb([sr, sg, sb]) = src;
        let inv = 1.0 - alpha;
        Rgb([
            dr * inv + sr * alpha,
            dg * inv + sg * alpha,
            db * inv + sb * alpha,
        ])
    }
}

impl Color for Rgb {
    fn to_rgb(self) -> [u8; 3] {
        let Self([r, g, b]) = self;
        [
            (crate::utils::clamp(r, 0.0, 1.0) * 255.0 + 0.5) as u8,
            (crate::utils::clamp(g, 0.0, 1.0) * 255.0 + 0.5) as u8,
            (crate::utils::clamp(b, 0.0, 1.0) * 255.0 + 0.5) as u8,
        ]
    }

    fn to_rgba(self) -> [u8; 4] {
        let [r, g, b] = self.to_rgb();
        [r, g, b, 255]
    }
}

impl From<Rgba> for Rgb {
    fn from(color: Rgba) -> Self {
        color.rgb()
    }
}

impl fmt::Debug for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.to_rgb();
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// 8-bit RGB triple, the row-major export format of the raster
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Pod, Zeroable)]
pub struct Rgb8(pub [u8; 3]);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    Empty,
    HexExpected,
    InvalidRgbFunction,
    UnknownColor(String),
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorError::Empty => write!(f, "empty color value"),
            ColorError::HexExpected => write!(f, "expected #RGB, #RRGGBB or #RRGGBBAA hex color"),
            ColorError::InvalidRgbFunction => write!(f, "malformed rgb() function"),
            ColorError::UnknownColor(name) => write!(f, "unknown named color: {}", name),
        }
    }
}

impl std::error::Error for ColorError {}
