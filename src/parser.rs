//! SVG document parser
//!
//! Builds a [`Document`] from SVG 1.1 text. Parsing is tolerant: a broken
//! element is skipped and recorded as a [`Diagnostic`], only malformed XML
//! or a root element other than `svg` abort the parse.
use crate::{
    CircleElement, Document, Element, EllipseElement, FillRule, LineCap, LineElement, LineJoin,
    Path, PathElement, Point, RectElement, Rgba, Scalar, Style, TextElement, Transform, ViewBox,
};
use std::fmt;

/// Fatal parse failure, the document cannot be used
#[derive(Debug)]
pub enum ParseError {
    /// XML is not well formed
    Xml(roxmltree::Error),
    /// Input is not valid UTF-8
    Encoding(std::str::Utf8Error),
    /// The root element is not `<svg>`
    NotSvg,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Xml(error) => write!(f, "malformed xml: {}", error),
            ParseError::Encoding(error) => write!(f, "input is not utf-8: {}", error),
            ParseError::NotSvg => write!(f, "root element is not <svg>"),
        }
    }
}

impl From<roxmltree::Error> for ParseError {
    fn from(error: roxmltree::Error) -> Self {
        Self::Xml(error)
    }
}

impl std::error::Error for ParseError {}

/// Recoverable parse problem, the offending construct was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    UnknownElement(String),
    UnknownTransform(String),
    UnknownPathCommand(char),
    InvalidNumber { attribute: String, value: String },
    InvalidColor(String),
    InvalidAttribute { attribute: String, value: String },
    InvalidPathData(String),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownElement(name) => write!(f, "unknown element <{}> skipped", name),
            Diagnostic::UnknownTransform(name) => {
                write!(f, "unknown transform function {}()", name)
            }
            Diagnostic::UnknownPathCommand(cmd) => write!(f, "unknown path command {:?}", cmd),
            Diagnostic::InvalidNumber { attribute, value } => {
                write!(f, "invalid number {:?} in attribute {}", value, attribute)
            }
            Diagnostic::InvalidColor(value) => write!(f, "invalid color {:?}", value),
            Diagnostic::InvalidAttribute { attribute, value } => {
                write!(f, "invalid value {:?} for attribute {}", value, attribute)
            }
            Diagnostic::InvalidPathData(reason) => write!(f, "invalid path data: {}", reason),
        }
    }
}

/// Parse an SVG document from UTF-8 text
pub fn parse(text: &str) -> Result<(Document, Vec<Diagnostic>), ParseError> {
    let mut parser = Parser::default();
    let document = parser.parse_document(text)?;
    log::debug!(
        "parsed svg: {} elements, {} diagnostics",
        document.elements().len(),
        parser.diagnostics.len()
    );
    Ok((document, parser.diagnostics))
}

/// Parse an SVG document from UTF-8 bytes
pub fn parse_bytes(bytes: &[u8]) -> Result<(Document, Vec<Diagnostic>), ParseError> {
    let text = std::str::from_utf8(bytes).map_err(ParseError::Encoding)?;
    parse(text)
}

// elements carrying no renderable content
const SKIPPED_ELEMENTS: [&str; 4] = ["title", "desc", "metadata", "defs"];

#[derive(Default)]
struct Parser {
    diagnostics: Vec<Diagnostic>,
}

type Node<'a, 'input> = roxmltree::Node<'a, 'input>;

impl Parser {
    fn parse_document(&mut self, text: &str) -> Result<Document, ParseError> {
        let xml = roxmltree::Document::parse(text)?;
        let root = xml.root_element();
        if root.tag_name().name() != "svg" {
            return Err(ParseError::NotSvg);
        }

        let mut document = Document::default();
        document.view_box = root.attribute("viewBox").and_then(|value| self.parse_view_box(value));

        // canvas size falls back to the viewBox extent, then to the default
        match root.attribute("width") {
            Some(width) => document.width = self.parse_length(width, "width", 800.0),
            None => {
                if let Some(view_box) = document.view_box {
                    document.width = view_box.width;
                }
            }
        }
        match root.attribute("height") {
            Some(height) => document.height = self.parse_length(height, "height", 600.0),
            None => {
                if let Some(view_box) = document.view_box {
                    document.height = view_box.height;
                }
            }
        }

        for child in root.children() {
            if !child.is_element() {
                continue;
            }
            let tag = child.tag_name().name();
            if SKIPPED_ELEMENTS.contains(&tag) {
                continue;
            }
            if tag == "g" {
                self.parse_group(child, Transform::identity(), &Style::default(), &mut document);
                continue;
            }
            if let Some(element) = self.parse_element(child) {
                document.add_element(element);
            }
        }
        Ok(document)
    }

    /// Flatten `<g>` into its children
    ///
    /// The group transform composes on the left of every descendant
    /// transform and unset paint properties inherit from the nearest
    /// ancestor that sets them.
    fn parse_group(
        &mut self,
        node: Node<'_, '_>,
        parent_transform: Transform,
        parent_style: &Style,
        document: &mut Document,
    ) {
        let transform = match node.attribute("transform") {
            Some(value) => self.parse_transform(value),
            None => Transform::identity(),
        };
        let combined_transform = parent_transform * transform;
        let mut combined_style = self.parse_style(node);
        combined_style.inherit(parent_style);

        for child in node.children() {
            if !child.is_element() {
                continue;
            }
            let tag = child.tag_name().name();
            if SKIPPED_ELEMENTS.contains(&tag) {
                continue;
            }
            if tag == "g" {
                self.parse_group(child, combined_transform, &combined_style, document);
                continue;
            }
            if let Some(mut element) = self.parse_element(child) {
                *element.transform_mut() = combined_transform * element.transform();
                element.style_mut().inherit(&combined_style);
                document.add_element(element);
            }
        }
    }

    fn parse_element(&mut self, node: Node<'_, '_>) -> Option<Element> {
        match node.tag_name().name() {
            "path" => self.parse_path(node),
            "rect" => Some(self.parse_rect(node)),
            "circle" => Some(self.parse_circle(node)),
            "ellipse" => Some(self.parse_ellipse(node)),
            "line" => Some(self.parse_line(node)),
            "text" => Some(self.parse_text(node)),
            tag => {
                self.diagnostics
                    .push(Diagnostic::UnknownElement(tag.to_owned()));
                None
            }
        }
    }

    fn common_attrs(&mut self, node: Node<'_, '_>) -> (Option<String>, Style, Transform) {
        let id = node.attribute("id").map(str::to_owned);
        let style = self.parse_style(node);
        let transform = match node.attribute("transform") {
            Some(value) => self.parse_transform(value),
            None => Transform::identity(),
        };
        (id, style, transform)
    }

    fn parse_path(&mut self, node: Node<'_, '_>) -> Option<Element> {
        let (id, style, transform) = self.common_attrs(node);
        let data = node.attribute("d")?;
        match Path::parse_with_unknown(data) {
            Ok((path, unknown)) => {
                self.diagnostics
                    .extend(unknown.into_iter().map(Diagnostic::UnknownPathCommand));
                Some(Element::Path(PathElement {
                    id,
                    path,
                    style,
                    transform,
                }))
            }
            Err(error) => {
                self.diagnostics
                    .push(Diagnostic::InvalidPathData(error.to_string()));
                None
            }
        }
    }

    fn parse_rect(&mut self, node: Node<'_, '_>) -> Element {
        let (id, style, transform) = self.common_attrs(node);
        Element::Rect(RectElement {
            id,
            position: Point::new(
                self.parse_attr_length(node, "x", 0.0),
                self.parse_attr_length(node, "y", 0.0),
            ),
            width: self.parse_attr_length(node, "width", 0.0),
            height: self.parse_attr_length(node, "height", 0.0),
            rx: self.parse_attr_length(node, "rx", 0.0),
            ry: self.parse_attr_length(node, "ry", 0.0),
            style,
            transform,
        })
    }

    fn parse_circle(&mut self, node: Node<'_, '_>) -> Element {
        let (id, style, transform) = self.common_attrs(node);
        Element::Circle(CircleElement {
            id,
            center: Point::new(
                self.parse_attr_length(node, "cx", 0.0),
                self.parse_attr_length(node, "cy", 0.0),
            ),
            radius: self.parse_attr_length(node, "r", 0.0),
            style,
            transform,
        })
    }

    fn parse_ellipse(&mut self, node: Node<'_, '_>) -> Element {
        let (id, style, transform) = self.common_attrs(node);
        Element::Ellipse(EllipseElement {
            id,
            center: Point::new(
                self.parse_attr_length(node, "cx", 0.0),
                self.parse_attr_length(node, "cy", 0.0),
            ),
            rx: self.parse_attr_length(node, "rx", 0.0),
            ry: self.parse_attr_length(node, "ry", 0.0),
            style,
            transform,
        })
    }

    fn parse_line(&mut self, node: Node<'_, '_>) -> Element {
        let (id, style, transform) = self.common_attrs(node);
        Element::Line(LineElement {
            id,
            start: Point::new(
                self.parse_attr_length(node, "x1", 0.0),
                self.parse_attr_length(node, "y1", 0.0),
            ),
            end: Point::new(
                self.parse_attr_length(node, "x2", 0.0),
                self.parse_attr_length(node, "y2", 0.0),
            ),
            style,
            transform,
        })
    }

    fn parse_text(&mut self, node: Node<'_, '_>) -> Element {
        let (id, style, transform) = self.common_attrs(node);
        Element::Text(TextElement {
            id,
            text: node.text().unwrap_or("").trim().to_owned(),
            position: Point::new(
                self.parse_attr_length(node, "x", 0.0),
                self.parse_attr_length(node, "y", 0.0),
            ),
            font_size: match node.attribute("font-size") {
                Some(value) => self.parse_length(value, "font-size", 12.0),
                None => 12.0,
            },
            font_family: node.attribute("font-family").unwrap_or("Arial").to_owned(),
            style,
            transform,
        })
    }

    /// Merge inline `style` declarations and presentation attributes
    ///
    /// Presentation attributes take priority over `style` when both are
    /// present. This is the documented behavior of this engine and differs
    /// from the CSS cascade.
    fn parse_style(&mut self, node: Node<'_, '_>) -> Style {
        let mut style = Style::default();
        if let Some(inline) = node.attribute("style") {
            for declaration in inline.split(';') {
                let Some((name, value)) = declaration.split_once(':') else {
                    continue;
                };
                self.apply_style_property(&mut style, name.trim(), value.trim());
            }
        }
        for attribute in [
            "fill",
            "stroke",
            "stroke-width",
            "opacity",
            "fill-opacity",
            "stroke-opacity",
            "fill-rule",
            "stroke-linecap",
            "stroke-linejoin",
            "stroke-miterlimit",
            "stroke-dasharray",
            "stroke-dashoffset",
        ] {
            if let Some(value) = node.attribute(attribute) {
                self.apply_style_property(&mut style, attribute, value.trim());
            }
        }
        style
    }

    fn apply_style_property(&mut self, style: &mut Style, name: &str, value: &str) {
        match name {
            "fill" => {
                if value == "none" {
                    style.fill_none = true;
                } else {
                    style.fill_none = false;
                    style.fill_color = Some(self.parse_color(value));
                }
            }
            "stroke" => {
                if value == "none" {
                    style.stroke_none = true;
                } else {
                    style.stroke_none = false;
                    style.stroke_color = Some(self.parse_color(value));
                }
            }
            "stroke-width" => style.stroke_width = Some(self.parse_length(value, name, 1.0)),
            "opacity" => style.opacity = self.parse_number(value, name),
            "fill-opacity" => style.fill_opacity = self.parse_number(value, name),
            "stroke-opacity" => style.stroke_opacity = self.parse_number(value, name),
            "fill-rule" => match value.parse::<FillRule>() {
                Ok(fill_rule) => style.fill_rule = Some(fill_rule),
                Err(()) => self.invalid_attribute(name, value),
            },
            "stroke-linecap" => match value.parse::<LineCap>() {
                Ok(cap) => style.stroke_line_cap = Some(cap),
                Err(()) => self.invalid_attribute(name, value),
            },
            "stroke-linejoin" => match value.parse::<LineJoin>() {
                Ok(join) => style.stroke_line_join = Some(join),
                Err(()) => self.invalid_attribute(name, value),
            },
            "stroke-miterlimit" => style.stroke_miter_limit = self.parse_number(value, name),
            "stroke-dasharray" => {
                if value != "none" {
                    style.stroke_dash_array = self.parse_dash_array(value);
                }
            }
            "stroke-dashoffset" => {
                style.stroke_dash_offset = Some(self.parse_length(value, name, 0.0))
            }
            // other properties are not part of the supported subset
            _ => {}
        }
    }

    fn invalid_attribute(&mut self, attribute: &str, value: &str) {
        self.diagnostics.push(Diagnostic::InvalidAttribute {
            attribute: attribute.to_owned(),
            value: value.to_owned(),
        });
    }

    fn parse_attr_length(&mut self, node: Node<'_, '_>, attribute: &str, default: Scalar) -> Scalar {
        match node.attribute(attribute) {
            Some(value) => self.parse_length(value, attribute, default),
            None => default,
        }
    }

    /// Parse a length with an optional unit suffix into device pixels
    ///
    /// Relative units (`em`, `ex`, `%`) are treated as `1x`, there is no
    /// surrounding font or container context to resolve them against.
    fn parse_length(&mut self, value: &str, attribute: &str, default: Scalar) -> Scalar {
        let value = value.trim();
        let split = value
            .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
            .unwrap_or(value.len());
        // an exponent suffix can swallow the unit start, retry number parse
        // on the full string first
        let (number, unit) = match value.parse::<Scalar>() {
            Ok(number) => (Some(number), ""),
            Err(_) => (value[..split].parse::<Scalar>().ok(), value[split..].trim()),
        };
        let Some(number) = number else {
            self.diagnostics.push(Diagnostic::InvalidNumber {
                attribute: attribute.to_owned(),
                value: value.to_owned(),
            });
            return default;
        };
        if !number.is_finite() {
            self.diagnostics.push(Diagnostic::InvalidNumber {
                attribute: attribute.to_owned(),
                value: value.to_owned(),
            });
            return default;
        }
        let factor = match unit {
            "" | "px" | "em" | "ex" | "%" => 1.0,
            "pt" => 1.333,
            "pc" => 16.0,
            "in" => 96.0,
            "cm" => 37.795,
            "mm" => 3.7795,
            _ => {
                self.invalid_attribute(attribute, value);
                1.0
            }
        };
        number * factor
    }

    fn parse_number(&mut self, value: &str, attribute: &str) -> Option<Scalar> {
        match value.trim().parse::<Scalar>() {
            Ok(number) if number.is_finite() => Some(number),
            _ => {
                self.diagnostics.push(Diagnostic::InvalidNumber {
                    attribute: attribute.to_owned(),
                    value: value.to_owned(),
                });
                None
            }
        }
    }

    /// Invalid colors fall back to opaque black
    fn parse_color(&mut self, value: &str) -> Rgba {
        match value.parse::<Rgba>() {
            Ok(color) => color,
            Err(_) => {
                self.diagnostics
                    .push(Diagnostic::InvalidColor(value.to_owned()));
                Rgba::opaque_black()
            }
        }
    }

    /// Ordered non-negative dash lengths, comma or whitespace separated
    fn parse_dash_array(&mut self, value: &str) -> Option<Vec<Scalar>> {
        let mut lengths = Vec::new();
        for token in value.split(|c: char| c == ',' || c.is_whitespace()) {
            if token.is_empty() {
                continue;
            }
            match token.parse::<Scalar>() {
                Ok(length) if length.is_finite() && length >= 0.0 => lengths.push(length),
                _ => {
                    self.invalid_attribute("stroke-dasharray", value);
                    return None;
                }
            }
        }
        (!lengths.is_empty()).then_some(lengths)
    }

    fn parse_view_box(&mut self, value: &str) -> Option<ViewBox> {
        let numbers: Vec<Scalar> = value
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .filter_map(|token| token.parse::<Scalar>().ok())
            .filter(|number| number.is_finite())
            .collect();
        match numbers.as_slice() {
            [min_x, min_y, width, height] if *width > 0.0 && *height > 0.0 => Some(ViewBox {
                min_x: *min_x,
                min_y: *min_y,
                width: *width,
                height: *height,
            }),
            _ => {
                self.invalid_attribute("viewBox", value);
                None
            }
        }
    }

    /// Parse a transform list, composing left to right
    ///
    /// The first listed transform is the outermost one:
    /// `translate(..) scale(..)` scales the point first, then translates.
    fn parse_transform(&mut self, value: &str) -> Transform {
        let mut result = Transform::identity();
        let mut rest = value.trim();
        while !rest.is_empty() {
            let Some(open) = rest.find('(') else {
                if !rest.trim().is_empty() {
                    self.diagnostics
                        .push(Diagnostic::UnknownTransform(rest.trim().to_owned()));
                }
                break;
            };
            let name = rest[..open].trim_matches(|c: char| c.is_whitespace() || c == ',');
            let Some(close) = rest[open..].find(')') else {
                self.diagnostics
                    .push(Diagnostic::UnknownTransform(name.to_owned()));
                break;
            };
            let args: Vec<Scalar> = rest[open + 1..open + close]
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|token| !token.is_empty())
                .filter_map(|token| token.parse::<Scalar>().ok())
                .collect();
            rest = &rest[open + close + 1..];

            let tr = match (name, args.as_slice()) {
                ("translate", [tx]) => Transform::new_translate(*tx, 0.0),
                ("translate", [tx, ty, ..]) => Transform::new_translate(*tx, *ty),
                ("scale", [s]) => Transform::new_scale(*s, *s),
                ("scale", [sx, sy, ..]) => Transform::new_scale(*sx, *sy),
                ("rotate", [a]) => Transform::new_rotate(a.to_radians()),
                ("rotate", [a, cx, cy, ..]) => Transform::new_translate(*cx, *cy)
                    .rotate(a.to_radians())
                    .translate(-cx, -cy),
                ("skewX", [a]) => Transform::new_skew_x(a.to_radians()),
                ("skewY", [a]) => Transform::new_skew_y(a.to_radians()),
                ("matrix", [a, b, c, d, e, f, ..]) => Transform::new(*a, *b, *c, *d, *e, *f),
                _ => {
                    self.diagnostics
                        .push(Diagnostic::UnknownTransform(name.to_owned()));
                    continue;
                }
            };
            result = result * tr;
        }
        result
    }
}
