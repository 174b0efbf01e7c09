//! Scene model: styles, typed elements and the document
use crate::{FillRule, LineCap, LineJoin, Path, Point, Rgba, Scalar, StrokeStyle, Transform};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Paint and stroke properties of an element
///
/// `None` means the property was not set and may be inherited; the two
/// `*_none` flags record an explicit `none`, which suppresses painting even
/// when a color would otherwise be inherited.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Style {
    pub fill_color: Option<Rgba>,
    pub stroke_color: Option<Rgba>,
    pub stroke_width: Option<Scalar>,
    pub opacity: Option<Scalar>,
    pub fill_opacity: Option<Scalar>,
    pub stroke_opacity: Option<Scalar>,
    pub fill_rule: Option<FillRule>,
    pub fill_none: bool,
    pub stroke_none: bool,
    pub stroke_line_cap: Option<LineCap>,
    pub stroke_line_join: Option<LineJoin>,
    pub stroke_miter_limit: Option<Scalar>,
    pub stroke_dash_array: Option<Vec<Scalar>>,
    pub stroke_dash_offset: Option<Scalar>,
}

impl Style {
    /// Effective fill color with opacities folded into alpha
    ///
    /// SVG fills with opaque black when nothing is specified; an explicit
    /// `fill="none"` suppresses filling entirely.
    pub fn fill_color(&self) -> Option<Rgba> {
        if self.fill_none {
            return None;
        }
        let mut color = self.fill_color.unwrap_or(Rgba::opaque_black());
        if let Some(fill_opacity) = self.fill_opacity {
            color = color.mul_alpha(fill_opacity as f32);
        }
        if let Some(opacity) = self.opacity {
            color = color.mul_alpha(opacity as f32);
        }
        (color.alpha() > 0.0).then_some(color)
    }

    /// Effective stroke color with opacities folded into alpha
    ///
    /// Unlike fill there is no stroke by default.
    pub fn stroke_color(&self) -> Option<Rgba> {
        if self.stroke_none {
            return None;
        }
        let mut color = self.stroke_color?;
        if let Some(stroke_opacity) = self.stroke_opacity {
            color = color.mul_alpha(stroke_opacity as f32);
        }
        if let Some(opacity) = self.opacity {
            color = color.mul_alpha(opacity as f32);
        }
        (color.alpha() > 0.0).then_some(color)
    }

    /// Stroke geometry parameters with SVG defaults filled in
    pub fn stroke_style(&self) -> StrokeStyle {
        StrokeStyle {
            width: self.stroke_width.unwrap_or(1.0),
            line_cap: self.stroke_line_cap.unwrap_or_default(),
            line_join: self.stroke_line_join.unwrap_or_default(),
            miter_limit: self.stroke_miter_limit.unwrap_or(4.0),
            dash_array: self.stroke_dash_array.clone().unwrap_or_default(),
            dash_offset: self.stroke_dash_offset.unwrap_or(0.0),
        }
    }

    /// Inherit unset paint properties from an ancestor
    ///
    /// Only fill color, stroke color and stroke width propagate through
    /// groups; an explicit `none` on the child blocks inheritance.
    pub fn inherit(&mut self, parent: &Style) {
        if self.fill_color.is_none() && !self.fill_none {
            self.fill_color = parent.fill_color;
        }
        if self.stroke_color.is_none() && !self.stroke_none {
            self.stroke_color = parent.stroke_color;
        }
        if self.stroke_width.is_none() {
            self.stroke_width = parent.stroke_width;
        }
    }
}

/// Rectangle, optionally with rounded corners
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RectElement {
    pub id: Option<String>,
    pub position: Point,
    pub width: Scalar,
    pub height: Scalar,
    pub rx: Scalar,
    pub ry: Scalar,
    pub style: Style,
    pub transform: Transform,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CircleElement {
    pub id: Option<String>,
    pub center: Point,
    pub radius: Scalar,
    pub style: Style,
    pub transform: Transform,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EllipseElement {
    pub id: Option<String>,
    pub center: Point,
    pub rx: Scalar,
    pub ry: Scalar,
    pub style: Style,
    pub transform: Transform,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineElement {
    pub id: Option<String>,
    pub start: Point,
    pub end: Point,
    pub style: Style,
    pub transform: Transform,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathElement {
    pub id: Option<String>,
    pub path: Path,
    pub style: Style,
    pub transform: Transform,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextElement {
    pub id: Option<String>,
    pub text: String,
    pub position: Point,
    pub font_size: Scalar,
    pub font_family: String,
    pub style: Style,
    pub transform: Transform,
}

/// A drawable element of the document
///
/// Groups do not appear here, the parser flattens them into their children
/// with composed transforms and inherited style.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Path(PathElement),
    Rect(RectElement),
    Circle(CircleElement),
    Ellipse(EllipseElement),
    Line(LineElement),
    Text(TextElement),
}

impl Element {
    pub fn id(&self) -> Option<&str> {
        match self {
            Element::Path(e) => e.id.as_deref(),
            Element::Rect(e) => e.id.as_deref(),
            Element::Circle(e) => e.id.as_deref(),
            Element::Ellipse(e) => e.id.as_deref(),
            Element::Line(e) => e.id.as_deref(),
            Element::Text(e) => e.id.as_deref(),
        }
    }

    pub fn style(&self) -> &Style {
        match self {
            Element::Path(e) => &e.style,
            Element::Rect(e) => &e.style,
            Element::Circle(e) => &e.style,
            Element::Ellipse(e) => &e.style,
            Element::Line(e) => &e.style,
            Element::Text(e) => &e.style,
        }
    }

    pub fn style_mut(&mut self) -> &mut Style {
        match self {
            Element::Path(e) => &mut e.style,
            Element::Rect(e) => &mut e.style,
            Element::Circle(e) => &mut e.style,
            Element::Ellipse(e) => &mut e.style,
            Element::Line(e) => &mut e.style,
            Element::Text(e) => &mut e.style,
        }
    }

    pub fn transform(&self) -> Transform {
        match self {
            Element::Path(e) => e.transform,
            Element::Rect(e) => e.transform,
            Element::Circle(e) => e.transform,
            Element::Ellipse(e) => e.transform,
            Element::Line(e) => e.transform,
            Element::Text(e) => e.transform,
        }
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        match self {
            Element::Path(e) => &mut e.transform,
            Element::Rect(e) => &mut e.transform,
            Element::Circle(e) => &mut e.transform,
            Element::Ellipse(e) => &mut e.transform,
            Element::Line(e) => &mut e.transform,
            Element::Text(e) => &mut e.transform,
        }
    }
}

/// The `viewBox` rectangle mapping user units onto the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub min_x: Scalar,
    pub min_y: Scalar,
    pub width: Scalar,
    pub height: Scalar,
}

impl ViewBox {
    /// Transform from viewBox space to a `width x height` device canvas
    pub fn to_device(&self, width: Scalar, height: Scalar) -> Transform {
        let sx = width / self.width;
        let sy = height / self.height;
        Transform::new_translate(-self.min_x * sx, -self.min_y * sy).scale(sx, sy)
    }
}

/// Parsed SVG document: canvas size, optional viewBox and the element list
///
/// Document order is painting order, later elements paint over earlier
/// ones. The document owns its elements; rendering borrows it immutably.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub width: Scalar,
    pub height: Scalar,
    pub view_box: Option<ViewBox>,
    elements: Vec<Element>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            view_box: None,
            elements: Vec::new(),
        }
    }
}

impl Document {
    pub fn new(width: Scalar, height: Scalar) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Append element at the end of the paint order
    pub fn add_element(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Remove element by index, no-op when out of bounds
    pub fn remove_element(&mut self, index: usize) -> Option<Element> {
        (index < self.elements.len()).then(|| self.elements.remove(index))
    }

    /// Replace element by index, returns the previous element
    pub fn replace_element(&mut self, index: usize, element: Element) -> Option<Element> {
        let slot = self.elements.get_mut(index)?;
        Some(std::mem::replace(slot, element))
    }

    pub fn set_canvas_size(&mut self, width: Scalar, height: Scalar) {
        self.width = width;
        self.height = height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_approx_eq, Color};

    #[test]
    fn test_fill_defaults_to_black() {
        let style = Style::default();
        let fill = style.fill_color().unwrap();
        assert_eq!(fill.to_rgba(), [0, 0, 0, 255]);
        assert!(style.stroke_color().is_none());
    }

    #[test]
    fn test_explicit_none_suppresses_fill() {
        let style = Style {
            fill_none: true,
            fill_color: Some(Rgba::new(1.0, 0.0, 0.0, 1.0)),
            ..Default::default()
        };
        assert!(style.fill_color().is_none());
    }

    #[test]
    fn test_opacity_multiplies() {
        let style = Style {
            fill_color: Some(Rgba::new(1.0, 0.0, 0.0, 1.0)),
            fill_opacity: Some(0.5),
            opacity: Some(0.5),
            stroke_color: Some(Rgba::new(0.0, 0.0, 1.0, 0.8)),
            stroke_opacity: Some(0.5),
            ..Default::default()
        };
        let fill = style.fill_color().unwrap();
        assert_approx_eq!(fill.alpha() as Scalar, 0.25, 1e-6);
        let stroke = style.stroke_color().unwrap();
        assert_approx_eq!(stroke.alpha() as Scalar, 0.2, 1e-6);
    }

    #[test]
    fn test_inherit() {
        let parent = Style {
            fill_color: Some(Rgba::new(1.0, 0.0, 0.0, 1.0)),
            stroke_color: Some(Rgba::new(0.0, 1.0, 0.0, 1.0)),
            stroke_width: Some(3.0),
            ..Default::default()
        };
        let mut child = Style::default();
        child.inherit(&parent);
        assert_eq!(child.fill_color, parent.fill_color);
        assert_eq!(child.stroke_color, parent.stroke_color);
        assert_eq!(child.stroke_width, Some(3.0));

        // explicit none blocks inheritance
        let mut child = Style {
            fill_none: true,
            stroke_none: true,
            ..Default::default()
        };
        child.inherit(&parent);
        assert!(child.fill_color.is_none());
        assert!(child.stroke_color.is_none());
        assert!(child.fill_color().is_none());
        assert!(child.stroke_color().is_none());

        // own values win over inherited ones
        let mut child = Style {
            stroke_width: Some(1.0),
            ..Default::default()
        };
        child.inherit(&parent);
        assert_eq!(child.stroke_width, Some(1.0));
    }

    #[test]
    fn test_view_box_transform() {
        let view_box = ViewBox {
            min_x: 0.0,
            min_y: 0.0,
            width: 100.0,
            height: 100.0,
        };
        let tr = view_box.to_device(200.0, 200.0);
        let p = tr.apply(Point::new(25.0, 75.0));
        assert_approx_eq!(p.x(), 50.0);
        assert_approx_eq!(p.y(), 150.0);

        let view_box = ViewBox {
            min_x: 10.0,
            min_y: 20.0,
            width: 50.0,
            height: 50.0,
        };
        let tr = view_box.to_device(100.0, 100.0);
        let p = tr.apply(Point::new(10.0, 20.0));
        assert_approx_eq!(p.x(), 0.0);
        assert_approx_eq!(p.y(), 0.0);
    }

    #[test]
    fn test_document_mutation() {
        let mut doc = Document::new(100.0, 100.0);
        doc.add_element(Element::Circle(CircleElement {
            radius: 5.0,
            ..Default::default()
        }));
        doc.add_element(Element::Line(LineElement::default()));
        assert_eq!(doc.elements().len(), 2);

        let replaced = doc.replace_element(0, Element::Rect(RectElement::default()));
        assert!(matches!(replaced, Some(Element::Circle(_))));
        assert!(matches!(doc.elements()[0], Element::Rect(_)));

        assert!(doc.remove_element(5).is_none());
        assert!(doc.remove_element(1).is_some());
        assert_eq!(doc.elements().len(), 1);

        doc.set_canvas_size(40.0, 30.0);
        assert_approx_eq!(doc.width, 40.0);
        assert_approx_eq!(doc.height, 30.0);
    }
}
