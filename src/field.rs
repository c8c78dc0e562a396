//! Form field model.
//!
//! A [`FormField`] is a text input placed on one page of a PDF. Geometry is
//! stored in page-local UI space (top-left origin, y downward, scale 1.0);
//! see [`crate::geometry`] for the conversion to PDF space.

use crate::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Default width for new and imported fields.
pub const DEFAULT_WIDTH: f32 = 150.0;
/// Default height for new and imported fields.
pub const DEFAULT_HEIGHT: f32 = 30.0;
/// Default font size.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;
/// Default text color.
pub const DEFAULT_COLOR: &str = "#000000";

/// Kind of input a field collects.
///
/// Only sample-data generation and input rendering depend on it; every
/// type materializes as a PDF text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text
    #[default]
    Text,
    /// Calendar date
    Date,
    /// Numeric value
    Number,
    /// Email address
    Email,
}

impl FieldType {
    /// Parse a wire name; unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "text" => Some(FieldType::Text),
            "date" => Some(FieldType::Date),
            "number" => Some(FieldType::Number),
            "email" => Some(FieldType::Email),
            _ => None,
        }
    }

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Date => "date",
            FieldType::Number => "number",
            FieldType::Email => "email",
        }
    }
}

/// A placed field on a PDF page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    /// Opaque unique identifier, fixed at creation
    pub id: String,
    /// Input kind
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Display label
    pub label: String,
    /// Form field key used when filling
    pub name: String,
    /// Left edge (UI space)
    pub x: f32,
    /// Top edge (UI space, y downward)
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
    /// Font size used for the widget's default appearance
    pub font_size: f32,
    /// Text color as `#rrggbb`
    pub color: String,
    /// Whether the field must be filled
    pub required: bool,
    /// Initial text value of the widget
    pub placeholder: String,
    /// 1-based page number
    pub page_number: u32,
}

impl FormField {
    /// Create a field with a fresh id and default size and styling.
    pub fn new(name: impl Into<String>, field_type: FieldType, page_number: u32) -> Self {
        let name = name.into();
        Self {
            id: new_field_id(),
            field_type,
            label: name.clone(),
            name,
            x: 0.0,
            y: 0.0,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            font_size: DEFAULT_FONT_SIZE,
            color: DEFAULT_COLOR.to_string(),
            required: false,
            placeholder: String::new(),
            page_number,
        }
    }

    /// Set the position.
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Set the size.
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the placeholder (initial widget value).
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Mark the field required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Field rectangle in UI space.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Top-left corner.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Text color as RGB components in `0.0..=1.0`; malformed colors are black.
    pub fn rgb(&self) -> (f32, f32, f32) {
        parse_hex_color(&self.color).unwrap_or((0.0, 0.0, 0.0))
    }

    /// Apply a partial update. The id never changes.
    pub fn apply(&mut self, patch: &FieldPatch) {
        if let Some(t) = patch.field_type {
            self.field_type = t;
        }
        if let Some(ref label) = patch.label {
            self.label = label.clone();
        }
        if let Some(ref name) = patch.name {
            self.name = name.clone();
        }
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(w) = patch.width {
            self.width = w;
        }
        if let Some(h) = patch.height {
            self.height = h;
        }
        if let Some(size) = patch.font_size {
            self.font_size = size;
        }
        if let Some(ref color) = patch.color {
            self.color = color.clone();
        }
        if let Some(required) = patch.required {
            self.required = required;
        }
        if let Some(ref placeholder) = patch.placeholder {
            self.placeholder = placeholder.clone();
        }
        if let Some(page) = patch.page_number {
            self.page_number = page;
        }
    }
}

/// Partial update of a [`FormField`]; `None` leaves a property unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldPatch {
    /// New input kind
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    /// New label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// New fill key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New left edge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    /// New top edge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    /// New width
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    /// New height
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    /// New font size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    /// New color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// New required flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// New placeholder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// New page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
}

impl FieldPatch {
    /// Patch that moves a field.
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    /// Patch that resizes a field.
    pub fn size(width: f32, height: f32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }

    /// True when the patch changes position, size or page.
    pub fn touches_geometry(&self) -> bool {
        self.x.is_some()
            || self.y.is_some()
            || self.width.is_some()
            || self.height.is_some()
            || self.page_number.is_some()
    }
}

/// Generate a fresh field id.
pub fn new_field_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Parse `#rgb` or `#rrggbb` into components in `0.0..=1.0`.
pub fn parse_hex_color(color: &str) -> Option<(f32, f32, f32)> {
    let hex = color.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let channel = |i: usize| {
        u8::from_str_radix(&expanded[i..i + 2], 16)
            .ok()
            .map(|v| v as f32 / 255.0)
    };
    Some((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_field_defaults() {
        let field = FormField::new("email", FieldType::Email, 1);
        assert_eq!(field.name, "email");
        assert_eq!(field.label, "email");
        assert_eq!(field.width, 150.0);
        assert_eq!(field.height, 30.0);
        assert_eq!(field.color, "#000000");
        assert!(!field.id.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = FormField::new("a", FieldType::Text, 1);
        let b = FormField::new("a", FieldType::Text, 1);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_apply_patch_keeps_id() {
        let mut field = FormField::new("name", FieldType::Text, 1);
        let id = field.id.clone();
        field.apply(&FieldPatch {
            label: Some("Full name".into()),
            x: Some(40.0),
            required: Some(true),
            ..Default::default()
        });
        assert_eq!(field.id, id);
        assert_eq!(field.label, "Full name");
        assert_eq!(field.x, 40.0);
        assert_eq!(field.y, 0.0);
        assert!(field.required);
    }

    #[test]
    fn test_patch_geometry_detection() {
        assert!(FieldPatch::position(1.0, 2.0).touches_geometry());
        assert!(FieldPatch::size(1.0, 2.0).touches_geometry());
        let cosmetic = FieldPatch {
            color: Some("#ff0000".into()),
            ..Default::default()
        };
        assert!(!cosmetic.touches_geometry());
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#000000"), Some((0.0, 0.0, 0.0)));
        assert_eq!(parse_hex_color("#ffffff"), Some((1.0, 1.0, 1.0)));
        assert_eq!(parse_hex_color("f00"), Some((1.0, 0.0, 0.0)));
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }

    #[test]
    fn test_wire_format() {
        let field = FormField::new("dob", FieldType::Date, 2).at(10.0, 20.0);
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "date");
        assert_eq!(json["pageNumber"], 2);
        assert_eq!(json["fontSize"], 12.0);
    }

    #[test]
    fn test_field_type_names() {
        assert_eq!(FieldType::from_name("EMAIL"), Some(FieldType::Email));
        assert_eq!(FieldType::from_name("checkbox"), None);
        assert_eq!(FieldType::Number.as_str(), "number");
    }
}
