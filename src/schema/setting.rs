//! The `{ box, meta }` field layout.
//!
//! Some configurations split each field into its geometry (`box`) and its
//! descriptive properties (`meta`) under a snake_case `form_fields` key:
//!
//! ```text
//! {
//!   "form_fields": [
//!     { "box":  { "x": 10, "y": 20, "width": 150, "height": 30, "page": 1 },
//!       "meta": { "id": "..", "type": "text", "label": "..", "name": "..",
//!                 "fontSize": 12, "color": "#000000", "required": false,
//!                 "placeholder": "" } }
//!   ],
//!   "version": "1.0",
//!   "timestamp": "2024-01-01T00:00:00Z"
//! }
//! ```

use super::normalize::normalize_field;
use crate::field::{FieldType, FormField};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Geometry half of a setting entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingBox {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
    /// 1-based page number
    pub page: u32,
}

/// Descriptive half of a setting entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingMeta {
    /// Field id
    pub id: String,
    /// Input kind
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Display label
    pub label: String,
    /// Fill key
    pub name: String,
    /// Font size
    pub font_size: f32,
    /// Text color
    pub color: String,
    /// Required flag
    pub required: bool,
    /// Initial value
    pub placeholder: String,
}

/// One field in `{ box, meta }` form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingField {
    /// Geometry
    #[serde(rename = "box")]
    pub bbox: SettingBox,
    /// Properties
    pub meta: SettingMeta,
}

/// A whole configuration in `{ box, meta }` form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingConfig {
    /// Fields
    pub form_fields: Vec<SettingField>,
    /// Format version
    pub version: String,
    /// Export time (RFC 3339)
    pub timestamp: String,
}

impl From<&FormField> for SettingField {
    fn from(f: &FormField) -> Self {
        Self {
            bbox: SettingBox {
                x: f.x,
                y: f.y,
                width: f.width,
                height: f.height,
                page: f.page_number,
            },
            meta: SettingMeta {
                id: f.id.clone(),
                field_type: f.field_type,
                label: f.label.clone(),
                name: f.name.clone(),
                font_size: f.font_size,
                color: f.color.clone(),
                required: f.required,
                placeholder: f.placeholder.clone(),
            },
        }
    }
}

/// True when a JSON entry looks like a `{ box, meta }` field.
pub fn is_setting_entry(raw: &Value) -> bool {
    raw.get("box").is_some_and(Value::is_object) || raw.get("meta").is_some_and(Value::is_object)
}

/// Normalize a `{ box, meta }` entry.
///
/// `meta` and `box` are merged into one flat object (box wins on
/// conflicts, `page` becomes `pageNumber`) and passed through
/// [`normalize_field`], so the same default table applies.
pub fn normalize_setting_field(raw: &Value, index: usize) -> FormField {
    let mut flat = Map::new();
    if let Some(meta) = raw.get("meta").and_then(Value::as_object) {
        flat.extend(meta.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    if let Some(bbox) = raw.get("box").and_then(Value::as_object) {
        for (k, v) in bbox {
            let key = if k == "page" { "pageNumber" } else { k.as_str() };
            flat.insert(key.to_string(), v.clone());
        }
    }
    normalize_field(&Value::Object(flat), index)
}
