//! Total conversion from arbitrary JSON to [`FormField`].
//!
//! Imported configurations may be hand-edited, produced by older builds or
//! by other tools. Every property falls back to a literal default when it
//! is missing or has the wrong type, so normalization never fails.

use crate::field::{
    new_field_id, FieldType, FormField, DEFAULT_COLOR, DEFAULT_FONT_SIZE, DEFAULT_HEIGHT,
    DEFAULT_WIDTH,
};
use serde_json::{Map, Value};

/// Literal defaults applied by [`normalize_field`].
pub mod defaults {
    /// Label used when neither label nor name is present.
    pub const LABEL: &str = "Field";
    /// Prefix of generated names (`field_1`, `field_2`, ...).
    pub const NAME_PREFIX: &str = "field_";
    /// Default x and y.
    pub const POSITION: f32 = 0.0;
    /// Default page.
    pub const PAGE_NUMBER: u32 = 1;
}

/// Key spellings accepted for each property, preferred spelling first.
const ID_KEYS: &[&str] = &["id"];
const TYPE_KEYS: &[&str] = &["type", "fieldType", "field_type"];
const LABEL_KEYS: &[&str] = &["label"];
const NAME_KEYS: &[&str] = &["name"];
const X_KEYS: &[&str] = &["x"];
const Y_KEYS: &[&str] = &["y"];
const WIDTH_KEYS: &[&str] = &["width", "w"];
const HEIGHT_KEYS: &[&str] = &["height", "h"];
const FONT_SIZE_KEYS: &[&str] = &["fontSize", "font_size"];
const COLOR_KEYS: &[&str] = &["color"];
const REQUIRED_KEYS: &[&str] = &["required"];
const PLACEHOLDER_KEYS: &[&str] = &["placeholder"];
const PAGE_KEYS: &[&str] = &["pageNumber", "page_number", "page"];

/// Build a [`FormField`] from any JSON value.
///
/// `index` is the position of the entry in its list and only feeds the
/// generated name of unnamed fields. Non-object input yields a field made
/// entirely of defaults.
///
/// # Examples
///
/// ```
/// use form_oxide::schema::normalize_field;
/// use serde_json::json;
///
/// let field = normalize_field(&json!({"name": "email", "x": "40"}), 0);
/// assert_eq!(field.name, "email");
/// assert_eq!(field.x, 40.0);
/// assert_eq!(field.width, 150.0);
/// assert_eq!(field.color, "#000000");
/// ```
pub fn normalize_field(raw: &Value, index: usize) -> FormField {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);

    let explicit_name = string_prop(obj, NAME_KEYS);
    let label = string_prop(obj, LABEL_KEYS)
        .or_else(|| explicit_name.clone())
        .unwrap_or_else(|| defaults::LABEL.to_string());
    let name = explicit_name
        .unwrap_or_else(|| format!("{}{}", defaults::NAME_PREFIX, index + 1));

    FormField {
        id: string_prop(obj, ID_KEYS)
            .or_else(|| number_prop(obj, ID_KEYS).map(|n| format!("{}", n)))
            .unwrap_or_else(new_field_id),
        field_type: string_prop(obj, TYPE_KEYS)
            .and_then(|t| FieldType::from_name(&t))
            .unwrap_or_default(),
        label,
        name,
        x: number_prop(obj, X_KEYS).unwrap_or(defaults::POSITION),
        y: number_prop(obj, Y_KEYS).unwrap_or(defaults::POSITION),
        width: positive(number_prop(obj, WIDTH_KEYS)).unwrap_or(DEFAULT_WIDTH),
        height: positive(number_prop(obj, HEIGHT_KEYS)).unwrap_or(DEFAULT_HEIGHT),
        font_size: positive(number_prop(obj, FONT_SIZE_KEYS)).unwrap_or(DEFAULT_FONT_SIZE),
        color: string_prop(obj, COLOR_KEYS).unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        required: bool_prop(obj, REQUIRED_KEYS).unwrap_or(false),
        placeholder: lookup(obj, PLACEHOLDER_KEYS)
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_default(),
        page_number: page_prop(obj).unwrap_or(defaults::PAGE_NUMBER),
    }
}

/// Normalize every entry of a JSON array; anything else yields no fields.
pub fn normalize_fields(raw: &Value) -> Vec<FormField> {
    raw.as_array()
        .map(|items| {
            items
                .iter()
                .enumerate()
                .map(|(i, item)| normalize_field(item, i))
                .collect()
        })
        .unwrap_or_default()
}

fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

/// Non-empty string, kept exactly as written.
fn string_prop(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    lookup(obj, keys)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Finite number, given either as a JSON number or a numeric string.
fn number_prop(obj: &Map<String, Value>, keys: &[&str]) -> Option<f32> {
    let value = lookup(obj, keys)?;
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    let n = n as f32;
    n.is_finite().then_some(n)
}

fn bool_prop(obj: &Map<String, Value>, keys: &[&str]) -> Option<bool> {
    match lookup(obj, keys)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn page_prop(obj: &Map<String, Value>) -> Option<u32> {
    let n = number_prop(obj, PAGE_KEYS)?;
    (n >= 1.0 && n <= u32::MAX as f32).then(|| n.floor() as u32)
}

fn positive(n: Option<f32>) -> Option<f32> {
    n.filter(|v| *v > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_object_gets_every_default() {
        let field = normalize_field(&json!({}), 2);
        assert!(!field.id.is_empty());
        assert_eq!(field.field_type, FieldType::Text);
        assert_eq!(field.label, "Field");
        assert_eq!(field.name, "field_3");
        assert_eq!((field.x, field.y), (0.0, 0.0));
        assert_eq!((field.width, field.height), (150.0, 30.0));
        assert_eq!(field.font_size, 12.0);
        assert_eq!(field.color, "#000000");
        assert!(!field.required);
        assert_eq!(field.placeholder, "");
        assert_eq!(field.page_number, 1);
    }

    #[test]
    fn test_non_object_input_does_not_panic() {
        for raw in [json!(null), json!(42), json!("text"), json!([1, 2])] {
            let field = normalize_field(&raw, 0);
            assert_eq!(field.name, "field_1");
        }
    }

    #[test]
    fn test_explicit_values_are_kept() {
        let raw = json!({
            "id": "f-1", "type": "email", "label": "Email", "name": "email",
            "x": 12.5, "y": 40, "width": 200, "height": 24, "fontSize": 10,
            "color": "#ff0000", "required": true, "placeholder": "you@example.com",
            "pageNumber": 3
        });
        let field = normalize_field(&raw, 0);
        assert_eq!(field.id, "f-1");
        assert_eq!(field.field_type, FieldType::Email);
        assert_eq!(field.label, "Email");
        assert_eq!(field.x, 12.5);
        assert_eq!(field.y, 40.0);
        assert_eq!(field.width, 200.0);
        assert_eq!(field.height, 24.0);
        assert_eq!(field.font_size, 10.0);
        assert_eq!(field.color, "#ff0000");
        assert!(field.required);
        assert_eq!(field.placeholder, "you@example.com");
        assert_eq!(field.page_number, 3);
    }

    #[test]
    fn test_wrong_types_fall_back() {
        let raw = json!({
            "type": "signature", "x": "abc", "width": -5, "height": 0,
            "required": "maybe", "color": 7, "pageNumber": 0, "name": ""
        });
        let field = normalize_field(&raw, 0);
        assert_eq!(field.field_type, FieldType::Text);
        assert_eq!(field.x, 0.0);
        assert_eq!(field.width, 150.0);
        assert_eq!(field.height, 30.0);
        assert!(!field.required);
        assert_eq!(field.color, "#000000");
        assert_eq!(field.page_number, 1);
        assert_eq!(field.name, "field_1");
    }

    #[test]
    fn test_surrounding_whitespace_is_preserved() {
        let raw = json!({"name": " first name ", "label": "  Name: ", "color": " #00ff00"});
        let field = normalize_field(&raw, 0);
        assert_eq!(field.name, " first name ");
        assert_eq!(field.label, "  Name: ");
        assert_eq!(field.color, " #00ff00");
    }

    #[test]
    fn test_label_defaults_to_name() {
        let field = normalize_field(&json!({"name": "zip"}), 0);
        assert_eq!(field.label, "zip");
    }

    #[test]
    fn test_alternate_key_spellings() {
        let raw = json!({"font_size": 9, "page_number": 2, "field_type": "date", "id": 17});
        let field = normalize_field(&raw, 0);
        assert_eq!(field.font_size, 9.0);
        assert_eq!(field.page_number, 2);
        assert_eq!(field.field_type, FieldType::Date);
        assert_eq!(field.id, "17");
    }

    #[test]
    fn test_normalize_fields_array() {
        let fields = normalize_fields(&json!([{"name": "a"}, {}]));
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].name, "field_2");
        assert!(normalize_fields(&json!({"name": "a"})).is_empty());
    }
}
