//! JSON field-configuration files.
//!
//! A configuration pairs the field list with a version stamp and
//! timestamps. It is written next to the original PDF so a layout can be
//! re-imported later:
//!
//! ```text
//! {
//!   "formFields": [ { "id": "...", "type": "text", "name": "...", ... } ],
//!   "metadata": { "version": "1.0", "createdAt": "...", "updatedAt": "..." },
//!   "version": "1.0"
//! }
//! ```
//!
//! Import accepts that layout, the `{ box, meta }` layout of
//! [`setting`], and a bare array of fields. Every field goes through
//! [`normalize_field`], so partially broken input still imports.
//!
//! ## Example
//!
//! ```
//! use form_oxide::field::{FieldType, FormField};
//! use form_oxide::schema::{export_config, import_config};
//!
//! let fields = vec![FormField::new("email", FieldType::Email, 1)];
//! let json = export_config(&fields).to_json_pretty().unwrap();
//! let config = import_config(&json).unwrap();
//! assert_eq!(config.form_fields, fields);
//! ```

mod normalize;
pub mod setting;

pub use normalize::{defaults, normalize_field, normalize_fields};
pub use setting::{SettingConfig, SettingField};

use crate::error::{Error, Result};
use crate::field::FormField;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Version stamp written into exported configurations.
pub const CONFIG_VERSION: &str = "1.0";

/// Version and timestamps of a configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMetadata {
    /// Format version
    pub version: String,
    /// Creation time (RFC 3339)
    pub created_at: String,
    /// Last update time (RFC 3339)
    pub updated_at: String,
}

impl ConfigMetadata {
    /// Metadata stamped with the current time.
    pub fn now() -> Self {
        let stamp = now_rfc3339();
        Self {
            version: CONFIG_VERSION.to_string(),
            created_at: stamp.clone(),
            updated_at: stamp,
        }
    }
}

/// A field configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfConfig {
    /// Placed fields
    pub form_fields: Vec<FormField>,
    /// Version and timestamps
    pub metadata: ConfigMetadata,
    /// Format version
    pub version: String,
}

impl PdfConfig {
    /// Serialize as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Refresh `updatedAt`, keeping `createdAt`.
    pub fn touch(&mut self) {
        self.metadata.updated_at = now_rfc3339();
    }
}

/// Build a configuration for `fields`, stamped with the current time.
pub fn export_config(fields: &[FormField]) -> PdfConfig {
    PdfConfig {
        form_fields: fields.to_vec(),
        metadata: ConfigMetadata::now(),
        version: CONFIG_VERSION.to_string(),
    }
}

/// Build a `{ box, meta }` configuration for `fields`.
pub fn export_setting_config(fields: &[FormField]) -> SettingConfig {
    SettingConfig {
        form_fields: fields.iter().map(SettingField::from).collect(),
        version: CONFIG_VERSION.to_string(),
        timestamp: now_rfc3339(),
    }
}

/// Parse a configuration from JSON text.
///
/// Malformed JSON and documents without a field list are errors; the
/// caller's state is untouched because nothing is returned. Individual
/// fields never fail, they are normalized.
pub fn import_config(json: &str) -> Result<PdfConfig> {
    let raw: Value = serde_json::from_str(json)?;
    import_config_value(&raw)
}

/// Parse a configuration from an already-decoded JSON value.
pub fn import_config_value(raw: &Value) -> Result<PdfConfig> {
    let (entries, metadata) = match raw {
        Value::Array(_) => (raw, None),
        Value::Object(obj) => {
            let entries = obj
                .get("formFields")
                .or_else(|| obj.get("form_fields"))
                .or_else(|| obj.get("fields"))
                .filter(|v| v.is_array())
                .ok_or_else(|| Error::InvalidConfig("no field list found".to_string()))?;
            (entries, Some(obj))
        },
        _ => {
            return Err(Error::InvalidConfig(
                "expected a JSON object or array".to_string(),
            ))
        },
    };

    let form_fields: Vec<FormField> = entries
        .as_array()
        .map(|items| {
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    if setting::is_setting_entry(item) {
                        setting::normalize_setting_field(item, i)
                    } else {
                        normalize_field(item, i)
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let version = metadata
        .and_then(|m| m.get("version"))
        .and_then(Value::as_str)
        .unwrap_or(CONFIG_VERSION)
        .to_string();
    let meta = metadata.and_then(|m| m.get("metadata"));
    let stamp = |key: &str| {
        meta.and_then(|m| m.get(key))
            .or_else(|| metadata.and_then(|m| m.get("timestamp")))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(now_rfc3339)
    };

    log::debug!("Imported {} fields (config version {})", form_fields.len(), version);

    Ok(PdfConfig {
        form_fields,
        metadata: ConfigMetadata {
            version: meta
                .and_then(|m| m.get("version"))
                .and_then(Value::as_str)
                .unwrap_or(&version)
                .to_string(),
            created_at: stamp("createdAt"),
            updated_at: stamp("updatedAt"),
        },
        version,
    })
}

/// Read and parse a configuration file.
pub fn import_config_file(path: impl AsRef<Path>) -> Result<PdfConfig> {
    let text = std::fs::read_to_string(path.as_ref())?;
    import_config(&text)
}

/// Write `fields` as a configuration file and return what was written.
pub fn export_config_file(path: impl AsRef<Path>, fields: &[FormField]) -> Result<PdfConfig> {
    let config = export_config(fields);
    std::fs::write(path.as_ref(), config.to_json_pretty()?)?;
    log::info!("Wrote {} fields to {}", fields.len(), path.as_ref().display());
    Ok(config)
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;

    #[test]
    fn test_export_stamps_version() {
        let config = export_config(&[]);
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.metadata.version, CONFIG_VERSION);
        assert!(chrono::DateTime::parse_from_rfc3339(&config.metadata.created_at).is_ok());
    }

    #[test]
    fn test_exported_json_shape() {
        let fields = vec![FormField::new("a", FieldType::Text, 1)];
        let json: Value =
            serde_json::from_str(&export_config(&fields).to_json_pretty().unwrap()).unwrap();
        assert!(json["formFields"].is_array());
        assert!(json["metadata"]["createdAt"].is_string());
        assert_eq!(json["version"], "1.0");
    }

    #[test]
    fn test_import_rejects_malformed_json() {
        assert!(matches!(import_config("{ not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_import_rejects_missing_field_list() {
        assert!(matches!(import_config(r#"{"version": "1.0"}"#), Err(Error::InvalidConfig(_))));
        assert!(matches!(import_config("42"), Err(Error::InvalidConfig(_))));
        assert!(matches!(
            import_config(r#"{"formFields": "nope"}"#),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_import_bare_array() {
        let config = import_config(r#"[{"name": "a"}, {"name": "b", "pageNumber": 2}]"#).unwrap();
        assert_eq!(config.form_fields.len(), 2);
        assert_eq!(config.form_fields[1].page_number, 2);
        assert_eq!(config.version, CONFIG_VERSION);
    }

    #[test]
    fn test_import_keeps_timestamps() {
        let json = r#"{
            "formFields": [],
            "metadata": {"version": "0.9", "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-02-01T00:00:00Z"},
            "version": "0.9"
        }"#;
        let config = import_config(json).unwrap();
        assert_eq!(config.version, "0.9");
        assert_eq!(config.metadata.created_at, "2024-01-01T00:00:00Z");
        assert_eq!(config.metadata.updated_at, "2024-02-01T00:00:00Z");
    }

    #[test]
    fn test_import_setting_layout() {
        let json = r#"{
            "form_fields": [{"box": {"x": 1, "y": 2, "width": 3, "height": 4, "page": 2}, "meta": {"name": "n"}}],
            "version": "2.0",
            "timestamp": "2024-05-05T00:00:00Z"
        }"#;
        let config = import_config(json).unwrap();
        assert_eq!(config.version, "2.0");
        assert_eq!(config.metadata.created_at, "2024-05-05T00:00:00Z");
        let f = &config.form_fields[0];
        assert_eq!((f.x, f.y, f.width, f.height, f.page_number), (1.0, 2.0, 3.0, 4.0, 2));
    }

    #[test]
    fn test_setting_export_reimports() {
        let fields = vec![FormField::new("qty", FieldType::Number, 3).at(40.0, 60.0)];
        let json = serde_json::to_string(&export_setting_config(&fields)).unwrap();
        let config = import_config(&json).unwrap();
        assert_eq!(config.form_fields, fields);
    }

    #[test]
    fn test_touch_updates_only_updated_at() {
        let mut config = export_config(&[]);
        config.metadata.created_at = "2020-01-01T00:00:00Z".to_string();
        config.metadata.updated_at = "2020-01-01T00:00:00Z".to_string();
        config.touch();
        assert_eq!(config.metadata.created_at, "2020-01-01T00:00:00Z");
        assert_ne!(config.metadata.updated_at, "2020-01-01T00:00:00Z");
    }
}
