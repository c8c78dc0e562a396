//! Sample data for previewing a layout.

use crate::field::{FieldType, FormField};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Sample value for one field, dating `date` fields to `today`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use form_oxide::field::{FieldType, FormField};
/// use form_oxide::sample::sample_value;
///
/// let today = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
/// let field = FormField::new("start", FieldType::Date, 1);
/// assert_eq!(sample_value(&field, today), "2024-03-09");
/// ```
pub fn sample_value(field: &FormField, today: NaiveDate) -> String {
    match field.field_type {
        FieldType::Text => format!("Sample {}", field.label),
        FieldType::Date => today.format("%Y-%m-%d").to_string(),
        FieldType::Number => "12345".to_string(),
        FieldType::Email => {
            let local: String = field
                .name
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
                .collect();
            let local = if local.is_empty() { "user".to_string() } else { local.to_lowercase() };
            format!("{}@example.com", local)
        },
    }
}

/// Name → sample value for every field, dated today (local time).
pub fn sample_data(fields: &[FormField]) -> HashMap<String, String> {
    sample_data_on(fields, chrono::Local::now().date_naive())
}

/// Name → sample value for every field, dated `today`.
pub fn sample_data_on(fields: &[FormField], today: NaiveDate) -> HashMap<String, String> {
    fields
        .iter()
        .map(|f| (f.name.clone(), sample_value(f, today)))
        .collect()
}
