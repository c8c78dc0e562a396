//! Rebuild field records from an existing AcroForm.

use super::{FieldEntry, PdfForm, FLAG_REQUIRED};
use crate::error::Result;
use crate::field::{FieldType, FormField, DEFAULT_FONT_SIZE, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::geometry::Rect;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Font size operand of the `Tf` in a `/DA` string
    static ref RE_DA_FONT_SIZE: Regex = Regex::new(r"/\S+\s+([\d.]+)\s+Tf").unwrap();
}

/// Read the text fields of `pdf` back as [`FormField`]s.
///
/// Name and label both come from the fully qualified field name, the
/// placeholder from `/V`, the font size from `/DA` (12 when absent or
/// auto-sized). The page is the widget's `/P` or the page listing it in
/// `/Annots`. When the widget has a usable `/Rect` the UI rectangle is
/// recovered by flipping it back; otherwise the field lands at the
/// origin with the default size. Non-text fields are skipped.
pub fn extract_fields(pdf: &[u8]) -> Result<Vec<FormField>> {
    let form = PdfForm::load(pdf)?;
    let entries = form.fields();
    let mut out = Vec::with_capacity(entries.len());

    for entry in &entries {
        if !entry.is_text() {
            log::debug!("Skipping non-text field '{}'", entry.name);
            continue;
        }
        out.push(form.to_form_field(entry));
    }

    log::info!("Extracted {} text fields of {}", out.len(), entries.len());
    Ok(out)
}

impl PdfForm {
    fn to_form_field(&self, entry: &FieldEntry) -> FormField {
        let widget = entry.widgets.first().copied();
        let page_index = widget.and_then(|w| self.widget_page(w)).unwrap_or(0);
        let page_id = self.page_ids()[page_index.min(self.page_count() - 1)];

        let rect = widget
            .and_then(|w| self.widget_rect(w))
            .map(|pdf_rect| Rect::from_pdf(&pdf_rect, self.page_height(page_id)))
            .unwrap_or_else(|| {
                log::debug!("Field '{}' has no usable /Rect; using default placement", entry.name);
                Rect::new(0.0, 0.0, DEFAULT_WIDTH, DEFAULT_HEIGHT)
            });

        let mut field = FormField::new(entry.name.clone(), FieldType::Text, page_index as u32 + 1)
            .at(rect.x, rect.y)
            .with_size(rect.width, rect.height)
            .with_placeholder(entry.value.clone().unwrap_or_default());
        field.font_size = entry
            .default_appearance
            .as_deref()
            .and_then(da_font_size)
            .unwrap_or(DEFAULT_FONT_SIZE);
        field.required = entry.flags & FLAG_REQUIRED != 0;
        field
    }
}

/// Font size from a default appearance string; `0` (auto) counts as absent.
fn da_font_size(da: &str) -> Option<f32> {
    RE_DA_FONT_SIZE
        .captures(da)
        .and_then(|c| c[1].parse::<f32>().ok())
        .filter(|size| *size > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::materialize_fields;
    use crate::pdf::tests_support::blank_pdf;

    #[test]
    fn test_da_font_size() {
        assert_eq!(da_font_size("/Helv 14 Tf 0 g"), Some(14.0));
        assert_eq!(da_font_size("/Helv 9.5 Tf 0 0 1 rg"), Some(9.5));
        assert_eq!(da_font_size("/Helv 0 Tf 0 g"), None);
        assert_eq!(da_font_size("0 g"), None);
    }

    #[test]
    fn test_extract_recovers_layout() {
        let fields = vec![
            FormField::new("first", FieldType::Email, 1)
                .at(40.0, 60.0)
                .with_size(200.0, 24.0)
                .with_placeholder("a@b.c")
                .required(),
            FormField::new("second", FieldType::Text, 2).at(10.0, 10.0),
        ];
        let pdf = materialize_fields(&blank_pdf(2), &fields).unwrap();
        let extracted = extract_fields(&pdf).unwrap();
        assert_eq!(extracted.len(), 2);

        let first = extracted.iter().find(|f| f.name == "first").unwrap();
        assert_eq!(first.label, "first");
        assert_eq!(first.field_type, FieldType::Text);
        assert_eq!((first.x, first.y), (40.0, 60.0));
        assert_eq!((first.width, first.height), (200.0, 24.0));
        assert_eq!(first.placeholder, "a@b.c");
        assert_eq!(first.color, "#000000");
        assert!(first.required);
        assert_eq!(first.page_number, 1);

        let second = extracted.iter().find(|f| f.name == "second").unwrap();
        assert_eq!(second.page_number, 2);
        assert!(!second.required);
    }

    #[test]
    fn test_extract_from_formless_pdf() {
        assert!(extract_fields(&blank_pdf(1)).unwrap().is_empty());
    }
}
