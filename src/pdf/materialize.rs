//! Turn a field layout into AcroForm text fields.

use super::{encode_text_string, fmt_num, PdfForm, FLAG_REQUIRED};
use crate::error::{Error, Result};
use crate::field::FormField;
use lopdf::{dictionary, Object, ObjectId};

/// Replace the form fields of `pdf` with one text field per entry of
/// `fields`.
///
/// Existing fields and widgets are removed first. Each new widget has a
/// 1pt black border, a white background and `placeholder` as its value;
/// its rectangle is the field's UI rectangle flipped into PDF space
/// (`pdfY = pageHeight - y - height`). Page numbers beyond the document
/// are clamped to the last page. A field with an unusable rectangle is
/// logged and skipped.
pub fn materialize_fields(pdf: &[u8], fields: &[FormField]) -> Result<Vec<u8>> {
    let mut form = PdfForm::load(pdf)?;

    let removed = form.remove_all_fields();
    if removed > 0 {
        log::info!("Removed {} existing form fields", removed);
    }

    let mut added = 0;
    for field in fields {
        match form.add_text_field(field) {
            Ok(_) => added += 1,
            Err(e) => log::warn!("Skipping field '{}': {}", field.name, e),
        }
    }
    form.set_need_appearances()?;

    log::info!("Materialized {} of {} fields", added, fields.len());
    form.save()
}

impl PdfForm {
    /// Add one merged field/widget dictionary for `field`.
    pub fn add_text_field(&mut self, field: &FormField) -> Result<ObjectId> {
        let ui_rect = field.rect();
        if !ui_rect.is_valid() {
            return Err(Error::InvalidConfig(format!(
                "invalid rectangle {:?} for field '{}'",
                ui_rect, field.name
            )));
        }

        let page_index = self.page_index(field.page_number);
        if page_index + 1 != field.page_number as usize {
            log::warn!(
                "Field '{}' targets page {}; placing it on page {}",
                field.name,
                field.page_number,
                page_index + 1
            );
        }
        let page_id = self.page_ids()[page_index];
        let pdf_rect = ui_rect.to_pdf(self.page_height(page_id));

        let (r, g, b) = field.rgb();
        let da = format!(
            "/Helv {} Tf {} {} {} rg",
            fmt_num(field.font_size),
            fmt_num(r),
            fmt_num(g),
            fmt_num(b)
        );
        let flags = if field.required { FLAG_REQUIRED } else { 0 };

        let widget = dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Tx",
            "T" => encode_text_string(&field.name),
            "TU" => encode_text_string(&field.label),
            "V" => encode_text_string(&field.placeholder),
            "Rect" => pdf_rect.to_corners().iter().map(|v| Object::Real(*v)).collect::<Vec<_>>(),
            "F" => Object::Integer(4),
            "Ff" => Object::Integer(flags),
            "DA" => Object::string_literal(da),
            "P" => Object::Reference(page_id),
            "BS" => dictionary! {
                "W" => Object::Integer(1),
                "S" => "S",
            },
            "MK" => dictionary! {
                "BG" => vec![Object::Real(1.0), Object::Real(1.0), Object::Real(1.0)],
                "BC" => vec![Object::Real(0.0), Object::Real(0.0), Object::Real(0.0)],
            },
        };

        let id = self.add_object(widget);
        self.push_page_annot(page_id, id)?;
        self.push_acroform_field(id)?;

        log::debug!(
            "Field '{}' -> page {} rect [{}, {}, {}, {}]",
            field.name,
            page_index + 1,
            pdf_rect.x,
            pdf_rect.y,
            pdf_rect.right(),
            pdf_rect.bottom()
        );
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;
    use crate::pdf::tests_support::blank_pdf;

    #[test]
    fn test_materialize_adds_one_field_per_entry() {
        let fields = vec![
            FormField::new("name", FieldType::Text, 1).at(10.0, 50.0),
            FormField::new("email", FieldType::Email, 1).at(10.0, 100.0),
        ];
        let out = materialize_fields(&blank_pdf(1), &fields).unwrap();
        let form = PdfForm::load(&out).unwrap();
        assert_eq!(form.field_count(), 2);
    }

    #[test]
    fn test_widget_rect_uses_y_flip() {
        let fields = vec![FormField::new("name", FieldType::Text, 1).at(10.0, 50.0)];
        let out = materialize_fields(&blank_pdf(1), &fields).unwrap();
        let form = PdfForm::load(&out).unwrap();
        let entry = &form.fields()[0];
        let rect = form.widget_rect(entry.widgets[0]).unwrap();
        assert_eq!(rect.x, 10.0);
        assert_eq!(rect.y, 712.0);
        assert_eq!(rect.width, 150.0);
        assert_eq!(rect.height, 30.0);
    }

    #[test]
    fn test_placeholder_seeds_value() {
        let fields =
            vec![FormField::new("city", FieldType::Text, 1).with_placeholder("Springfield")];
        let out = materialize_fields(&blank_pdf(1), &fields).unwrap();
        let form = PdfForm::load(&out).unwrap();
        assert_eq!(form.field_value("city").as_deref(), Some("Springfield"));
    }

    #[test]
    fn test_existing_fields_are_replaced() {
        let first = vec![FormField::new("old", FieldType::Text, 1)];
        let once = materialize_fields(&blank_pdf(1), &first).unwrap();
        let second = vec![FormField::new("new", FieldType::Text, 1).at(0.0, 100.0)];
        let twice = materialize_fields(&once, &second).unwrap();
        let form = PdfForm::load(&twice).unwrap();
        let names: Vec<String> = form.fields().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["new".to_string()]);
    }

    #[test]
    fn test_page_number_is_clamped() {
        let fields = vec![FormField::new("late", FieldType::Text, 9)];
        let out = materialize_fields(&blank_pdf(2), &fields).unwrap();
        let form = PdfForm::load(&out).unwrap();
        let entry = &form.fields()[0];
        assert_eq!(form.widget_page(entry.widgets[0]), Some(1));
    }

    #[test]
    fn test_bad_rectangle_is_skipped() {
        let fields = vec![
            FormField::new("zero", FieldType::Text, 1).with_size(0.0, 30.0),
            FormField::new("ok", FieldType::Text, 1),
        ];
        let out = materialize_fields(&blank_pdf(1), &fields).unwrap();
        let form = PdfForm::load(&out).unwrap();
        assert_eq!(form.field_count(), 1);
    }

    #[test]
    fn test_required_flag_written() {
        let fields = vec![FormField::new("must", FieldType::Text, 1).required()];
        let out = materialize_fields(&blank_pdf(1), &fields).unwrap();
        let form = PdfForm::load(&out).unwrap();
        assert_eq!(form.fields()[0].flags & FLAG_REQUIRED, FLAG_REQUIRED);
    }
}
