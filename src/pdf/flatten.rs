//! Flatten text fields into page content.

use super::{encode_win_ansi, fmt_num, PdfForm, FLATTEN_FONT_NAME};
use crate::config::FlattenOptions;
use crate::error::Result;
use crate::field::FormField;
use lazy_static::lazy_static;
use lopdf::content::Operation;
use lopdf::{Object, ObjectId, StringFormat};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};

lazy_static! {
    /// `page3`, `Page_3`, `page-3`, `page 3` anywhere in a field name
    static ref RE_PAGE_WORD: Regex = Regex::new(r"(?i)page[_\-\s]?(\d+)").unwrap();
    /// Trailing `_3`
    static ref RE_TRAILING_NUMBER: Regex = Regex::new(r"_(\d+)$").unwrap();
}

/// Pick the 0-based page a field's text is drawn on.
///
/// In order: the page recorded for `name` in `page_map` (1-based), a page
/// number embedded in the name, the first page. The result is clamped to
/// the document.
pub fn resolve_flatten_page(name: &str, page_map: &HashMap<&str, u32>, page_count: usize) -> usize {
    let last = page_count.saturating_sub(1);
    if let Some(page) = page_map.get(name) {
        return ((*page).max(1) as usize - 1).min(last);
    }
    let embedded = RE_PAGE_WORD
        .captures(name)
        .or_else(|| RE_TRAILING_NUMBER.captures(name))
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<usize>().ok());
    match embedded {
        Some(n) => n.max(1).saturating_sub(1).min(last),
        None => 0,
    }
}

/// Draw every non-empty text field value into page content and remove
/// all form fields.
///
/// `fields` supplies the page of each field by name and its text color.
/// Text is drawn in Helvetica at `options.font_size` at
/// `(rect.x + x_offset, rect.y + rect.height - baseline_offset)` of the
/// widget rectangle. A field whose widget has no usable rectangle is
/// logged and skipped. The result has no form fields left.
pub fn flatten_fields(pdf: &[u8], fields: &[FormField], options: &FlattenOptions) -> Result<Vec<u8>> {
    let mut form = PdfForm::load(pdf)?;
    form.flatten(fields, options)?;
    form.save()
}

/// Fill by name, then flatten: the final-export path.
pub fn fill_and_flatten(
    pdf: &[u8],
    fields: &[FormField],
    values: &HashMap<String, String>,
    options: &FlattenOptions,
) -> Result<Vec<u8>> {
    let mut form = PdfForm::load(pdf)?;
    form.fill(values)?;
    form.flatten(fields, options)?;
    form.save()
}

impl PdfForm {
    /// In-place variant of [`flatten_fields`]. Returns the number of text
    /// runs drawn.
    pub fn flatten(&mut self, fields: &[FormField], options: &FlattenOptions) -> Result<usize> {
        let page_map: HashMap<&str, u32> =
            fields.iter().map(|f| (f.name.as_str(), f.page_number)).collect();
        let colors: HashMap<&str, (f32, f32, f32)> =
            fields.iter().map(|f| (f.name.as_str(), f.rgb())).collect();

        let mut per_page: BTreeMap<usize, Vec<Operation>> = BTreeMap::new();
        let mut drawn = 0;

        for entry in self.fields() {
            let Some(text) = entry.value.as_deref().filter(|v| !v.is_empty()) else {
                continue;
            };
            if !entry.is_text() {
                continue;
            }
            let Some(rect) = entry.widgets.iter().find_map(|w| self.widget_rect(*w)) else {
                log::warn!("Field '{}' has no usable widget rectangle; not drawn", entry.name);
                continue;
            };

            let page = resolve_flatten_page(&entry.name, &page_map, self.page_count());
            let (r, g, b) = colors.get(entry.name.as_str()).copied().unwrap_or((0.0, 0.0, 0.0));
            let x = rect.x + options.x_offset;
            let y = rect.y + rect.height - options.baseline_offset;

            per_page.entry(page).or_default().extend(text_ops(text, x, y, options.font_size, (r, g, b)));
            drawn += 1;
            log::debug!("Flattened '{}' on page {} at ({}, {})", entry.name, page + 1, x, y);
        }

        for (page, ops) in per_page {
            let page_id: ObjectId = self.page_ids()[page];
            if let Err(e) = self
                .add_page_font(page_id)
                .and_then(|_| self.append_page_content(page_id, ops))
            {
                log::warn!("Could not draw flattened text on page {}: {}", page + 1, e);
            }
        }

        let removed = self.remove_all_fields();
        log::info!("Flattened {} fields, removed {} form fields", drawn, removed);
        Ok(drawn)
    }
}

fn text_ops(text: &str, x: f32, y: f32, size: f32, (r, g, b): (f32, f32, f32)) -> Vec<Operation> {
    let num = |v: f32| Object::Real(fmt_num(v).parse().unwrap_or(v));
    vec![
        Operation::new("q", vec![]),
        Operation::new("rg", vec![num(r), num(g), num(b)]),
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![Object::Name(FLATTEN_FONT_NAME.as_bytes().to_vec()), num(size)],
        ),
        Operation::new("Td", vec![num(x), num(y)]),
        Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
        Operation::new("Q", vec![]),
    ]
}
