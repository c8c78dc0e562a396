//! AcroForm text-field pipeline.
//!
//! Four operations turn a field layout into PDF output and back:
//!
//! - [`materialize_fields`]: replace a PDF's form fields with one text
//!   field widget per [`FormField`](crate::field::FormField)
//! - [`fill_fields`]: set field values by name
//! - [`flatten_fields`]: draw field values into page content and drop
//!   every widget
//! - [`extract_fields`]: rebuild field records from an existing form
//!
//! All of them take and return byte buffers. [`PdfForm`] is the shared
//! wrapper around the loaded document.
//!
//! See ISO 32000-1:2008, Section 12.7 - Interactive Forms.
//!
//! ## Example
//!
//! ```ignore
//! use form_oxide::pdf::{materialize_fields, fill_fields, flatten_fields};
//! use form_oxide::config::FlattenOptions;
//!
//! let pdf = std::fs::read("blank.pdf")?;
//! let with_fields = materialize_fields(&pdf, &fields)?;
//! let (filled, report) = fill_fields(&with_fields, &values)?;
//! let flat = flatten_fields(&filled, &fields, &FlattenOptions::default())?;
//! ```

mod extract;
mod fill;
mod flatten;
mod materialize;

pub use extract::extract_fields;
pub use fill::{fill_fields, FillReport};
pub use flatten::{fill_and_flatten, flatten_fields, resolve_flatten_page};
pub use materialize::materialize_fields;

use crate::error::{Error, Result};
use crate::geometry::Rect;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::HashSet;

/// Page height used when no `/MediaBox` can be found (US Letter).
pub const DEFAULT_PAGE_HEIGHT: f32 = 792.0;

/// Resource name under which the flatten font is registered.
pub(crate) const FLATTEN_FONT_NAME: &str = "FOxHelv";

/// Maximum `/Parent` hops and `/Kids` depth followed.
const MAX_TREE_DEPTH: usize = 32;

/// Text field flag: required (bit 2).
pub(crate) const FLAG_REQUIRED: i64 = 1 << 1;

/// One terminal field of the AcroForm tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEntry {
    /// Field dictionary
    pub id: ObjectId,
    /// Fully qualified name (`parent.child`)
    pub name: String,
    /// `/FT`, inherited from ancestors
    pub field_type: Option<String>,
    /// `/V` as text, inherited from ancestors
    pub value: Option<String>,
    /// `/Ff`, inherited from ancestors
    pub flags: i64,
    /// `/DA`, inherited from ancestors
    pub default_appearance: Option<String>,
    /// Widget annotations (the field itself when field and widget are merged)
    pub widgets: Vec<ObjectId>,
}

impl FieldEntry {
    /// True for `/FT /Tx`.
    pub fn is_text(&self) -> bool {
        self.field_type.as_deref() == Some("Tx")
    }
}

/// A loaded PDF with form-field helpers.
pub struct PdfForm {
    doc: Document,
    pages: Vec<ObjectId>,
    font_id: Option<ObjectId>,
}

impl std::fmt::Debug for PdfForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfForm")
            .field("pages", &self.pages.len())
            .field("objects", &self.doc.objects.len())
            .finish()
    }
}

impl PdfForm {
    /// Parse a PDF from memory.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes).map_err(|e| {
            log::error!("Failed to load PDF ({} bytes): {}", bytes.len(), e);
            Error::from(e)
        })?;
        Self::from_document(doc)
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: Document) -> Result<Self> {
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if pages.is_empty() {
            return Err(Error::InvalidPdf("document has no pages".to_string()));
        }
        log::debug!("Loaded PDF with {} pages", pages.len());
        Ok(Self {
            doc,
            pages,
            font_id: None,
        })
    }

    /// Underlying document.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Serialize the document.
    pub fn save(mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.doc.save_to(&mut out)?;
        Ok(out)
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page object ids in page order.
    pub fn page_ids(&self) -> &[ObjectId] {
        &self.pages
    }

    /// Clamp a 1-based page number to a valid 0-based index.
    pub fn page_index(&self, page_number: u32) -> usize {
        (page_number.max(1) as usize - 1).min(self.pages.len() - 1)
    }

    /// Height of a page from its (possibly inherited) `/MediaBox`.
    pub fn page_height(&self, page_id: ObjectId) -> f32 {
        self.inherited(page_id, b"MediaBox")
            .and_then(|obj| self.rect_of(obj))
            .map(|r| r.height)
            .filter(|h| *h > 0.0)
            .unwrap_or(DEFAULT_PAGE_HEIGHT)
    }

    /// 0-based index of the page a widget sits on, from `/P` or by
    /// scanning page annotations.
    pub fn widget_page(&self, widget_id: ObjectId) -> Option<usize> {
        let from_p = self
            .doc
            .get_dictionary(widget_id)
            .ok()
            .and_then(|d| d.get(b"P").ok())
            .and_then(|p| p.as_reference().ok())
            .and_then(|p| self.pages.iter().position(|id| *id == p));
        from_p.or_else(|| {
            self.pages.iter().position(|page_id| {
                self.page_annots(*page_id)
                    .iter()
                    .any(|a| matches!(a, Object::Reference(id) if *id == widget_id))
            })
        })
    }

    /// Widget rectangle in PDF space.
    pub fn widget_rect(&self, widget_id: ObjectId) -> Option<Rect> {
        let dict = self.doc.get_dictionary(widget_id).ok()?;
        let rect = self.rect_of(dict.get(b"Rect").ok()?)?;
        rect.is_valid().then_some(rect)
    }

    /// All terminal fields of the AcroForm.
    pub fn fields(&self) -> Vec<FieldEntry> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        for root in self.root_field_refs() {
            if let Object::Reference(id) = root {
                self.walk_field(id, None, &Inherited::default(), 0, &mut visited, &mut out);
            }
        }
        out
    }

    /// Number of terminal fields.
    pub fn field_count(&self) -> usize {
        self.fields().len()
    }

    /// Current text value of the first field called `name`.
    pub fn field_value(&self, name: &str) -> Option<String> {
        self.fields()
            .into_iter()
            .find(|f| f.name == name)
            .and_then(|f| f.value)
    }

    /// Remove every form field and widget annotation.
    ///
    /// Returns the number of terminal fields removed. The AcroForm keeps
    /// an empty `/Fields` array.
    pub fn remove_all_fields(&mut self) -> usize {
        let mut doomed: HashSet<ObjectId> = HashSet::new();
        let mut visited = HashSet::new();
        let mut entries = Vec::new();
        for root in self.root_field_refs() {
            if let Object::Reference(id) = root {
                self.walk_field(id, None, &Inherited::default(), 0, &mut visited, &mut entries);
            }
        }
        doomed.extend(visited.iter().copied());
        for entry in &entries {
            doomed.extend(entry.widgets.iter().copied());
        }

        for page_id in self.pages.clone() {
            let kept: Vec<Object> = self
                .page_annots(page_id)
                .into_iter()
                .filter(|annot| match annot {
                    Object::Reference(id) => !doomed.contains(id) && !self.is_widget(annot),
                    other => !self.is_widget(other),
                })
                .collect();
            if let Ok(page) = self.doc.get_object_mut(page_id).and_then(Object::as_dict_mut) {
                if kept.is_empty() {
                    page.remove(b"Annots");
                } else {
                    page.set("Annots", kept);
                }
            }
        }

        for id in &doomed {
            self.doc.objects.remove(id);
        }

        if let Some(acroform_id) = self.acroform_ref() {
            if let Ok(acroform) = self.doc.get_object_mut(acroform_id).and_then(Object::as_dict_mut)
            {
                acroform.set("Fields", Vec::<Object>::new());
            }
        } else if let Ok(catalog_id) = self.catalog_id() {
            if let Ok(catalog) = self.doc.get_object_mut(catalog_id).and_then(Object::as_dict_mut) {
                if let Ok(Object::Dictionary(acroform)) = catalog.get_mut(b"AcroForm") {
                    acroform.set("Fields", Vec::<Object>::new());
                }
            }
        }

        log::debug!("Removed {} form fields ({} objects)", entries.len(), doomed.len());
        entries.len()
    }

    // ---- write helpers -------------------------------------------------

    /// Make sure the catalog has an indirect AcroForm with an inline
    /// `/Fields` array, `/DA` and a `/DR` font entry for `Helv`.
    pub(crate) fn ensure_acroform(&mut self) -> Result<ObjectId> {
        let catalog_id = self.catalog_id()?;
        let existing = self.doc.get_dictionary(catalog_id)?.get(b"AcroForm").ok().cloned();
        let acroform_id = match existing {
            Some(Object::Reference(id)) if self.doc.get_dictionary(id).is_ok() => id,
            Some(Object::Dictionary(dict)) => self.doc.add_object(dict),
            _ => self.doc.add_object(Dictionary::new()),
        };
        self.doc
            .get_object_mut(catalog_id)?
            .as_dict_mut()?
            .set("AcroForm", Object::Reference(acroform_id));

        let fields = self.root_field_refs();
        let font_id = self.font_id();
        let dr = {
            let acroform = self.doc.get_dictionary(acroform_id)?;
            let mut dr = acroform
                .get(b"DR")
                .ok()
                .and_then(|o| self.resolve(o).as_dict().ok())
                .cloned()
                .unwrap_or_else(Dictionary::new);
            let mut fonts = dr
                .get(b"Font")
                .ok()
                .and_then(|o| self.resolve(o).as_dict().ok())
                .cloned()
                .unwrap_or_else(Dictionary::new);
            if !fonts.has(b"Helv") {
                fonts.set("Helv", Object::Reference(font_id));
            }
            dr.set("Font", fonts);
            dr
        };

        let acroform = self.doc.get_object_mut(acroform_id)?.as_dict_mut()?;
        acroform.set("Fields", fields);
        acroform.set("DR", dr);
        if !acroform.has(b"DA") {
            acroform.set("DA", Object::string_literal("/Helv 0 Tf 0 g"));
        }
        Ok(acroform_id)
    }

    /// Ask viewers to regenerate widget appearances from `/V` and `/DA`.
    pub(crate) fn set_need_appearances(&mut self) -> Result<()> {
        let acroform_id = self.ensure_acroform()?;
        self.doc
            .get_object_mut(acroform_id)?
            .as_dict_mut()?
            .set("NeedAppearances", Object::Boolean(true));
        Ok(())
    }

    /// Register a new terminal field in the AcroForm `/Fields` array.
    pub(crate) fn push_acroform_field(&mut self, field_id: ObjectId) -> Result<()> {
        let acroform_id = self.ensure_acroform()?;
        let acroform = self.doc.get_object_mut(acroform_id)?.as_dict_mut()?;
        if let Ok(Object::Array(fields)) = acroform.get_mut(b"Fields") {
            fields.push(Object::Reference(field_id));
        }
        Ok(())
    }

    /// Append an annotation reference to a page's `/Annots`.
    pub(crate) fn push_page_annot(&mut self, page_id: ObjectId, annot_id: ObjectId) -> Result<()> {
        let mut annots = self.page_annots(page_id);
        annots.push(Object::Reference(annot_id));
        self.doc
            .get_object_mut(page_id)?
            .as_dict_mut()?
            .set("Annots", annots);
        Ok(())
    }

    /// Mutable access to a dictionary object.
    pub(crate) fn dict_mut(&mut self, id: ObjectId) -> Result<&mut Dictionary> {
        Ok(self.doc.get_object_mut(id)?.as_dict_mut()?)
    }

    /// Add an object to the document.
    pub(crate) fn add_object(&mut self, obj: impl Into<Object>) -> ObjectId {
        self.doc.add_object(obj)
    }

    /// Append drawing operations to a page.
    ///
    /// Existing content is wrapped in `q`/`Q` so its graphics state does
    /// not leak into the appended operations.
    pub(crate) fn append_page_content(
        &mut self,
        page_id: ObjectId,
        operations: Vec<Operation>,
    ) -> Result<()> {
        let existing: Vec<Object> = match self.doc.get_dictionary(page_id)?.get(b"Contents") {
            Ok(Object::Reference(id)) => match self.doc.get_object(*id) {
                Ok(Object::Array(arr)) => arr.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Array(arr)) => arr.clone(),
            _ => Vec::new(),
        };

        let prefix = Content {
            operations: vec![Operation::new("q", vec![])],
        }
        .encode()?;
        let mut body_ops = vec![Operation::new("Q", vec![])];
        body_ops.extend(operations);
        let body = Content {
            operations: body_ops,
        }
        .encode()?;

        let prefix_id = self.doc.add_object(Stream::new(Dictionary::new(), prefix));
        let body_id = self.doc.add_object(Stream::new(Dictionary::new(), body));

        let mut contents = Vec::with_capacity(existing.len() + 2);
        contents.push(Object::Reference(prefix_id));
        contents.extend(existing);
        contents.push(Object::Reference(body_id));
        self.dict_mut(page_id)?.set("Contents", contents);
        Ok(())
    }

    /// Register the flatten font in a page's resources.
    ///
    /// Resources are copied inline onto the page (resolving references
    /// and inheritance) so sibling pages sharing a resource dictionary are
    /// not affected.
    pub(crate) fn add_page_font(&mut self, page_id: ObjectId) -> Result<()> {
        let font_id = self.font_id();
        let mut resources = self
            .inherited(page_id, b"Resources")
            .and_then(|o| o.as_dict().ok())
            .cloned()
            .unwrap_or_else(Dictionary::new);
        let mut fonts = resources
            .get(b"Font")
            .ok()
            .and_then(|o| self.resolve(o).as_dict().ok())
            .cloned()
            .unwrap_or_else(Dictionary::new);
        fonts.set(FLATTEN_FONT_NAME, Object::Reference(font_id));
        resources.set("Font", fonts);
        self.dict_mut(page_id)?.set("Resources", resources);
        Ok(())
    }

    /// Standard Helvetica, WinAnsi encoded; created on first use.
    pub(crate) fn font_id(&mut self) -> ObjectId {
        if let Some(id) = self.font_id {
            return id;
        }
        let id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        self.font_id = Some(id);
        id
    }

    // ---- read helpers --------------------------------------------------

    fn catalog_id(&self) -> Result<ObjectId> {
        self.doc
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .map_err(|_| Error::InvalidPdf("missing document catalog".to_string()))
    }

    fn acroform(&self) -> Option<&Dictionary> {
        let catalog = self.doc.get_dictionary(self.catalog_id().ok()?).ok()?;
        self.resolve(catalog.get(b"AcroForm").ok()?).as_dict().ok()
    }

    fn acroform_ref(&self) -> Option<ObjectId> {
        let catalog = self.doc.get_dictionary(self.catalog_id().ok()?).ok()?;
        catalog.get(b"AcroForm").ok()?.as_reference().ok()
    }

    /// Top-level `/Fields` entries, resolved to an owned array.
    fn root_field_refs(&self) -> Vec<Object> {
        self.acroform()
            .and_then(|af| af.get(b"Fields").ok())
            .and_then(|f| self.resolve(f).as_array().ok())
            .cloned()
            .unwrap_or_default()
    }

    /// A page's `/Annots`, resolved to an owned array.
    fn page_annots(&self, page_id: ObjectId) -> Vec<Object> {
        self.doc
            .get_dictionary(page_id)
            .ok()
            .and_then(|d| d.get(b"Annots").ok())
            .and_then(|a| self.resolve(a).as_array().ok())
            .cloned()
            .unwrap_or_default()
    }

    fn is_widget(&self, annot: &Object) -> bool {
        self.resolve(annot)
            .as_dict()
            .ok()
            .and_then(|d| d.get(b"Subtype").ok())
            .is_some_and(|s| matches!(s, Object::Name(n) if n.as_slice() == b"Widget"))
    }

    /// Follow indirect references.
    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        let mut current = obj;
        for _ in 0..MAX_TREE_DEPTH {
            match current {
                Object::Reference(id) => match self.doc.get_object(*id) {
                    Ok(next) => current = next,
                    Err(_) => return current,
                },
                _ => return current,
            }
        }
        current
    }

    /// Look up an inheritable page attribute through `/Parent`.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut current = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(value) = current.get(key) {
                return Some(self.resolve(value));
            }
            let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
            current = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn rect_of(&self, obj: &Object) -> Option<Rect> {
        let arr = self.resolve(obj).as_array().ok()?;
        if arr.len() != 4 {
            return None;
        }
        let n: Vec<f32> = arr
            .iter()
            .filter_map(|o| number(self.resolve(o)))
            .collect();
        (n.len() == 4).then(|| Rect::from_points(n[0], n[1], n[2], n[3]))
    }

    fn walk_field(
        &self,
        id: ObjectId,
        parent_name: Option<&str>,
        inherited: &Inherited,
        depth: usize,
        visited: &mut HashSet<ObjectId>,
        out: &mut Vec<FieldEntry>,
    ) {
        if depth > MAX_TREE_DEPTH || !visited.insert(id) {
            return;
        }
        let Ok(dict) = self.doc.get_dictionary(id) else {
            log::warn!("Form field {} {} R is not a dictionary", id.0, id.1);
            return;
        };

        let partial = dict.get(b"T").ok().and_then(|t| text_of(self.resolve(t)));
        let name = match (parent_name, partial) {
            (Some(parent), Some(p)) => format!("{}.{}", parent, p),
            (Some(parent), None) => parent.to_string(),
            (None, Some(p)) => p,
            (None, None) => String::new(),
        };
        let here = inherited.merge(self, dict);

        let kids: Vec<ObjectId> = dict
            .get(b"Kids")
            .ok()
            .and_then(|k| self.resolve(k).as_array().ok())
            .map(|arr| arr.iter().filter_map(|o| o.as_reference().ok()).collect())
            .unwrap_or_default();

        let (child_fields, widgets): (Vec<ObjectId>, Vec<ObjectId>) =
            kids.into_iter().partition(|kid| {
                self.doc
                    .get_dictionary(*kid)
                    .map(|d| d.has(b"T"))
                    .unwrap_or(false)
            });

        if !child_fields.is_empty() {
            for kid in child_fields {
                self.walk_field(kid, Some(&name), &here, depth + 1, visited, out);
            }
            return;
        }

        let mut widgets = widgets;
        visited.extend(widgets.iter().copied());
        if widgets.is_empty() && (dict.has(b"Rect") || self.is_widget(&Object::Reference(id))) {
            widgets.push(id);
        }

        out.push(FieldEntry {
            id,
            name,
            field_type: here.field_type,
            value: here.value,
            flags: here.flags,
            default_appearance: here.default_appearance,
            widgets,
        });
    }
}

/// Inheritable field attributes (ISO 32000-1, Table 220).
#[derive(Debug, Clone, Default)]
struct Inherited {
    field_type: Option<String>,
    value: Option<String>,
    flags: i64,
    default_appearance: Option<String>,
}

impl Inherited {
    fn merge(&self, form: &PdfForm, dict: &Dictionary) -> Inherited {
        let get = |key: &'static [u8]| dict.get(key).ok().map(|o| form.resolve(o));
        Inherited {
            field_type: get(b"FT".as_slice())
                .and_then(|o| match o {
                    Object::Name(n) => Some(String::from_utf8_lossy(n).into_owned()),
                    _ => None,
                })
                .or_else(|| self.field_type.clone()),
            value: get(b"V".as_slice()).and_then(text_of).or_else(|| self.value.clone()),
            flags: get(b"Ff".as_slice()).and_then(|o| o.as_i64().ok()).unwrap_or(self.flags),
            default_appearance: get(b"DA".as_slice())
                .and_then(text_of)
                .or_else(|| self.default_appearance.clone()),
        }
    }
}

/// Numeric value of an integer or real object.
pub(crate) fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// Text of a string or name object.
pub(crate) fn text_of(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        Object::Name(n) => Some(String::from_utf8_lossy(n).into_owned()),
        _ => None,
    }
}

/// Encode a PDF text string: ASCII as a literal, anything else as
/// UTF-16BE with a byte-order mark.
pub(crate) fn encode_text_string(s: &str) -> Object {
    if s.is_ascii() {
        return Object::string_literal(s);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in s.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Decode a PDF text string (UTF-16BE with BOM, otherwise Latin-1).
pub(crate) fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| b as char).collect()
}

/// Bytes for a `Tj` operand in WinAnsi encoding; unmappable characters
/// become `?` and line breaks become spaces.
pub(crate) fn encode_win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match c {
            '\r' | '\n' | '\t' => b' ',
            c if (c as u32) < 0x80 => c as u8,
            c if (0xA0..=0xFF).contains(&(c as u32)) => c as u32 as u8,
            '€' => 0x80,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

/// Compact decimal formatting for content and `/DA` strings.
pub(crate) fn fmt_num(v: f32) -> String {
    let s = format!("{:.3}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}
