//! Fill text fields by name.

use super::{encode_text_string, PdfForm};
use crate::error::Result;
use std::collections::HashMap;

/// What [`fill_fields`] did with each requested name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    /// Names whose value was set, sorted
    pub filled: Vec<String>,
    /// Names with no matching text field, sorted
    pub unmatched: Vec<String>,
}

/// Set the value of every text field whose name appears in `values`.
///
/// Names without a matching text field are logged and reported, never an
/// error. Other fields keep their values. Stale appearance streams of
/// filled widgets are dropped and `/NeedAppearances` is set so viewers
/// render the new text.
pub fn fill_fields(pdf: &[u8], values: &HashMap<String, String>) -> Result<(Vec<u8>, FillReport)> {
    let mut form = PdfForm::load(pdf)?;
    let report = form.fill(values)?;
    Ok((form.save()?, report))
}

impl PdfForm {
    /// In-place variant of [`fill_fields`].
    pub fn fill(&mut self, values: &HashMap<String, String>) -> Result<FillReport> {
        let entries = self.fields();
        let mut report = FillReport::default();

        let mut names: Vec<&String> = values.keys().collect();
        names.sort();

        for name in names {
            let value = &values[name];
            let targets: Vec<_> = entries
                .iter()
                .filter(|e| &e.name == name && e.is_text())
                .collect();

            if targets.is_empty() {
                if entries.iter().any(|e| &e.name == name) {
                    log::warn!("Field '{}' is not a text field; skipping", name);
                } else {
                    log::warn!("No form field named '{}'; skipping", name);
                }
                report.unmatched.push(name.clone());
                continue;
            }

            for entry in targets {
                let set = self.dict_mut(entry.id).map(|dict| {
                    dict.set("V", encode_text_string(value));
                });
                if let Err(e) = set {
                    log::warn!("Could not set field '{}': {}", name, e);
                    continue;
                }
                for widget in &entry.widgets {
                    if let Ok(dict) = self.dict_mut(*widget) {
                        dict.remove(b"AP");
                    }
                }
            }
            report.filled.push(name.clone());
        }

        if !report.filled.is_empty() {
            self.set_need_appearances()?;
        }
        log::info!(
            "Filled {} fields ({} unmatched)",
            report.filled.len(),
            report.unmatched.len()
        );
        Ok(report)
    }
}
