//! Owned field collection with change notification.
//!
//! [`FieldStore`] is the single owner of a document's fields. Views read
//! through [`FieldStore::fields`] and mutate through the store's methods;
//! every successful mutation invokes the registered listeners with the new
//! field list.
//!
//! # Example
//!
//! ```
//! use form_oxide::config::BuilderConfig;
//! use form_oxide::field::FieldType;
//! use form_oxide::store::FieldStore;
//!
//! let mut store = FieldStore::new(BuilderConfig::default());
//! let first = store.add_field_at(FieldType::Text, 23.0, 41.0, 1).unwrap().clone();
//! assert_eq!((first.x, first.y), (20.0, 40.0));
//!
//! // Same spot again: the new field is moved to a free slot.
//! let second = store.add_field_at(FieldType::Text, 23.0, 41.0, 1).unwrap().clone();
//! assert_ne!((second.x, second.y), (first.x, first.y));
//! ```

use crate::config::{BuilderConfig, OverlapPolicy};
use crate::error::{Error, Result};
use crate::field::{new_field_id, FieldPatch, FieldType, FormField};
use crate::geometry::{snap_to_grid, Point};
use crate::placement::{check_overlap, find_free_position, resolve_position, Placement};
use std::collections::HashMap;
use std::fmt;

/// Smallest width a resize may produce.
pub const MIN_FIELD_WIDTH: f32 = 20.0;
/// Smallest height a resize may produce.
pub const MIN_FIELD_HEIGHT: f32 = 10.0;

/// Handle returned by [`FieldStore::subscribe`].
pub type SubscriptionId = usize;

type Listener = Box<dyn FnMut(&[FormField])>;

/// Single owner of a document's placed fields.
pub struct FieldStore {
    config: BuilderConfig,
    fields: Vec<FormField>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
    next_sequence: usize,
}

impl fmt::Debug for FieldStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldStore")
            .field("config", &self.config)
            .field("fields", &self.fields)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for FieldStore {
    fn default() -> Self {
        Self::new(BuilderConfig::default())
    }
}

impl FieldStore {
    /// Create an empty store.
    pub fn new(config: BuilderConfig) -> Self {
        Self {
            config,
            fields: Vec::new(),
            listeners: Vec::new(),
            next_subscription: 0,
            next_sequence: 1,
        }
    }

    /// Create a store holding `fields` as-is.
    pub fn with_fields(config: BuilderConfig, fields: Vec<FormField>) -> Self {
        let mut store = Self::new(config);
        store.next_sequence = fields.len() + 1;
        store.fields = fields;
        store
    }

    /// Placement configuration.
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Replace the placement configuration. Existing fields are not touched.
    pub fn set_config(&mut self, config: BuilderConfig) {
        self.config = config;
    }

    /// All fields in insertion order.
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the store holds no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field by id.
    pub fn get(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Fields placed on a 1-based page.
    pub fn fields_on_page(&self, page: u32) -> impl Iterator<Item = &FormField> {
        self.fields.iter().filter(move |f| f.page_number == page)
    }

    /// Names used by more than one field, sorted.
    ///
    /// Fill-by-name only reaches one of the duplicates.
    pub fn duplicate_names(&self) -> Vec<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for f in &self.fields {
            *counts.entry(f.name.as_str()).or_default() += 1;
        }
        let mut dups: Vec<String> = counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(name, _)| name.to_string())
            .collect();
        dups.sort();
        dups
    }

    /// Place a new field of the default size at a click/drop position.
    ///
    /// The position is snapped to the grid (when enabled) and moved to
    /// the nearest free slot. Under [`OverlapPolicy::Reject`] an
    /// unresolvable overlap is an error; otherwise the field is placed at
    /// the best position found.
    pub fn add_field_at(
        &mut self,
        field_type: FieldType,
        x: f32,
        y: f32,
        page: u32,
    ) -> Result<&FormField> {
        let (width, height) = (self.config.default_field_width, self.config.default_field_height);
        let snapped = snap_to_grid(Point::new(x, y), self.config.grid_size, self.config.snap_to_grid);
        let pos = find_free_position(snapped, width, height, page, &self.fields, None);

        let name = self.next_field_name();
        let mut field = FormField::new(name, field_type, page)
            .at(pos.x, pos.y)
            .with_size(width, height);
        field.label = format!("Field {}", self.next_sequence - 1);
        field.font_size = self.config.default_font_size;

        if check_overlap(&field.rect(), page, &self.fields, None) {
            if self.config.overlap_policy == OverlapPolicy::Reject {
                return Err(Error::Overlap { id: field.id, page });
            }
            log::warn!("No free slot near ({}, {}) on page {}; field overlaps", x, y, page);
        }

        log::debug!("Added field '{}' at ({}, {}) on page {}", field.name, pos.x, pos.y, page);
        self.fields.push(field);
        self.notify();
        Ok(&self.fields[self.fields.len() - 1])
    }

    /// Insert a prebuilt field, applying the overlap policy to its rectangle.
    ///
    /// A field whose id is already taken is stored under a fresh id.
    pub fn insert_field(&mut self, mut field: FormField) -> Result<()> {
        if self.fields.iter().any(|f| f.id == field.id) {
            let fresh = new_field_id();
            log::warn!("Field id '{}' already in use; inserting as '{}'", field.id, fresh);
            field.id = fresh;
        }
        let placement = resolve_position(
            &field.rect(),
            field.page_number,
            &self.fields,
            None,
            self.config.overlap_policy,
        );
        match placement.point() {
            Some(p) => {
                field.x = p.x;
                field.y = p.y;
            },
            None => {
                return Err(Error::Overlap {
                    id: field.id,
                    page: field.page_number,
                })
            },
        }
        self.next_sequence += 1;
        self.fields.push(field);
        self.notify();
        Ok(())
    }

    /// Apply a partial update to a field.
    ///
    /// Geometry changes go through the overlap policy. A rejected change
    /// returns [`Error::Overlap`] and leaves the field untouched. A
    /// size-only change is never relocated: where the policy would move
    /// the field it is rejected instead.
    pub fn update_field(&mut self, id: &str, patch: &FieldPatch) -> Result<Placement> {
        let idx = self.index_of(id)?;
        let mut candidate = self.fields[idx].clone();
        candidate.apply(patch);

        let placement = if patch.touches_geometry() {
            let resize_only =
                patch.x.is_none() && patch.y.is_none() && patch.page_number.is_none();
            match resolve_position(
                &candidate.rect(),
                candidate.page_number,
                &self.fields,
                Some(id),
                self.config.overlap_policy,
            ) {
                Placement::Relocated(_) if resize_only => Placement::Rejected,
                other => other,
            }
        } else {
            Placement::Accepted(candidate.position())
        };

        let Some(p) = placement.point() else {
            return Err(Error::Overlap {
                id: id.to_string(),
                page: candidate.page_number,
            });
        };
        candidate.x = p.x;
        candidate.y = p.y;
        self.fields[idx] = candidate;
        self.notify();
        Ok(placement)
    }

    /// Move a field, snapping the target to the grid first.
    pub fn move_field(&mut self, id: &str, x: f32, y: f32) -> Result<Placement> {
        let p = snap_to_grid(Point::new(x, y), self.config.grid_size, self.config.snap_to_grid);
        self.update_field(id, &FieldPatch::position(p.x, p.y))
    }

    /// Resize a field, clamping to the minimum field size.
    pub fn resize_field(&mut self, id: &str, width: f32, height: f32) -> Result<Placement> {
        let patch = FieldPatch::size(width.max(MIN_FIELD_WIDTH), height.max(MIN_FIELD_HEIGHT));
        self.update_field(id, &patch)
    }

    /// Remove a field and return it.
    pub fn remove_field(&mut self, id: &str) -> Result<FormField> {
        let idx = self.index_of(id)?;
        let removed = self.fields.remove(idx);
        self.notify();
        Ok(removed)
    }

    /// Remove every field.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.next_sequence = 1;
        self.notify();
    }

    /// Replace the whole collection, e.g. after importing a configuration.
    pub fn replace_all(&mut self, fields: Vec<FormField>) {
        self.next_sequence = fields.len() + 1;
        self.fields = fields;
        self.notify();
    }

    /// Register a listener called with the field list after every mutation.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&[FormField]) + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.fields);
        }
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.fields
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| Error::FieldNotFound(id.to_string()))
    }

    fn next_field_name(&mut self) -> String {
        loop {
            let name = format!("field_{}", self.next_sequence);
            self.next_sequence += 1;
            if !self.fields.iter().any(|f| f.name == name) {
                return name;
            }
        }
    }
}
