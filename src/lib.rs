// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::wrong_self_convention)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # Form Oxide
//!
//! Form-builder engine for PDF documents: place text fields on pages,
//! keep them from overlapping, round-trip the layout as JSON and turn it
//! into a fillable, filled or flattened PDF.
//!
//! ## Core Features
//!
//! ### Placement
//! - **Overlap test**: axis-aligned rectangles, touching edges allowed
//! - **Spiral search**: nearest free position around a drop point
//! - **Grid snap**: configurable grid, half rounds up
//! - **Overlap policy**: reject, relocate or allow overlapping moves
//!
//! ### Layout model
//! - **FieldStore**: single owner of the field list with change listeners
//! - **Gestures**: drag and resize state machine over the store
//! - **JSON config**: tolerant import (two shapes, per-property defaults),
//!   timestamped export
//! - **Sample data**: plausible values per field type
//!
//! ### PDF output (via `lopdf`)
//! - **Materialize**: one AcroForm text field per layout entry
//! - **Fill**: set values by field name
//! - **Flatten**: draw values into page content and drop the form
//! - **Extract**: read an existing form back into a layout
//!
//! ## Coordinates
//!
//! Layout coordinates have a top-left origin with y growing downward, at
//! scale 1.0 (one unit per PDF point). PDF rectangles use a bottom-left
//! origin; the conversion is `pdfY = pageHeight - y - height`.
//!
//! ## Quick Start
//!
//! ```ignore
//! use form_oxide::config::{BuilderConfig, FlattenOptions};
//! use form_oxide::field::FieldType;
//! use form_oxide::store::FieldStore;
//! use form_oxide::{pdf, sample, schema};
//!
//! # fn main() -> form_oxide::Result<()> {
//! let mut store = FieldStore::new(BuilderConfig::default());
//! store.add_field_at(FieldType::Text, 72.0, 100.0, 1)?;
//! store.add_field_at(FieldType::Email, 72.0, 100.0, 1)?; // relocated
//!
//! let blank = std::fs::read("blank.pdf")?;
//! let with_fields = pdf::materialize_fields(&blank, store.fields())?;
//! let values = sample::sample_data(store.fields());
//! let flat = pdf::fill_and_flatten(&with_fields, store.fields(), &values, &FlattenOptions::default())?;
//! std::fs::write("out.pdf", flat)?;
//!
//! schema::export_config_file("fields.json", store.fields())?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Layout geometry and placement
pub mod geometry;
pub mod placement;

// Field model
pub mod field;
pub mod interaction;
pub mod store;

// JSON configuration import/export
pub mod schema;

// Sample values
pub mod sample;

// AcroForm pipeline
pub mod pdf;

// Re-exports
pub use config::{BuilderConfig, FlattenOptions, OverlapPolicy};
pub use error::{Error, Result};
pub use field::{FieldPatch, FieldType, FormField};
pub use geometry::{Point, Rect};
pub use placement::Placement;
pub use schema::PdfConfig;
pub use store::FieldStore;

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
